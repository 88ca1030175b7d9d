use thiserror::Error;

use crate::TabId;

/// The in-page selection read could not run at all (restricted page,
/// navigation mid-call). Distinct from an empty selection, which is a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("selection script failed: {0}")]
pub struct InjectionError(pub String);

/// Runs a selection read in every frame of a tab, returning one result per
/// frame in the host's enumeration order.
#[async_trait::async_trait]
pub trait FrameScripting: Send + Sync {
    async fn selection_per_frame(&self, tab_id: TabId) -> Result<Vec<String>, InjectionError>;
}

/// First frame result that is non-empty after trimming, untrimmed;
/// enumeration order decides ties. Empty string when no frame has one.
pub fn first_nonblank(frames: &[String]) -> String {
    frames
        .iter()
        .find(|text| !text.trim().is_empty())
        .cloned()
        .unwrap_or_default()
}

pub async fn extract_selection(
    host: &dyn FrameScripting,
    tab_id: TabId,
) -> Result<String, InjectionError> {
    let frames = host.selection_per_frame(tab_id).await?;
    Ok(first_nonblank(&frames))
}
