use detector_host::{extract_selection, first_nonblank, FrameScripting, InjectionError, TabId};
use pretty_assertions::assert_eq;

struct FramesHost(Result<Vec<String>, InjectionError>);

#[async_trait::async_trait]
impl FrameScripting for FramesHost {
    async fn selection_per_frame(&self, _tab_id: TabId) -> Result<Vec<String>, InjectionError> {
        self.0.clone()
    }
}

#[test]
fn first_nonblank_takes_enumeration_order() {
    let frames = vec![
        "".to_string(),
        "   \n\t".to_string(),
        "second frame".to_string(),
        "third frame, longer than the second".to_string(),
    ];
    // First wins, not longest.
    assert_eq!(first_nonblank(&frames), "second frame");
}

#[test]
fn first_nonblank_keeps_surrounding_whitespace() {
    let frames = vec!["  padded selection  ".to_string()];
    assert_eq!(first_nonblank(&frames), "  padded selection  ");
}

#[test]
fn all_blank_frames_yield_empty_string() {
    let frames = vec!["".to_string(), " ".to_string()];
    assert_eq!(first_nonblank(&frames), "");
    assert_eq!(first_nonblank(&[]), "");
}

#[tokio::test]
async fn extraction_reads_through_the_host() {
    let host = FramesHost(Ok(vec!["".to_string(), "picked".to_string()]));
    let selection = extract_selection(&host, 5).await.expect("extract ok");
    assert_eq!(selection, "picked");
}

#[tokio::test]
async fn injection_failure_propagates() {
    let host = FramesHost(Err(InjectionError("page navigated away".to_string())));
    let err = extract_selection(&host, 5).await.unwrap_err();
    assert_eq!(err, InjectionError("page navigated away".to_string()));
}
