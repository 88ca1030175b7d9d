use serde::{Deserialize, Serialize};

/// Messages pushed from the background process to the side panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PanelOutbound {
    #[serde(rename = "SHOW_RESULT_LOADING")]
    Loading,
    #[serde(rename = "SHOW_RESULT_DATA")]
    Data { payload: ScoreReport },
    #[serde(rename = "SHOW_RESULT_ERROR")]
    Error {
        error: ErrorKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<ErrorPayload>,
    },
}

/// Scoring result payload surfaced to the panel. Fields the service omitted
/// stay absent instead of being filled with fabricated defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub prob_ai: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_high: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedPage,
    SelectionTooShort,
    SelectionExtractionFailed,
    UpstreamError,
    NetworkOrTimeout,
}

/// Context attached to an error report; each kind fills the fields it has.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "nChars", skip_serializing_if = "Option::is_none")]
    pub n_chars: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorPayload {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn for_char_count(n_chars: usize) -> Self {
        Self {
            n_chars: Some(n_chars),
            ..Self::default()
        }
    }

    pub fn for_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}
