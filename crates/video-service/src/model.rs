use serde::{Deserialize, Serialize};

/// A registered video.
///
/// `id` and `data_url` are assigned by the registry on creation; values sent
/// by a client in a create request are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub title: String,
    /// Duration in seconds
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub data_url: String,
}

impl VideoMetadata {
    pub fn new(title: impl Into<String>, duration: u64) -> Self {
        Self {
            title: title.into(),
            duration,
            ..Self::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

/// Reported state of a data upload
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoState {
    Processing,
    Ready,
}

/// Response value of a data upload attempt. Never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoStatus {
    pub state: VideoState,
}

impl VideoStatus {
    pub fn processing() -> Self {
        Self {
            state: VideoState::Processing,
        }
    }

    pub fn ready() -> Self {
        Self {
            state: VideoState::Ready,
        }
    }
}
