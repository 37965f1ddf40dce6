use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Video not found: {0}")]
    NotFound(u64),

    #[error("Upload of video {0} did not complete (server still reports PROCESSING)")]
    UploadIncomplete(u64),

    #[error("Unexpected response {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
