use thiserror::Error;

use crate::resource::{ResourceKind, VideoShape};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The token page or script no longer matches the expected structure.
    #[error("could not scrape token: {0}")]
    TokenScrape(&'static str),

    #[error("token retrieval failed: {0}")]
    TokenRetrieval(#[source] reqwest::Error),

    #[error("catalog API returned HTTP {status}")]
    Api { status: u16 },

    #[error("unexpected API response: {0}")]
    Parse(String),

    #[error("no {shape} video available for this {kind}")]
    MissingVideo { shape: VideoShape, kind: ResourceKind },

    #[error("unsupported video shape: '{0}' (expected 'tall' or 'square')")]
    UnsupportedShape(String),

    #[error("invalid manifest: {0}")]
    ManifestParse(String),

    #[error("manifest contains no variant streams")]
    EmptyManifest,

    #[error("no variant with id {index} (valid ids are 0 to {})", .len.saturating_sub(1))]
    IndexOutOfRange { index: i64, len: usize },

    #[error("'{0}' is not a number")]
    InvalidInput(String),

    #[error("ffmpeg failed: {tool_output}")]
    Extraction { tool_output: String },

    #[error("malformed catalog URL: {0}")]
    MalformedUrl(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
