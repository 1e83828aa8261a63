use thiserror::Error;

/// Failure to obtain the product page body
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: &'static str, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Unexpected HTTP status {code} from {url}")]
    Status { code: u16, url: String },
    #[error("Failed to read response body: {0}")]
    Body(String),
}
