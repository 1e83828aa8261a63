pub mod client;
pub mod models;

use async_trait::async_trait;

pub use client::ProductPageClient;
pub use models::FetchError;

/// Source of the raw product page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the tracked page once; no retry
    async fn fetch(&self) -> Result<String, FetchError>;
}
