use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::{debug, warn};

use super::models::FetchError;
use super::PageFetcher;
use crate::config::Config;

/// HTTP client for the tracked product page
pub struct ProductPageClient {
    http_client: HttpClient,
    url: String,
}

impl ProductPageClient {
    /// Create a client presenting the configured browser identity
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_url(config, config.product_url.clone())
    }

    /// Create a client against a custom URL (for testing)
    pub fn with_url(config: &Config, url: String) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder()
            .default_headers(Self::create_headers(config)?)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { http_client, url })
    }

    /// Static header set sent with every request
    fn create_headers(config: &Config) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();

        let user_agent = HeaderValue::from_str(&config.user_agent)
            .map_err(|e| FetchError::InvalidHeader { name: "User-Agent", reason: e.to_string() })?;
        headers.insert(USER_AGENT, user_agent);

        let language = HeaderValue::from_str(&config.accept_language)
            .map_err(|e| FetchError::InvalidHeader { name: "Accept-Language", reason: e.to_string() })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        Ok(headers)
    }

    /// GET the product page and return its body as text
    ///
    /// Any non-2xx status is reported as `FetchError::Status`.
    pub async fn get_page(&self) -> Result<String, FetchError> {
        debug!("Fetching {}", self.url);

        let response = self.http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Product page answered with HTTP {}", status.as_u16());
            return Err(FetchError::Status {
                code: status.as_u16(),
                url: self.url.clone(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

#[async_trait]
impl PageFetcher for ProductPageClient {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.get_page().await
    }
}
