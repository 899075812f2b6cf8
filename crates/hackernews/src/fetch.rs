//! Upstream fetch seam

use crate::client::HackerNewsConfig;
use crate::error::AdapterError;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches raw upstream bodies
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &Url) -> Result<String>;
}

/// `reqwest`-backed fetcher
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &HackerNewsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AdapterError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn get(&self, url: &Url) -> Result<String> {
        debug!(%url, "fetching");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AdapterError::Http {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| AdapterError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
