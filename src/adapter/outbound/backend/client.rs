use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::ServerConfig;
use crate::domain::Snapshot;
use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for the backend's status endpoint.
pub struct StatusClient {
    client: Client,
    url: Url,
    token: String,
}

impl StatusClient {
    /// Client for the status endpoint at `url`, authenticating with `token`.
    pub fn new(url: Url, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            token: token.into(),
        })
    }

    /// Build a client from the `[server]` section.
    pub fn from_config(server: &ServerConfig) -> Result<Self> {
        Self::new(server.status_url()?, server.token()?)
    }

    /// Fetch the current snapshot once.
    pub async fn fetch_status(&self) -> Result<Snapshot> {
        info!(url = %self.url, "Fetching UPS status");

        let response = self
            .client
            .get(self.url.clone())
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let snapshot: Snapshot = response.json().await?;
        debug!(status = ?snapshot.status, "Fetched status");
        Ok(snapshot)
    }
}
