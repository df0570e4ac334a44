//! Contract broker client.
//!
//! Publishes contract documents to a broker and fetches the latest published
//! document for a provider/consumer pair.

use covenant_core::contract::Contract;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

/// Shared HTTP client for broker requests.
static HTTP_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to create HTTP client")
    })
}

/// Errors from talking to the broker.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("broker answered {status} for {url}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// A client scoped to one broker base URL.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    base_url: String,
    token: Option<String>,
}

impl BrokerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            token: None,
        }
    }

    /// Use a bearer token for every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Publish a contract under a consumer version.
    pub async fn publish(&self, contract: &Contract, version: &str) -> Result<(), BrokerError> {
        let url = format!(
            "{}/pacts/provider/{}/consumer/{}/version/{}",
            self.base_url, contract.provider.name, contract.consumer.name, version
        );
        let response = self
            .authorized(http_client().put(&url).json(contract))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(BrokerError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }
        info!(%url, version, "published contract");
        Ok(())
    }

    /// Fetch the latest published contract for a provider/consumer pair.
    pub async fn fetch_latest(
        &self,
        provider: &str,
        consumer: &str,
    ) -> Result<Contract, BrokerError> {
        let url = format!(
            "{}/pacts/provider/{provider}/consumer/{consumer}/latest",
            self.base_url
        );
        let response = self.authorized(http_client().get(&url)).send().await?;
        if !response.status().is_success() {
            return Err(BrokerError::UnexpectedStatus {
                url,
                status: response.status().as_u16(),
            });
        }
        Ok(response.json::<Contract>().await?)
    }
}
