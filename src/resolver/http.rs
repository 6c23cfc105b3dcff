use async_trait::async_trait;
use anyhow::{Result, anyhow};
use reqwest::Client;
use crate::resolver::{TargetResolutionService, TargetQuery, ResolvedTargets};

/// Delegates target resolution to a remote service: the query is POSTed as JSON,
/// the response body is a `ResolvedTargets` document.
#[derive(Debug)]
pub struct HttpTargetResolver {
    client: Client,
    url: String,
}

impl HttpTargetResolver {
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TargetResolutionService for HttpTargetResolver {
    async fn get_targets(&self, query: &TargetQuery) -> Result<ResolvedTargets> {
        let response = self.client.post(&self.url)
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Target service at {} answered {}", self.url, status));
        }

        let resolved = response.json::<ResolvedTargets>().await?;
        Ok(resolved)
    }
}
