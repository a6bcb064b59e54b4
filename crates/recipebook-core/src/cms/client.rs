use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api::client::{ApiClient, REQUEST_TIMEOUT_SECS};
use crate::api::ApiError;
use crate::models::SiteSettings;

pub const DEFAULT_PROJECT_ID: &str = "hi3cpzph";
pub const DEFAULT_DATASET: &str = "production";

/// Query API version pinned for stable result shapes
const API_VERSION: &str = "v2021-10-21";

const SITE_SETTINGS_QUERY: &str = r#"*[_type == "siteSettings"][0] {
    headerLinks,
    logo,
    title,
    description
}"#;

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    result: Option<T>,
}

#[derive(Clone)]
pub struct CmsClient {
    client: Client,
    endpoint: String,
}

impl CmsClient {
    pub fn new(project_id: &str, dataset: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "https://{}.api.sanity.io/{}/data/query/{}",
                project_id, API_VERSION, dataset
            ),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a query, returning `None` when it matches nothing
    pub async fn query<T: DeserializeOwned>(&self, query: &str) -> Result<Option<T>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(ApiError::NetworkError)
            .context("Failed to send CMS query")?;

        let response = ApiClient::check_response(response).await?;
        let envelope: QueryResponse<T> = response
            .json()
            .await
            .context("Failed to parse CMS query response")?;
        Ok(envelope.result)
    }

    pub async fn fetch_site_settings(&self) -> Result<Option<SiteSettings>> {
        let settings: Option<SiteSettings> = self.query(SITE_SETTINGS_QUERY).await?;
        debug!(found = settings.is_some(), "Fetched site settings");
        Ok(settings)
    }
}
