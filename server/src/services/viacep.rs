use axum::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use common::application::ViaCepConfig;
use common::error::{ApiError, ApiResult};

use crate::services::CepSource;

/// ViaCEP 地址查询: `GET {base}/{uf}/{city}/{street}/json/`
#[derive(Debug, Clone)]
pub struct ViaCepSource {
    url: Url,
    client: Client,
}

impl ViaCepSource {
    pub fn new(config: &ViaCepConfig) -> ApiResult<Self> {
        let mut url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("VIACEP_BASE_URL={}: {}", config.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ApiError::Config(format!("VIACEP_BASE_URL={}: not a base url", config.base_url))
            })?
            .pop_if_empty()
            .extend([
                config.uf.as_str(),
                config.city.as_str(),
                config.street.as_str(),
                "json",
                "",
            ]);

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("http client: {}", e)))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl CepSource for ViaCepSource {
    async fn fetch_entries(&self) -> ApiResult<Vec<Value>> {
        debug!("GET {}", self.url);
        let response = self.client.get(self.url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream(format!("{} answered {}", self.url, status)));
        }

        match response.json::<Value>().await? {
            Value::Array(entries) => Ok(entries),
            Value::Object(body) if body.contains_key("erro") => Err(ApiError::Mapping(
                "provider reported an error for the query".to_string(),
            )),
            _ => Err(ApiError::Mapping("expected a JSON array of entries".to_string())),
        }
    }
}
