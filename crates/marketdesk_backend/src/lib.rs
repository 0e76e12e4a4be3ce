pub mod chartdata;
pub mod levels;
pub mod method;
pub mod snapshots;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client for the dashboard backend's JSON endpoints.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    reqwest: Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> reqwest::Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let reqwest = ClientBuilder::new()
            .default_headers(default_headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            reqwest,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<R: DeserializeOwned>(&self, path: &str) -> reqwest::Result<R> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self.reqwest.get(&url).send().await?;
        let response = response.error_for_status()?;

        response.json().await
    }

    pub async fn call<M: method::Method>(&self, params: &M::Params) -> reqwest::Result<M::Response> {
        self.get(&M::path(params)).await
    }

    pub async fn call0<M: method::Method0>(&self) -> reqwest::Result<M::Response> {
        self.get(M::PATH).await
    }
}
