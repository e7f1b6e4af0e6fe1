use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, ORIGIN};
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::{ResourceAttributes, ResourceKind, ResourceRef};
use crate::token::BearerToken;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Plain GET; an HTTP error status is not an `Err`.
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse> {
        debug!(url, "GET");
        let res = self.client.get(url).headers(headers).send().await?;
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(HttpResponse { status, body })
    }
}

pub fn api_url(config: &Config, country: &str, kind: ResourceKind, id: &str) -> String {
    format!(
        "{}/{}/{}/{}?extend=editorialVideo",
        config.api_base,
        country,
        kind.api_segment(),
        id
    )
}

pub fn api_headers(config: &Config, token: &BearerToken) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
            .map_err(|_| Error::Parse("token contains characters not allowed in a header".into()))?,
    );
    headers.insert(
        ORIGIN,
        HeaderValue::from_str(&config.origin)
            .map_err(|e| Error::Config(format!("origin '{}': {e}", config.origin)))?,
    );
    Ok(headers)
}

#[derive(Deserialize)]
struct ResourceResponse {
    data: Vec<ResourceItem>,
}

#[derive(Deserialize)]
struct ResourceItem {
    #[serde(default)]
    attributes: ResourceAttributes,
}

pub async fn fetch_attributes(
    transport: &dyn Transport,
    config: &Config,
    resource: &ResourceRef,
    token: &BearerToken,
) -> Result<ResourceAttributes> {
    let url = api_url(config, &resource.country, resource.kind, &resource.id);
    let res = transport.get(&url, api_headers(config, token)?).await?;
    if !res.is_success() {
        return Err(Error::Api { status: res.status });
    }

    let body: ResourceResponse =
        serde_json::from_str(&res.body).map_err(|e| Error::Parse(e.to_string()))?;
    body.data
        .into_iter()
        .next()
        .map(|item| item.attributes)
        .ok_or_else(|| Error::Parse("response has an empty `data` array".into()))
}
