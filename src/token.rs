use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::HeaderMap;
use tracing::{debug, info, warn};

use crate::api::{self, HttpResponse, Transport};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::resource::ResourceKind;

static SCRIPT_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"crossorigin src="(/assets/index.+?\.js)""#).unwrap());

#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

pub struct TokenManager<'a> {
    transport: &'a dyn Transport,
    config: &'a Config,
}

impl<'a> TokenManager<'a> {
    pub fn new(transport: &'a dyn Transport, config: &'a Config) -> Self {
        Self { transport, config }
    }

    /// Returns the cached token if the API still accepts it, otherwise
    /// scrapes a new one from the web player and caches it.
    pub async fn ensure_token(&self) -> Result<BearerToken> {
        if let Some(cached) = self.read_cached().await? {
            if self.probe(&cached).await? {
                info!("cached token valid");
                return Ok(cached);
            }
            warn!("cached token rejected, fetching a new one");
        }

        let token = self.scrape().await?;
        tokio::fs::write(&self.config.token_file, token.as_str()).await?;
        info!(path = %self.config.token_file.display(), "token updated");
        Ok(token)
    }

    async fn read_cached(&self) -> Result<Option<BearerToken>> {
        match tokio::fs::read(&self.config.token_file).await {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                let content = content.trim();
                Ok((!content.is_empty()).then(|| BearerToken::new(content)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn probe(&self, token: &BearerToken) -> Result<bool> {
        let url = api::api_url(
            self.config,
            &self.config.probe_country,
            ResourceKind::Album,
            &self.config.probe_album_id,
        );
        let headers = match api::api_headers(self.config, token) {
            Ok(headers) => headers,
            Err(e) => {
                warn!("cached token unusable: {e}");
                return Ok(false);
            }
        };
        let res = self.get(&url, headers).await?;
        debug!(status = res.status, "token probe");
        Ok(res.status == 200)
    }

    async fn scrape(&self) -> Result<BearerToken> {
        let page = self.get(&self.config.token_page, HeaderMap::new()).await?;
        let script_path = SCRIPT_PATH_RE
            .captures(&page.body)
            .and_then(|c| c.get(1))
            .ok_or(Error::TokenScrape("no index script referenced by the web player page"))?
            .as_str();
        debug!(script_path, "found web player script");

        let script_url = format!("{}{}", self.config.origin, script_path);
        let script = self.get(&script_url, HeaderMap::new()).await?;
        extract_token(&script.body, &self.config.token_prefix)
            .ok_or(Error::TokenScrape("no token found in the web player script"))
    }

    async fn get(&self, url: &str, headers: HeaderMap) -> Result<HttpResponse> {
        self.transport
            .get(url, headers)
            .await
            .map_err(|e| match e {
                Error::Transport(e) => Error::TokenRetrieval(e),
                other => other,
            })
    }
}

fn extract_token(script: &str, prefix: &str) -> Option<BearerToken> {
    let re = Regex::new(&format!(r#"({}.+?)""#, regex::escape(prefix))).ok()?;
    re.captures(script)
        .and_then(|c| c.get(1))
        .map(|m| BearerToken::new(m.as_str()))
}
