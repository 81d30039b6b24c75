// src/scraping/http_fetcher.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Proxy};
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info};

use crate::core::HttpSettings;
use crate::errors::FetchError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Raw page returned by a fetch. Parsing is deferred to [`FetchedPage::document`]
/// because `Html` cannot be held across an await point.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub body: String,
}

impl FetchedPage {
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Sequential HTTP GET with bounded retries on timeout.
pub struct HttpFetcher {
    client: Client,
    retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(build_headers(&settings.headers)?)
            .timeout(settings.timeout);

        // Only configured proxies are used, never the environment's
        builder = builder.no_proxy();
        for proxy in build_proxies(&settings.proxies)? {
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            retries: settings.retries.max(1),
            retry_delay: settings.retry_delay,
            request_delay: settings.request_delay,
        })
    }

    async fn get_body(&self, url: &str) -> reqwest::Result<String> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        for attempt in 1..=self.retries {
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            match self.get_body(url).await {
                Ok(body) => {
                    return Ok(FetchedPage {
                        url: url.to_string(),
                        body,
                    })
                }
                Err(e) if e.is_timeout() && attempt < self.retries => {
                    info!(
                        "Timeout occurred for URL: {} (attempt {}/{}), retrying in {:?}...",
                        url, attempt, self.retries, self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) if e.is_timeout() => {
                    error!(
                        "Timeout occurred for URL: {} (attempt {}/{}), giving up",
                        url, attempt, self.retries
                    );
                }
                Err(e) => {
                    error!("An error occurred while retrieving the URL: {}, error: {}", url, e);
                    return Err(FetchError::Request {
                        url: url.to_string(),
                        source: e,
                    });
                }
            }
        }

        Err(FetchError::RetriesExhausted {
            url: url.to_string(),
            attempts: self.retries,
        })
    }
}

pub fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let header_value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Keys follow the requests-style proxy map: `http`, `https`, or `all`
pub fn build_proxies(proxies: &HashMap<String, String>) -> Result<Vec<Proxy>> {
    let mut built = Vec::new();
    for (scheme, url) in proxies {
        let proxy = match scheme.to_lowercase().as_str() {
            "http" => Proxy::http(url),
            "https" => Proxy::https(url),
            "all" => Proxy::all(url),
            other => anyhow::bail!("Unsupported proxy scheme: {}. Use http, https or all", other),
        }
        .with_context(|| format!("Invalid proxy URL for {}: {}", scheme, url))?;
        built.push(proxy);
    }
    Ok(built)
}
