use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};

use crate::parse::parse_html;
use crate::record::RecordBatch;
use crate::{info_time, Error, Result, NEWS_PER_PAGE};

/// Upper bound on the pages whose records are reserved up front.
const MAX_PREALLOCATED_PAGES: usize = 10;

/// Plain `GET url -> body` capability the fetcher pulls pages through.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<String> {
        (**self).get(url).await
    }
}

/// `Transport` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    // Client uses Arc so we can clone cheaply
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// Requests a page and returns the HTML. Non-2xx responses count as failures.
    async fn get(&self, url: &str) -> Result<String> {
        let transport_err = |e: reqwest::Error| Error::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(transport_err)?;
        let html = res.text().await.map_err(transport_err)?;
        Ok(html)
    }
}

/// Downloads the listing pages of one cycle, strictly one after another.
pub struct Fetcher<T> {
    transport: T,
    base_url: Url,
    count: usize,
    delay: Duration,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, base_url: Url, count: usize, delay: Duration) -> Self {
        Self {
            transport,
            base_url,
            count,
            delay,
        }
    }

    pub fn page_count(&self) -> usize {
        self.count.div_ceil(NEWS_PER_PAGE)
    }

    /// `{base}news?p={page}`, pages are 1-indexed.
    pub fn page_url(&self, page: usize) -> String {
        let path = format!("news?p={page}");
        match self.base_url.join(&path) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{path}", self.base_url),
        }
    }

    /// Fetches and parses every page of the cycle.
    ///
    /// Requests are separated by the configured delay and never overlap. The first
    /// failing page aborts the cycle; the remaining pages are not requested.
    /// Ranks are left as printed on each page.
    pub async fn fetch(&self) -> Result<RecordBatch> {
        let start_time = Utc::now();
        let pages = self.page_count();
        let mut batch = Vec::with_capacity(pages.min(MAX_PREALLOCATED_PAGES) * NEWS_PER_PAGE);

        for page in 1..=pages {
            if page > 1 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let url = self.page_url(page);
            tracing::debug!(%url, "requesting page");
            let html = self.transport.get(&url).await.inspect_err(|e| {
                tracing::warn!(page, error = %e, "page fetch failed, abandoning cycle");
            })?;

            let records = parse_html(html, self.base_url.clone()).await?;
            tracing::debug!(page, records = records.len(), "parsed page");
            batch.extend(records);
        }

        info_time!(start_time, "Fetched {} records from {} pages", batch.len(), pages);
        Ok(batch)
    }
}
