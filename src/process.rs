use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::{Config, DuplicateKey, SaveFormat};
use crate::error::StoreError;
use crate::merge::merge;
use crate::period::{Clock, Granularity, Period, SystemClock};
use crate::record::RecordBatch;
use crate::render::render_report;
use crate::request::{Fetcher, HttpTransport, Transport};
use crate::schedule::Scrape;
use crate::store::{FileStore, SnapshotStore};
use crate::{info_time, Error, Result};

/// Runs one fetch -> merge -> persist cycle against the current period.
pub struct Scraper<T, S> {
    fetcher: Fetcher<T>,
    store: S,
    clock: Arc<dyn Clock>,
    duplicate_key: DuplicateKey,
    granularity: Granularity,
    save_format: SaveFormat,
    report_path: PathBuf,
}

impl Scraper<HttpTransport, FileStore> {
    /// Scraper talking to the live site and storing under `config.storage_dir`.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let fetcher = Fetcher::new(
            HttpTransport::new()?,
            config.base_url()?,
            config.count,
            config.fetch_delay(),
        );
        let store = FileStore::new(&config.storage_dir);
        Ok(Self::new(fetcher, store, Arc::new(SystemClock), config))
    }
}

impl<T: Transport, S: SnapshotStore> Scraper<T, S> {
    pub fn new(fetcher: Fetcher<T>, store: S, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            fetcher,
            store,
            clock,
            duplicate_key: config.duplicate_key,
            granularity: config.granularity,
            save_format: config.save_format,
            report_path: config.report_path.clone(),
        }
    }

    pub fn current_period(&self) -> Period {
        Period::from_utc(self.clock.now(), self.granularity)
    }

    /// Fetches a fresh batch, merges it into the current period's snapshot and
    /// persists the result.
    ///
    /// A fetch failure aborts before anything is written. A write failure is
    /// returned as [`Error::StoreWrite`], which still carries the merged batch.
    pub async fn scrape(&self) -> Result<RecordBatch> {
        let start_time = Utc::now();
        info_time!("Started scraping");

        let fresh = self.fetcher.fetch().await?;
        let period = self.current_period();

        let merged = if self.store.exists(&period).await.map_err(Error::StoreRead)? {
            let stored = self.store.read(&period).await.map_err(Error::StoreRead)?;
            let merged = merge(&stored, &fresh, self.duplicate_key);
            tracing::info!(
                %period,
                stored = stored.len(),
                fresh = fresh.len(),
                merged = merged.len(),
                "merged with stored snapshot"
            );
            merged
        } else {
            // Pages are fetched apart, a story sliding down the listing can show up twice.
            let merged = merge(&[], &fresh, self.duplicate_key);
            tracing::info!(%period, fresh = fresh.len(), merged = merged.len(), "first snapshot of period");
            merged
        };

        if let Err(source) = self.store.write(&period, &merged).await {
            tracing::error!(%period, error = %source, "failed to persist snapshot");
            return Err(Error::StoreWrite {
                target: format!("snapshot {period}"),
                source,
                merged: Box::new(merged),
            });
        }

        if self.save_format.renders_report() {
            if let Err(e) = tokio::fs::write(&self.report_path, render_report(&merged)).await {
                tracing::error!(path = %self.report_path.display(), error = %e, "failed to write report");
                return Err(Error::StoreWrite {
                    target: format!("report {}", self.report_path.display()),
                    source: StoreError::Io(e),
                    merged: Box::new(merged),
                });
            }
        }

        info_time!(start_time, "Stored {} records for {}", merged.len(), period);
        Ok(merged)
    }

    /// Snapshot stored for a past (or the current) period.
    pub async fn get_batch(&self, period: &Period) -> Result<RecordBatch> {
        self.store.read(period).await.map_err(Error::StoreRead)
    }

    pub async fn list_stored_periods(&self) -> Result<Vec<Period>> {
        self.store.list().await.map_err(Error::StoreRead)
    }
}

#[async_trait]
impl<T: Transport, S: SnapshotStore> Scrape for Scraper<T, S> {
    async fn scrape(&self) -> Result<RecordBatch> {
        Scraper::scrape(self).await
    }
}
