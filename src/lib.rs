//! HACKER NEWS ARCHIVER
//! Crawls the paginated front page, merges every fresh batch into the snapshot
//! of the current period and repeats on a schedule aligned to the hour.

mod macros;

pub mod config;
mod error;
pub mod merge;
pub mod parse;
pub mod period;
pub mod process;
pub mod record;
pub mod render;
pub mod request;
pub mod schedule;
pub mod store;

pub use config::{Config, DuplicateKey, SaveFormat};
pub use error::{Error, Result, StoreError};
pub use period::{Clock, Granularity, Period, SystemClock};
pub use process::Scraper;
pub use record::{ItemRecord, RecordBatch};
pub use request::{Fetcher, HttpTransport, Transport};
pub use schedule::{Scrape, Scheduler};
pub use store::{FileStore, SnapshotStore};

/// Number of stories on a single listing page.
pub const NEWS_PER_PAGE: usize = 30;
const DEFAULT_BASE_URL: &str = "https://news.ycombinator.com/";
const DEFAULT_STORAGE_DIR: &str = "./storage";
const DEFAULT_REPORT_PATH: &str = "./HackerNews.html";
