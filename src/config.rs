use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::period::Granularity;
use crate::{Error, Result, DEFAULT_BASE_URL, DEFAULT_REPORT_PATH, DEFAULT_STORAGE_DIR};

/// Which artifacts a scrape produces besides the period snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// Snapshot only.
    Json,
    /// Snapshot plus the flat HTML report.
    Html,
    #[default]
    All,
}

impl SaveFormat {
    pub fn renders_report(self) -> bool {
        matches!(self, SaveFormat::Html | SaveFormat::All)
    }
}

/// Record field used to decide whether two records are the same story.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateKey {
    #[default]
    Link,
    Title,
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of stories to fetch per cycle. Controls the page count.
    pub count: usize,
    pub fetch_delay_ms: u64,
    pub scrape_interval_ms: u64,
    pub save_format: SaveFormat,
    pub duplicate_key: DuplicateKey,
    pub granularity: Granularity,
    pub base_url: String,
    pub storage_dir: PathBuf,
    pub report_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            count: crate::NEWS_PER_PAGE,
            fetch_delay_ms: 500,
            scrape_interval_ms: 60 * 60 * 1000,
            save_format: SaveFormat::default(),
            duplicate_key: DuplicateKey::default(),
            granularity: Granularity::default(),
            base_url: DEFAULT_BASE_URL.into(),
            storage_dir: DEFAULT_STORAGE_DIR.into(),
            report_path: DEFAULT_REPORT_PATH.into(),
        }
    }
}

impl Config {
    /// Reads a YAML config file. Missing keys fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.scrape_interval_ms == 0 {
            return Err(Error::Config("scrape_interval_ms must be positive".into()));
        }
        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {e}", self.base_url)))
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_millis(self.scrape_interval_ms)
    }
}
