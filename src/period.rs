use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of "now". Swappable so scheduling and period selection can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// How coarse the snapshot partitions are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Year,
    Month,
    #[default]
    Day,
    Hour,
}

impl Granularity {
    fn format(self) -> &'static str {
        match self {
            Granularity::Year => "%Y",
            Granularity::Month => "%Y-%m",
            Granularity::Day => "%Y-%m-%d",
            Granularity::Hour => "%Y-%m-%dT%H",
        }
    }
}

/// Partition key of a persisted snapshot, e.g. `2024-03-07` for daily partitions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(String);

impl Period {
    pub fn from_utc(at: DateTime<Utc>, granularity: Granularity) -> Self {
        Period(at.format(granularity.format()).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Period {
    fn from(key: &str) -> Self {
        Period(key.to_string())
    }
}

impl From<String> for Period {
    fn from(key: String) -> Self {
        Period(key)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keys_follow_granularity() {
        let at = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
        assert_eq!(Period::from_utc(at, Granularity::Year).as_str(), "2024");
        assert_eq!(Period::from_utc(at, Granularity::Month).as_str(), "2024-03");
        assert_eq!(Period::from_utc(at, Granularity::Day).as_str(), "2024-03-07");
        assert_eq!(Period::from_utc(at, Granularity::Hour).as_str(), "2024-03-07T09");
    }

    #[test]
    fn same_day_same_period() {
        let morning = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            Period::from_utc(morning, Granularity::Day),
            Period::from_utc(night, Granularity::Day)
        );
    }
}
