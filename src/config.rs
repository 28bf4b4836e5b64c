//! Runtime settings read from the environment (and `.env`, loaded by the
//! binary before this runs).

use anyhow::Result;
use std::borrow::Cow;

use crate::analyzers::classify::ThresholdTable;

pub const DEFAULT_API_BASE_URL: &str = "https://www.umweltbundesamt.de/api/air_data/v3";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/clean_air.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `UBA_API_BASE_URL`
    pub api_base_url: String,
    /// `LOG_FILE_PATH`
    pub log_file_path: String,
    /// `CLEAN_AIR_THRESHOLDS`: optional JSON file replacing the standard limits.
    pub thresholds_path: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            api_base_url: non_empty("UBA_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            log_file_path: non_empty("LOG_FILE_PATH")
                .unwrap_or_else(|| DEFAULT_LOG_FILE_PATH.to_string()),
            thresholds_path: non_empty("CLEAN_AIR_THRESHOLDS"),
        }
    }

    /// The configured threshold table, or the standard one.
    pub fn threshold_table(&self) -> Result<Cow<'static, ThresholdTable>> {
        match &self.thresholds_path {
            Some(path) => Ok(Cow::Owned(ThresholdTable::load(path)?)),
            None => Ok(Cow::Borrowed(ThresholdTable::standard())),
        }
    }
}
