//! Build configuration loaded from TOML.
//!
//! ```toml
//! target_folder = "/srv/sync"
//! build_time = "15:30:00"
//!
//! [[source]]
//! market = "sse"
//! resource = "m5"
//! folder = "/data/sse/min"
//!
//! [code_ranges]
//! sse = ["600000-609999"]
//! ```

use barvault_core::{CodeRanges, RangeParseError, ResourceKind};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::build::ResourceKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("no [[source]] entries configured")]
    NoSources,

    #[error("invalid market id '{0}': expected ASCII letters and digits")]
    InvalidMarket(String),

    #[error("unknown resource '{resource}' for market '{market}'")]
    UnknownResource { market: String, resource: String },

    #[error("source '{0}' is configured more than once")]
    DuplicateSource(ResourceKey),

    #[error("code ranges for '{market}': {source}")]
    Ranges {
        market: String,
        #[source]
        source: RangeParseError,
    },
}

fn default_build_time() -> NaiveTime {
    NaiveTime::from_hms_opt(15, 30, 0).unwrap_or(NaiveTime::MIN)
}

/// One source folder feeding one resource of one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub market: String,
    pub resource: String,
    pub folder: PathBuf,
}

impl SourceConfig {
    /// Parsed `market.resource` key; valid once [`RunConfig::validate`] passed.
    pub fn key(&self) -> Result<ResourceKey, ConfigError> {
        let kind = ResourceKind::from_key(&self.resource).ok_or_else(|| {
            ConfigError::UnknownResource {
                market: self.market.clone(),
                resource: self.resource.clone(),
            }
        })?;
        Ok(ResourceKey::new(&self.market, kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Root of the published archive tree.
    pub target_folder: PathBuf,

    /// Local time after which the daily build runs in watch mode.
    #[serde(default = "default_build_time")]
    pub build_time: NaiveTime,

    #[serde(rename = "source", default)]
    pub sources: Vec<SourceConfig>,

    /// Market id → inclusive instrument-code ranges. Markets without an
    /// entry accept every code.
    #[serde(default)]
    pub code_ranges: BTreeMap<String, Vec<String>>,
}

impl RunConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        // Two sources with one key would write the same bucket files.
        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.market.is_empty() || !source.market.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(ConfigError::InvalidMarket(source.market.clone()));
            }
            let key = source.key()?;
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateSource(key));
            }
        }
        for market in self.code_ranges.keys() {
            self.code_filter(market)?;
        }
        Ok(())
    }

    /// Code ranges configured for `market`, or `None` to accept everything.
    pub fn code_filter(&self, market: &str) -> Result<Option<CodeRanges>, ConfigError> {
        let specs = self
            .code_ranges
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(market))
            .map(|(_, specs)| specs);
        let Some(specs) = specs else {
            return Ok(None);
        };
        let ranges = CodeRanges::parse(specs).map_err(|source| ConfigError::Ranges {
            market: market.to_string(),
            source,
        })?;
        Ok((!ranges.is_empty()).then_some(ranges))
    }
}
