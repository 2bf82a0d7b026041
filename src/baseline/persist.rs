//! Durable baseline records
//!
//! One small JSON file per symbol so the last known baseline survives a
//! restart. A missing file or directory means "not yet known", never an
//! error.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted baseline for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineRecord {
    pub price: Decimal,
    pub time: DateTime<Utc>,
}

/// Directory of per-symbol baseline record files
#[derive(Debug, Clone)]
pub struct BaselineDir {
    dir: PathBuf,
}

impl BaselineDir {
    /// Open (and create if needed) the record directory
    pub fn new(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol))
    }

    /// Write the record for one symbol, replacing any previous one
    pub fn save(&self, symbol: &str, record: &BaselineRecord) -> anyhow::Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        fs::write(self.path_for(symbol), json)?;
        Ok(())
    }

    /// Read the record for one symbol; Ok(None) when no record exists yet
    pub fn load(&self, symbol: &str) -> anyhow::Result<Option<BaselineRecord>> {
        match fs::read_to_string(self.path_for(symbol)) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
