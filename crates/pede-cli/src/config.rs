//! Run configuration
//!
//! Everything has a default, so the config file is optional and may be partial:
//!
//! ```json
//! {
//!   "columns": { "tier": "Pedra 23", "age": "Idade 23" },
//!   "histogram_bins": { "academic": 30 }
//! }
//! ```

use std::path::Path;

use pede_analysis::profile::ProfileColumns;
use serde::{Deserialize, Serialize};

use crate::util;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub columns: ColumnNames,
    pub histogram_bins: HistogramBins,
}

impl Config {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let config: Self = util::read_json_file("config", path)?;
        log::info!("using config from {}", path.display());
        Ok(config)
    }
}

/// Column names of the indicators and group keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Level adequacy indicator
    pub ian: String,
    /// Academic performance indicator
    pub ida: String,
    /// Engagement indicator
    pub ieg: String,
    /// Turning-point indicator
    pub ipv: String,
    /// Level gap (negative means behind)
    pub defas: String,
    pub cohort: String,
    pub age: String,
    pub phase: String,
    pub tier: String,
    /// Further columns coerced to numeric; they only show up in the overview
    pub extra_numeric: Vec<String>,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            ian: "IAN".to_owned(),
            ida: "IDA".to_owned(),
            ieg: "IEG".to_owned(),
            ipv: "IPV".to_owned(),
            defas: "Defas".to_owned(),
            cohort: "Ano ingresso".to_owned(),
            age: "Idade 22".to_owned(),
            phase: "Fase".to_owned(),
            tier: "Pedra 22".to_owned(),
            extra_numeric: ["INDE 22", "IAA", "IPS", "IPP"]
                .map(str::to_owned)
                .to_vec(),
        }
    }
}

impl ColumnNames {
    pub fn profile(&self) -> ProfileColumns<'_> {
        ProfileColumns {
            cohort: &self.cohort,
            age: &self.age,
            phase: &self.phase,
            tier: &self.tier,
        }
    }

    /// Every column converted to numeric on load.
    pub fn numeric_candidates(&self) -> Vec<&str> {
        [
            &self.ian,
            &self.ida,
            &self.ieg,
            &self.ipv,
            &self.defas,
            &self.cohort,
            &self.age,
            &self.phase,
        ]
        .into_iter()
        .chain(&self.extra_numeric)
        .map(String::as_str)
        .collect()
    }
}

/// Histogram bin count of each analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramBins {
    pub adequacy: usize,
    pub academic: usize,
    pub engagement: usize,
}

impl Default for HistogramBins {
    fn default() -> Self {
        Self {
            adequacy: 12,
            academic: 20,
            engagement: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{ "columns": { "tier": "Pedra 23" }, "histogram_bins": { "academic": 30 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.columns.tier, "Pedra 23");
        assert_eq!(config.columns.ian, "IAN");
        assert_eq!(config.histogram_bins.academic, 30);
        assert_eq!(config.histogram_bins.adequacy, 12);
    }

    #[test]
    fn test_empty_config_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_numeric_candidates() {
        let columns = ColumnNames::default();
        let candidates = columns.numeric_candidates();
        assert!(candidates.contains(&"Defas"));
        assert!(candidates.contains(&"INDE 22"));
        assert!(!candidates.contains(&"Pedra 22"));
    }
}
