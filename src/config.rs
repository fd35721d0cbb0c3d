use crate::error::{InsightError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_UNCLASSIFIED_LABEL: &str = "Unclassified";

/// Tunables for one analysis run. Passed by value per request; nothing is global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    #[schemars(
        description = "Multiplier of the standard deviation above the mean at which a transaction is flagged. Default 2.0."
    )]
    pub anomaly_sigma: f64,

    #[schemars(description = "Maximum number of products in the ranked product table. Default 10.")]
    pub top_products_limit: usize,

    /// Rows whose product cell literally equals this label are grouped with
    /// the rows that have no product value.
    #[schemars(
        description = "Label used for rows without a product value. Products carrying this exact name are merged into the same group. Default 'Unclassified'."
    )]
    pub unclassified_label: String,

    #[schemars(
        description = "Share of calendar days that must carry data for daily forecast buckets; below it monthly buckets are used. Range (0, 1]. Default 0.5."
    )]
    pub sparse_daily_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            anomaly_sigma: 2.0,
            top_products_limit: 10,
            unclassified_label: DEFAULT_UNCLASSIFIED_LABEL.to_string(),
            sparse_daily_threshold: 0.5,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.anomaly_sigma.is_finite() || self.anomaly_sigma <= 0.0 {
            return Err(InsightError::InvalidConfig(format!(
                "anomaly_sigma must be a positive number, got {}",
                self.anomaly_sigma
            )));
        }

        if self.top_products_limit == 0 {
            return Err(InsightError::InvalidConfig(
                "top_products_limit must be at least 1".to_string(),
            ));
        }

        if self.unclassified_label.trim().is_empty() {
            return Err(InsightError::InvalidConfig(
                "unclassified_label must not be empty".to_string(),
            ));
        }

        if !(self.sparse_daily_threshold > 0.0 && self.sparse_daily_threshold <= 1.0) {
            return Err(InsightError::InvalidConfig(format!(
                "sparse_daily_threshold must be in (0, 1], got {}",
                self.sparse_daily_threshold
            )));
        }

        Ok(())
    }
}
