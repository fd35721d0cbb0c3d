use crate::aggregate::{product_label, NormalizedTable};
use crate::config::AnalysisConfig;
use crate::schema::{AggregateSummary, Anomaly};
use log::debug;

/// Tolerance on the z-score comparison; rows on the threshold stay flagged
/// under rounding in the mean and deviation.
const SCORE_EPSILON: f64 = 1e-9;

/// Flags unusually high-value transactions against the aggregate distribution.
///
/// Only the high side is considered. Mean and standard deviation come from the
/// [`AggregateSummary`] and are never recomputed here.
#[derive(Debug, Clone)]
pub struct HighValueDetector {
    sigma: f64,
    mean: f64,
    std_dev: f64,
}

impl HighValueDetector {
    pub fn new(summary: &AggregateSummary, sigma: f64) -> Self {
        Self {
            sigma,
            mean: summary.mean,
            std_dev: summary.std_dev,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.mean + self.sigma * self.std_dev
    }

    /// `None` when the distribution has no spread.
    pub fn score(&self, revenue: f64) -> Option<f64> {
        if self.std_dev > 0.0 {
            Some((revenue - self.mean) / self.std_dev)
        } else {
            None
        }
    }

    /// Inclusive at `mean + sigma * std_dev`; never true without spread.
    pub fn is_anomalous(&self, revenue: f64) -> bool {
        self.score(revenue)
            .is_some_and(|score| score >= self.sigma - SCORE_EPSILON)
    }

    /// Flagged rows ordered by deviation score descending, ties in row order.
    pub fn detect(&self, table: &NormalizedTable, config: &AnalysisConfig) -> Vec<Anomaly> {
        let mut anomalies: Vec<Anomaly> = table
            .rows
            .iter()
            .filter(|row| self.is_anomalous(row.revenue))
            .filter_map(|row| {
                self.score(row.revenue).map(|deviation_score| Anomaly {
                    row_index: row.row_index,
                    product: product_label(row.product.as_deref(), config).to_string(),
                    revenue: row.revenue,
                    deviation_score,
                })
            })
            .collect();

        anomalies.sort_by(|a, b| b.deviation_score.total_cmp(&a.deviation_score));

        debug!(
            "Anomaly threshold {:.2} (mean {:.2} + {} x {:.2}) flagged {} rows",
            self.threshold(),
            self.mean,
            self.sigma,
            self.std_dev,
            anomalies.len()
        );

        anomalies
    }
}

pub fn detect_anomalies(
    table: &NormalizedTable,
    summary: &AggregateSummary,
    config: &AnalysisConfig,
) -> Vec<Anomaly> {
    HighValueDetector::new(summary, config.anomaly_sigma).detect(table, config)
}
