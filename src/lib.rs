//! # Sales Insight Builder
//!
//! A library for turning an arbitrary sales-style table (loosely named product,
//! revenue and optional date columns) into a structured business summary.
//!
//! ## Pipeline
//!
//! - **Schema inference**: headers are matched to the `product`, `revenue`, `date`
//!   (and optional `quantity`) roles by keyword containment
//! - **Aggregation**: totals per product, top performer, mean and population std. dev.
//! - **Anomaly detection**: transactions at or above `mean + 2σ`
//! - **Trend forecast**: least-squares line over daily or monthly revenue buckets,
//!   projected one period ahead
//! - **Narrative**: fixed-template insight statements
//!
//! Everything is computed per call from the input table; nothing is shared between runs.
//!
//! ## Example
//!
//! ```rust
//! use sales_insight_builder::*;
//!
//! let table = RawTable::new(
//!     vec!["Product".to_string(), "Amount".to_string()],
//!     vec![
//!         vec!["Monitor".into(), 300.0.into()],
//!         vec!["Keyboard".into(), 100.0.into()],
//!         vec!["Monitor".into(), 200.0.into()],
//!     ],
//! );
//!
//! let report = analyze_table(&table).unwrap();
//! assert_eq!(report.summary.top_product, "Monitor");
//! assert!(report.forecast.is_none());
//! ```

pub mod aggregate;
pub mod anomaly;
pub mod config;
pub mod error;
pub mod forecast;
pub mod inference;
pub mod ingestion;
pub mod narrative;
pub mod report;
pub mod schema;
pub mod utils;

pub use aggregate::{mean_and_std_dev, normalize_rows, Aggregator, NormalizedTable};
pub use anomaly::{detect_anomalies, HighValueDetector};
pub use config::AnalysisConfig;
pub use error::{InsightError, Result};
pub use forecast::{forecast_revenue, LinearTrend};
pub use inference::{classify_header, infer_column_roles, normalize_header};
pub use ingestion::{read_csv, read_csv_file};
pub use narrative::{collect_insights, synthesize_narrative, Insight};
pub use schema::*;

use log::{debug, info};
use std::io::Read;

pub struct SalesInsightProcessor;

impl SalesInsightProcessor {
    pub fn process(table: &RawTable, config: &AnalysisConfig) -> Result<ReportPayload> {
        config.validate()?;

        info!(
            "Analyzing table with {} columns and {} rows",
            table.headers.len(),
            table.row_count()
        );

        let roles = infer_column_roles(&table.headers)?;
        debug!(
            "Roles: product={:?}, revenue='{}', date={:?}, quantity={:?}",
            roles.product.as_ref().map(|c| &c.header),
            roles.revenue.header,
            roles.date.as_ref().map(|c| &c.header),
            roles.quantity.as_ref().map(|c| &c.header)
        );

        let normalized = normalize_rows(table, &roles);
        let summary = Aggregator::new(config).summarize(&normalized)?;
        let anomalies = detect_anomalies(&normalized, &summary, config);

        let forecast = if roles.date.is_some() {
            forecast_revenue(&normalized, config)
        } else {
            None
        };
        if forecast.is_none() {
            debug!("No usable date series; forecast omitted");
        }

        let narrative = synthesize_narrative(&summary, &anomalies, forecast.as_ref());

        Ok(ReportPayload::assemble(
            roles, summary, anomalies, forecast, narrative,
        ))
    }

    pub fn process_csv<R: Read>(reader: R, config: &AnalysisConfig) -> Result<ReportPayload> {
        let table = read_csv(reader)?;
        Self::process(&table, config)
    }
}

pub fn analyze_table(table: &RawTable) -> Result<ReportPayload> {
    SalesInsightProcessor::process(table, &AnalysisConfig::default())
}

pub fn analyze_table_with_config(table: &RawTable, config: &AnalysisConfig) -> Result<ReportPayload> {
    SalesInsightProcessor::process(table, config)
}

pub fn analyze_csv<R: Read>(reader: R) -> Result<ReportPayload> {
    SalesInsightProcessor::process_csv(reader, &AnalysisConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: Vec<Vec<CellValue>>) -> RawTable {
        RawTable::new(headers.iter().map(|s| s.to_string()).collect(), rows)
    }

    #[test]
    fn test_end_to_end_processing() {
        let raw = table(
            &["Product", "Amount"],
            vec![
                vec!["Monitor".into(), 300.0.into()],
                vec!["Keyboard".into(), 100.0.into()],
                vec!["Monitor".into(), 200.0.into()],
            ],
        );

        let report = analyze_table(&raw).unwrap();
        assert_eq!(report.summary.total_revenue, 600.0);
        assert_eq!(report.summary.top_product, "Monitor");
        assert!(report.anomalies.is_empty());
        assert!(report.forecast.is_none());
        assert_eq!(
            report.narrative_lines(),
            vec![
                "Top Performer: 'Monitor' contributes 83.3% of total sales",
                "Average transaction value: 200.00 across 3 recorded transactions",
            ]
        );
    }

    #[test]
    fn test_invalid_config_rejected_before_analysis() {
        let raw = table(&["Amount"], vec![vec![1.0.into()]]);
        let config = AnalysisConfig {
            anomaly_sigma: 0.0,
            ..Default::default()
        };
        let err = analyze_table_with_config(&raw, &config).unwrap_err();
        assert_eq!(err.reason_code(), "invalid_config");
    }

    #[test]
    fn test_date_column_enables_forecast() {
        let raw = table(
            &["Item", "Total", "Date"],
            vec![
                vec!["A".into(), 100.0.into(), "2024-01-01".into()],
                vec!["B".into(), 200.0.into(), "2024-01-02".into()],
                vec!["A".into(), 300.0.into(), "2024-01-03".into()],
            ],
        );
        let report = analyze_table(&raw).unwrap();
        let forecast = report.forecast.as_ref().unwrap();
        assert!((forecast.predicted_values[0] - 400.0).abs() < 1e-9);
        assert!(report
            .narrative_lines()
            .contains(&"Projected next-period revenue: 400.00"));
    }
}
