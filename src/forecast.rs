use crate::aggregate::NormalizedTable;
use crate::config::AnalysisConfig;
use crate::schema::{BucketGranularity, ForecastResult, PeriodTotal};
use crate::utils::{days_spanned, first_day_of_month, next_day, next_month_start};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// Forecasts are always one period ahead.
pub const HORIZON_PERIODS: usize = 1;

pub const MIN_FORECAST_PERIODS: usize = 2;

/// Ordinary least squares fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits against x = 0, 1, 2, ... Returns `None` for fewer than two points.
    pub fn fit(values: &[f64]) -> Option<Self> {
        if values.len() < 2 {
            return None;
        }

        let n = values.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, y)| {
                let dx = i as f64 - x_mean;
                (sxy + dx * (y - y_mean), sxx + dx * dx)
            });

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }

    pub fn predict_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

fn bucket_by(
    dated: &[(NaiveDate, f64)],
    key: impl Fn(NaiveDate) -> NaiveDate,
) -> BTreeMap<NaiveDate, f64> {
    let mut buckets = BTreeMap::new();
    for (date, revenue) in dated {
        *buckets.entry(key(*date)).or_insert(0.0) += revenue;
    }
    buckets
}

/// Daily buckets unless fewer than `sparse_daily_threshold` of the spanned days
/// carry data and months still give enough points.
pub fn bucket_revenue(
    table: &NormalizedTable,
    config: &AnalysisConfig,
) -> Option<(BucketGranularity, BTreeMap<NaiveDate, f64>)> {
    let dated: Vec<(NaiveDate, f64)> = table
        .rows
        .iter()
        .filter_map(|row| row.date.map(|d| (d, row.revenue)))
        .collect();

    let daily = bucket_by(&dated, |d| d);
    if daily.len() < MIN_FORECAST_PERIODS {
        return None;
    }

    let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return None,
    };
    let density = daily.len() as f64 / days_spanned(first, last) as f64;

    if density < config.sparse_daily_threshold {
        let monthly = bucket_by(&dated, first_day_of_month);
        if monthly.len() >= MIN_FORECAST_PERIODS {
            debug!(
                "Daily buckets too sparse ({:.2} density), using {} monthly buckets",
                density,
                monthly.len()
            );
            return Some((BucketGranularity::Month, monthly));
        }
    }

    Some((BucketGranularity::Day, daily))
}

/// Projects next-period revenue from the dated rows, or `None` when fewer than
/// two distinct time buckets exist.
pub fn forecast_revenue(table: &NormalizedTable, config: &AnalysisConfig) -> Option<ForecastResult> {
    let (granularity, buckets) = bucket_revenue(table, config)?;

    let history: Vec<PeriodTotal> = buckets
        .into_iter()
        .enumerate()
        .map(|(period_index, (period_start, total_revenue))| PeriodTotal {
            period_start,
            period_index,
            total_revenue,
        })
        .collect();

    let values: Vec<f64> = history.iter().map(|p| p.total_revenue).collect();
    let trend = LinearTrend::fit(&values)?;

    let next_index = history.len() as f64;
    let predicted_values: Vec<f64> = (0..HORIZON_PERIODS)
        .map(|step| trend.predict_at(next_index + step as f64).max(0.0))
        .collect();

    let last_start = history.last()?.period_start;
    let next_period_start = match granularity {
        BucketGranularity::Day => next_day(last_start),
        BucketGranularity::Month => next_month_start(last_start),
    };

    debug!(
        "Fitted {} trend over {} periods: slope {:.4}, intercept {:.4}",
        granularity.as_str(),
        history.len(),
        trend.slope,
        trend.intercept
    );

    Some(ForecastResult {
        horizon_periods: HORIZON_PERIODS,
        predicted_values,
        model_slope: trend.slope,
        model_intercept: trend.intercept,
        confidence_note: format!(
            "based on {} {} periods of history",
            history.len(),
            granularity.as_str()
        ),
        granularity,
        history,
        next_period_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NormalizedRow;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dated(rows: &[(Option<NaiveDate>, f64)]) -> NormalizedTable {
        NormalizedTable {
            rows: rows
                .iter()
                .enumerate()
                .map(|(i, (date, revenue))| NormalizedRow {
                    row_index: i,
                    product: None,
                    revenue: *revenue,
                    date: *date,
                    quantity: None,
                })
                .collect(),
            skipped_rows: 0,
        }
    }

    #[test]
    fn test_fit_perfect_line() {
        let trend = LinearTrend::fit(&[10.0, 12.0, 14.0, 16.0]).unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-9);
        assert!((trend.intercept - 10.0).abs() < 1e-9);
        assert!((trend.predict_at(4.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_needs_two_points() {
        assert!(LinearTrend::fit(&[]).is_none());
        assert!(LinearTrend::fit(&[5.0]).is_none());
    }

    #[test]
    fn test_daily_forecast() {
        let table = dated(&[
            (Some(ymd(2024, 1, 1)), 100.0),
            (Some(ymd(2024, 1, 2)), 150.0),
            (Some(ymd(2024, 1, 2)), 50.0),
            (Some(ymd(2024, 1, 3)), 300.0),
            (None, 9999.0),
        ]);
        let forecast = forecast_revenue(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(forecast.granularity, BucketGranularity::Day);
        assert_eq!(forecast.history.len(), 3);
        assert_eq!(forecast.history[1].total_revenue, 200.0);
        assert_eq!(forecast.horizon_periods, 1);
        assert!((forecast.model_slope - 100.0).abs() < 1e-9);
        assert!((forecast.model_intercept - 100.0).abs() < 1e-9);
        assert!((forecast.predicted_values[0] - 400.0).abs() < 1e-9);
        assert_eq!(forecast.next_period_start, ymd(2024, 1, 4));
        assert_eq!(forecast.confidence_note, "based on 3 daily periods of history");
    }

    #[test]
    fn test_chronological_indexing_regardless_of_row_order() {
        let table = dated(&[
            (Some(ymd(2024, 1, 3)), 30.0),
            (Some(ymd(2024, 1, 1)), 10.0),
            (Some(ymd(2024, 1, 2)), 20.0),
        ]);
        let forecast = forecast_revenue(&table, &AnalysisConfig::default()).unwrap();
        let starts: Vec<NaiveDate> = forecast.history.iter().map(|p| p.period_start).collect();
        assert_eq!(starts, vec![ymd(2024, 1, 1), ymd(2024, 1, 2), ymd(2024, 1, 3)]);
        assert!((forecast.model_slope - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_days_fall_back_to_months() {
        let table = dated(&[
            (Some(ymd(2024, 1, 5)), 100.0),
            (Some(ymd(2024, 1, 20)), 100.0),
            (Some(ymd(2024, 2, 10)), 300.0),
            (Some(ymd(2024, 3, 15)), 400.0),
        ]);
        let forecast = forecast_revenue(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(forecast.granularity, BucketGranularity::Month);
        assert_eq!(forecast.history.len(), 3);
        assert_eq!(forecast.history[0].period_start, ymd(2024, 1, 1));
        assert_eq!(forecast.history[0].total_revenue, 200.0);
        assert_eq!(forecast.next_period_start, ymd(2024, 4, 1));
        assert!((forecast.predicted_values[0] - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_sparse_days_within_one_month_stay_daily() {
        let table = dated(&[(Some(ymd(2024, 1, 1)), 10.0), (Some(ymd(2024, 1, 30)), 20.0)]);
        let forecast = forecast_revenue(&table, &AnalysisConfig::default()).unwrap();
        assert_eq!(forecast.granularity, BucketGranularity::Day);
        assert_eq!(forecast.history.len(), 2);
    }

    #[test]
    fn test_absent_with_fewer_than_two_buckets() {
        let config = AnalysisConfig::default();
        assert!(forecast_revenue(&dated(&[(None, 1.0), (None, 2.0)]), &config).is_none());

        let same_day = dated(&[(Some(ymd(2024, 1, 1)), 1.0), (Some(ymd(2024, 1, 1)), 2.0)]);
        assert!(forecast_revenue(&same_day, &config).is_none());
    }

    #[test]
    fn test_prediction_clamped_non_negative() {
        let table = dated(&[
            (Some(ymd(2024, 1, 1)), 1000.0),
            (Some(ymd(2024, 1, 2)), 500.0),
            (Some(ymd(2024, 1, 3)), 10.0),
        ]);
        let forecast = forecast_revenue(&table, &AnalysisConfig::default()).unwrap();
        assert!(forecast.model_slope < 0.0);
        assert_eq!(forecast.predicted_values[0], 0.0);
    }
}
