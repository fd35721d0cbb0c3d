use crate::schema::{
    AggregateSummary, Anomaly, ForecastResult, InsightNarrative, NarrativeStatement,
    StatementKind,
};
use std::fmt;

/// Statement kinds in the order they appear in a narrative.
pub const STATEMENT_ORDER: [StatementKind; 4] = [
    StatementKind::TopPerformer,
    StatementKind::HighValueTransactions,
    StatementKind::Forecast,
    StatementKind::Baseline,
];

/// A fully resolved statement, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum Insight {
    TopPerformer {
        product: String,
        share: f64,
    },
    HighValueTransactions {
        count: usize,
        largest_revenue: f64,
        product: String,
    },
    Forecast {
        predicted: f64,
    },
    Baseline {
        mean: f64,
        row_count: usize,
    },
}

impl Insight {
    /// Builds the statement of `kind` if its inputs are present.
    pub fn for_kind(
        kind: StatementKind,
        summary: &AggregateSummary,
        anomalies: &[Anomaly],
        forecast: Option<&ForecastResult>,
    ) -> Option<Self> {
        match kind {
            StatementKind::TopPerformer => {
                (summary.top_product_share > 0.0).then(|| Insight::TopPerformer {
                    product: summary.top_product.clone(),
                    share: summary.top_product_share,
                })
            }
            StatementKind::HighValueTransactions => {
                anomalies
                    .first()
                    .map(|largest| Insight::HighValueTransactions {
                        count: anomalies.len(),
                        largest_revenue: largest.revenue,
                        product: largest.product.clone(),
                    })
            }
            StatementKind::Forecast => forecast
                .and_then(|f| f.predicted_values.first())
                .map(|predicted| Insight::Forecast {
                    predicted: *predicted,
                }),
            StatementKind::Baseline => Some(Insight::Baseline {
                mean: summary.mean,
                row_count: summary.row_count,
            }),
        }
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Insight::TopPerformer { .. } => StatementKind::TopPerformer,
            Insight::HighValueTransactions { .. } => StatementKind::HighValueTransactions,
            Insight::Forecast { .. } => StatementKind::Forecast,
            Insight::Baseline { .. } => StatementKind::Baseline,
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::TopPerformer { product, share } => write!(
                f,
                "Top Performer: '{}' contributes {:.1}% of total sales",
                product,
                share * 100.0
            ),
            Insight::HighValueTransactions {
                count,
                largest_revenue,
                product,
            } => write!(
                f,
                "{} unusually high transaction(s) detected, the largest being {:.2} for '{}'",
                count, largest_revenue, product
            ),
            Insight::Forecast { predicted } => {
                write!(f, "Projected next-period revenue: {:.2}", predicted)
            }
            Insight::Baseline { mean, row_count } => write!(
                f,
                "Average transaction value: {:.2} across {} recorded transactions",
                mean, row_count
            ),
        }
    }
}

pub fn collect_insights(
    summary: &AggregateSummary,
    anomalies: &[Anomaly],
    forecast: Option<&ForecastResult>,
) -> Vec<Insight> {
    STATEMENT_ORDER
        .iter()
        .filter_map(|kind| Insight::for_kind(*kind, summary, anomalies, forecast))
        .collect()
}

pub fn synthesize_narrative(
    summary: &AggregateSummary,
    anomalies: &[Anomaly],
    forecast: Option<&ForecastResult>,
) -> InsightNarrative {
    collect_insights(summary, anomalies, forecast)
        .into_iter()
        .map(|insight| NarrativeStatement {
            kind: insight.kind(),
            text: insight.to_string(),
        })
        .collect()
}
