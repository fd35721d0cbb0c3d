use crate::config::AnalysisConfig;
use crate::error::{InsightError, Result};
use crate::schema::{
    AggregateSummary, CellValue, ColumnRoleMap, NormalizedRow, ProductTotal, RawTable,
};
use crate::utils::{parse_amount, parse_date};
use chrono::NaiveDate;
use log::{debug, warn};
use std::collections::{BTreeMap, HashMap};

/// Rows that survived revenue coercion, plus how many did not.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub rows: Vec<NormalizedRow>,
    pub skipped_rows: usize,
}

impl NormalizedTable {
    pub fn revenues(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.revenue).collect()
    }
}

pub fn coerce_revenue(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => parse_amount(s),
        _ => None,
    }
}

/// Unparseable or numeric cells read as null dates.
pub fn coerce_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date(s),
        _ => None,
    }
}

pub fn coerce_label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        CellValue::Number(n) if n.is_finite() => Some(n.to_string()),
        CellValue::Date(d) => Some(d.to_string()),
        _ => None,
    }
}

/// Projects the raw table through the role map. Rows whose revenue cell is empty
/// or non-numeric are dropped and counted, never treated as zero.
pub fn normalize_rows(table: &RawTable, roles: &ColumnRoleMap) -> NormalizedTable {
    let mut rows = Vec::with_capacity(table.row_count());
    let mut skipped_rows = 0;

    for row_index in 0..table.row_count() {
        let Some(revenue) = coerce_revenue(table.cell(row_index, roles.revenue.index)) else {
            skipped_rows += 1;
            continue;
        };

        let product = roles
            .product
            .as_ref()
            .and_then(|col| coerce_label(table.cell(row_index, col.index)));
        let date = roles
            .date
            .as_ref()
            .and_then(|col| coerce_date(table.cell(row_index, col.index)));
        let quantity = roles
            .quantity
            .as_ref()
            .and_then(|col| coerce_revenue(table.cell(row_index, col.index)));

        rows.push(NormalizedRow {
            row_index,
            product,
            revenue,
            date,
            quantity,
        });
    }

    if skipped_rows > 0 {
        warn!(
            "Dropped {} of {} rows with empty or non-numeric '{}' values",
            skipped_rows,
            table.row_count(),
            roles.revenue.header
        );
    }

    NormalizedTable { rows, skipped_rows }
}

/// Population mean and standard deviation (divides by N).
pub fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    // Identical values have no spread even when the summed mean rounds.
    if values.iter().all(|v| *v == values[0]) {
        return (values[0], 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub fn product_label<'a>(product: Option<&'a str>, config: &'a AnalysisConfig) -> &'a str {
    product.unwrap_or(&config.unclassified_label)
}

struct ProductAccumulator {
    first_seen: usize,
    total: f64,
    quantity: Option<f64>,
}

pub struct Aggregator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, table: &NormalizedTable) -> Result<AggregateSummary> {
        if table.rows.is_empty() {
            return Err(InsightError::EmptyDataset {
                skipped_rows: table.skipped_rows,
            });
        }

        let revenues = table.revenues();
        let total_revenue: f64 = revenues.iter().sum();
        let (mean, std_dev) = mean_and_std_dev(&revenues);

        let mut products: HashMap<&str, ProductAccumulator> = HashMap::new();
        for row in &table.rows {
            let label = product_label(row.product.as_deref(), self.config);
            let next_rank = products.len();
            let acc = products.entry(label).or_insert(ProductAccumulator {
                first_seen: next_rank,
                total: 0.0,
                quantity: None,
            });
            acc.total += row.revenue;
            if let Some(q) = row.quantity {
                acc.quantity = Some(acc.quantity.unwrap_or(0.0) + q);
            }
        }

        let mut ranked: Vec<(&str, ProductAccumulator)> = products.into_iter().collect();
        ranked.sort_by_key(|(_, acc)| acc.first_seen);
        // Stable: equal totals stay in first-seen order
        ranked.sort_by(|(_, a), (_, b)| b.total.total_cmp(&a.total));

        let share_of = |value: f64| {
            if total_revenue == 0.0 {
                0.0
            } else {
                value / total_revenue
            }
        };

        let per_product: BTreeMap<String, f64> = ranked
            .iter()
            .map(|(label, acc)| (label.to_string(), acc.total))
            .collect();

        let (top_product, top_total) = ranked
            .first()
            .map(|(label, acc)| (label.to_string(), acc.total))
            .unwrap_or_else(|| (self.config.unclassified_label.clone(), 0.0));
        let top_product_share = share_of(top_total);

        let ranked_products: Vec<ProductTotal> = ranked
            .iter()
            .take(self.config.top_products_limit)
            .map(|(label, acc)| ProductTotal {
                product: label.to_string(),
                total: acc.total,
                share: share_of(acc.total),
                quantity: acc.quantity,
            })
            .collect();

        debug!(
            "Aggregated {} rows into {} products; top '{}' at {:.1}%",
            table.rows.len(),
            per_product.len(),
            top_product,
            top_product_share * 100.0
        );

        Ok(AggregateSummary {
            total_revenue,
            row_count: table.rows.len(),
            skipped_rows: table.skipped_rows,
            per_product,
            ranked_products,
            top_product,
            top_product_share,
            mean,
            std_dev,
        })
    }
}
