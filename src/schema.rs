use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single raw cell as handed over by the upload layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Date(NaiveDate),
    Text(String),
    Empty,
}

impl CellValue {
    /// Builds a cell from raw text, mapping blank strings to `Empty`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(trimmed.to_string())
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from_raw(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from_raw(&value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        CellValue::Date(value)
    }
}

/// Ordered rows of named cells. Row cells are positional and line up with `headers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at (row, column). Ragged rows read as `Empty` past their end.
    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(EMPTY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[schemars(description = "Label of the item sold (grouping key for totals)")]
    Product,

    #[schemars(description = "Monetary value of the transaction (mandatory)")]
    Revenue,

    #[schemars(description = "Transaction date used for time bucketing")]
    Date,

    #[schemars(description = "Number of units sold")]
    Quantity,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Product => "product",
            Role::Revenue => "revenue",
            Role::Date => "date",
            Role::Quantity => "quantity",
        }
    }
}

/// Where a role was found in the original table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRef {
    #[schemars(description = "The column header exactly as it appeared in the file")]
    pub header: String,

    #[schemars(description = "0-based column position in the file")]
    pub index: usize,

    #[schemars(description = "The role keyword that matched the normalized header")]
    pub matched_keyword: String,
}

/// Semantic roles inferred from the headers. `revenue` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnRoleMap {
    pub product: Option<ColumnRef>,
    pub revenue: ColumnRef,
    pub date: Option<ColumnRef>,
    pub quantity: Option<ColumnRef>,
}

/// A row projected through the role map with its revenue successfully coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    /// Position of the row in the original table.
    pub row_index: usize,
    pub product: Option<String>,
    pub revenue: f64,
    pub date: Option<NaiveDate>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProductTotal {
    pub product: String,
    pub total: f64,

    #[schemars(description = "Fraction of total revenue (0.0 - 1.0); 0 when total revenue is 0")]
    pub share: f64,

    #[schemars(description = "Units sold, present only when a quantity column was inferred")]
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateSummary {
    pub total_revenue: f64,

    #[schemars(description = "Number of rows retained after revenue coercion")]
    pub row_count: usize,

    #[schemars(description = "Rows dropped because their revenue cell was empty or non-numeric")]
    pub skipped_rows: usize,

    pub per_product: BTreeMap<String, f64>,

    #[schemars(description = "Products ordered by revenue descending, ties in first-seen order")]
    pub ranked_products: Vec<ProductTotal>,

    pub top_product: String,
    pub top_product_share: f64,
    pub mean: f64,

    #[schemars(description = "Population standard deviation of retained revenue values")]
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Anomaly {
    pub row_index: usize,
    pub product: String,
    pub revenue: f64,

    #[schemars(description = "Distance above the mean in standard deviations")]
    pub deviation_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BucketGranularity {
    Day,
    Month,
}

impl BucketGranularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketGranularity::Day => "daily",
            BucketGranularity::Month => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodTotal {
    #[schemars(description = "First calendar day of the bucket")]
    pub period_start: NaiveDate,
    pub period_index: usize,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastResult {
    pub horizon_periods: usize,
    pub predicted_values: Vec<f64>,
    pub model_slope: f64,
    pub model_intercept: f64,

    #[schemars(description = "Qualitative note only; no statistical confidence interval is claimed")]
    pub confidence_note: String,

    pub granularity: BucketGranularity,
    pub history: Vec<PeriodTotal>,
    pub next_period_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    TopPerformer,
    HighValueTransactions,
    Forecast,
    Baseline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NarrativeStatement {
    pub kind: StatementKind,
    pub text: String,
}

pub type InsightNarrative = Vec<NarrativeStatement>;

/// The single result object handed to the rendering and response layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportPayload {
    pub roles: ColumnRoleMap,
    pub summary: AggregateSummary,
    pub anomalies: Vec<Anomaly>,

    #[schemars(description = "Absent when no usable date series (at least 2 buckets) exists")]
    pub forecast: Option<ForecastResult>,

    pub narrative: InsightNarrative,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ragged_rows_read_as_empty() {
        let table = RawTable::new(
            vec!["Product".to_string(), "Amount".to_string()],
            vec![vec![CellValue::from("Monitor")]],
        );
        assert_eq!(table.cell(0, 0), &CellValue::Text("Monitor".to_string()));
        assert_eq!(table.cell(0, 1), &CellValue::Empty);
        assert_eq!(table.cell(5, 0), &CellValue::Empty);
    }

    #[test]
    fn test_cell_value_deserialization() {
        let cells: Vec<CellValue> =
            serde_json::from_str(r#"[12.5, "2024-01-05", "Monitor", null]"#).unwrap();
        assert_eq!(cells[0], CellValue::Number(12.5));
        assert_eq!(
            cells[1],
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        );
        assert_eq!(cells[2], CellValue::Text("Monitor".to_string()));
        assert_eq!(cells[3], CellValue::Empty);
    }

    #[test]
    fn test_blank_text_is_empty() {
        assert_eq!(CellValue::from_raw("   "), CellValue::Empty);
        assert_eq!(CellValue::from(" x "), CellValue::Text("x".to_string()));
    }
}
