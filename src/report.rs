use crate::schema::{
    AggregateSummary, Anomaly, ColumnRoleMap, ForecastResult, InsightNarrative, ReportPayload,
};

impl ReportPayload {
    /// Assembles the payload. Every section is required; the forecast is explicitly optional.
    pub fn assemble(
        roles: ColumnRoleMap,
        summary: AggregateSummary,
        anomalies: Vec<Anomaly>,
        forecast: Option<ForecastResult>,
        narrative: InsightNarrative,
    ) -> Self {
        Self {
            roles,
            summary,
            anomalies,
            forecast,
            narrative,
        }
    }

    /// The narrative as plain lines, for bullet lists.
    pub fn narrative_lines(&self) -> Vec<&str> {
        self.narrative.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn projected_revenue(&self) -> Option<f64> {
        self.forecast
            .as_ref()
            .and_then(|f| f.predicted_values.first().copied())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportPayload)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        let summary = &self.summary;

        output.push_str("# Business Summary\n\n");

        output.push_str("## Key Metrics\n\n");
        output.push_str("| Metric | Value |\n|---|---|\n");
        output.push_str(&format!("| Total Revenue | {:.2} |\n", summary.total_revenue));
        output.push_str(&format!("| Transactions | {} |\n", summary.row_count));
        if summary.skipped_rows > 0 {
            output.push_str(&format!("| Skipped Rows | {} |\n", summary.skipped_rows));
        }
        output.push_str(&format!("| Average Transaction | {:.2} |\n", summary.mean));
        output.push_str(&format!("| Std. Deviation | {:.2} |\n", summary.std_dev));
        match self.projected_revenue() {
            Some(value) => {
                output.push_str(&format!("| Forecast (Next Period) | {:.2} |\n", value))
            }
            None => output.push_str("| Forecast (Next Period) | n/a |\n"),
        }
        output.push('\n');

        output.push_str("## Insights\n\n");
        for line in self.narrative_lines() {
            output.push_str(&format!("- {}\n", line));
        }
        output.push('\n');

        output.push_str("## Top Product Performance\n\n");
        output.push_str("| Product | Revenue | Share |\n|---|---|---|\n");
        for product in &summary.ranked_products {
            output.push_str(&format!(
                "| {} | {:.2} | {:.1}% |\n",
                product.product,
                product.total,
                product.share * 100.0
            ));
        }
        output.push('\n');

        if !self.anomalies.is_empty() {
            output.push_str("## Unusual Transactions\n\n");
            output.push_str("| Row | Product | Revenue | Deviation |\n|---|---|---|---|\n");
            for anomaly in &self.anomalies {
                output.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} |\n",
                    anomaly.row_index, anomaly.product, anomaly.revenue, anomaly.deviation_score
                ));
            }
            output.push('\n');
        }

        if let Some(forecast) = &self.forecast {
            output.push_str("## Forecast\n\n");
            output.push_str(&format!(
                "Next period starting {}: {:.2} ({})\n",
                forecast.next_period_start,
                forecast.predicted_values.first().copied().unwrap_or(0.0),
                forecast.confidence_note
            ));
        }

        output
    }
}
