use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("No column could be matched to the mandatory revenue role (headers: {headers:?})")]
    SchemaInference { headers: Vec<String> },

    #[error("No usable revenue values: all {skipped_rows} rows failed numeric coercion")]
    EmptyDataset { skipped_rows: usize },

    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InsightError {
    /// Stable machine-readable failure reason for the calling layer.
    pub fn reason_code(&self) -> &'static str {
        match self {
            InsightError::SchemaInference { .. } => "schema_inference",
            InsightError::EmptyDataset { .. } => "empty_dataset",
            InsightError::InvalidConfig(_) => "invalid_config",
            InsightError::Csv(_) => "csv",
            InsightError::Serialization(_) => "serialization",
            InsightError::Io(_) => "io",
        }
    }

    /// True when the uploaded data itself cannot be analysed, as opposed to
    /// configuration or I/O trouble.
    pub fn is_fatal_input_error(&self) -> bool {
        matches!(
            self,
            InsightError::SchemaInference { .. } | InsightError::EmptyDataset { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, InsightError>;
