use thiserror::Error;

/// Failure taxonomy for the dashboard pipeline.
///
/// Each data variant names the table (and field) involved so the caller can
/// tell the user which export was wrong instead of collapsing everything
/// into one generic "bad file" message. Renderer failures are a separate
/// variant from data failures.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{table}: required column '{column}' is missing")]
    MissingColumn { table: String, column: String },

    #[error("{table}: cannot parse {field} value '{value}' as a currency amount")]
    InvalidCurrency {
        table: String,
        field: String,
        value: String,
    },

    #[error("{table}: cannot parse {field} value '{value}' as a date")]
    InvalidDate {
        table: String,
        field: String,
        value: String,
    },

    #[error("{table}: malformed CSV: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("chart rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
