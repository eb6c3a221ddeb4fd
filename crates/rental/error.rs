use chrono::NaiveDate;
use polars::prelude::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RentalError>;

#[derive(Debug, Error)]
pub enum RentalError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: {field} code {code} is outside the known domain")]
    Validation {
        row: usize,
        field: &'static str,
        code: i64,
    },

    #[error("invalid date range {start} .. {end}: {reason}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: &'static str,
    },

    #[error("column `{column}` not found in table")]
    Schema { column: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Fail with [`RentalError::Schema`] on the first column `df` lacks.
pub(crate) fn require_columns(df: &polars::prelude::DataFrame, columns: &[&str]) -> Result<()> {
    let present = df.get_column_names();
    match columns.iter().find(|c| !present.contains(*c)) {
        Some(missing) => Err(RentalError::Schema {
            column: missing.to_string(),
        }),
        None => Ok(()),
    }
}
