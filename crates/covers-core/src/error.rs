use std::fmt;
use std::path::PathBuf;

use crate::model::Money;

/// Machine-readable error codes for scripting against the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DatasetUnreadable,
    MissingColumn,
    InvalidField,
    MalformedRow,
    RevenueMismatch,
    EmptySelection,
    InvalidFilter,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::DatasetUnreadable => "E1001",
            Self::MissingColumn => "E1002",
            Self::InvalidField => "E1003",
            Self::MalformedRow => "E1004",
            Self::RevenueMismatch => "E1005",
            Self::EmptySelection => "E2001",
            Self::InvalidFilter => "E2002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DatasetUnreadable => "Dataset file could not be read",
            Self::MissingColumn => "Required column missing",
            Self::InvalidField => "Invalid field value",
            Self::MalformedRow => "Malformed row",
            Self::RevenueMismatch => "Revenue does not equal quantity x unit price",
            Self::EmptySelection => "No data for this selection",
            Self::InvalidFilter => "Invalid filter value",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::DatasetUnreadable => {
                Some("Check the path passed via --data, COVERS_DATA, or [data].path in covers.toml.")
            }
            Self::MissingColumn => Some(
                "The header must name date, customer_id, category, item, quantity, unit_price and revenue.",
            ),
            Self::InvalidField => Some("Fix the offending cell and reload."),
            Self::MalformedRow => Some("Every row must have the same number of cells as the header."),
            Self::RevenueMismatch => {
                Some("Correct the row, or drop `verify_revenue = true` from [data] in covers.toml.")
            }
            Self::EmptySelection => Some("Widen the category, weekday, year, or month filters."),
            Self::InvalidFilter => Some("Months are 1-12; weekdays are names like mon or Monday."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A load-time schema violation. Always names the column or line at fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A required column is absent from the header row.
    #[error("missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// A cell could not be converted to its column's type.
    #[error("line {line}: invalid {column} '{value}': {reason}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },

    /// The row itself could not be read (wrong cell count, bad encoding).
    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    /// Revenue disagrees with quantity x unit price by more than a cent.
    #[error("line {line}: revenue {actual} does not match quantity x unit price ({expected})")]
    RevenueMismatch {
        line: u64,
        expected: Money,
        actual: Money,
    },
}

impl SchemaError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn { .. } => ErrorCode::MissingColumn,
            Self::InvalidField { .. } => ErrorCode::InvalidField,
            Self::Malformed { .. } => ErrorCode::MalformedRow,
            Self::RevenueMismatch { .. } => ErrorCode::RevenueMismatch,
        }
    }
}

/// Errors produced while loading a dataset or answering an insight query.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// The dataset file could not be opened.
    #[error("failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dataset violates the expected schema.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// A single-winner query had no candidate rows after filtering.
    #[error("no data for this selection ({query})")]
    EmptyInput { query: &'static str },

    /// A filter value is out of range or unparseable.
    #[error("invalid filter: {reason}")]
    InvalidFilter { reason: String },
}

impl InsightError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::DatasetUnreadable,
            Self::Schema(err) => err.error_code(),
            Self::EmptyInput { .. } => ErrorCode::EmptySelection,
            Self::InvalidFilter { .. } => ErrorCode::InvalidFilter,
        }
    }

    /// Remediation text for the CLI; falls back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }

    /// Whether the session can continue after this error.
    ///
    /// Empty selections are shown as an empty state; everything else aborts.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::EmptyInput { .. })
    }
}
