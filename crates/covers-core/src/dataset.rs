//! Dataset loading: the single place where raw cells become typed records.
//!
//! # Overview
//!
//! A dataset is a delimited text file with a header row. Header names are
//! matched case-insensitively against a small alias table so exports using
//! `order_date`/`cust_id`/`order_total` load the same as files using the
//! canonical `date`/`customer_id`/`revenue` names.
//!
//! Every schema problem surfaces here as a [`SchemaError`]; nothing past
//! this boundary re-checks types.

use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::instrument;

use crate::error::{InsightError, SchemaError};
use crate::model::{CustomerId, Money, SaleRecord};

/// Options controlling how a dataset file is parsed and validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Reject rows whose revenue differs from `quantity * unit_price` by more
    /// than [`REVENUE_TOLERANCE_CENTS`]. When off, such rows are kept as
    /// stated and reported with a warning.
    pub verify_revenue: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            verify_revenue: false,
        }
    }
}

/// Largest accepted gap between stated and computed revenue.
pub const REVENUE_TOLERANCE_CENTS: u64 = 1;

/// Canonical column name and the header spellings accepted for it.
const DATE: (&str, &[&str]) = ("date", &["date", "order_date"]);
const CUSTOMER: (&str, &[&str]) = ("customer_id", &["customer_id", "cust_id", "customer"]);
const CATEGORY: (&str, &[&str]) = ("category", &["category"]);
const ITEM: (&str, &[&str]) = ("item", &["item", "item_name"]);
const QUANTITY: (&str, &[&str]) = ("quantity", &["quantity", "qty"]);
const UNIT_PRICE: (&str, &[&str]) = ("unit_price", &["unit_price", "price"]);
const REVENUE: (&str, &[&str]) = ("revenue", &["revenue", "order_total", "total"]);
const ORDER_ID: (&str, &[&str]) = ("order_id", &["order_id"]);

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    customer_id: usize,
    category: usize,
    item: usize,
    quantity: usize,
    unit_price: usize,
    revenue: usize,
    order_id: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, SchemaError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_ascii_lowercase())
            .collect();

        let find = |(_, aliases): (&'static str, &[&str])| {
            aliases
                .iter()
                .find_map(|alias| normalized.iter().position(|h| h == alias))
        };
        let require = |column: (&'static str, &[&str])| {
            find(column).ok_or(SchemaError::MissingColumn { column: column.0 })
        };

        Ok(Self {
            date: require(DATE)?,
            customer_id: require(CUSTOMER)?,
            category: require(CATEGORY)?,
            item: require(ITEM)?,
            quantity: require(QUANTITY)?,
            unit_price: require(UNIT_PRICE)?,
            revenue: require(REVENUE)?,
            order_id: find(ORDER_ID),
        })
    }
}

/// An immutable, validated set of sale records.
///
/// Cloning is cheap: records are shared behind an [`Arc`].
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Arc<[SaleRecord]>,
    source: Option<PathBuf>,
}

impl Dataset {
    /// Load and validate a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Io`] if the file cannot be opened and
    /// [`InsightError::Schema`] on the first invalid header or row.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, InsightError> {
        let started = Instant::now();
        let file = File::open(path).map_err(|source| InsightError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut dataset = Self::from_reader(file, options)?;
        dataset.source = Some(path.to_path_buf());

        tracing::info!(
            rows = dataset.len(),
            categories = dataset.categories().len(),
            elapsed_ms = started.elapsed().as_millis(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Parse a dataset from any reader (header row required).
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::Schema`] on the first invalid header or row.
    pub fn from_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, InsightError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(options.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|err| malformed(&err, 1))?
            .clone();
        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        let mut mismatched = 0_usize;
        let mut first_mismatch = None;
        for row in reader.records() {
            let row = row.map_err(|err| malformed(&err, 0))?;
            let line = row.position().map_or(0, csv::Position::line);
            let record = parse_row(&row, line, columns)?;

            let expected = record.expected_revenue();
            if expected.abs_diff(record.revenue) > REVENUE_TOLERANCE_CENTS {
                if options.verify_revenue {
                    return Err(SchemaError::RevenueMismatch {
                        line,
                        expected,
                        actual: record.revenue,
                    }
                    .into());
                }
                tracing::debug!(
                    line,
                    %expected,
                    actual = %record.revenue,
                    "revenue differs from quantity x unit price"
                );
                mismatched += 1;
                first_mismatch.get_or_insert(line);
            }
            records.push(record);
        }

        if let Some(first_line) = first_mismatch {
            tracing::warn!(
                rows = mismatched,
                first_line,
                "revenue differs from quantity x unit price; keeping stated revenue"
            );
        }

        tracing::debug!(rows = records.len(), "parsed sale records");
        Ok(Self::from_records(records))
    }

    /// Wrap already-typed records, e.g. ones built in code or tests.
    #[must_use]
    pub fn from_records(records: Vec<SaleRecord>) -> Self {
        Self {
            records: records.into(),
            source: None,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SaleRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path the dataset was loaded from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Distinct category names, sorted.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct transactions.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.order_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a SaleRecord;
    type IntoIter = std::slice::Iter<'a, SaleRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn malformed(err: &csv::Error, fallback_line: u64) -> SchemaError {
    let line = err.position().map_or(fallback_line, csv::Position::line);
    let reason = match err.kind() {
        csv::ErrorKind::UnequalLengths {
            expected_len, len, ..
        } => format!("expected {expected_len} fields, found {len}"),
        _ => err.to_string(),
    };
    SchemaError::Malformed { line, reason }
}

fn parse_row(row: &csv::StringRecord, line: u64, columns: Columns) -> Result<SaleRecord, SchemaError> {
    let cell = |index: usize| row.get(index).unwrap_or("");
    let invalid = |column: &'static str, value: &str, reason: String| SchemaError::InvalidField {
        line,
        column,
        value: value.to_string(),
        reason,
    };
    let text = |index: usize, column: &'static str| {
        let value = cell(index);
        if value.is_empty() {
            Err(invalid(column, value, "empty value".to_string()))
        } else {
            Ok(value.to_string())
        }
    };
    let money = |index: usize, column: &'static str| {
        let value = cell(index);
        value
            .parse::<Money>()
            .map_err(|err| invalid(column, value, err.to_string()))
    };

    let raw_date = cell(columns.date);
    let date = parse_date(raw_date)
        .ok_or_else(|| invalid(DATE.0, raw_date, "expected YYYY-MM-DD".to_string()))?;

    let raw_quantity = cell(columns.quantity);
    let quantity = raw_quantity
        .parse::<u32>()
        .map_err(|err| invalid(QUANTITY.0, raw_quantity, err.to_string()))?;

    let order_id = match columns.order_id {
        Some(index) => text(index, ORDER_ID.0)?,
        None => format!("#{line}"),
    };

    Ok(SaleRecord {
        order_id,
        date,
        customer_id: CustomerId::new(text(columns.customer_id, CUSTOMER.0)?),
        category: text(columns.category, CATEGORY.0)?,
        item: text(columns.item, ITEM.0)?,
        quantity,
        unit_price: money(columns.unit_price, UNIT_PRICE.0)?,
        revenue: money(columns.revenue, REVENUE.0)?,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y/%m/%d") {
        return Some(date);
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|dt| dt.date())
}
