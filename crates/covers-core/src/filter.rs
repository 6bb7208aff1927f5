//! Filter selections: which slice of the dataset a report looks at.

use std::collections::BTreeSet;

use chrono::Weekday;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::InsightError;
use crate::model::SaleRecord;

/// A filter selection. Empty sets and `None` fields mean "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub categories: BTreeSet<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl Filter {
    /// A filter that keeps every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    #[must_use]
    pub fn with_weekday(mut self, day: Weekday) -> Self {
        if !self.weekdays.contains(&day) {
            self.weekdays.push(day);
            self.weekdays.sort_by_key(Weekday::num_days_from_monday);
        }
        self
    }

    #[must_use]
    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Restrict to one calendar month (1-12).
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::InvalidFilter`] when `month` is out of range.
    pub fn with_month(mut self, month: u32) -> Result<Self, InsightError> {
        if !(1..=12).contains(&month) {
            return Err(InsightError::InvalidFilter {
                reason: format!("month must be between 1 and 12, got {month}"),
            });
        }
        self.month = Some(month);
        Ok(self)
    }

    /// Returns true when no restriction is set.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty()
            && self.weekdays.is_empty()
            && self.year.is_none()
            && self.month.is_none()
    }

    #[must_use]
    pub fn matches(&self, record: &SaleRecord) -> bool {
        (self.categories.is_empty() || self.categories.contains(&record.category))
            && (self.weekdays.is_empty() || self.weekdays.contains(&record.weekday()))
            && self.year.is_none_or(|year| record.year() == year)
            && self.month.is_none_or(|month| record.month() == month)
    }

    /// Borrow the records this filter keeps, in dataset order.
    #[must_use]
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a SaleRecord> {
        let kept: Vec<&SaleRecord> = dataset.iter().filter(|r| self.matches(r)).collect();
        tracing::debug!(
            total = dataset.len(),
            kept = kept.len(),
            "applied filter"
        );
        kept
    }
}

/// Parse a weekday from a full or three-letter English name.
///
/// # Errors
///
/// Returns [`InsightError::InvalidFilter`] for anything else.
pub fn parse_weekday(raw: &str) -> Result<Weekday, InsightError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| InsightError::InvalidFilter {
            reason: format!("unknown weekday '{raw}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CustomerId, Money};
    use chrono::NaiveDate;

    fn record(date: (i32, u32, u32), category: &str) -> SaleRecord {
        SaleRecord {
            order_id: format!("{date:?}-{category}"),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            customer_id: CustomerId::from("1"),
            category: category.to_string(),
            item: "x".to_string(),
            quantity: 1,
            unit_price: Money::from_cents(100),
            revenue: Money::from_cents(100),
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_records(vec![
            record((2022, 1, 3), "Main"),   // Monday
            record((2022, 1, 8), "Drinks"), // Saturday
            record((2023, 2, 4), "Main"),   // Saturday
            record((2023, 3, 6), "Dessert"),
        ])
    }

    #[test]
    fn unrestricted_keeps_everything() {
        let filter = Filter::all();
        assert!(filter.is_unrestricted());
        assert_eq!(filter.apply(&dataset()).len(), 4);
    }

    #[test]
    fn categories_are_or_combined() {
        let filter = Filter::all().with_category("Main").with_category("Dessert");
        assert_eq!(filter.apply(&dataset()).len(), 3);
    }

    #[test]
    fn weekday_year_month_are_and_combined() {
        let ds = dataset();
        let saturday = Filter::all().with_weekday(Weekday::Sat);
        assert_eq!(saturday.apply(&ds).len(), 2);

        let saturday_2023 = saturday.with_year(2023);
        assert_eq!(saturday_2023.apply(&ds).len(), 1);

        let feb = Filter::all().with_year(2023).with_month(2).unwrap();
        assert_eq!(feb.apply(&ds).len(), 1);
    }

    #[test]
    fn month_without_records_keeps_nothing() {
        let filter = Filter::all().with_month(7).unwrap();
        assert!(filter.apply(&dataset()).is_empty());
    }

    #[test]
    fn month_out_of_range_is_rejected() {
        assert!(Filter::all().with_month(0).is_err());
        assert!(Filter::all().with_month(13).is_err());
    }

    #[test]
    fn weekdays_are_deduplicated_and_ordered() {
        let filter = Filter::all()
            .with_weekday(Weekday::Sun)
            .with_weekday(Weekday::Mon)
            .with_weekday(Weekday::Sun);
        assert_eq!(filter.weekdays, vec![Weekday::Mon, Weekday::Sun]);
    }

    #[test]
    fn weekday_names_parse() {
        assert_eq!(parse_weekday("mon").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("Saturday").unwrap(), Weekday::Sat);
        assert_eq!(parse_weekday(" FRI ").unwrap(), Weekday::Fri);
        assert!(parse_weekday("someday").is_err());
    }
}
