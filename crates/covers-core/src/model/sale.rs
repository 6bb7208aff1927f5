use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use super::Money;

/// Customer identifier.
///
/// Ordering is numeric-aware: all-digit identifiers compare by value and
/// sort before any other identifier, so `"9" < "10" < "C1"`. This ordering
/// is what breaks ties between customers with equal totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u128> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Ord for CustomerId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CustomerId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One sold line: a customer bought `quantity` of `item` on `date`.
///
/// Records are validated once at load time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleRecord {
    /// Transaction the line belongs to. Several lines may share one order.
    pub order_id: String,
    pub date: NaiveDate,
    pub customer_id: CustomerId,
    pub category: String,
    pub item: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// Line total; expected to equal `quantity * unit_price`.
    pub revenue: Money,
}

impl SaleRecord {
    #[must_use]
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    #[must_use]
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// `quantity * unit_price`.
    #[must_use]
    pub fn expected_revenue(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Full English day name, as shown on the weekday chart.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Full English month name for a 1-based month number.
#[must_use]
pub const fn month_name(month: u32) -> Option<&'static str> {
    match month {
        1 => Some("January"),
        2 => Some("February"),
        3 => Some("March"),
        4 => Some("April"),
        5 => Some("May"),
        6 => Some("June"),
        7 => Some("July"),
        8 => Some("August"),
        9 => Some("September"),
        10 => Some("October"),
        11 => Some("November"),
        12 => Some("December"),
        _ => None,
    }
}
