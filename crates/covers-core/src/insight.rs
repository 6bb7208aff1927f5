//! Insight calculations: grouped sums and counts over sale records.
//!
//! # Overview
//!
//! Every function here is pure. Inputs are any iterator of borrowed
//! [`SaleRecord`]s, so callers can pass a whole [`Dataset`] or the
//! `Vec<&SaleRecord>` a [`Filter`] produced without copying.
//!
//! Ordering is always deterministic:
//!
//! - customer rankings: metric descending, then lowest [`CustomerId`]
//! - category rankings: revenue descending, then category name
//! - item rankings: revenue descending, then category, then item
//! - period and weekday series: chronological
//!
//! List-valued queries return an empty `Vec` for empty input. Single-winner
//! queries ([`top_spender`], [`most_loyal`]) return
//! [`InsightError::EmptyInput`] instead.
//!
//! [`Dataset`]: crate::dataset::Dataset
//! [`Filter`]: crate::filter::Filter

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::InsightError;
use crate::model::{CustomerId, Money, SaleRecord, month_name, weekday_name};

// ---------------------------------------------------------------------------
// Aggregate types
// ---------------------------------------------------------------------------

/// Spend and visit frequency of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerAggregate {
    pub customer_id: CustomerId,
    pub total_revenue: Money,
    /// Distinct transactions.
    pub purchase_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryAggregate {
    pub category: String,
    pub total_revenue: Money,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemAggregate {
    pub item: String,
    pub category: String,
    pub total_revenue: Money,
    pub total_quantity: u64,
}

/// Distinct transactions placed on one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdayOrders {
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub order_count: usize,
}

/// Headline numbers for a selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub total_revenue: Money,
    pub total_quantity: u64,
    /// Distinct transactions.
    pub order_count: usize,
    /// Sale lines.
    pub record_count: usize,
    /// Mean revenue per sale line; `None` when the selection is empty.
    pub avg_order_value: Option<Money>,
}

/// Bucket size for revenue trends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Month,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Month => "month",
        })
    }
}

/// A trend bucket. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
}

impl Period {
    fn of(date: NaiveDate, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => Self::Day(date),
            Granularity::Month => Self::Month {
                year: date.year(),
                month: date.month(),
            },
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Revenue summed over one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodRevenue {
    pub period: Period,
    pub revenue: Money,
}

/// Year/month restriction applied before bucketing a trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl PeriodFilter {
    #[must_use]
    pub const fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    #[must_use]
    pub const fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    fn matches(self, date: NaiveDate) -> bool {
        self.year.is_none_or(|y| date.year() == y) && self.month.is_none_or(|m| date.month() == m)
    }
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

// ---------------------------------------------------------------------------
// Revenue trend
// ---------------------------------------------------------------------------

/// Revenue per day or month, in chronological order.
///
/// Records outside `period_filter` are ignored. Periods with no records are
/// absent from the result rather than reported as zero.
pub fn revenue_by_period<'a, I>(
    records: I,
    granularity: Granularity,
    period_filter: PeriodFilter,
) -> Vec<PeriodRevenue>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut buckets: BTreeMap<Period, Money> = BTreeMap::new();
    for record in records {
        if !period_filter.matches(record.date) {
            continue;
        }
        *buckets.entry(Period::of(record.date, granularity)).or_default() += record.revenue;
    }

    tracing::debug!(
        %granularity,
        periods = buckets.len(),
        "computed revenue by period"
    );

    buckets
        .into_iter()
        .map(|(period, revenue)| PeriodRevenue { period, revenue })
        .collect()
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct CustomerTally<'a> {
    revenue: Money,
    orders: HashSet<&'a str>,
}

fn customer_aggregates<'a, I>(records: I) -> Vec<CustomerAggregate>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut tallies: BTreeMap<&CustomerId, CustomerTally<'a>> = BTreeMap::new();
    for record in records {
        let tally = tallies.entry(&record.customer_id).or_default();
        tally.revenue += record.revenue;
        tally.orders.insert(record.order_id.as_str());
    }

    tallies
        .into_iter()
        .map(|(customer_id, tally)| CustomerAggregate {
            customer_id: customer_id.clone(),
            total_revenue: tally.revenue,
            purchase_count: tally.orders.len(),
        })
        .collect()
}

fn by_spend(a: &CustomerAggregate, b: &CustomerAggregate) -> std::cmp::Ordering {
    b.total_revenue
        .cmp(&a.total_revenue)
        .then_with(|| a.customer_id.cmp(&b.customer_id))
}

fn by_visits(a: &CustomerAggregate, b: &CustomerAggregate) -> std::cmp::Ordering {
    b.purchase_count
        .cmp(&a.purchase_count)
        .then_with(|| a.customer_id.cmp(&b.customer_id))
}

/// Customers ranked by total spend, at most `limit` of them.
pub fn top_spenders<'a, I>(records: I, limit: usize) -> Vec<CustomerAggregate>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut customers = customer_aggregates(records);
    customers.sort_by(by_spend);
    customers.truncate(limit);
    customers
}

/// Customers ranked by number of distinct transactions, at most `limit`.
pub fn most_loyal_customers<'a, I>(records: I, limit: usize) -> Vec<CustomerAggregate>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut customers = customer_aggregates(records);
    customers.sort_by(by_visits);
    customers.truncate(limit);
    customers
}

/// The customer with the highest total spend.
///
/// Ties go to the lowest customer id.
///
/// # Errors
///
/// Returns [`InsightError::EmptyInput`] when `records` is empty.
pub fn top_spender<'a, I>(records: I) -> Result<CustomerAggregate, InsightError>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    customer_aggregates(records)
        .into_iter()
        .min_by(by_spend)
        .ok_or(InsightError::EmptyInput {
            query: "top_spender",
        })
}

/// The customer with the most distinct transactions.
///
/// Ties go to the lowest customer id.
///
/// # Errors
///
/// Returns [`InsightError::EmptyInput`] when `records` is empty.
pub fn most_loyal<'a, I>(records: I) -> Result<CustomerAggregate, InsightError>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    customer_aggregates(records)
        .into_iter()
        .min_by(by_visits)
        .ok_or(InsightError::EmptyInput {
            query: "most_loyal",
        })
}

// ---------------------------------------------------------------------------
// Categories and items
// ---------------------------------------------------------------------------

/// Revenue and volume per category, highest revenue first.
pub fn category_contribution<'a, I>(records: I) -> Vec<CategoryAggregate>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut groups: BTreeMap<&str, (Money, u64)> = BTreeMap::new();
    for record in records {
        let (revenue, quantity) = groups.entry(record.category.as_str()).or_default();
        *revenue += record.revenue;
        *quantity += u64::from(record.quantity);
    }

    let mut categories: Vec<CategoryAggregate> = groups
        .into_iter()
        .map(|(category, (total_revenue, total_quantity))| CategoryAggregate {
            category: category.to_string(),
            total_revenue,
            total_quantity,
        })
        .collect();
    // Stable sort keeps the BTreeMap's name order among equal revenues.
    categories.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    categories
}

/// Revenue and volume per menu item, highest revenue first.
///
/// When `category` is given only that category's items are included.
pub fn item_performance<'a, I>(records: I, category: Option<&str>) -> Vec<ItemAggregate>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut groups: BTreeMap<(&str, &str), (Money, u64)> = BTreeMap::new();
    for record in records {
        if category.is_some_and(|c| c != record.category) {
            continue;
        }
        let key = (record.category.as_str(), record.item.as_str());
        let (revenue, quantity) = groups.entry(key).or_default();
        *revenue += record.revenue;
        *quantity += u64::from(record.quantity);
    }

    let mut items: Vec<ItemAggregate> = groups
        .into_iter()
        .map(|((category, item), (total_revenue, total_quantity))| ItemAggregate {
            item: item.to_string(),
            category: category.to_string(),
            total_revenue,
            total_quantity,
        })
        .collect();
    items.sort_by(|a, b| b.total_revenue.cmp(&a.total_revenue));
    items
}

// ---------------------------------------------------------------------------
// Weekday pattern and KPIs
// ---------------------------------------------------------------------------

/// Days in chart order.
const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Distinct transactions per weekday, Monday first. Empty weekdays are omitted.
pub fn orders_by_weekday<'a, I>(records: I) -> Vec<WeekdayOrders>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut orders: HashMap<Weekday, HashSet<&str>> = HashMap::new();
    for record in records {
        orders
            .entry(record.weekday())
            .or_default()
            .insert(record.order_id.as_str());
    }

    WEEK.iter()
        .filter_map(|day| {
            let ids = orders.get(day)?;
            Some(WeekdayOrders {
                weekday: *day,
                order_count: ids.len(),
            })
        })
        .collect()
}

/// Totals, transaction count, and average order value.
///
/// The average is taken over sale lines, so a two-line order contributes
/// two values.
pub fn kpis<'a, I>(records: I) -> Kpis
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut total_revenue = Money::ZERO;
    let mut total_quantity = 0_u64;
    let mut record_count = 0_usize;
    let mut orders: HashSet<&str> = HashSet::new();

    for record in records {
        total_revenue += record.revenue;
        total_quantity += u64::from(record.quantity);
        record_count += 1;
        orders.insert(record.order_id.as_str());
    }

    Kpis {
        total_revenue,
        total_quantity,
        order_count: orders.len(),
        record_count,
        avg_order_value: total_revenue.div_rounded(record_count),
    }
}

// ---------------------------------------------------------------------------
// Period selectors
// ---------------------------------------------------------------------------

/// Distinct years present, ascending.
pub fn available_years<'a, I>(records: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    records
        .into_iter()
        .map(SaleRecord::year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct months (1-12) present in `year`, ascending.
pub fn available_months<'a, I>(records: I, year: i32) -> Vec<u32>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    records
        .into_iter()
        .filter(|r| r.year() == year)
        .map(SaleRecord::month)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One selectable month, with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    pub month: u32,
    pub name: &'static str,
}

/// [`available_months`] with display names attached.
pub fn month_options<'a, I>(records: I, year: i32) -> Vec<MonthOption>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    available_months(records, year)
        .into_iter()
        .filter_map(|month| Some(MonthOption {
            month,
            name: month_name(month)?,
        }))
        .collect()
}
