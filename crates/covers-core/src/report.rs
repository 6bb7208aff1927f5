//! Full dashboard report for one filter selection.

use serde::Serialize;

use crate::dataset::Dataset;
use crate::error::InsightError;
use crate::filter::Filter;
use crate::insight::{
    self, CategoryAggregate, CustomerAggregate, Granularity, ItemAggregate, Kpis, MonthOption,
    PeriodFilter, PeriodRevenue, WeekdayOrders,
};

/// Default length of the ranked customer lists.
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Length of the top spender / most loyal lists.
    pub top_n: usize,
    pub trend_granularity: Granularity,
    /// Restrict each year's trend to this month (1-12).
    pub trend_month: Option<u32>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            trend_granularity: Granularity::Day,
            trend_month: None,
        }
    }
}

/// Revenue trend for one calendar year of the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearTrend {
    pub year: i32,
    /// Months with any sales in this year; the choices for `month`.
    pub months: Vec<MonthOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    pub granularity: Granularity,
    /// Empty when the chosen month had no sales.
    pub points: Vec<PeriodRevenue>,
}

/// Every panel of the sales dashboard.
///
/// Single-winner panels are `None` when the selection is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub filter: Filter,
    pub kpis: Kpis,
    pub top_spender: Option<CustomerAggregate>,
    pub top_spenders: Vec<CustomerAggregate>,
    pub most_loyal: Option<CustomerAggregate>,
    pub most_loyal_customers: Vec<CustomerAggregate>,
    pub categories: Vec<CategoryAggregate>,
    pub items: Vec<ItemAggregate>,
    pub weekdays: Vec<WeekdayOrders>,
    pub trends: Vec<YearTrend>,
}

impl InsightReport {
    /// Compute every panel for `filter` over `dataset`.
    ///
    /// # Errors
    ///
    /// Only non-empty-selection failures propagate; an empty selection
    /// produces empty panels.
    pub fn build(
        dataset: &Dataset,
        filter: &Filter,
        options: &ReportOptions,
    ) -> Result<Self, InsightError> {
        let records = filter.apply(dataset);

        let trends = insight::available_years(records.iter().copied())
            .into_iter()
            .map(|year| YearTrend {
                year,
                months: insight::month_options(records.iter().copied(), year),
                month: options.trend_month,
                granularity: options.trend_granularity,
                points: insight::revenue_by_period(
                    records.iter().copied(),
                    options.trend_granularity,
                    PeriodFilter {
                        year: Some(year),
                        month: options.trend_month,
                    },
                ),
            })
            .collect();

        let report = Self {
            source: dataset.source().map(|p| p.display().to_string()),
            filter: filter.clone(),
            kpis: insight::kpis(records.iter().copied()),
            top_spender: empty_as_none(insight::top_spender(records.iter().copied()))?,
            top_spenders: insight::top_spenders(records.iter().copied(), options.top_n),
            most_loyal: empty_as_none(insight::most_loyal(records.iter().copied()))?,
            most_loyal_customers: insight::most_loyal_customers(
                records.iter().copied(),
                options.top_n,
            ),
            categories: insight::category_contribution(records.iter().copied()),
            items: insight::item_performance(records.iter().copied(), None),
            weekdays: insight::orders_by_weekday(records.iter().copied()),
            trends,
        };

        tracing::debug!(
            records = records.len(),
            customers = report.top_spenders.len(),
            categories = report.categories.len(),
            "built insight report"
        );
        Ok(report)
    }

    /// Returns true when the selection matched no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kpis.record_count == 0
    }
}

/// Turn [`InsightError::EmptyInput`] into `Ok(None)`, the empty-state panel.
///
/// # Errors
///
/// Any other error is passed through.
pub fn empty_as_none<T>(result: Result<T, InsightError>) -> Result<Option<T>, InsightError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InsightError::EmptyInput { query }) => {
            tracing::debug!(query, "no data for this selection");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}
