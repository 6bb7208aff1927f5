//! `covers report`: every dashboard panel in one run.

use std::io::Write;

use clap::Args;
use covers_core::{InsightError, InsightReport};

use super::categories::{write_categories_pretty, write_categories_text};
use super::customers::{write_customers_text, write_loyal_pretty, write_spenders_pretty};
use super::items::{write_items_pretty, write_items_text};
use super::summary::{write_kpis_pretty, write_kpis_text};
use super::trend::{write_trend_pretty, write_trend_text};
use super::weekdays::{write_weekdays_pretty, write_weekdays_text};
use super::{Context, FilterArgs, GranularityArg, load_selection};
use crate::output::render_mode;

/// Arguments for `covers report`.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Length of the customer rankings (default: `[report].top_n`, 10).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Bucket each year's trend by day or by month.
    #[arg(long, value_enum, default_value_t = GranularityArg::Day)]
    pub granularity: GranularityArg,

    /// Restrict each year's trend to this month.
    #[arg(long, value_name = "1-12")]
    pub trend_month: Option<u32>,
}

/// Execute `covers report`.
pub fn run_report(args: &ReportArgs, ctx: &Context) -> anyhow::Result<()> {
    if let Some(month) = args.trend_month.filter(|m| !(1..=12).contains(m)) {
        return Err(InsightError::InvalidFilter {
            reason: format!("trend month must be between 1 and 12, got {month}"),
        }
        .into());
    }

    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let mut options = ctx
        .config
        .config
        .report
        .report_options(args.granularity.into(), args.trend_month);
    if let Some(limit) = args.limit {
        options.top_n = limit;
    }

    let report = InsightReport::build(&dataset, &filter, &options)?;
    tracing::info!(
        records = report.kpis.record_count,
        empty = report.is_empty(),
        "report ready"
    );

    render_mode(ctx.output, &report, write_report_text, write_report_pretty)
}

fn write_report_pretty(report: &InsightReport, w: &mut dyn Write) -> std::io::Result<()> {
    if let Some(source) = &report.source {
        writeln!(w, "Source: {source}")?;
        writeln!(w)?;
    }
    write_kpis_pretty(&report.kpis, w)?;
    writeln!(w)?;
    write_spenders_pretty(report.top_spender.as_ref(), &report.top_spenders, w)?;
    writeln!(w)?;
    write_loyal_pretty(report.most_loyal.as_ref(), &report.most_loyal_customers, w)?;
    writeln!(w)?;
    write_categories_pretty(&report.categories, w)?;
    writeln!(w)?;
    write_items_pretty("Item performance", &report.items, w)?;
    writeln!(w)?;
    write_weekdays_pretty(&report.weekdays, w)?;
    for trend in &report.trends {
        writeln!(w)?;
        let heading = match trend.month {
            Some(month) => format!("Revenue by {} in {}-{month:02}", trend.granularity, trend.year),
            None => format!("Revenue by {} in {}", trend.granularity, trend.year),
        };
        write_trend_pretty(&heading, &trend.points, w)?;
    }
    Ok(())
}

fn write_report_text(report: &InsightReport, w: &mut dyn Write) -> std::io::Result<()> {
    write_kpis_text(&report.kpis, w)?;
    writeln!(w)?;
    write_customers_text("spend", &report.top_spenders, w)?;
    writeln!(w)?;
    write_customers_text("loyalty", &report.most_loyal_customers, w)?;
    writeln!(w)?;
    write_categories_text(&report.categories, w)?;
    writeln!(w)?;
    write_items_text(&report.items, w)?;
    writeln!(w)?;
    write_weekdays_text(&report.weekdays, w)?;
    writeln!(w)?;
    write_trend_text(
        &report
            .trends
            .iter()
            .flat_map(|t| t.points.iter().cloned())
            .collect::<Vec<_>>(),
        w,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use covers_core::{Dataset, Filter, LoadOptions, ReportOptions};

    const CSV: &str = "order_id,date,customer_id,category,item,quantity,unit_price,revenue\n\
        1,2022-03-01,5,Main,Steak,1,25,25\n\
        2,2022-03-02,6,Drinks,Tea,2,3,6\n\
        3,2023-03-05,7,Dessert,Pie,2,6,12\n";

    fn report(filter: &Filter) -> InsightReport {
        let dataset = Dataset::from_reader(CSV.as_bytes(), &LoadOptions::default()).unwrap();
        InsightReport::build(&dataset, filter, &ReportOptions::default()).unwrap()
    }

    #[test]
    fn pretty_report_has_every_panel() {
        let mut buf = Vec::new();
        write_report_pretty(&report(&Filter::all()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        for heading in [
            "Summary",
            "Top spenders",
            "Most loyal customers",
            "Revenue by category",
            "Item performance",
            "Orders by weekday",
            "Revenue by day in 2022",
            "Revenue by day in 2023",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn text_report_flattens_trends() {
        let mut buf = Vec::new();
        write_report_text(&report(&Filter::all()), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("period\trevenue\n2022-03-01\t25.00\n2022-03-02\t6.00\n2023-03-05\t12.00\n"));
    }

    #[test]
    fn empty_report_renders_empty_states() {
        let mut buf = Vec::new();
        write_report_pretty(&report(&Filter::all().with_category("Brunch")), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.matches(crate::output::EMPTY_SELECTION).count() >= 6);
    }
}
