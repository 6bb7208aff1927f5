//! `covers trend`: revenue per day or month.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, Granularity, PeriodFilter, PeriodRevenue};
use serde::Serialize;

use super::{Context, FilterArgs, GranularityArg, load_selection};
use crate::output::{EMPTY_SELECTION, money_magnitude, pretty_bar, pretty_section, render_mode};

/// Arguments for `covers trend`.
#[derive(Args, Debug, Default)]
pub struct TrendArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Bucket revenue by day or by month.
    #[arg(long, value_enum, default_value_t = GranularityArg::Day)]
    pub granularity: GranularityArg,
}

#[derive(Debug, Serialize)]
struct TrendPayload {
    granularity: Granularity,
    points: Vec<PeriodRevenue>,
}

/// Execute `covers trend`.
pub fn run_trend(args: &TrendArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let granularity = Granularity::from(args.granularity);
    let payload = TrendPayload {
        granularity,
        // Year and month already narrowed the selection.
        points: insight::revenue_by_period(
            filter.apply(&dataset),
            granularity,
            PeriodFilter::default(),
        ),
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| write_trend_text(&p.points, w),
        |p, w| write_trend_pretty(&format!("Revenue by {}", p.granularity), &p.points, w),
    )
}

pub(crate) fn write_trend_pretty(
    heading: &str,
    points: &[PeriodRevenue],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, heading)?;
    if points.is_empty() {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    let max = points
        .iter()
        .map(|p| money_magnitude(p.revenue))
        .max()
        .unwrap_or(0);
    for point in points {
        pretty_bar(
            w,
            &point.period.to_string(),
            money_magnitude(point.revenue),
            max,
            point.revenue.to_string(),
        )?;
    }
    Ok(())
}

pub(crate) fn write_trend_text(points: &[PeriodRevenue], w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "period\trevenue")?;
    for point in points {
        writeln!(w, "{}\t{}", point.period, point.revenue)?;
    }
    Ok(())
}
