//! `covers periods`: years and months present in a selection.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, MonthOption};
use serde::Serialize;

use super::{Context, FilterArgs, load_selection};
use crate::output::{EMPTY_SELECTION, pretty_kv, pretty_section, render_mode};

/// Arguments for `covers periods`.
#[derive(Args, Debug, Default)]
pub struct PeriodsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
struct YearPeriods {
    year: i32,
    months: Vec<MonthOption>,
}

#[derive(Debug, Serialize)]
struct PeriodsPayload {
    years: Vec<YearPeriods>,
}

/// Execute `covers periods`.
pub fn run_periods(args: &PeriodsArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let records = filter.apply(&dataset);

    let years = insight::available_years(records.iter().copied())
        .into_iter()
        .map(|year| YearPeriods {
            year,
            months: insight::month_options(records.iter().copied(), year),
        })
        .collect();
    let payload = PeriodsPayload { years };

    render_mode(
        ctx.output,
        &payload,
        |p, w| {
            writeln!(w, "year\tmonth\tname")?;
            for year in &p.years {
                for month in &year.months {
                    writeln!(w, "{}\t{}\t{}", year.year, month.month, month.name)?;
                }
            }
            Ok(())
        },
        |p, w| write_periods_pretty(&p.years, w),
    )
}

fn write_periods_pretty(years: &[YearPeriods], w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Available periods")?;
    if years.is_empty() {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    for year in years {
        let names: Vec<&str> = year.months.iter().map(|m| m.name).collect();
        pretty_kv(w, &year.year.to_string(), names.join(", "))?;
    }
    Ok(())
}
