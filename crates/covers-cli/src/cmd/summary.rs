//! `covers summary`: headline KPIs for a selection.

use std::io::Write;

use clap::Args;
use covers_core::Filter;
use covers_core::insight::{self, Kpis};
use serde::Serialize;

use super::{Context, FilterArgs, display_source, load_selection};
use crate::output::{EMPTY_SELECTION, pretty_kv, pretty_section, render_mode};

/// Arguments for `covers summary`.
#[derive(Args, Debug, Default)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
struct SummaryPayload {
    source: String,
    filter: Filter,
    kpis: Kpis,
}

/// Execute `covers summary`.
pub fn run_summary(args: &SummaryArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let records = filter.apply(&dataset);

    let payload = SummaryPayload {
        source: display_source(dataset.source()),
        kpis: insight::kpis(records),
        filter,
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| write_kpis_text(&p.kpis, w),
        |p, w| {
            writeln!(w, "Source: {}", p.source)?;
            writeln!(w)?;
            write_kpis_pretty(&p.kpis, w)
        },
    )
}

pub(crate) fn write_kpis_pretty(kpis: &Kpis, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Summary")?;
    if kpis.record_count == 0 {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    pretty_kv(w, "Revenue", kpis.total_revenue.to_string())?;
    pretty_kv(w, "Orders", kpis.order_count.to_string())?;
    pretty_kv(w, "Items sold", kpis.total_quantity.to_string())?;
    pretty_kv(w, "Sale lines", kpis.record_count.to_string())?;
    if let Some(avg) = kpis.avg_order_value {
        pretty_kv(w, "Avg order", avg.to_string())?;
    }
    Ok(())
}

pub(crate) fn write_kpis_text(kpis: &Kpis, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "total_revenue\t{}", kpis.total_revenue)?;
    writeln!(w, "order_count\t{}", kpis.order_count)?;
    writeln!(w, "total_quantity\t{}", kpis.total_quantity)?;
    writeln!(w, "record_count\t{}", kpis.record_count)?;
    match kpis.avg_order_value {
        Some(avg) => writeln!(w, "avg_order_value\t{avg}"),
        None => writeln!(w, "avg_order_value\t-"),
    }
}
