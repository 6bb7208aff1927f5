//! `covers items`: item performance, optionally within one category.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, ItemAggregate};
use serde::Serialize;

use super::{Context, FilterArgs, load_selection};
use crate::output::{EMPTY_SELECTION, money_magnitude, pretty_bar, pretty_section, render_mode};

/// Arguments for `covers items`.
#[derive(Args, Debug, Default)]
pub struct ItemsArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Only rank items of this category.
    #[arg(long = "in", value_name = "CATEGORY")]
    pub in_category: Option<String>,

    /// Show at most this many items.
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ItemsPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    items: Vec<ItemAggregate>,
}

/// Execute `covers items`.
pub fn run_items(args: &ItemsArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let category = args.in_category.as_deref().map(str::trim);
    let mut items = insight::item_performance(filter.apply(&dataset), category);
    if let Some(limit) = args.limit {
        items.truncate(limit);
    }

    let payload = ItemsPayload {
        category: category.map(str::to_string),
        items,
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| write_items_text(&p.items, w),
        |p, w| {
            let heading = p.category.as_ref().map_or_else(
                || "Item performance".to_string(),
                |c| format!("Item performance: {c}"),
            );
            write_items_pretty(&heading, &p.items, w)
        },
    )
}

pub(crate) fn write_items_pretty(
    heading: &str,
    items: &[ItemAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, heading)?;
    if items.is_empty() {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    let max = items
        .iter()
        .map(|i| money_magnitude(i.total_revenue))
        .max()
        .unwrap_or(0);
    for item in items {
        pretty_bar(
            w,
            &item.item,
            money_magnitude(item.total_revenue),
            max,
            format!(
                "{} x{} [{}]",
                item.total_revenue, item.total_quantity, item.category
            ),
        )?;
    }
    Ok(())
}

pub(crate) fn write_items_text(items: &[ItemAggregate], w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "category\titem\ttotal_revenue\ttotal_quantity")?;
    for item in items {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            item.category, item.item, item.total_revenue, item.total_quantity
        )?;
    }
    Ok(())
}
