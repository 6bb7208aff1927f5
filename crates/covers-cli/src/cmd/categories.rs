//! `covers categories`: revenue contribution per category.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, CategoryAggregate};
use covers_core::model::Money;
use serde::Serialize;

use super::{Context, FilterArgs, load_selection};
use crate::output::{EMPTY_SELECTION, money_magnitude, pretty_bar, pretty_section, render_mode};

/// Arguments for `covers categories`.
#[derive(Args, Debug, Default)]
pub struct CategoriesArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
struct CategoriesPayload {
    categories: Vec<CategoryAggregate>,
}

/// Execute `covers categories`.
pub fn run_categories(args: &CategoriesArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let payload = CategoriesPayload {
        categories: insight::category_contribution(filter.apply(&dataset)),
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| write_categories_text(&p.categories, w),
        |p, w| write_categories_pretty(&p.categories, w),
    )
}

/// Percentage of `total` contributed by `part`, or zero for an empty total.
pub(crate) fn share(part: Money, total: Money) -> f64 {
    if total.cents() == 0 {
        return 0.0;
    }
    part.as_f64() / total.as_f64() * 100.0
}

pub(crate) fn write_categories_pretty(
    categories: &[CategoryAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Revenue by category")?;
    if categories.is_empty() {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    let total: Money = categories.iter().map(|c| c.total_revenue).sum();
    let max = categories
        .iter()
        .map(|c| money_magnitude(c.total_revenue))
        .max()
        .unwrap_or(0);
    for category in categories {
        pretty_bar(
            w,
            &category.category,
            money_magnitude(category.total_revenue),
            max,
            format!(
                "{} ({:.1}%, {} sold)",
                category.total_revenue,
                share(category.total_revenue, total),
                category.total_quantity
            ),
        )?;
    }
    Ok(())
}

pub(crate) fn write_categories_text(
    categories: &[CategoryAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "category\ttotal_revenue\ttotal_quantity")?;
    for category in categories {
        writeln!(
            w,
            "{}\t{}\t{}",
            category.category, category.total_revenue, category.total_quantity
        )?;
    }
    Ok(())
}
