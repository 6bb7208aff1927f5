//! `covers customers`: top spenders and most loyal customers.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, CustomerAggregate};
use covers_core::report::empty_as_none;
use serde::Serialize;

use super::{Context, FilterArgs, load_selection};
use crate::output::{
    EMPTY_SELECTION, money_magnitude, pretty_bar, pretty_kv, pretty_section, render_mode,
};

/// Arguments for `covers customers`.
#[derive(Args, Debug, Default)]
pub struct CustomersArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Length of each ranking (default: `[report].top_n`, 10).
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

/// Both customer rankings for one selection.
#[derive(Debug, Serialize)]
pub struct CustomersPayload {
    pub top_spender: Option<CustomerAggregate>,
    pub top_spenders: Vec<CustomerAggregate>,
    pub most_loyal: Option<CustomerAggregate>,
    pub most_loyal_customers: Vec<CustomerAggregate>,
}

/// Execute `covers customers`.
pub fn run_customers(args: &CustomersArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let records = filter.apply(&dataset);
    let limit = args.limit.unwrap_or_else(|| ctx.top_n());

    let payload = CustomersPayload {
        top_spender: empty_as_none(insight::top_spender(records.iter().copied()))?,
        top_spenders: insight::top_spenders(records.iter().copied(), limit),
        most_loyal: empty_as_none(insight::most_loyal(records.iter().copied()))?,
        most_loyal_customers: insight::most_loyal_customers(records.iter().copied(), limit),
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| {
            write_customers_text("spend", &p.top_spenders, w)?;
            write_customers_text("loyalty", &p.most_loyal_customers, w)
        },
        |p, w| {
            write_spenders_pretty(p.top_spender.as_ref(), &p.top_spenders, w)?;
            writeln!(w)?;
            write_loyal_pretty(p.most_loyal.as_ref(), &p.most_loyal_customers, w)
        },
    )
}

pub(crate) fn write_spenders_pretty(
    winner: Option<&CustomerAggregate>,
    ranking: &[CustomerAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Top spenders")?;
    let Some(winner) = winner else {
        return writeln!(w, "{EMPTY_SELECTION}");
    };
    pretty_kv(
        w,
        "Top spender",
        format!("{} ({})", winner.customer_id, winner.total_revenue),
    )?;
    let max = money_magnitude(winner.total_revenue);
    for customer in ranking {
        pretty_bar(
            w,
            customer.customer_id.as_str(),
            money_magnitude(customer.total_revenue),
            max,
            customer.total_revenue.to_string(),
        )?;
    }
    Ok(())
}

pub(crate) fn write_loyal_pretty(
    winner: Option<&CustomerAggregate>,
    ranking: &[CustomerAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Most loyal customers")?;
    let Some(winner) = winner else {
        return writeln!(w, "{EMPTY_SELECTION}");
    };
    pretty_kv(
        w,
        "Most loyal",
        format!("{} ({} orders)", winner.customer_id, winner.purchase_count),
    )?;
    let max = winner.purchase_count as u64;
    for customer in ranking {
        pretty_bar(
            w,
            customer.customer_id.as_str(),
            customer.purchase_count as u64,
            max,
            customer.purchase_count.to_string(),
        )?;
    }
    Ok(())
}

pub(crate) fn write_customers_text(
    ranking_name: &str,
    ranking: &[CustomerAggregate],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "ranking\trank\tcustomer_id\ttotal_revenue\tpurchase_count")?;
    for (rank, customer) in ranking.iter().enumerate() {
        writeln!(
            w,
            "{ranking_name}\t{}\t{}\t{}\t{}",
            rank + 1,
            customer.customer_id,
            customer.total_revenue,
            customer.purchase_count
        )?;
    }
    Ok(())
}
