//! `covers weekdays`: orders per day of the week.

use std::io::Write;

use clap::Args;
use covers_core::insight::{self, WeekdayOrders};
use covers_core::model::weekday_name;
use serde::Serialize;

use super::{Context, FilterArgs, load_selection};
use crate::output::{EMPTY_SELECTION, pretty_bar, pretty_section, render_mode};

/// Arguments for `covers weekdays`.
#[derive(Args, Debug, Default)]
pub struct WeekdaysArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
struct WeekdaysPayload {
    weekdays: Vec<WeekdayOrders>,
}

/// Execute `covers weekdays`.
pub fn run_weekdays(args: &WeekdaysArgs, ctx: &Context) -> anyhow::Result<()> {
    let (dataset, filter) = load_selection(ctx, &args.filter)?;
    let payload = WeekdaysPayload {
        weekdays: insight::orders_by_weekday(filter.apply(&dataset)),
    };

    render_mode(
        ctx.output,
        &payload,
        |p, w| write_weekdays_text(&p.weekdays, w),
        |p, w| write_weekdays_pretty(&p.weekdays, w),
    )
}

pub(crate) fn write_weekdays_pretty(
    weekdays: &[WeekdayOrders],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    pretty_section(w, "Orders by weekday")?;
    if weekdays.is_empty() {
        return writeln!(w, "{EMPTY_SELECTION}");
    }
    let max = weekdays
        .iter()
        .map(|d| d.order_count as u64)
        .max()
        .unwrap_or(0);
    for day in weekdays {
        pretty_bar(
            w,
            weekday_name(day.weekday),
            day.order_count as u64,
            max,
            day.order_count.to_string(),
        )?;
    }
    Ok(())
}

pub(crate) fn write_weekdays_text(
    weekdays: &[WeekdayOrders],
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "weekday\torder_count")?;
    for day in weekdays {
        writeln!(w, "{}\t{}", weekday_name(day.weekday), day.order_count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn text_uses_full_day_names() {
        let days = [
            WeekdayOrders {
                weekday: Weekday::Fri,
                order_count: 4,
            },
            WeekdayOrders {
                weekday: Weekday::Sat,
                order_count: 9,
            },
        ];
        let mut buf = Vec::new();
        write_weekdays_text(&days, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "weekday\torder_count\nFriday\t4\nSaturday\t9\n"
        );
    }
}
