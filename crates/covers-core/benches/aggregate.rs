use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use covers_core::insight::{self, Granularity, PeriodFilter};
use covers_core::model::{CustomerId, Money, SaleRecord};
use covers_core::{Dataset, Filter, InsightReport, ReportOptions};

struct Tier {
    name: &'static str,
    rows: usize,
}

const TIERS: [Tier; 3] = [
    Tier {
        name: "small",
        rows: 1_000,
    },
    Tier {
        name: "medium",
        rows: 25_000,
    },
    Tier {
        name: "large",
        rows: 200_000,
    },
];

const CATEGORIES: [&str; 5] = ["Main", "Drinks", "Dessert", "Sides", "Specials"];

/// Deterministic synthetic sales; a tiny LCG keeps runs comparable.
fn synthetic(rows: usize, seed: u64) -> Dataset {
    let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
    let mut state = seed;
    let mut next = move |bound: u64| {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        (state >> 33) % bound
    };

    let records = (0..rows)
        .map(|i| {
            let category = CATEGORIES[next(CATEGORIES.len() as u64) as usize];
            let quantity = next(6) as u32 + 1;
            let unit_price = Money::from_cents(next(4_000) as i64 + 150);
            SaleRecord {
                order_id: format!("{}", i / 3),
                date: start + Days::new(next(730)),
                customer_id: CustomerId::new(next(2_000).to_string()),
                category: category.to_string(),
                item: format!("{category}-{}", next(12)),
                quantity,
                unit_price,
                revenue: unit_price.times(quantity),
            }
        })
        .collect();
    Dataset::from_records(records)
}

fn bench_aggregates(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregates");

    for tier in TIERS {
        let dataset = synthetic(tier.rows, 0xC0FFEE + tier.rows as u64);

        group.bench_with_input(BenchmarkId::new("customers", tier.name), &dataset, |b, ds| {
            b.iter(|| black_box(insight::top_spenders(ds, 10)));
        });

        group.bench_with_input(BenchmarkId::new("categories", tier.name), &dataset, |b, ds| {
            b.iter(|| black_box(insight::category_contribution(ds)));
        });

        group.bench_with_input(BenchmarkId::new("daily_trend", tier.name), &dataset, |b, ds| {
            b.iter(|| {
                black_box(insight::revenue_by_period(
                    ds,
                    Granularity::Day,
                    PeriodFilter::year(2023),
                ))
            });
        });

        group.bench_with_input(BenchmarkId::new("full_report", tier.name), &dataset, |b, ds| {
            let filter = Filter::all().with_category("Main");
            b.iter(|| black_box(InsightReport::build(ds, &filter, &ReportOptions::default())));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregates);
criterion_main!(benches);
