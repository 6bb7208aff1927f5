use chrono::NaiveDate;
use covers_core::model::{CustomerId, Money, SaleRecord};
use proptest::prelude::*;

const CUSTOMERS: &[&str] = &["1", "2", "3", "10", "42", "C7", "vip"];
const CATEGORIES: &[&str] = &["Main", "Drinks", "Dessert", "Sides"];
const ITEMS: &[&str] = &["Steak", "Pasta", "Tea", "Pie", "Fries", "Soup"];

pub fn arb_date() -> impl Strategy<Value = NaiveDate> + Clone {
    (2022i32..=2023, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn arb_record() -> impl Strategy<Value = SaleRecord> + Clone {
    (
        0u32..40,
        arb_date(),
        prop::sample::select(CUSTOMERS),
        prop::sample::select(CATEGORIES),
        prop::sample::select(ITEMS),
        0u32..20,
        0i64..5_000,
    )
        .prop_map(
            |(order, date, customer, category, item, quantity, price)| {
                let unit_price = Money::from_cents(price);
                SaleRecord {
                    order_id: format!("{customer}-{order}"),
                    date,
                    customer_id: CustomerId::from(customer),
                    category: category.to_string(),
                    item: item.to_string(),
                    quantity,
                    unit_price,
                    revenue: unit_price.times(quantity),
                }
            },
        )
}

pub fn arb_records(max: usize) -> impl Strategy<Value = Vec<SaleRecord>> + Clone {
    prop::collection::vec(arb_record(), 0..max)
}

pub fn arb_nonempty_records(max: usize) -> impl Strategy<Value = Vec<SaleRecord>> + Clone {
    prop::collection::vec(arb_record(), 1..max)
}
