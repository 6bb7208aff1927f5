//! Typed sale records and the value types they are built from.

mod money;
mod sale;

pub use money::{Money, ParseMoneyError};
pub use sale::{CustomerId, SaleRecord, month_name, weekday_name};
