//! covers-core library.
//!
//! Loads a restaurant sales dataset once, validates it into typed
//! [`model::SaleRecord`]s, and answers insight queries over filtered views
//! of it: revenue trends, top spenders and most loyal customers, category
//! and item performance, weekday ordering pattern, and headline KPIs.
//!
//! # Conventions
//!
//! - **Errors**: library failures are [`error::InsightError`]; config loading
//!   uses `anyhow::Result` with context.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//! - **Purity**: everything in [`insight`] is a pure function of its input
//!   records; the [`dataset::Dataset`] handle is immutable once loaded.

pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod insight;
pub mod model;
pub mod report;

pub use dataset::{Dataset, LoadOptions};
pub use error::{ErrorCode, InsightError, SchemaError};
pub use filter::Filter;
pub use report::{InsightReport, ReportOptions};
