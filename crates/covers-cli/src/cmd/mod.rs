pub mod categories;
pub mod completions;
pub mod customers;
pub mod items;
pub mod periods;
pub mod report;
pub mod summary;
pub mod trend;
pub mod weekdays;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use covers_core::config::LoadedConfig;
use covers_core::filter::parse_weekday;
use covers_core::insight::Granularity;
use covers_core::{Dataset, Filter, InsightError};

use crate::output::OutputMode;

/// Raised when no dataset path is configured anywhere.
#[derive(Debug, thiserror::Error)]
#[error("no dataset given")]
pub struct NoDataset;

/// Everything a subcommand needs besides its own arguments.
#[derive(Debug)]
pub struct Context {
    pub config: LoadedConfig,
    /// `--data` / `COVERS_DATA`, which beats `[data].path`.
    pub data: Option<PathBuf>,
    pub output: OutputMode,
}

impl Context {
    /// The dataset path in effect, if any.
    pub fn data_path(&self) -> Option<PathBuf> {
        self.data.clone().or_else(|| self.config.data_path())
    }

    /// Load and validate the dataset once for this invocation.
    ///
    /// # Errors
    ///
    /// Fails with [`NoDataset`] when no path is configured, or with the
    /// loader's [`InsightError`] when the file is unreadable or invalid.
    pub fn load_dataset(&self) -> Result<Dataset> {
        let path = self.data_path().ok_or(NoDataset)?;
        let options = self
            .config
            .config
            .data
            .load_options()
            .context("invalid [data] section in config")?;
        Ok(Dataset::load(&path, &options)?)
    }

    pub const fn top_n(&self) -> usize {
        self.config.config.report.top_n
    }
}

/// Filter flags shared by every report subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only include this category (repeatable).
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Only include orders placed on this weekday, e.g. `sat` (repeatable).
    #[arg(long = "weekday", value_name = "DAY")]
    pub weekdays: Vec<String>,

    /// Only include this calendar year.
    #[arg(long, value_name = "YYYY")]
    pub year: Option<i32>,

    /// Only include this month of the year.
    #[arg(long, value_name = "1-12")]
    pub month: Option<u32>,
}

impl FilterArgs {
    /// Build the core [`Filter`] from the flags.
    ///
    /// # Errors
    ///
    /// Returns [`InsightError::InvalidFilter`] for an unknown weekday or a
    /// month outside 1-12.
    pub fn to_filter(&self) -> Result<Filter, InsightError> {
        let mut filter = Filter::all();
        for category in &self.categories {
            filter = filter.with_category(category.trim());
        }
        for day in &self.weekdays {
            filter = filter.with_weekday(parse_weekday(day)?);
        }
        if let Some(year) = self.year {
            filter = filter.with_year(year);
        }
        if let Some(month) = self.month {
            filter = filter.with_month(month)?;
        }
        Ok(filter)
    }
}

/// Trend bucket size on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum GranularityArg {
    #[default]
    Day,
    Month,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Day => Self::Day,
            GranularityArg::Month => Self::Month,
        }
    }
}

/// Dataset plus the filtered selection, ready for a calculator call.
pub fn load_selection(ctx: &Context, args: &FilterArgs) -> Result<(Dataset, Filter)> {
    let filter = args.to_filter()?;
    let dataset = ctx.load_dataset()?;
    tracing::debug!(
        records = dataset.len(),
        unrestricted = filter.is_unrestricted(),
        "dataset ready"
    );
    Ok((dataset, filter))
}

/// Display form of an optional path for logs and headers.
pub fn display_source(path: Option<&Path>) -> String {
    path.map_or_else(|| "<memory>".to_string(), |p| p.display().to_string())
}
