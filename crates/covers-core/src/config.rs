use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::dataset::LoadOptions;
use crate::insight::Granularity;
use crate::report::{DEFAULT_TOP_N, ReportOptions};

/// File name looked up in the working directory.
pub const PROJECT_CONFIG_FILE: &str = "covers.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset file; relative paths resolve against the config file's directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Reject rows whose revenue is not `quantity * unit_price`.
    #[serde(default)]
    pub verify_revenue: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: default_delimiter(),
            verify_revenue: false,
        }
    }
}

impl DataConfig {
    /// Translate into loader options.
    ///
    /// # Errors
    ///
    /// Fails if `delimiter` is not a single ASCII character (or `tab`).
    pub fn load_options(&self) -> Result<LoadOptions> {
        let delimiter = match self.delimiter.as_str() {
            "tab" | "\\t" | "\t" => b'\t',
            other if other.len() == 1 && other.is_ascii() => other.as_bytes()[0],
            other => bail!("delimiter must be a single ASCII character, got '{other}'"),
        };
        Ok(LoadOptions {
            delimiter,
            verify_revenue: self.verify_revenue,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            output: None,
        }
    }
}

impl ReportConfig {
    #[must_use]
    pub fn report_options(&self, granularity: Granularity, month: Option<u32>) -> ReportOptions {
        ReportOptions {
            top_n: self.top_n,
            trend_granularity: granularity,
            trend_month: month,
        }
    }
}

/// A config together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: ProjectConfig,
    pub origin: Option<PathBuf>,
}

impl LoadedConfig {
    /// Dataset path from `[data].path`, resolved against the config's directory.
    #[must_use]
    pub fn data_path(&self) -> Option<PathBuf> {
        let path = self.config.data.path.as_ref()?;
        if path.is_absolute() {
            return Some(path.clone());
        }
        let base = self.origin.as_deref().and_then(Path::parent);
        Some(base.map_or_else(|| path.clone(), |dir| dir.join(path)))
    }
}

/// Parse one config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Path of the per-user config, if the platform has a config directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("covers/config.toml"))
}

/// Find and load the effective config.
///
/// Lookup order: `explicit` (must exist), `<project_root>/covers.toml`, the
/// user config, then built-in defaults.
///
/// # Errors
///
/// Returns an error if `explicit` is missing or any found file fails to parse.
pub fn resolve_config(explicit: Option<&Path>, project_root: &Path) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return Ok(LoadedConfig {
            config: load_config_file(path)?,
            origin: Some(path.to_path_buf()),
        });
    }

    let candidates = std::iter::once(project_root.join(PROJECT_CONFIG_FILE)).chain(user_config_path());
    for path in candidates {
        if path.exists() {
            tracing::debug!(path = %path.display(), "using config file");
            return Ok(LoadedConfig {
                config: load_config_file(&path)?,
                origin: Some(path),
            });
        }
    }

    Ok(LoadedConfig::default())
}

fn default_delimiter() -> String {
    ",".to_string()
}

const fn default_top_n() -> usize {
    DEFAULT_TOP_N
}
