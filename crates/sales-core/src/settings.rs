use chrono::NaiveDate;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SalesError;
use crate::models::{RegionFilter, DEFAULT_CUTOFF_DATE, DEFAULT_PRODUCT};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Pink Morsel sales pipeline and before/after price-increase dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "sales-dashboard",
    about = "Pink Morsel sales pipeline and before/after price-increase dashboard",
    version
)]
pub struct Settings {
    /// What to run: the ingestion pipeline, a text summary, the dashboard, or
    /// the pipeline followed by the dashboard
    #[arg(long, default_value = "dashboard", value_parser = ["process", "summary", "dashboard", "all"])]
    pub mode: String,

    /// Directory holding the per-store source CSV files
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Path of the canonical dataset written by the pipeline
    #[arg(long, default_value = "formatted_sales_data.csv")]
    pub output: PathBuf,

    /// Product line kept by the pipeline (case-insensitive)
    #[arg(long, default_value = DEFAULT_PRODUCT)]
    pub product: String,

    /// Price-increase date splitting the before/after comparison (YYYY-MM-DD)
    #[arg(long, default_value = DEFAULT_CUTOFF_DATE)]
    pub cutoff: NaiveDate,

    /// Initial region filter
    #[arg(
        long,
        default_value = "all",
        ignore_case = true,
        value_parser = ["all", "north", "south", "east", "west"]
    )]
    pub region: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.sales-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl LastUsedParams {
    /// `~/.sales-dashboard/last_used.json`, or relative to `.` without a home.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".sales-dashboard").join("last_used.json")
    }

    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable last-used params at {}: {e}", path.display());
            Self::default()
        })
    }

    /// Atomically write params to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, merge last-used params for flags that
    /// were not given explicitly, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Same as [`Settings::load_with_last_used`] with explicit args and
    /// config path.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::debug!("Could not clear {}: {e}", config_path.display());
            }
            return settings.apply_debug_flag();
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins; clap keys args by field name.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "region") {
            if let Some(v) = last.region {
                settings.region = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output") {
            if let Some(v) = last.output {
                settings.output = v;
            }
        }

        settings = settings.apply_debug_flag();

        if let Err(e) = LastUsedParams::from(&settings).save_to(config_path) {
            tracing::debug!("Could not persist last-used params: {e}");
        }

        settings
    }

    fn apply_debug_flag(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// The `--region` value as a typed filter.
    pub fn region_filter(&self) -> Result<RegionFilter, SalesError> {
        Ok(self.region.parse::<RegionFilter>()?)
    }

    /// Reject values clap cannot catch on its own, such as a region restored
    /// from a hand-edited last-used file.
    pub fn validate(&self) -> Result<(), SalesError> {
        if self.product.trim().is_empty() {
            return Err(SalesError::Config("product must not be empty".to_string()));
        }
        if let Err(e) = self.region.parse::<RegionFilter>() {
            return Err(SalesError::Config(e.to_string()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(SalesError::Config("output path must not be empty".to_string()));
        }
        Ok(())
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            region: Some(s.region.to_lowercase()),
            output: Some(s.output.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied on the command line rather than
/// coming from a default.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
