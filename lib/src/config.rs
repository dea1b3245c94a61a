//! Run configuration, read from a TOML file. Every section and key is optional.
//!
//! ```toml
//! [filters]
//! date_from = "2023-01-01"
//! location = "Kandy"
//!
//! [display]
//! top_drugs_pie = 7
//! drug_mode = "mentions"
//!
//! [export]
//! dir = "out"
//! ```

use crate::{aggregate::CountMode, filter::FilterCriteria, util::check_extension, Result};
use qu::ick_use::*;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub filters: FilterCriteria,
    pub display: DisplayConfig,
    pub export: ExportConfig,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        fn inner(path: &Path) -> Result<Config> {
            let contents = fs::read_to_string(path)?;
            Config::from_toml_str(&contents)
        }
        let path = path.as_ref();
        check_extension(path, "toml")?;
        let config = inner(path)
            .with_context(|| format!("unable to load config from \"{}\"", path.display()))?;
        event!(Level::DEBUG, ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// `path` if given, otherwise the default configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Limits on how much of each table panels show.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// Drugs shown individually in the pie chart, the rest are grouped as `Others`.
    pub top_drugs_pie: usize,
    /// Drugs shown in the bar chart.
    pub top_drugs_bar: usize,
    /// Locations shown in the location charts.
    pub max_locations: usize,
    /// Drug options offered by the filter.
    pub max_filter_drugs: usize,
    pub drug_mode: CountMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            top_drugs_pie: 7,
            top_drugs_bar: 20,
            max_locations: 20,
            max_filter_drugs: crate::filter::MAX_DRUG_OPTIONS,
            drug_mode: CountMode::Cases,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory exported files are written to.
    pub dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig { dir: "out".into() }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
        assert_eq!(Config::default().display.top_drugs_pie, 7);
    }

    #[test]
    fn parses_sections() {
        let config = Config::from_toml_str(
            r#"
            [filters]
            date_from = "2023-01-01"
            outcome = "Died"

            [display]
            top_drugs_bar = 10
            drug_mode = "mentions"

            [export]
            dir = "reports/out"
            "#,
        )
        .unwrap();
        assert_eq!(config.filters.date_from, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(config.filters.outcome.as_deref(), Some("Died"));
        assert_eq!(config.display.top_drugs_bar, 10);
        assert_eq!(config.display.top_drugs_pie, 7);
        assert_eq!(config.display.drug_mode, CountMode::Mentions);
        assert_eq!(config.export.dir, PathBuf::from("reports/out"));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::from_toml_str("[display]\ntop = 3").is_err());
    }

    #[test]
    fn load_requires_toml_extension() {
        let err = Config::load("config.json").unwrap_err();
        assert!(err.to_string().contains(".toml"));
    }
}
