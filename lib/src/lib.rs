//! Normalisation and aggregation of adverse drug reaction (ADR) case reports exported from a
//! pharmacovigilance database.
//!
//! Reports are loaded from a spreadsheet ([`load`]), cleaned field by field ([`clean`]),
//! optionally filtered ([`filter`]), and summarised per dimension ([`aggregate`]). Summaries are
//! turned into chart configurations, HTML fragments and CSV files for display or export
//! ([`panel`]).

pub mod aggregate;
pub mod chart;
pub mod clean;
pub mod config;
pub mod derived;
pub mod export;
pub mod filter;
pub mod freq;
pub mod html;
pub mod load;
pub mod panel;
pub mod record;
mod util;

pub use anyhow::{Context, Error};
use std::sync::Arc;

pub use crate::{
    config::Config,
    derived::DerivedFields,
    filter::{apply_filters, calculate_filter_counts, FilterCriteria, FilterOptions},
    freq::FrequencyTable,
    load::{load_reports, READ_ERROR},
    panel::{Dashboard, Dimension, Panel},
    record::{col, CellValue, Report, Reports},
    util::{header, ResultExt},
};

pub type ArcStr = Arc<str>;
pub type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
