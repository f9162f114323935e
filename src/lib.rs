//! Phishing campaign report generator
//!
//! Turns a GoPhish CSV export into a single self-contained HTML page with
//! funnel metrics, an embedded bar chart and the full result table.

pub mod chart;
pub mod cli;
pub mod config;
pub mod errors;
pub mod generator;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod reporter;
pub mod utils;

pub use errors::{ReportError, ReportResult};
pub use generator::{ReportGenerator, ReportSummary};
