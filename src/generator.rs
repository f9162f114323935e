//! Report generation pipeline: load, measure, chart, compose, write.

use std::path::PathBuf;

use crate::chart::ChartRenderer;
use crate::cli::Args;
use crate::config::ReportOptions;
use crate::errors::{ReportError, ReportResult};
use crate::loader::load_table;
use crate::metrics::compute_metrics;
use crate::models::FunnelMetrics;
use crate::reporter::HtmlReporter;

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ReportSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub metrics: FunnelMetrics,
    pub bytes_written: usize,
}

pub struct ReportGenerator {
    args: Args,
    chart_renderer: ChartRenderer,
    html_reporter: HtmlReporter,
}

impl ReportGenerator {
    /// Validate the input path and set up the chart backend.
    pub fn new(args: Args, options: ReportOptions) -> ReportResult<Self> {
        if !args.input.is_file() {
            return Err(ReportError::FileNotFound { path: args.input });
        }
        log::info!(
            "Generating report from {} into {}",
            args.input.display(),
            args.output.display()
        );

        Ok(Self {
            args,
            chart_renderer: ChartRenderer::new(options.clone()),
            html_reporter: HtmlReporter::new(options),
        })
    }

    pub fn generate(&self) -> ReportResult<ReportSummary> {
        let table = load_table(&self.args.input)?;
        let metrics = compute_metrics(&table);
        log::debug!("Metrics: {}", serde_json::to_string(&metrics)?);

        let chart = self.chart_renderer.render(&metrics)?;
        let bytes_written =
            self.html_reporter
                .generate_report(&table, &metrics, &chart.base64, &self.args.output)?;

        Ok(ReportSummary {
            input: self.args.input.clone(),
            output: self.args.output.clone(),
            rows: table.row_count(),
            columns: table.column_count(),
            metrics,
            bytes_written,
        })
    }
}
