use std::fmt::Write;
use std::path::Path;

use crate::chart::png_data_uri;
use crate::config::ReportOptions;
use crate::errors::{ReportError, ReportResult};
use crate::models::{FunnelMetrics, Table};
use crate::utils::escape_html;

/// Summary list captions, in funnel order.
const SUMMARY_CAPTIONS: [&str; 4] = [
    "Total Emails Sent",
    "Emails Opened",
    "Links Clicked",
    "Credentials Submitted",
];

/// Stand-alone HTML report writer for campaign results.
#[derive(Debug, Clone, Default)]
pub struct HtmlReporter {
    options: ReportOptions,
}

impl HtmlReporter {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Compose the report and write it to `output`. Returns the bytes written.
    pub fn generate_report(
        &self,
        table: &Table,
        metrics: &FunnelMetrics,
        chart_b64: &str,
        output: &Path,
    ) -> ReportResult<usize> {
        let html = self.compose(table, metrics, chart_b64);
        Self::write(&html, output)?;
        Ok(html.len())
    }

    /// Overwrites any existing file at `output`.
    pub fn write(html: &str, output: &Path) -> ReportResult<()> {
        std::fs::write(output, html).map_err(|e| ReportError::write(e, output))?;
        log::info!("Wrote {} bytes to {}", html.len(), output.display());
        Ok(())
    }

    pub fn compose(&self, table: &Table, metrics: &FunnelMetrics, chart_b64: &str) -> String {
        let title = escape_html(&self.options.title);
        let generated = self
            .options
            .generated_at
            .map(|at| {
                format!(
                    "\n<p class=\"generated\">Generated {}</p>",
                    at.format("%Y-%m-%d %H:%M:%S %Z")
                )
            })
            .unwrap_or_default();

        let mut summary = String::new();
        for (caption, (_, value)) in SUMMARY_CAPTIONS.iter().zip(metrics.stages()) {
            let _ = writeln!(summary, "  <li>{}: <strong>{}</strong></li>", caption, value);
        }

        let image_src = png_data_uri(chart_b64);
        let table_html = Self::table_html(table);

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: Arial, sans-serif; margin: 20px; }}
h1 {{ color: #2e6c80; }}
.generated {{ color: #666666; font-size: 0.9em; }}
.result-table {{ border-collapse: collapse; border: 1px solid #999999; }}
.result-table th, .result-table td {{ border: 1px solid #999999; padding: 4px; }}
.result-table th {{ background: #f2f2f2; }}
</style>
</head>
<body>
<h1>{title}</h1>{generated}
<h2>Summary</h2>
<ul>
{summary}</ul>
<h2>Funnel Chart</h2>
<img src="{image_src}" alt="Funnel Chart">
<h2>Detailed Results</h2>
{table_html}
</body>
</html>
"#
        )
    }

    fn table_html(table: &Table) -> String {
        let mut html = String::new();
        html.push_str("<table class=\"result-table\">\n  <thead>\n    <tr>");
        for header in table.headers() {
            let _ = write!(html, "<th>{}</th>", escape_html(header));
        }
        html.push_str("</tr>\n  </thead>\n  <tbody>\n");

        for row in table.rows() {
            html.push_str("    <tr>");
            for cell in row {
                let _ = write!(html, "<td>{}</td>", escape_html(cell.as_str()));
            }
            html.push_str("</tr>\n");
        }

        html.push_str("  </tbody>\n</table>");
        html
    }
}
