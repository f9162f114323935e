use chrono::{DateTime, Local};
use std::path::PathBuf;

/// Environment variable naming an extra directory of fonts for the chart.
pub const FONT_DIR_ENV: &str = "PHISHREPORT_FONT_DIR";

/// Presentation settings shared by the chart renderer and the HTML reporter.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Document `<title>` and `<h1>` text
    pub title: String,
    pub chart_title: String,
    pub y_axis_label: String,
    /// Chart raster size in pixels
    pub chart_width: u32,
    pub chart_height: u32,
    /// Extra fonts loaded on top of the system fonts
    pub font_dir: Option<PathBuf>,
    /// Printed under the heading when set
    pub generated_at: Option<DateTime<Local>>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "GoPhish Campaign Report".to_string(),
            chart_title: "Phishing Campaign Funnel".to_string(),
            y_axis_label: "Count".to_string(),
            chart_width: 600,
            chart_height: 400,
            font_dir: None,
            generated_at: None,
        }
    }
}

impl ReportOptions {
    /// Defaults plus any font directory named by [`FONT_DIR_ENV`].
    pub fn from_env() -> Self {
        Self {
            font_dir: std::env::var_os(FONT_DIR_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_timestamp(mut self, at: DateTime<Local>) -> Self {
        self.generated_at = Some(at);
        self
    }
}
