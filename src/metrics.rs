//! Funnel metric calculation over a loaded campaign table.

use crate::models::{Cell, FunnelMetrics, Table};

pub const OPENED_COLUMN: &str = "Email Opened Date";
pub const CLICKED_COLUMN: &str = "Clicked Date";
pub const SUBMITTED_DATE_COLUMN: &str = "Submitted Date";
pub const SUBMITTED_DATA_COLUMN: &str = "Submitted Data";

/// Textual values that coerce to `false` (compared case-insensitively).
const FALSY_WORDS: &[&str] = &["", "false", "f", "no", "n", "off"];

/// Derive the four funnel counts from `table`.
///
/// Stages whose source column is absent report [`FunnelMetrics::PLACEHOLDER`].
pub fn compute_metrics(table: &Table) -> FunnelMetrics {
    let sent = table.row_count() as u64;
    let opened = count_present(table, OPENED_COLUMN);
    let clicked = count_present(table, CLICKED_COLUMN);

    let submitted = match table.column(SUBMITTED_DATE_COLUMN) {
        Some(cells) => count_non_missing(cells),
        None => match table.column(SUBMITTED_DATA_COLUMN) {
            Some(cells) => {
                log::debug!(
                    "No '{}' column, counting truthy '{}'",
                    SUBMITTED_DATE_COLUMN,
                    SUBMITTED_DATA_COLUMN
                );
                cells.iter().filter(|cell| is_truthy(cell)).count() as u64
            }
            None => placeholder(SUBMITTED_DATE_COLUMN),
        },
    };

    let metrics = FunnelMetrics {
        sent,
        opened,
        clicked,
        submitted,
    };
    log::info!(
        "Funnel: sent={} opened={} clicked={} submitted={}",
        metrics.sent,
        metrics.opened,
        metrics.clicked,
        metrics.submitted
    );
    metrics
}

/// Boolean coercion used for the "Submitted Data" column.
pub fn is_truthy(cell: &Cell) -> bool {
    let value = match cell {
        Cell::Missing => return false,
        Cell::Text(s) => s.trim(),
    };

    if FALSY_WORDS.iter().any(|w| value.eq_ignore_ascii_case(w)) {
        return false;
    }
    match value.parse::<f64>() {
        Ok(n) if !n.is_nan() => n != 0.0,
        _ => true,
    }
}

fn count_present(table: &Table, column: &str) -> u64 {
    match table.column(column) {
        Some(cells) => count_non_missing(cells),
        None => placeholder(column),
    }
}

fn count_non_missing(cells: &[Cell]) -> u64 {
    cells.iter().filter(|cell| !cell.is_missing()).count() as u64
}

fn placeholder(column: &str) -> u64 {
    log::warn!(
        "Column '{}' not present; reporting placeholder value {}",
        column,
        FunnelMetrics::PLACEHOLDER
    );
    FunnelMetrics::PLACEHOLDER
}
