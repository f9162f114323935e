use serde::Serialize;
use std::collections::HashMap;

/// Shape violations rejected when building a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("no header row")]
    NoColumns,

    #[error("duplicate column name '{0}' in header row")]
    DuplicateColumn(String),

    #[error("row {row} has {found} fields, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A single table cell. Empty CSV fields load as `Missing`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Missing,
    Text(String),
}

impl Cell {
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(field.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Text content for display; missing cells render as an empty string.
    pub fn as_str(&self) -> &str {
        match self {
            Cell::Missing => "",
            Cell::Text(s) => s,
        }
    }
}

/// Column-oriented, immutable view of a campaign export.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    columns: Vec<Vec<Cell>>,
    index: HashMap<String, usize>,
    row_count: usize,
}

impl Table {
    /// Build a table from headers and row-major records.
    ///
    /// There must be at least one header, header names must be unique and
    /// every record must have exactly one cell per header. Rows are
    /// numbered from 1 in errors.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self, TableError> {
        if headers.is_empty() {
            return Err(TableError::NoColumns);
        }

        let mut index = HashMap::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
            .map(|(idx, row)| (idx + 1, row.len()))
        {
            return Err(TableError::RowLength {
                row,
                expected: headers.len(),
                found,
            });
        }

        let row_count = rows.len();
        let mut columns: Vec<Vec<Cell>> = headers
            .iter()
            .map(|_| Vec::with_capacity(row_count))
            .collect();

        for row in rows {
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell);
            }
        }

        Ok(Self {
            headers,
            columns,
            index,
            row_count,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Look up a column by exact header name.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.index.get(name).map(|&idx| self.columns[idx].as_slice())
    }

    /// Cells of one row, in column order.
    pub fn row(&self, row: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.columns.iter().map(move |column| &column[row])
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Cell>> + '_ {
        (0..self.row_count).map(move |row| self.row(row).collect())
    }
}

/// The four funnel counts of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunnelMetrics {
    pub sent: u64,
    pub opened: u64,
    pub clicked: u64,
    pub submitted: u64,
}

impl FunnelMetrics {
    pub const LABELS: [&'static str; 4] = ["Sent", "Opened", "Clicked", "Submitted"];

    /// Value reported for a stage whose source column is absent.
    pub const PLACEHOLDER: u64 = 1;

    pub fn values(&self) -> [u64; 4] {
        [self.sent, self.opened, self.clicked, self.submitted]
    }

    /// `(label, value)` pairs in funnel order.
    pub fn stages(&self) -> impl Iterator<Item = (&'static str, u64)> {
        Self::LABELS.into_iter().zip(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_column_lookup_is_explicit() -> Result<(), TableError> {
        let table = Table::from_rows(
            vec!["Email".into(), "Clicked Date".into()],
            vec![
                vec![text("a@example.com"), Cell::Missing],
                vec![text("b@example.com"), text("2024-01-02")],
            ],
        )?;

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(
            table.column("Clicked Date"),
            Some(&[Cell::Missing, text("2024-01-02")][..])
        );
        assert!(table.column("Submitted Date").is_none());
        Ok(())
    }

    #[test]
    fn test_rows_keep_column_order() -> Result<(), TableError> {
        let table = Table::from_rows(
            vec!["z".into(), "a".into(), "m".into()],
            vec![vec![text("1"), text("2"), text("3")]],
        )?;
        let row: Vec<&str> = table.row(0).map(Cell::as_str).collect();
        assert_eq!(row, vec!["1", "2", "3"]);
        assert_eq!(table.headers(), &["z", "a", "m"]);
        Ok(())
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let result = Table::from_rows(vec!["Email".into(), "Email".into()], vec![]);
        assert_eq!(result, Err(TableError::DuplicateColumn("Email".into())));
    }

    #[test]
    fn test_no_columns_rejected() {
        assert_eq!(Table::from_rows(vec![], vec![]), Err(TableError::NoColumns));
    }

    #[test]
    fn test_row_length_mismatch_rejected() {
        let short = Table::from_rows(
            vec!["a".into(), "b".into()],
            vec![vec![Cell::Missing, Cell::Missing], vec![Cell::Missing]],
        );
        assert_eq!(
            short,
            Err(TableError::RowLength {
                row: 2,
                expected: 2,
                found: 1
            })
        );

        let long = Table::from_rows(
            vec!["a".into()],
            vec![vec![text("1"), text("2")]],
        );
        assert!(matches!(long, Err(TableError::RowLength { row: 1, found: 2, .. })));
    }

    #[test]
    fn test_empty_field_is_missing() {
        assert!(Cell::from_field("").is_missing());
        assert_eq!(Cell::from_field(" "), text(" "));
        assert_eq!(Cell::Missing.as_str(), "");
    }

    #[test]
    fn test_stages_in_funnel_order() {
        let metrics = FunnelMetrics {
            sent: 10,
            opened: 7,
            clicked: 3,
            submitted: 1,
        };
        let stages: Vec<_> = metrics.stages().collect();
        assert_eq!(
            stages,
            vec![("Sent", 10), ("Opened", 7), ("Clicked", 3), ("Submitted", 1)]
        );
    }
}
