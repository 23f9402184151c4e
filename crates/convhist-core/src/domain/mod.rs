pub mod errors;

pub use errors::{HistoryError, HistoryErrorCategory, HistoryResult, ParserResult};

/// One numeric row of a history file, tagged with its 1-based source line.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub source_line: usize,
    pub values: Vec<f64>,
}

impl DataRow {
    pub fn new(source_line: usize, values: Vec<f64>) -> Self {
        Self {
            source_line,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }
}

/// Rectangular iteration table, row-major.
///
/// Every row has exactly `column_count` values. An empty table has shape `(0, 0)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryTable {
    column_count: usize,
    values: Vec<f64>,
    source_lines: Vec<usize>,
}

impl HistoryTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<DataRow>) -> HistoryResult<Self> {
        let Some(column_count) = rows.first().map(DataRow::width) else {
            return Ok(Self::empty());
        };

        let mut values = Vec::with_capacity(rows.len() * column_count);
        let mut source_lines = Vec::with_capacity(rows.len());
        for row in rows {
            if row.width() != column_count {
                return Err(HistoryError::internal(
                    "SYS.HISTORY_TABLE_SHAPE",
                    format!(
                        "row from line {} has {} columns, table expects {}",
                        row.source_line,
                        row.width(),
                        column_count
                    ),
                ));
            }
            values.extend(row.values);
            source_lines.push(row.source_line);
        }

        Ok(Self {
            column_count,
            values,
            source_lines,
        })
    }

    pub fn row_count(&self) -> usize {
        self.source_lines.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count)
    }

    pub fn is_empty(&self) -> bool {
        self.source_lines.is_empty()
    }

    /// Returns `self` when at least one row is present.
    pub fn require_rows(&self, context: &str) -> HistoryResult<&Self> {
        if self.is_empty() {
            return Err(HistoryError::input_validation(
                "INPUT.HISTORY_EMPTY",
                format!("no numeric rows survived filtering in {}", context),
            ));
        }
        Ok(self)
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.row_count() {
            return None;
        }
        let start = index * self.column_count;
        Some(&self.values[start..start + self.column_count])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.column_count.max(1))
    }

    pub fn first_row(&self) -> Option<&[f64]> {
        self.row(0)
    }

    pub fn last_row(&self) -> Option<&[f64]> {
        self.row_count().checked_sub(1).and_then(|index| self.row(index))
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if column >= self.column_count {
            return None;
        }
        self.row(row).map(|values| values[column])
    }

    pub fn column(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.column_count {
            return None;
        }
        Some(self.rows().map(|row| row[index]).collect())
    }

    pub fn source_line(&self, row: usize) -> Option<usize> {
        self.source_lines.get(row).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_nested(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }
}
