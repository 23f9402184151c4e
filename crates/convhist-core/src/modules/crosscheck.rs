//! Compares final-iteration values of named columns against the values stated in a
//! forces report. Column names are supplied by the caller; nothing is matched by
//! value.

use super::columns::ColumnSchema;
use super::forces::{TOTAL_CD_LABEL, TOTAL_CL_LABEL, find_labeled_value};
use crate::domain::{HistoryError, HistoryResult, HistoryTable};
use crate::numerics::{NumericTolerance, compare_with_tolerance};
use serde::Serialize;
use std::fmt::Write as _;
use std::str::FromStr;

/// A report label paired with the history column expected to hold the same quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossCheckTarget {
    pub label: String,
    pub column: String,
}

impl CrossCheckTarget {
    pub fn new(label: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            column: column.into(),
        }
    }

    /// `Total CL:` against `CLift(Total)` and `Total CD:` against `CDrag(Total)`.
    pub fn su2_defaults() -> Vec<Self> {
        vec![
            Self::new(TOTAL_CL_LABEL, "CLift(Total)"),
            Self::new(TOTAL_CD_LABEL, "CDrag(Total)"),
        ]
    }
}

impl FromStr for CrossCheckTarget {
    type Err = String;

    /// Parses `LABEL=COLUMN`, splitting on the last `=`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (label, column) = value
            .rsplit_once('=')
            .ok_or_else(|| format!("expected LABEL=COLUMN, got '{}'", value))?;
        let label = label.trim();
        let column = column.trim();
        if label.is_empty() || column.is_empty() {
            return Err(format!("expected LABEL=COLUMN, got '{}'", value));
        }
        Ok(Self::new(label, column))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossCheckStatus {
    Pass,
    Fail,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCheckEntry {
    pub label: String,
    pub column: String,
    pub column_index: usize,
    pub history_value: f64,
    pub reference_value: Option<f64>,
    pub abs_diff: Option<f64>,
    pub rel_diff: Option<f64>,
    pub status: CrossCheckStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossCheckReport {
    pub final_row_line: usize,
    pub tolerance: NumericTolerance,
    pub entries: Vec<CrossCheckEntry>,
    pub passed: bool,
}

impl CrossCheckReport {
    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.status == CrossCheckStatus::Fail)
            .count()
    }

    pub fn render_human(&self) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            let reference = entry
                .reference_value
                .map_or_else(|| "missing".to_string(), |value| format!("{:.6}", value));
            let status = match entry.status {
                CrossCheckStatus::Pass => "PASS",
                CrossCheckStatus::Fail => "FAIL",
                CrossCheckStatus::Missing => "MISSING",
            };
            let _ = writeln!(
                output,
                "{:<8} {} vs column {} [{}]: history {:.6}, report {}",
                status,
                entry.label,
                entry.column_index,
                entry.column,
                entry.history_value,
                reference
            );
        }
        let _ = writeln!(
            output,
            "Cross-check status: {}",
            if self.passed { "PASS" } else { "FAIL" }
        );
        output
    }
}

pub fn crosscheck(
    table: &HistoryTable,
    schema: &ColumnSchema,
    forces_source: &str,
    targets: &[CrossCheckTarget],
    tolerance: NumericTolerance,
) -> HistoryResult<CrossCheckReport> {
    table.require_rows("the history table")?;
    if targets.is_empty() {
        return Err(HistoryError::input_validation(
            "INPUT.CROSSCHECK_TARGETS",
            "at least one cross-check target is required",
        ));
    }

    let last_index = table.row_count() - 1;
    let mut entries = Vec::with_capacity(targets.len());
    for target in targets {
        let column_index = schema.require_index(&target.column)?;
        let history_value = table.value(last_index, column_index).ok_or_else(|| {
            HistoryError::input_validation(
                "INPUT.HISTORY_COLUMN",
                format!(
                    "column '{}' maps to index {} but the table has {} columns",
                    target.column,
                    column_index,
                    table.column_count()
                ),
            )
        })?;

        let reference_value = find_labeled_value(forces_source, &target.label);
        let (abs_diff, rel_diff, status) = match reference_value {
            Some(reference) => {
                let comparison = compare_with_tolerance(reference, history_value, tolerance);
                let status = if comparison.passes {
                    CrossCheckStatus::Pass
                } else {
                    CrossCheckStatus::Fail
                };
                (Some(comparison.abs_diff), Some(comparison.rel_diff), status)
            }
            None => (None, None, CrossCheckStatus::Missing),
        };

        entries.push(CrossCheckEntry {
            label: target.label.clone(),
            column: target.column.clone(),
            column_index,
            history_value,
            reference_value,
            abs_diff,
            rel_diff,
            status,
        });
    }

    let passed = entries
        .iter()
        .all(|entry| entry.status != CrossCheckStatus::Fail);

    Ok(CrossCheckReport {
        final_row_line: table.source_line(last_index).unwrap_or_default(),
        tolerance,
        entries,
        passed,
    })
}
