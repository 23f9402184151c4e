use super::columns::ColumnSchema;
use crate::domain::{HistoryError, HistoryResult, HistoryTable};
use crate::numerics::{ColumnStats, lift_drag_ratio, reduction_ratio};
use serde::Serialize;
use std::fmt::Write as _;

/// Lift and drag columns named by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftDragColumns {
    pub lift: String,
    pub drag: String,
}

impl LiftDragColumns {
    pub fn new(lift: impl Into<String>, drag: impl Into<String>) -> Self {
        Self {
            lift: lift.into(),
            drag: drag.into(),
        }
    }
}

/// Optional parts of a [`ConvergenceSummary`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub residual: Option<String>,
    pub lift_drag: Option<LiftDragColumns>,
    pub sample_every: Option<usize>,
}

impl SummaryRequest {
    pub fn with_residual(mut self, residual: impl Into<String>) -> Self {
        self.residual = Some(residual.into());
        self
    }

    pub fn with_lift_drag(mut self, columns: LiftDragColumns) -> Self {
        self.lift_drag = Some(columns);
        self
    }

    pub fn with_sample_every(mut self, every: usize) -> Self {
        self.sample_every = Some(every);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedColumnStats {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub stats: ColumnStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResidualReduction {
    pub column: String,
    pub initial: f64,
    #[serde(rename = "final")]
    pub last: f64,
    pub reduction: Option<f64>,
}

/// Final-row lift over drag computed from two table columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiftDragRatio {
    pub lift_column: String,
    pub drag_column: String,
    pub lift: f64,
    pub drag: f64,
    pub ratio: Option<f64>,
}

/// One row of the sampled iteration table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationSample {
    pub row: usize,
    pub source_line: usize,
    pub iteration: f64,
    pub lift: Option<f64>,
    pub drag: Option<f64>,
    pub ratio: Option<f64>,
    pub residual: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvergenceSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub final_iteration: f64,
    pub columns: Vec<NamedColumnStats>,
    pub residual: Option<ResidualReduction>,
    pub lift_drag: Option<LiftDragRatio>,
    pub samples: Vec<IterationSample>,
}

impl ConvergenceSummary {
    /// Column 0 is read as the iteration counter. Residual, lift and drag columns are
    /// only looked up when `request` names them.
    pub fn build(
        table: &HistoryTable,
        schema: &ColumnSchema,
        request: &SummaryRequest,
    ) -> HistoryResult<Self> {
        table.require_rows("the history table")?;
        let schema = schema.clone().fit(table.column_count());

        let mut columns = Vec::with_capacity(table.column_count());
        for index in 0..table.column_count() {
            let values = table.column(index).unwrap_or_default();
            let Some(stats) = ColumnStats::from_values(&values) else {
                continue;
            };
            columns.push(NamedColumnStats {
                index,
                name: schema.name(index).unwrap_or_default().to_string(),
                stats,
            });
        }

        let residual_index = request
            .residual
            .as_deref()
            .map(|name| schema.require_index(name))
            .transpose()?;
        let lift_drag_indices = request
            .lift_drag
            .as_ref()
            .map(|pair| -> HistoryResult<(usize, usize)> {
                Ok((schema.require_index(&pair.lift)?, schema.require_index(&pair.drag)?))
            })
            .transpose()?;

        let residual = residual_index.map(|index| {
            let stats = columns[index].stats;
            ResidualReduction {
                column: columns[index].name.clone(),
                initial: stats.first,
                last: stats.last,
                reduction: reduction_ratio(stats.first, stats.last),
            }
        });

        let last_row = table.row_count() - 1;
        let lift_drag = lift_drag_indices.map(|(lift_index, drag_index)| {
            let lift = columns[lift_index].stats.last;
            let drag = columns[drag_index].stats.last;
            LiftDragRatio {
                lift_column: columns[lift_index].name.clone(),
                drag_column: columns[drag_index].name.clone(),
                lift,
                drag,
                ratio: lift_drag_ratio(lift, drag),
            }
        });

        let samples = match request.sample_every {
            Some(0) => {
                return Err(HistoryError::input_validation(
                    "INPUT.SUMMARY_SAMPLE",
                    "sample interval must be at least 1",
                ));
            }
            Some(every) => {
                let mut rows = (0..table.row_count()).step_by(every).collect::<Vec<_>>();
                if rows.last() != Some(&last_row) {
                    rows.push(last_row);
                }
                rows.into_iter()
                    .map(|row| sample_row(table, row, residual_index, lift_drag_indices))
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(Self {
            row_count: table.row_count(),
            column_count: table.column_count(),
            final_iteration: columns[0].stats.last,
            columns,
            residual,
            lift_drag,
            samples,
        })
    }

    pub fn render_human(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "Rows: {}  Columns: {}  Final iteration: {}",
            self.row_count, self.column_count, self.final_iteration
        );
        let _ = writeln!(
            output,
            "{:>4} {:<28} {:>14} {:>14} {:>14} {:>14}",
            "col", "name", "first", "last", "min", "max"
        );
        for column in &self.columns {
            let _ = writeln!(
                output,
                "{:>4} {:<28} {:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e}",
                column.index,
                column.name,
                column.stats.first,
                column.stats.last,
                column.stats.min,
                column.stats.max
            );
        }
        if let Some(residual) = &self.residual {
            let reduction = residual
                .reduction
                .map_or_else(|| "n/a".to_string(), |value| format!("{:.2e}x", value));
            let _ = writeln!(
                output,
                "Residual {}: initial {:.2e}, final {:.2e}, reduction {}",
                residual.column, residual.initial, residual.last, reduction
            );
        }
        if let Some(lift_drag) = &self.lift_drag {
            let _ = writeln!(
                output,
                "Lift/drag {}/{}: {:.6} / {:.6} = {}",
                lift_drag.lift_column,
                lift_drag.drag_column,
                lift_drag.lift,
                lift_drag.drag,
                format_optional(lift_drag.ratio, 2)
            );
        }
        if !self.samples.is_empty() {
            let _ = writeln!(output, "Sampled iterations:");
            let _ = writeln!(
                output,
                "{:>10} {:>12} {:>12} {:>12} {:>15}",
                "Iteration", "Lift", "Drag", "L/D", "Residual"
            );
            for sample in &self.samples {
                let residual = sample
                    .residual
                    .map_or_else(|| "-".to_string(), |value| format!("{:.2e}", value));
                let _ = writeln!(
                    output,
                    "{:>10} {:>12} {:>12} {:>12} {:>15}",
                    sample.iteration,
                    format_optional(sample.lift, 6),
                    format_optional(sample.drag, 6),
                    format_optional(sample.ratio, 2),
                    residual
                );
            }
        }
        output
    }
}

fn sample_row(
    table: &HistoryTable,
    row: usize,
    residual_index: Option<usize>,
    lift_drag_indices: Option<(usize, usize)>,
) -> IterationSample {
    let lift = lift_drag_indices.and_then(|(lift_index, _)| table.value(row, lift_index));
    let drag = lift_drag_indices.and_then(|(_, drag_index)| table.value(row, drag_index));
    IterationSample {
        row,
        source_line: table.source_line(row).unwrap_or_default(),
        iteration: table.value(row, 0).unwrap_or(f64::NAN),
        lift,
        drag,
        ratio: lift.zip(drag).and_then(|(lift, drag)| lift_drag_ratio(lift, drag)),
        residual: residual_index.and_then(|index| table.value(row, index)),
    }
}

fn format_optional(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{:.*}", precision, value))
}
