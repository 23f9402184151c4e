use crate::domain::{HistoryError, HistoryResult};
use crate::parser::HistoryPreamble;

/// Column layout of SU2's Tecplot history output for a compressible Euler run.
pub const SU2_DEFAULT_COLUMNS: [&str; 21] = [
    "Iteration",
    "Time(s)",
    "Res_Flow[0]",
    "Res_Flow[1]",
    "Res_Flow[2]",
    "Res_Flow[3]",
    "Res_Flow[4]",
    "Linear_Solver_Iterations",
    "CFL_Number",
    "CLift(Total)",
    "CDrag(Total)",
    "CMz(Total)",
    "CFx(Total)",
    "CFy(Total)",
    "CLift(Pressure)",
    "CDrag(Pressure)",
    "CMz(Pressure)",
    "CFx(Pressure)",
    "CFy(Pressure)",
    "CL/CD",
    "Time(min)",
];

/// Caller-supplied names for table columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSchema {
    names: Vec<String>,
}

impl ColumnSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn su2_default() -> Self {
        Self::new(SU2_DEFAULT_COLUMNS)
    }

    pub fn from_preamble(preamble: &HistoryPreamble) -> Option<Self> {
        preamble
            .has_variables()
            .then(|| Self::new(preamble.variables.iter().cloned()))
    }

    /// Splits a comma-separated list such as `Iteration,Res,CL`.
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn generic(width: usize) -> Self {
        Self::new((0..width).map(|index| format!("col{}", index)))
    }

    /// Pads with `col<N>` names or truncates so the schema has exactly `width` names.
    pub fn fit(mut self, width: usize) -> Self {
        self.names.truncate(width);
        for index in self.names.len()..width {
            self.names.push(format!("col{}", index));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Exact match first, then ASCII case-insensitive.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .or_else(|| {
                self.names
                    .iter()
                    .position(|candidate| candidate.eq_ignore_ascii_case(name))
            })
    }

    pub fn require_index(&self, name: &str) -> HistoryResult<usize> {
        self.index_of(name).ok_or_else(|| {
            HistoryError::input_validation(
                "INPUT.HISTORY_COLUMN",
                format!(
                    "column '{}' is not in the schema ({} columns: {})",
                    name,
                    self.names.len(),
                    self.names.join(", ")
                ),
            )
        })
    }
}
