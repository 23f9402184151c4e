//! JSON configuration file.
//!
//! Every key is optional:
//!
//! ```json
//! {
//!   "parser": { "min_width": 20, "width_policy": "strict" },
//!   "tolerance": { "absTol": 1e-6, "relTol": 1e-4, "relativeFloor": 1e-12 },
//!   "columns": ["Iteration", "Time(s)", "Res_Flow[0]"],
//!   "residualColumn": "Res_Flow[0]",
//!   "liftColumn": "CLift(Total)",
//!   "dragColumn": "CDrag(Total)",
//!   "targets": ["Total CL:=CLift(Total)"]
//! }
//! ```

use crate::domain::HistoryError;
use crate::modules::{ColumnSchema, CrossCheckTarget, LiftDragColumns};
use crate::numerics::NumericTolerance;
use crate::parser::ParserConfig;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub parser: ParserConfig,
    pub tolerance: NumericTolerance,
    pub columns: Option<Vec<String>>,
    pub residual_column: Option<String>,
    pub lift_column: Option<String>,
    pub drag_column: Option<String>,
    pub targets: Vec<String>,
}

impl HistoryConfig {
    pub fn schema(&self) -> Option<ColumnSchema> {
        self.columns
            .as_ref()
            .map(|names| ColumnSchema::new(names.iter().cloned()))
    }

    /// Both names are needed; either one alone yields `None`.
    pub fn lift_drag(&self) -> Option<LiftDragColumns> {
        let lift = self.lift_column.as_deref()?;
        let drag = self.drag_column.as_deref()?;
        Some(LiftDragColumns::new(lift, drag))
    }

    pub fn crosscheck_targets(&self) -> Result<Vec<CrossCheckTarget>, HistoryConfigError> {
        self.targets
            .iter()
            .map(|target| {
                target
                    .parse::<CrossCheckTarget>()
                    .map_err(|message| HistoryConfigError::Target { message })
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryConfigError {
    #[error("failed to read configuration '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid cross-check target: {message}")]
    Target { message: String },
}

impl From<HistoryConfigError> for HistoryError {
    fn from(error: HistoryConfigError) -> Self {
        match error {
            HistoryConfigError::Read { .. } => {
                HistoryError::io_system("IO.CONFIG_READ", error.to_string())
            }
            HistoryConfigError::Parse { .. } | HistoryConfigError::Target { .. } => {
                HistoryError::input_validation("INPUT.CONFIG", error.to_string())
            }
        }
    }
}

pub fn load_history_config(
    config_path: impl AsRef<Path>,
) -> Result<HistoryConfig, HistoryConfigError> {
    let config_path = config_path.as_ref();
    let source = fs::read_to_string(config_path).map_err(|source| HistoryConfigError::Read {
        path: config_path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| HistoryConfigError::Parse {
        path: config_path.to_path_buf(),
        source,
    })
}
