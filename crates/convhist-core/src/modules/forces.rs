//! Lookups into the solver's `forces_breakdown.dat` summary report.

use serde::Serialize;

pub const TOTAL_CL_LABEL: &str = "Total CL:";
pub const TOTAL_CD_LABEL: &str = "Total CD:";
pub const TOTAL_CMZ_LABEL: &str = "Total CMz:";
pub const TOTAL_CL_CD_LABEL: &str = "Total CL/CD:";

/// Value following `label` on the first line that contains it.
///
/// Only the first matching line is consulted, and only the `|`-separated field that
/// holds the label; `None` if that field carries no number after the label.
pub fn find_labeled_value(source: &str, label: &str) -> Option<f64> {
    let line = source.lines().find(|line| line.contains(label))?;
    let (_, remainder) = line.split_once(label)?;
    let field = remainder.split('|').next().unwrap_or_default();
    field
        .split(|character: char| character.is_whitespace() || character == ',')
        .filter(|token| !token.is_empty())
        .find_map(|token| token.parse::<f64>().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ForcesBreakdown {
    pub cl: Option<f64>,
    pub cd: Option<f64>,
    pub cmz: Option<f64>,
    pub cl_cd: Option<f64>,
}

impl ForcesBreakdown {
    pub fn parse(source: &str) -> Self {
        Self {
            cl: find_labeled_value(source, TOTAL_CL_LABEL),
            cd: find_labeled_value(source, TOTAL_CD_LABEL),
            cmz: find_labeled_value(source, TOTAL_CMZ_LABEL),
            cl_cd: find_labeled_value(source, TOTAL_CL_CD_LABEL),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cl.is_none() && self.cd.is_none() && self.cmz.is_none() && self.cl_cd.is_none()
    }
}
