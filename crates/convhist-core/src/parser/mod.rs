//! Iteration-history parser.
//!
//! Turns a Tecplot-style history log into a [`HistoryTable`]: the preamble up to
//! and including the first zone-marker line is discarded, every following line is
//! cleaned and split on the delimiter, and only fully numeric rows of an agreed
//! width are kept. Malformed rows are counted in [`ParseStats`] and dropped.

pub mod preamble;

pub use preamble::HistoryPreamble;

use crate::domain::{DataRow, HistoryError, HistoryTable, ParserResult};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DEFAULT_ZONE_MARKER: &str = "ZONE T=";
pub const DEFAULT_MIN_WIDTH: usize = 10;

/// Rule applied when surviving rows disagree on their field count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthPolicy {
    /// Keep the most common width; ties go to the width seen first.
    #[default]
    Majority,
    /// Keep the width of the first surviving row.
    First,
    /// Fail with `INPUT.HISTORY_WIDTH_MISMATCH`.
    Strict,
}

impl WidthPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Majority => "majority",
            Self::First => "first",
            Self::Strict => "strict",
        }
    }
}

impl Display for WidthPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidthPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "majority" => Ok(Self::Majority),
            "first" => Ok(Self::First),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unknown width policy '{}'; expected majority, first or strict",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParserConfig {
    pub zone_marker: String,
    pub delimiter: char,
    pub comment_prefix: char,
    pub min_width: usize,
    pub fallback_skip: usize,
    pub width_policy: WidthPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            zone_marker: DEFAULT_ZONE_MARKER.to_string(),
            delimiter: ',',
            comment_prefix: '#',
            min_width: DEFAULT_MIN_WIDTH,
            fallback_skip: 1,
            width_policy: WidthPolicy::default(),
        }
    }
}

impl ParserConfig {
    pub fn with_min_width(mut self, min_width: usize) -> Self {
        self.min_width = min_width;
        self
    }

    pub fn with_width_policy(mut self, width_policy: WidthPolicy) -> Self {
        self.width_policy = width_policy;
        self
    }

    pub fn validate(&self) -> ParserResult<()> {
        if self.zone_marker.trim().is_empty() {
            return Err(HistoryError::input_validation(
                "INPUT.PARSER_CONFIG",
                "zone marker must not be empty",
            ));
        }
        if self.delimiter == self.comment_prefix {
            return Err(HistoryError::input_validation(
                "INPUT.PARSER_CONFIG",
                format!(
                    "delimiter and comment prefix must differ (both are '{}')",
                    self.delimiter
                ),
            ));
        }
        if self.delimiter.is_whitespace() && self.delimiter != '\t' {
            return Err(HistoryError::input_validation(
                "INPUT.PARSER_CONFIG",
                "whitespace delimiters other than tab are not supported",
            ));
        }
        Ok(())
    }
}

/// Counters describing what a parse kept and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ParseStats {
    /// 1-based line of the zone marker, `None` when the fallback skip was used.
    pub zone_marker_line: Option<usize>,
    pub preamble_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
    pub non_numeric_rows: usize,
    pub narrow_rows: usize,
    pub width_mismatch_rows: usize,
    pub retained_rows: usize,
}

impl ParseStats {
    pub fn dropped_rows(&self) -> usize {
        self.non_numeric_rows + self.narrow_rows + self.width_mismatch_rows
    }

    pub fn used_fallback(&self) -> bool {
        self.zone_marker_line.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHistory {
    pub table: HistoryTable,
    pub preamble: HistoryPreamble,
    pub stats: ParseStats,
}

impl ParsedHistory {
    pub fn require_rows(self, context: &str) -> ParserResult<Self> {
        self.table.require_rows(context)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryTableParser {
    config: ParserConfig,
}

impl HistoryTableParser {
    pub fn new(config: ParserConfig) -> ParserResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse(&self, source: &str) -> ParserResult<ParsedHistory> {
        let config = &self.config;
        let lines = source.lines().collect::<Vec<_>>();
        let mut stats = ParseStats::default();

        let marker_index = lines
            .iter()
            .position(|line| line.contains(config.zone_marker.as_str()));
        let (preamble, data_start) = match marker_index {
            Some(index) => {
                stats.zone_marker_line = Some(index + 1);
                let preamble = HistoryPreamble::from_lines(
                    &lines[..index],
                    Some(lines[index]),
                    config.delimiter,
                );
                (preamble, index + 1)
            }
            None => {
                let skip = config.fallback_skip.min(lines.len());
                (
                    HistoryPreamble::from_lines(&lines[..skip], None, config.delimiter),
                    skip,
                )
            }
        };
        stats.preamble_lines = data_start;

        let mut candidates = Vec::new();
        for (index, line) in lines.iter().enumerate().skip(data_start) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                stats.blank_lines += 1;
                continue;
            }
            if trimmed.starts_with(config.comment_prefix) {
                stats.comment_lines += 1;
                continue;
            }

            let Some(values) = parse_numeric_row(trimmed, config.delimiter) else {
                stats.non_numeric_rows += 1;
                continue;
            };
            if values.len() < config.min_width {
                stats.narrow_rows += 1;
                continue;
            }

            candidates.push(DataRow::new(index + 1, values));
        }

        let rows = match select_width(&candidates, config.width_policy)? {
            Some(width) => {
                let before = candidates.len();
                let kept = candidates
                    .into_iter()
                    .filter(|row| row.width() == width)
                    .collect::<Vec<_>>();
                stats.width_mismatch_rows = before - kept.len();
                kept
            }
            None => Vec::new(),
        };
        stats.retained_rows = rows.len();

        Ok(ParsedHistory {
            table: HistoryTable::from_rows(rows)?,
            preamble,
            stats,
        })
    }
}

pub fn parse_history(source: &str, config: &ParserConfig) -> ParserResult<ParsedHistory> {
    HistoryTableParser::new(config.clone())?.parse(source)
}

pub fn parse_history_table(source: &str, config: &ParserConfig) -> ParserResult<HistoryTable> {
    parse_history(source, config).map(|parsed| parsed.table)
}

/// Cleans one data line and converts every field, or returns `None` if any field
/// is not a number. `line` must already be trimmed.
pub fn parse_numeric_row(line: &str, delimiter: char) -> Option<Vec<f64>> {
    let line = line.strip_prefix(delimiter).unwrap_or(line);
    let line = line.strip_suffix(delimiter).unwrap_or(line);

    line.split(delimiter)
        .map(|field| field.trim().parse::<f64>().ok())
        .collect()
}

fn select_width(rows: &[DataRow], policy: WidthPolicy) -> ParserResult<Option<usize>> {
    let Some(first) = rows.first() else {
        return Ok(None);
    };

    match policy {
        WidthPolicy::First => Ok(Some(first.width())),
        WidthPolicy::Strict => {
            if let Some(offender) = rows.iter().find(|row| row.width() != first.width()) {
                return Err(HistoryError::input_validation(
                    "INPUT.HISTORY_WIDTH_MISMATCH",
                    format!(
                        "line {} has {} columns but line {} has {}",
                        offender.source_line,
                        offender.width(),
                        first.source_line,
                        first.width()
                    ),
                ));
            }
            Ok(Some(first.width()))
        }
        WidthPolicy::Majority => {
            let mut counts: Vec<(usize, usize)> = Vec::new();
            for row in rows {
                match counts.iter_mut().find(|(width, _)| *width == row.width()) {
                    Some((_, count)) => *count += 1,
                    None => counts.push((row.width(), 1)),
                }
            }

            let mut best = counts[0];
            for candidate in counts.iter().copied().skip(1) {
                if candidate.1 > best.1 {
                    best = candidate;
                }
            }
            Ok(Some(best.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        HistoryTableParser, ParserConfig, WidthPolicy, parse_history, parse_history_table,
        parse_numeric_row,
    };

    fn config(min_width: usize) -> ParserConfig {
        ParserConfig::default().with_min_width(min_width)
    }

    #[test]
    fn reference_example_parses_to_two_by_three() {
        let source = "TITLE=\"x\"\nZONE T=\"a\"\n1,2.5,3.0\n2,2.6,3.1\nbad,row\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");

        assert_eq!(parsed.table.shape(), (2, 3));
        assert_eq!(
            parsed.table.to_nested(),
            vec![vec![1.0, 2.5, 3.0], vec![2.0, 2.6, 3.1]]
        );
        assert_eq!(parsed.stats.zone_marker_line, Some(2));
        assert_eq!(parsed.stats.non_numeric_rows, 1);
        assert_eq!(parsed.preamble.title.as_deref(), Some("x"));
    }

    #[test]
    fn stray_delimiters_do_not_change_values() {
        assert_eq!(parse_numeric_row(",1.0,2.0,3.0", ','), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse_numeric_row("1.0,2.0,3.0,", ','), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(parse_numeric_row(",1.0, 2.0 ,3.0,", ','), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn only_one_stray_delimiter_is_stripped_per_side() {
        assert_eq!(parse_numeric_row(",,1.0,2.0", ','), None);
        assert_eq!(parse_numeric_row("1.0,2.0,,", ','), None);
    }

    #[test]
    fn non_numeric_field_discards_whole_row() {
        assert_eq!(parse_numeric_row("1.0,abc,3.0", ','), None);
        assert_eq!(parse_numeric_row("1.0,,3.0", ','), None);
        assert_eq!(parse_numeric_row("1.5e-3,-2,+4.0", ','), Some(vec![1.5e-3, -2.0, 4.0]));
    }

    #[test]
    fn blank_and_comment_lines_are_not_malformed() {
        let source = "ZONE T=\"a\"\n\n# note\n1,2,3\n   \n  # indented\n4,5,6\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");

        assert_eq!(parsed.table.shape(), (2, 3));
        assert_eq!(parsed.stats.blank_lines, 2);
        assert_eq!(parsed.stats.comment_lines, 2);
        assert_eq!(parsed.stats.dropped_rows(), 0);
    }

    #[test]
    fn rows_below_min_width_are_dropped() {
        let source = "ZONE T=\"a\"\n1,2,3,4\n1,2\n5,6,7,8\n";
        let parsed = parse_history(source, &config(4)).expect("parse should succeed");

        assert_eq!(parsed.table.shape(), (2, 4));
        assert_eq!(parsed.stats.narrow_rows, 1);
    }

    #[test]
    fn missing_marker_falls_back_to_single_header_line() {
        let source = "Iteration,Res,CL\n1,0.1,0.3\n2,0.01,0.31\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");

        assert!(parsed.stats.used_fallback());
        assert_eq!(parsed.stats.preamble_lines, 1);
        assert_eq!(parsed.table.shape(), (2, 3));
    }

    #[test]
    fn only_first_marker_sets_the_boundary() {
        let source = "ZONE T=\"a\"\n1,2,3\nZONE T=\"b\"\n4,5,6\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");

        assert_eq!(parsed.stats.zone_marker_line, Some(1));
        assert_eq!(parsed.table.shape(), (2, 3));
        assert_eq!(parsed.stats.non_numeric_rows, 1);
    }

    #[test]
    fn majority_width_wins_and_ties_keep_first_width() {
        let source = "ZONE T=\"a\"\n1,2,3\n1,2,3,4\n5,6,7,8\n9,9,9,9\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");
        assert_eq!(parsed.table.shape(), (3, 4));
        assert_eq!(parsed.stats.width_mismatch_rows, 1);

        let tied = "ZONE T=\"a\"\n1,2,3\n1,2,3,4\n5,6,7\n9,9,9,9\n";
        let parsed = parse_history(tied, &config(3)).expect("parse should succeed");
        assert_eq!(parsed.table.shape(), (2, 3));
    }

    #[test]
    fn first_policy_keeps_first_row_width() {
        let source = "ZONE T=\"a\"\n1,2,3\n1,2,3,4\n5,6,7,8\n";
        let table = parse_history_table(
            source,
            &config(3).with_width_policy(WidthPolicy::First),
        )
        .expect("parse should succeed");

        assert_eq!(table.shape(), (1, 3));
    }

    #[test]
    fn strict_policy_reports_mismatch() {
        let source = "ZONE T=\"a\"\n1,2,3\n1,2,3,4\n";
        let error = parse_history(source, &config(3).with_width_policy(WidthPolicy::Strict))
            .expect_err("strict policy should reject mixed widths");

        assert_eq!(error.code(), "INPUT.HISTORY_WIDTH_MISMATCH");
        assert!(error.message().contains("line 3 has 4 columns"));
    }

    #[test]
    fn nothing_surviving_yields_empty_table() {
        let source = "TITLE=\"x\"\nZONE T=\"a\"\nbad,row\n1,2\n";
        let parsed = parse_history(source, &config(3)).expect("parse should succeed");

        assert!(parsed.table.is_empty());
        assert_eq!(parsed.table.shape(), (0, 0));
        assert_eq!(
            parsed.require_rows("'history.dat'").expect_err("empty").code(),
            "INPUT.HISTORY_EMPTY"
        );
    }

    #[test]
    fn empty_source_yields_empty_table() {
        let parsed = parse_history("", &ParserConfig::default()).expect("parse should succeed");
        assert!(parsed.table.is_empty());
        assert_eq!(parsed.stats.preamble_lines, 0);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let mut config = ParserConfig::default();
        config.zone_marker = "  ".to_string();
        assert_eq!(
            HistoryTableParser::new(config).expect_err("empty marker").code(),
            "INPUT.PARSER_CONFIG"
        );

        let mut config = ParserConfig::default();
        config.comment_prefix = ',';
        assert!(HistoryTableParser::new(config).is_err());
    }

    #[test]
    fn width_policy_parses_from_text() {
        assert_eq!("Majority".parse::<WidthPolicy>(), Ok(WidthPolicy::Majority));
        assert_eq!("strict".parse::<WidthPolicy>(), Ok(WidthPolicy::Strict));
        assert!("widest".parse::<WidthPolicy>().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ParserConfig =
            serde_json::from_str(r#"{ "min_width": 20, "width_policy": "strict" }"#)
                .expect("config should deserialize");

        assert_eq!(config.min_width, 20);
        assert_eq!(config.width_policy, WidthPolicy::Strict);
        assert_eq!(config.zone_marker, "ZONE T=");
        assert_eq!(config.delimiter, ',');
    }
}
