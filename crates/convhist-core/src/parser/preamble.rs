//! Tecplot preamble metadata.
//!
//! Only the `TITLE` and `VARIABLES` records are read. Column names taken from
//! `VARIABLES` are reported as written; nothing here guesses what a column means.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HistoryPreamble {
    pub title: Option<String>,
    pub variables: Vec<String>,
    pub zone_line: Option<String>,
}

impl HistoryPreamble {
    pub fn from_lines(lines: &[&str], zone_line: Option<&str>, delimiter: char) -> Self {
        let mut preamble = Self {
            zone_line: zone_line.map(|line| line.trim().to_string()),
            ..Self::default()
        };

        for line in lines {
            let Some((keyword, value)) = split_record(line) else {
                continue;
            };

            if keyword.eq_ignore_ascii_case("TITLE") && preamble.title.is_none() {
                preamble.title = Some(unquote(value).to_string());
            } else if keyword.eq_ignore_ascii_case("VARIABLES") && preamble.variables.is_empty() {
                preamble.variables = value
                    .split(delimiter)
                    .map(unquote)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }

        preamble
    }

    pub fn has_variables(&self) -> bool {
        !self.variables.is_empty()
    }
}

fn split_record(line: &str) -> Option<(&str, &str)> {
    let (keyword, value) = line.trim().split_once('=')?;
    let keyword = keyword.trim();
    if keyword.is_empty() || !keyword.chars().all(|character| character.is_ascii_alphabetic()) {
        return None;
    }
    Some((keyword, value.trim()))
}

fn unquote(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}
