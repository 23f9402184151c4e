use super::columns::ColumnSchema;
use crate::domain::{HistoryError, HistoryResult, HistoryTable};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

/// Renders `table` as delimited text.
///
/// The first line is `# ` followed by the column names; values use the shortest
/// representation that parses back to the same `f64`, so re-parsing the output
/// yields the same table.
pub fn write_delimited(
    table: &HistoryTable,
    schema: Option<&ColumnSchema>,
    delimiter: char,
) -> String {
    let schema = schema
        .cloned()
        .unwrap_or_default()
        .fit(table.column_count());
    let separator = delimiter.to_string();

    let mut output = String::new();
    output.push_str("# ");
    output.push_str(&schema.names().join(&separator));
    output.push('\n');

    for row in table.rows() {
        for (index, value) in row.iter().enumerate() {
            if index > 0 {
                output.push(delimiter);
            }
            let _ = write!(output, "{:?}", value);
        }
        output.push('\n');
    }

    output
}

pub fn write_delimited_file(
    path: &Path,
    table: &HistoryTable,
    schema: Option<&ColumnSchema>,
    delimiter: char,
) -> HistoryResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| {
            HistoryError::io_system(
                "IO.EXPORT_DIRECTORY",
                format!(
                    "failed to create export directory '{}': {}",
                    parent.display(),
                    source
                ),
            )
        })?;
    }

    let content = write_delimited(table, schema, delimiter);
    fs::write(path, normalize_text_artifact(&content)).map_err(|source| {
        HistoryError::io_system(
            "IO.EXPORT_WRITE",
            format!("failed to write export '{}': {}", path.display(), source),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::{normalize_text_artifact, write_delimited, write_delimited_file};
    use crate::domain::{DataRow, HistoryTable};
    use crate::modules::columns::ColumnSchema;
    use crate::parser::{ParserConfig, parse_history_table};
    use std::fs;
    use tempfile::TempDir;

    fn table() -> HistoryTable {
        HistoryTable::from_rows(vec![
            DataRow::new(1, vec![0.0, 1.0e-7, -0.326933]),
            DataRow::new(2, vec![1.0, 2.5e-9, 0.1 + 0.2]),
        ])
        .expect("rows share a width")
    }

    #[test]
    fn header_uses_schema_names_padded_to_width() {
        let schema = ColumnSchema::new(["Iteration", "Res"]);
        let output = write_delimited(&table(), Some(&schema), ',');

        assert_eq!(output.lines().next(), Some("# Iteration,Res,col2"));
        assert_eq!(output.lines().count(), 3);
    }

    #[test]
    fn export_reparses_to_identical_table() {
        let original = table();
        let output = write_delimited(&original, None, ',');
        let config = ParserConfig::default().with_min_width(original.column_count());

        let reparsed = parse_history_table(&output, &config).expect("export should parse");
        assert_eq!(reparsed.to_nested(), original.to_nested());

        let again = parse_history_table(&write_delimited(&reparsed, None, ','), &config)
            .expect("second export should parse");
        assert_eq!(again.to_nested(), original.to_nested());
    }

    #[test]
    fn empty_table_exports_header_only() {
        let output = write_delimited(&HistoryTable::empty(), None, ',');
        assert_eq!(output, "# \n");
    }

    #[test]
    fn file_export_normalizes_line_endings() {
        let temp = TempDir::new().expect("tempdir should be created");
        let path = temp.path().join("nested/history_clean.csv");

        write_delimited_file(&path, &table(), None, ',').expect("export should be written");
        let content = fs::read_to_string(&path).expect("export should be readable");

        assert!(content.starts_with("# col0,col1,col2\n"));
        assert!(content.ends_with('\n'));
        assert_eq!(normalize_text_artifact("a\r\nb\rc"), "a\nb\nc\n");
    }
}
