use super::CliError;
use anyhow::Context;
use convhist_core::config::{HistoryConfig, load_history_config};
use convhist_core::domain::HistoryError;
use convhist_core::modules::ColumnSchema;
use convhist_core::parser::{HistoryTableParser, ParsedHistory, ParserConfig, WidthPolicy};
use serde::Serialize;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Options shared by every subcommand that reads a history file.
#[derive(clap::Args, Debug)]
pub(super) struct HistoryInputArgs {
    /// Tecplot-style history file (history.dat)
    #[arg(value_name = "HISTORY")]
    pub(super) history: PathBuf,

    /// JSON configuration file
    #[arg(long)]
    pub(super) config: Option<PathBuf>,

    /// Minimum field count of a retained row
    #[arg(long)]
    pub(super) min_width: Option<usize>,

    /// Token that ends the preamble
    #[arg(long)]
    pub(super) zone_marker: Option<String>,

    /// Rule for rows of differing width: majority, first or strict
    #[arg(long)]
    pub(super) width_policy: Option<WidthPolicy>,

    /// Comma-separated column names, overriding the file's VARIABLES line
    #[arg(long, conflicts_with = "su2_columns")]
    pub(super) columns: Option<String>,

    /// Use the default SU2 history column layout
    #[arg(long)]
    pub(super) su2_columns: bool,
}

#[derive(Debug)]
pub(super) struct LoadedHistory {
    pub(super) path: PathBuf,
    pub(super) parsed: ParsedHistory,
    pub(super) schema: ColumnSchema,
    pub(super) config: HistoryConfig,
}

pub(super) fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

pub(super) fn resolve_config(args: &HistoryInputArgs) -> Result<HistoryConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let config = load_history_config(path).map_err(HistoryError::from)?;
            debug!(path = %path.display(), "loaded configuration file");
            config
        }
        None => HistoryConfig::default(),
    };

    apply_parser_overrides(&mut config.parser, args);
    Ok(config)
}

fn apply_parser_overrides(parser: &mut ParserConfig, args: &HistoryInputArgs) {
    if let Some(min_width) = args.min_width {
        parser.min_width = min_width;
    }
    if let Some(zone_marker) = &args.zone_marker {
        parser.zone_marker = zone_marker.clone();
    }
    if let Some(width_policy) = args.width_policy {
        parser.width_policy = width_policy;
    }
}

pub(super) fn read_history_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| {
        CliError::Compute(HistoryError::io_system(
            "IO.HISTORY_READ",
            format!("failed to read history file '{}': {}", path.display(), source),
        ))
    })
}

pub(super) fn load_history(args: &HistoryInputArgs) -> Result<LoadedHistory, CliError> {
    let config = resolve_config(args)?;
    let parser = HistoryTableParser::new(config.parser.clone())?;
    let source = read_history_source(&args.history)?;

    let parsed = parser.parse(&source)?;
    log_parse_outcome(&args.history, &parsed);
    let parsed = parsed.require_rows(&format!("'{}'", args.history.display()))?;

    let schema = resolve_schema(args, &config, &parsed);
    if schema.len() != parsed.table.column_count() {
        warn!(
            schema_columns = schema.len(),
            table_columns = parsed.table.column_count(),
            "column names do not match table width; missing names become col<N>"
        );
    }
    let schema = schema.fit(parsed.table.column_count());

    Ok(LoadedHistory {
        path: args.history.clone(),
        parsed,
        schema,
        config,
    })
}

fn resolve_schema(
    args: &HistoryInputArgs,
    config: &HistoryConfig,
    parsed: &ParsedHistory,
) -> ColumnSchema {
    if let Some(list) = &args.columns {
        return ColumnSchema::from_list(list);
    }
    if args.su2_columns {
        return ColumnSchema::su2_default();
    }
    if let Some(schema) = config.schema() {
        return schema;
    }
    ColumnSchema::from_preamble(&parsed.preamble)
        .unwrap_or_else(|| ColumnSchema::generic(parsed.table.column_count()))
}

fn log_parse_outcome(path: &Path, parsed: &ParsedHistory) {
    let stats = &parsed.stats;
    match stats.zone_marker_line {
        Some(line) => debug!(path = %path.display(), line, "zone marker found"),
        None => warn!(
            path = %path.display(),
            skipped = stats.preamble_lines,
            "zone marker not found; treating leading lines as header"
        ),
    }
    debug!(
        blank = stats.blank_lines,
        comments = stats.comment_lines,
        non_numeric = stats.non_numeric_rows,
        narrow = stats.narrow_rows,
        width_mismatch = stats.width_mismatch_rows,
        "line filtering"
    );
    if stats.dropped_rows() > 0 {
        info!(dropped = stats.dropped_rows(), "discarded malformed rows");
    }
    info!(
        path = %path.display(),
        rows = parsed.table.row_count(),
        columns = parsed.table.column_count(),
        "parsed history"
    );
}

pub(super) fn write_json_report<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create report directory '{}'", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    fs::write(path, format!("{content}\n"))
        .with_context(|| format!("failed to write report '{}'", path.display()))?;
    Ok(())
}

pub(super) fn format_value(value: f64) -> String {
    format!("{:>14.6e}", value)
}
