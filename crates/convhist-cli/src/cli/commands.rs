use super::CliError;
use super::helpers::*;
use convhist_core::domain::HistoryError;
use convhist_core::modules::{
    ConvergenceSummary, CrossCheckTarget, ForcesBreakdown, LiftDragColumns, SummaryRequest,
    crosscheck, write_delimited_file,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(clap::Args)]
pub(super) struct ParseArgs {
    #[command(flatten)]
    input: HistoryInputArgs,

    /// Write the clean table as delimited text with a header line
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    #[command(flatten)]
    input: HistoryInputArgs,

    /// Number of rows shown from each end of the table
    #[arg(long, default_value_t = 3)]
    rows: usize,

    /// Number of leading columns shown per row
    #[arg(long, default_value_t = 15)]
    max_columns: usize,
}

#[derive(clap::Args)]
pub(super) struct SummaryArgs {
    #[command(flatten)]
    input: HistoryInputArgs,

    /// Column whose first-to-last reduction is reported
    #[arg(long)]
    residual: Option<String>,

    /// Lift column for the final lift/drag ratio
    #[arg(long, requires = "drag")]
    lift: Option<String>,

    /// Drag column for the final lift/drag ratio
    #[arg(long, requires = "lift")]
    drag: Option<String>,

    /// Add a table of every Nth iteration plus the final one
    #[arg(long, value_name = "N")]
    sample_every: Option<usize>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct CheckArgs {
    #[command(flatten)]
    input: HistoryInputArgs,

    /// forces_breakdown.dat report with "Total CL:" style lines
    #[arg(long, default_value = "forces_breakdown.dat")]
    forces: PathBuf,

    /// LABEL=COLUMN pair; repeatable (default: SU2 total CL and CD)
    #[arg(long = "target", value_name = "LABEL=COLUMN")]
    targets: Vec<CrossCheckTarget>,

    /// Absolute tolerance
    #[arg(long)]
    abs_tol: Option<f64>,

    /// Relative tolerance
    #[arg(long)]
    rel_tol: Option<f64>,

    /// JSON report output path
    #[arg(long)]
    report: Option<PathBuf>,
}

pub(super) fn run_parse_command(args: ParseArgs) -> Result<i32, CliError> {
    let loaded = load_history(&args.input)?;
    let table = &loaded.parsed.table;
    let stats = &loaded.parsed.stats;

    match stats.zone_marker_line {
        Some(line) => println!("Data starts at line {}", line + 1),
        None => println!(
            "No zone marker found; data starts at line {}",
            stats.preamble_lines + 1
        ),
    }
    println!("Read {} iterations", table.row_count());
    println!("Data shape: ({}, {})", table.row_count(), table.column_count());
    if stats.dropped_rows() > 0 {
        println!(
            "Dropped {} rows (non-numeric {}, narrow {}, width mismatch {})",
            stats.dropped_rows(),
            stats.non_numeric_rows,
            stats.narrow_rows,
            stats.width_mismatch_rows
        );
    }

    println!("Column mapping:");
    for (index, name) in loaded.schema.names().iter().enumerate() {
        println!("  Column {}: {}", index, name);
    }

    if let Some(output) = &args.output {
        write_delimited_file(
            output,
            table,
            Some(&loaded.schema),
            loaded.config.parser.delimiter,
        )?;
        info!(path = %output.display(), "wrote clean table");
        println!("Clean data saved as '{}'", output.display());
    }

    Ok(0)
}

pub(super) fn run_inspect_command(args: InspectArgs) -> Result<i32, CliError> {
    let loaded = load_history(&args.input)?;
    let table = &loaded.parsed.table;
    let shown = args.rows.min(table.row_count());

    println!("=== First {} data rows ===", shown);
    for index in 0..shown {
        print_row(&loaded, index, args.max_columns);
    }

    let tail_start = table.row_count().saturating_sub(shown).max(shown);
    if tail_start < table.row_count() {
        println!("=== Last {} data rows ===", table.row_count() - tail_start);
        for index in tail_start..table.row_count() {
            print_row(&loaded, index, args.max_columns);
        }
    }

    Ok(0)
}

fn print_row(loaded: &LoadedHistory, index: usize, max_columns: usize) {
    let table = &loaded.parsed.table;
    let Some(row) = table.row(index) else {
        return;
    };
    println!(
        "Row {} (line {}): {} columns",
        index,
        table.source_line(index).unwrap_or_default(),
        row.len()
    );
    for (column, value) in row.iter().take(max_columns).enumerate() {
        println!(
            "  Col {:>2} {:<26}: {}",
            column,
            loaded.schema.name(column).unwrap_or_default(),
            format_value(*value)
        );
    }
    println!();
}

pub(super) fn run_summary_command(args: SummaryArgs) -> Result<i32, CliError> {
    let loaded = load_history(&args.input)?;
    let lift_drag = match (args.lift, args.drag) {
        (Some(lift), Some(drag)) => Some(LiftDragColumns::new(lift, drag)),
        _ => loaded.config.lift_drag(),
    };
    let request = SummaryRequest {
        residual: args.residual.or_else(|| loaded.config.residual_column.clone()),
        lift_drag,
        sample_every: args.sample_every,
    };
    let summary = ConvergenceSummary::build(&loaded.parsed.table, &loaded.schema, &request)?;

    if args.json {
        let content = serde_json::to_string_pretty(&summary).map_err(|source| {
            HistoryError::internal(
                "SYS.SUMMARY_SERIALIZE",
                format!("failed to serialize summary: {}", source),
            )
        })?;
        println!("{}", content);
    } else {
        if let Some(title) = &loaded.parsed.preamble.title {
            println!("{}", title);
        }
        print!("{}", summary.render_human());
    }

    Ok(0)
}

pub(super) fn run_check_command(args: CheckArgs) -> Result<i32, CliError> {
    let loaded = load_history(&args.input)?;

    let targets = if !args.targets.is_empty() {
        args.targets
    } else if !loaded.config.targets.is_empty() {
        loaded
            .config
            .crosscheck_targets()
            .map_err(HistoryError::from)?
    } else {
        CrossCheckTarget::su2_defaults()
    };

    let mut tolerance = loaded.config.tolerance;
    if let Some(abs_tol) = args.abs_tol {
        tolerance.abs_tol = abs_tol;
    }
    if let Some(rel_tol) = args.rel_tol {
        tolerance.rel_tol = rel_tol;
    }

    let forces_source = read_forces_source(&args.forces)?;
    if ForcesBreakdown::parse(&forces_source).is_empty() {
        warn!(path = %args.forces.display(), "forces report has no Total coefficient lines");
    }

    let report = crosscheck(
        &loaded.parsed.table,
        &loaded.schema,
        &forces_source,
        &targets,
        tolerance,
    )?;
    println!(
        "Comparing final row (line {}) of '{}' with '{}'",
        report.final_row_line,
        loaded.path.display(),
        args.forces.display()
    );
    print!("{}", report.render_human());

    if let Some(path) = &args.report {
        write_json_report(path, &report)?;
        println!("JSON report: {}", path.display());
    }

    if report.passed { Ok(0) } else { Ok(1) }
}

fn read_forces_source(path: &std::path::Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| {
        CliError::Compute(HistoryError::io_system(
            "IO.FORCES_READ",
            format!("failed to read forces report '{}': {}", path.display(), source),
        ))
    })
}
