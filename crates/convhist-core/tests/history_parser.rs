use convhist_core::modules::{
    ColumnSchema, ConvergenceSummary, CrossCheckTarget, ForcesBreakdown, LiftDragColumns,
    SummaryRequest, crosscheck, write_delimited,
};
use convhist_core::numerics::NumericTolerance;
use convhist_core::{ParserConfig, WidthPolicy, parse_history, parse_history_table};
use std::fs;
use std::path::{Path, PathBuf};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("fixture should be readable: {}", path.display()))
}

#[test]
fn su2_history_fixture_parses_to_clean_table() {
    let source = read_fixture("history.dat");
    let parsed = parse_history(&source, &ParserConfig::default()).expect("fixture should parse");

    assert_eq!(parsed.table.shape(), (7, 21));
    assert_eq!(parsed.stats.zone_marker_line, Some(3));
    assert_eq!(parsed.stats.preamble_lines, 3);
    assert_eq!(parsed.stats.blank_lines, 1);
    assert_eq!(parsed.stats.comment_lines, 1);
    assert_eq!(parsed.stats.narrow_rows, 1);
    assert_eq!(parsed.stats.non_numeric_rows, 0);
    assert_eq!(parsed.stats.width_mismatch_rows, 0);
    assert_eq!(parsed.preamble.title.as_deref(), Some("SU2 Simulation"));
    assert_eq!(parsed.preamble.variables.len(), 21);

    let iterations = parsed.table.column(0).expect("iteration column");
    assert_eq!(iterations, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    for row in parsed.table.rows() {
        assert_eq!(row.len(), parsed.table.column_count());
    }
}

#[test]
fn column_count_matches_first_surviving_row() {
    let source = "header\n1,2,3,4\nnot,a,row\n5,6,7,8\n";
    let table = parse_history_table(source, &ParserConfig::default().with_min_width(4))
        .expect("parse should succeed");

    assert_eq!(table.column_count(), 4);
    assert_eq!(table.first_row(), Some(&[1.0, 2.0, 3.0, 4.0][..]));
}

#[test]
fn valid_rows_survive_amid_malformed_rows() {
    let width = 12;
    let valid_rows = 9;
    let mut source = String::from("TITLE = \"t\"\nZONE T=\"z\"\n");
    for row in 0..valid_rows {
        let values = (0..width)
            .map(|column| format!("{}.5", row * 100 + column))
            .collect::<Vec<_>>();
        source.push_str(&values.join(","));
        source.push('\n');
        match row % 3 {
            0 => source.push_str("1,2,3\n"),
            1 => source.push_str(&format!("{},oops\n", "7,".repeat(width))),
            _ => source.push_str("NaN-ish,1\n"),
        }
    }

    let table = parse_history_table(&source, &ParserConfig::default())
        .expect("parse should succeed");
    assert_eq!(table.shape(), (valid_rows, width));
    assert_eq!(table.value(8, 11), Some(811.5));
}

#[test]
fn stray_commas_are_value_neutral() {
    let plain = "ZONE T=\"z\"\n1.0,2.0,3.0\n";
    let leading = "ZONE T=\"z\"\n,1.0,2.0,3.0\n";
    let trailing = "ZONE T=\"z\"\n1.0,2.0,3.0,\n";
    let config = ParserConfig::default().with_min_width(3);

    let expected = parse_history_table(plain, &config).expect("plain row");
    assert_eq!(expected.to_nested(), vec![vec![1.0, 2.0, 3.0]]);
    assert_eq!(parse_history_table(leading, &config).expect("leading"), expected);
    assert_eq!(parse_history_table(trailing, &config).expect("trailing"), expected);
}

#[test]
fn export_then_reparse_is_idempotent_on_fixture() {
    let source = read_fixture("history.dat");
    let parsed = parse_history(&source, &ParserConfig::default()).expect("fixture should parse");
    let schema = ColumnSchema::from_preamble(&parsed.preamble).expect("variables present");

    let exported = write_delimited(&parsed.table, Some(&schema), ',');
    assert!(exported.starts_with("# Iteration,Time(s),Res_Flow[0]"));

    let reparsed = parse_history_table(&exported, &ParserConfig::default())
        .expect("export should parse");
    assert_eq!(reparsed.to_nested(), parsed.table.to_nested());
}

#[test]
fn strict_policy_accepts_consistent_fixture() {
    let source = read_fixture("history.dat");
    let config = ParserConfig::default()
        .with_min_width(20)
        .with_width_policy(WidthPolicy::Strict);

    let table = parse_history_table(&source, &config).expect("fixture widths agree");
    assert_eq!(table.shape(), (7, 21));
}

#[test]
fn summary_and_crosscheck_use_preamble_column_names() {
    let source = read_fixture("history.dat");
    let parsed = parse_history(&source, &ParserConfig::default()).expect("fixture should parse");
    let schema = ColumnSchema::from_preamble(&parsed.preamble).expect("variables present");

    let request = SummaryRequest::default()
        .with_residual("Res_Flow[0]")
        .with_lift_drag(LiftDragColumns::new("CLift(Total)", "CDrag(Total)"))
        .with_sample_every(5);
    let summary =
        ConvergenceSummary::build(&parsed.table, &schema, &request).expect("summary should build");
    assert_eq!(summary.final_iteration, 6.0);
    let cfl = &summary.columns[8];
    assert_eq!(cfl.name, "CFL_Number");
    assert_eq!(cfl.stats.min, 10.0);
    assert_eq!(cfl.stats.max, 23.1);

    let lift_drag = summary.lift_drag.as_ref().expect("lift/drag requested");
    let ratio = lift_drag.ratio.expect("final drag is non-zero");
    assert!((ratio - 15.313021).abs() < 1.0e-5);
    let sampled = summary
        .samples
        .iter()
        .map(|sample| sample.iteration)
        .collect::<Vec<_>>();
    assert_eq!(sampled, vec![0.0, 5.0, 6.0]);

    let forces_source = read_fixture("forces_breakdown.dat");
    let forces = ForcesBreakdown::parse(&forces_source);
    assert_eq!(forces.cl, Some(0.326933));
    assert_eq!(forces.cmz, Some(0.033698));

    let mut targets = CrossCheckTarget::su2_defaults();
    targets.push(CrossCheckTarget::new("Total CMz:", "CMz(Total)"));
    targets.push(CrossCheckTarget::new("Total CL/CD:", "CL/CD"));
    let report = crosscheck(
        &parsed.table,
        &schema,
        &forces_source,
        &targets,
        NumericTolerance::default(),
    )
    .expect("cross-check should run");

    assert!(report.passed, "report: {}", report.render_human());
    assert_eq!(report.final_row_line, 12);
    assert_eq!(report.entries.len(), 4);
}
