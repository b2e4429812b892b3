//! Tests for src/output/mod.rs - table and error rendering

use kubedig::bucket::{RenderOptions, Results, Value};
use kubedig::cli::OutputFormat;
use kubedig::output::{column_max_width, format_table, render_error, render_results};

// ============================================================================
// column width tests
// ============================================================================

#[test]
fn test_column_max_width_formula() {
    // (140 - 4 - 3 * 3) / 4
    assert_eq!(column_max_width(140, 4), 31);
    assert_eq!(column_max_width(80, 1), 76);
}

#[test]
fn test_column_max_width_never_zero() {
    assert_eq!(column_max_width(5, 4), 1);
    assert_eq!(column_max_width(0, 2), 1);
}

// ============================================================================
// table tests
// ============================================================================

#[test]
fn test_format_table_layout() {
    let rows = vec![vec!["x".to_string(), "longer".to_string()]];
    let table = format_table(&["a", "b"], &rows, 80);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], lines[2]);
    assert_eq!(lines[0], lines[4]);
    assert!(lines[0].starts_with("+-") && lines[0].ends_with("-+"));
    assert!(lines[1].contains("A") && lines[1].contains("B"));
    assert!(lines[3].starts_with("| x "));
    assert!(lines[3].contains("| longer |"));
}

#[test]
fn test_format_table_uppercases_and_centers_headers() {
    let rows = vec![vec!["abcdefgh".to_string()]];
    let table = format_table(&["id"], &rows, 80);
    assert!(table.contains("|    ID    |"), "{table}");
    assert!(table.contains("| abcdefgh |"));
}

#[test]
fn test_format_table_rows_are_not_ruled() {
    let rows = vec![vec!["1".to_string()], vec!["2".to_string()], vec!["3".to_string()]];
    let table = format_table(&["n"], &rows, 80);
    let borders = table.lines().filter(|l| l.starts_with('+')).count();
    assert_eq!(borders, 3);
}

#[test]
fn test_format_table_wraps_to_width() {
    let rows = vec![vec!["one two three four five six seven".to_string(), "x".to_string()]];
    let table = format_table(&["text", "other"], &rows, 24);
    for line in table.lines() {
        assert!(line.chars().count() <= 24, "line too wide: {line:?}");
    }
    assert!(table.lines().count() > 5);
    for word in ["one", "four", "seven"] {
        assert!(table.contains(word));
    }
}

#[test]
fn test_format_table_ignores_escape_codes_for_width() {
    let red = "\x1b[31mabc\x1b[0m";
    let rows = vec![vec![red.to_string()], vec!["abc".to_string()]];
    let table = format_table(&["c"], &rows, 80);
    let lines: Vec<&str> = table.lines().collect();
    assert!(lines[3].contains('\x1b') && lines[3].contains("abc"));
    assert!(lines[4].contains("| abc |"));
    assert_eq!(lines[0], "+-----+");
}

#[test]
fn test_format_table_pads_missing_cells() {
    let rows = vec![vec!["only".to_string()]];
    let table = format_table(&["a", "b"], &rows, 80);
    assert!(table.contains("| only |   |"));
}

#[test]
fn test_format_table_without_headers_is_empty() {
    assert_eq!(format_table(&[], &[], 80), "");
}

// ============================================================================
// render tests
// ============================================================================

#[test]
fn test_render_results_human_adds_blank_line() {
    let mut res = Results::new("x");
    res.add_comment("c");
    let out = render_results(&res, &RenderOptions::new(80), OutputFormat::Human).unwrap();
    assert_eq!(out, "### X ###\nComments:\n- c\n\n");
}

#[test]
fn test_render_results_json_one_line() {
    let mut res = Results::new("x");
    res.set_headers(["k"]);
    res.add_content(vec![Value::from(1i64)]);
    let out = render_results(&res, &RenderOptions::bare(80), OutputFormat::Json).unwrap();
    assert_eq!(out, "{\"k\":1}\n");
}

#[test]
fn test_render_error_human() {
    let out = render_error("token", "permission denied", OutputFormat::Human).unwrap();
    assert!(out.starts_with("### TOKEN ###\nError: permission denied\n"));
}

#[test]
fn test_render_error_json() {
    let out = render_error("token", "permission denied", OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(
        value,
        serde_json::json!({"bucket": "token", "error": "permission denied"})
    );
}
