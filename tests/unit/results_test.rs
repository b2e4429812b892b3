//! Tests for src/bucket/results.rs - Results and RenderOptions

use kubedig::bucket::{RenderOptions, Results, Value};
use kubedig::error::DigError;
use serde_json::json;

fn two_rows() -> Results {
    let mut res = Results::new("sample");
    res.set_headers(["name", "count"]);
    res.add_content(vec![Value::from("a"), Value::from(1i64)]);
    res.add_content(vec![Value::from("b"), Value::from(2i64)]);
    res.add_comment("two rows");
    res
}

fn parse(s: &str) -> serde_json::Value {
    serde_json::from_str(s).unwrap()
}

// ============================================================================
// width invariant tests
// ============================================================================

#[test]
fn test_widths_consistent_when_matching() {
    assert!(two_rows().widths_consistent());
}

#[test]
fn test_widths_consistent_without_headers_or_data() {
    let mut only_headers = Results::new("h");
    only_headers.set_headers(["a", "b"]);
    assert!(only_headers.widths_consistent());

    let mut only_data = Results::new("d");
    only_data.add_content(vec![Value::from("x")]);
    assert!(only_data.widths_consistent());
}

#[test]
fn test_widths_inconsistent_with_headers() {
    let mut res = Results::new("bad");
    res.set_headers(["a", "b", "c"]);
    res.add_content(vec![Value::from("x"), Value::from("y")]);
    assert!(!res.widths_consistent());
}

#[test]
fn test_widths_inconsistent_between_rows() {
    let mut res = Results::new("ragged");
    res.add_content(vec![Value::from("x")]);
    res.add_content(vec![Value::from("x"), Value::from("y")]);
    assert!(!res.widths_consistent());
}

#[test]
fn test_json_rejects_width_mismatch() {
    let mut res = Results::new("bad");
    res.set_headers(["a", "b"]);
    res.add_content(vec![Value::from("x")]);

    let err = res.json(&RenderOptions::new(80)).unwrap_err();
    assert!(matches!(err, DigError::WidthMismatch(ref name) if name == "bad"));
    assert!(err.to_string().contains("\"bad\""));
}

// ============================================================================
// JSON rendering tests
// ============================================================================

#[test]
fn test_json_envelope_with_all_parts() {
    let out = two_rows().json(&RenderOptions::new(80)).unwrap();
    assert_eq!(
        parse(&out),
        json!({
            "bucket": "sample",
            "comments": ["two rows"],
            "results": [{"count": 1, "name": "a"}, {"count": 2, "name": "b"}]
        })
    );
}

#[test]
fn test_json_is_compact_with_sorted_keys() {
    let out = two_rows().json(&RenderOptions::bare(80)).unwrap();
    assert_eq!(out, r#"[{"count":1,"name":"a"},{"count":2,"name":"b"}]"#);
}

#[test]
fn test_json_envelope_single_row_flattens() {
    let mut res = Results::new("one");
    res.set_headers(["k"]);
    res.add_content(vec![Value::from(true)]);

    let out = res.json(&RenderOptions::new(80)).unwrap();
    assert_eq!(parse(&out), json!({"bucket": "one", "result": {"k": true}}));
}

#[test]
fn test_json_bare_single_row_is_object() {
    let mut res = Results::new("one");
    res.set_headers(["k", "items"]);
    res.add_content(vec![Value::from("v"), Value::from(vec!["x".to_string(), "y".to_string()])]);

    let out = res.json(&RenderOptions::bare(80)).unwrap();
    assert_eq!(parse(&out), json!({"items": ["x", "y"], "k": "v"}));
}

#[test]
fn test_json_bare_zero_rows_is_empty_array() {
    let mut res = Results::new("empty");
    res.set_headers(["name", "value"]);
    res.add_comment("ignored");

    assert_eq!(res.json(&RenderOptions::bare(80)).unwrap(), "[]");
}

#[test]
fn test_json_envelope_zero_rows_has_empty_results() {
    let res = Results::new("empty");
    let out = res.json(&RenderOptions::new(80)).unwrap();
    assert_eq!(parse(&out), json!({"bucket": "empty", "results": []}));
}

#[test]
fn test_json_hidden_name_keeps_comments() {
    let opts = RenderOptions {
        show_name: Some(false),
        ..RenderOptions::new(80)
    };
    let value = parse(&two_rows().json(&opts).unwrap());
    assert!(value.get("bucket").is_none());
    assert_eq!(value["comments"], json!(["two rows"]));
    assert_eq!(value["results"].as_array().unwrap().len(), 2);
}

#[test]
fn test_json_hidden_data_omits_results() {
    let opts = RenderOptions {
        show_data: Some(false),
        ..RenderOptions::new(80)
    };
    let value = parse(&two_rows().json(&opts).unwrap());
    assert_eq!(value, json!({"bucket": "sample", "comments": ["two rows"]}));
}

#[test]
fn test_json_empty_comments_omitted() {
    let mut res = Results::new("quiet");
    res.set_headers(["a"]);
    res.add_content(vec![Value::from("x")]);
    res.add_content(vec![Value::from("y")]);

    let value = parse(&res.json(&RenderOptions::new(80)).unwrap());
    assert!(value.get("comments").is_none());
}

#[test]
fn test_value_json_types() {
    assert_eq!(Value::from("s").to_json(), json!("s"));
    assert_eq!(Value::from(-3i64).to_json(), json!(-3));
    assert_eq!(Value::from(false).to_json(), json!(false));
    assert_eq!(Value::from(vec!["a".to_string()]).to_json(), json!(["a"]));
}

// ============================================================================
// human rendering tests
// ============================================================================

#[test]
fn test_human_full_block() {
    let out = two_rows().human(&RenderOptions::new(80));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "### SAMPLE ###");
    assert_eq!(lines[1], "Comments:");
    assert_eq!(lines[2], "- two rows");
    assert!(lines[3].starts_with("+-"));
    assert!(out.contains("| NAME | COUNT |"));
    assert!(out.contains("| a    | 1     |"));
    assert!(out.ends_with("+\n"));
}

#[test]
fn test_human_hidden_name_and_comments() {
    let out = two_rows().human(&RenderOptions::bare(80));
    assert!(!out.contains("###"));
    assert!(!out.contains("Comments:"));
    assert!(out.starts_with("+-"));
}

#[test]
fn test_human_without_data_has_no_table() {
    let mut res = Results::new("note");
    res.add_comment("just a note");
    assert_eq!(res.human(&RenderOptions::new(80)), "### NOTE ###\nComments:\n- just a note\n");
}

#[test]
fn test_human_hidden_data() {
    let opts = RenderOptions {
        show_data: Some(false),
        ..RenderOptions::new(80)
    };
    let out = two_rows().human(&opts);
    assert!(!out.contains('+'));
}

#[test]
fn test_human_renders_lists_with_brackets() {
    let mut res = Results::new("lists");
    res.set_headers(["items"]);
    res.add_content(vec![Value::from(vec!["x".to_string(), "y".to_string()])]);
    assert!(res.human(&RenderOptions::new(80)).contains("[x y]"));
}

#[test]
fn test_render_options_defaults_show_everything() {
    let opts = RenderOptions::default();
    assert!(opts.name_shown());
    assert!(opts.comments_shown());
    assert!(opts.data_shown());

    let bare = RenderOptions::bare(100);
    assert!(!bare.name_shown());
    assert!(!bare.comments_shown());
    assert!(bare.data_shown());
    assert_eq!(bare.output_width, 100);
}
