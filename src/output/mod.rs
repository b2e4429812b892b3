//! Output formatting for kubedig

use crate::bucket::{RenderOptions, Results};
use crate::cli::OutputFormat;
use crate::error::Result;
use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, ContentArrangement, Table, TableComponent, Width};

/// Outer border, header rule and column separators; rows are not ruled
const BOX_STYLE: [(TableComponent, char); 15] = [
    (TableComponent::LeftBorder, '|'),
    (TableComponent::RightBorder, '|'),
    (TableComponent::TopBorder, '-'),
    (TableComponent::BottomBorder, '-'),
    (TableComponent::HeaderLines, '-'),
    (TableComponent::LeftHeaderIntersection, '+'),
    (TableComponent::MiddleHeaderIntersections, '+'),
    (TableComponent::RightHeaderIntersection, '+'),
    (TableComponent::VerticalLines, '|'),
    (TableComponent::TopBorderIntersections, '+'),
    (TableComponent::BottomBorderIntersections, '+'),
    (TableComponent::TopLeftCorner, '+'),
    (TableComponent::TopRightCorner, '+'),
    (TableComponent::BottomLeftCorner, '+'),
    (TableComponent::BottomRightCorner, '+'),
];

/// Maximum width of every column of a table with `columns` columns that has
/// to fit in `output_width`, accounting for borders and padding
pub fn column_max_width(output_width: usize, columns: usize) -> usize {
    if columns == 0 {
        return output_width.max(1);
    }
    let chrome = 4 + 3 * (columns - 1);
    (output_width.saturating_sub(chrome) / columns).max(1)
}

/// Format raw headers and rows as a boxed table constrained to `output_width`
///
/// ```text
/// +------+-------+
/// | NAME | VALUE |
/// +------+-------+
/// | a    | b     |
/// +------+-------+
/// ```
pub fn format_table(headers: &[&str], rows: &[Vec<String>], output_width: usize) -> String {
    let num_cols = headers.len();
    if num_cols == 0 {
        return String::new();
    }
    let max_width = u16::try_from(column_max_width(output_width, num_cols) + 2).unwrap_or(u16::MAX);

    let mut table = Table::new();
    table.load_preset(NOTHING);
    for (component, c) in BOX_STYLE {
        table.set_style(component, c);
    }
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(u16::try_from(output_width).unwrap_or(u16::MAX))
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Center)),
        )
        .set_constraints(vec![ColumnConstraint::UpperBoundary(Width::Fixed(max_width)); num_cols]);

    for row in rows {
        table.add_row((0..num_cols).map(|i| row.get(i).map(String::as_str).unwrap_or("")));
    }

    table.to_string()
}

/// Render a bucket's results in the requested format, newline terminated
pub fn render_results(results: &Results, opts: &RenderOptions, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(format!("{}\n", results.human(opts))),
        OutputFormat::Json => Ok(format!("{}\n", results.json(opts)?)),
    }
}

/// Render a per-bucket error block, newline terminated
pub fn render_error(name: &str, message: &str, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Human => Ok(format!("### {} ###\nError: {}\n\n", name.to_uppercase(), message)),
        OutputFormat::Json => {
            let block = serde_json::json!({ "bucket": name, "error": message });
            Ok(format!("{}\n", serde_json::to_string(&block)?))
        }
    }
}
