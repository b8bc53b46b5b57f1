use chrono::{Local, LocalResult, TimeZone};
use serde_json::{Number, Value};

pub const MIN_COLUMN_WIDTH: usize = 8;
pub const MAX_COLUMN_WIDTH: usize = 30;
pub const COLUMN_GAP: usize = 2;

const CREATED_TIME_COLUMN: &str = "__createdtime__";
const UPDATED_TIME_COLUMN: &str = "__updatedtime__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWindow {
    pub start: usize,
    pub end: usize,
    pub widths: Vec<usize>,
    pub hidden_left: usize,
    pub hidden_right: usize,
}

impl ColumnWindow {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[must_use]
pub fn visible_row_range(total_rows: usize, selected_row: usize, max_visible_rows: usize) -> RowWindow {
    let size = max_visible_rows.min(total_rows);
    if size == 0 {
        return RowWindow { start: 0, end: 0 };
    }

    let start = if selected_row < size {
        0
    } else {
        selected_row + 1 - size
    };
    let start = start.min(total_rows - size);
    RowWindow {
        start,
        end: start + size,
    }
}

#[must_use]
pub fn natural_column_width(header: &str, cells: &[String]) -> usize {
    let widest_cell = cells
        .iter()
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0);
    header
        .chars()
        .count()
        .max(widest_cell)
        .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

#[must_use]
pub fn visible_column_span(widths: &[usize], start: usize, budget: usize) -> ColumnWindow {
    let start = start.min(widths.len());
    let mut visible = Vec::new();
    let mut used = 0usize;

    for (offset, &width) in widths[start..].iter().enumerate() {
        let cost = if offset == 0 { width } else { width + COLUMN_GAP };
        if used + cost > budget {
            break;
        }
        visible.push(width);
        used += cost;
    }

    if visible.is_empty() && start < widths.len() {
        visible.push(widths[start].min(budget.max(MIN_COLUMN_WIDTH)));
    }

    let end = start + visible.len();
    ColumnWindow {
        start,
        end,
        widths: visible,
        hidden_left: start,
        hidden_right: widths.len() - end,
    }
}

#[must_use]
pub fn max_column_start(widths: &[usize], budget: usize) -> usize {
    let Some(last) = widths.len().checked_sub(1) else {
        return 0;
    };

    let mut used = 0usize;
    let mut start = last;
    for index in (0..widths.len()).rev() {
        let cost = if index == last {
            widths[index]
        } else {
            widths[index] + COLUMN_GAP
        };
        if used + cost > budget {
            break;
        }
        used += cost;
        start = index;
    }
    start
}

#[must_use]
pub fn format_cell(column: &str, value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Number(number) if is_timestamp_column(column) => format_timestamp(number),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        Value::String(text) => collapse_newlines(text),
        other => other.to_string(),
    }
}

fn is_timestamp_column(column: &str) -> bool {
    column == CREATED_TIME_COLUMN || column == UPDATED_TIME_COLUMN
}

fn format_timestamp(number: &Number) -> String {
    let millis = number
        .as_i64()
        .or_else(|| number.as_f64().map(|float| float as i64));
    let Some(millis) = millis else {
        return number.to_string();
    };

    match Local.timestamp_millis_opt(millis) {
        LocalResult::Single(timestamp) => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => number.to_string(),
    }
}

fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        format_cell, max_column_start, natural_column_width, visible_column_span,
        visible_row_range, RowWindow,
    };

    #[test]
    fn row_window_pins_to_start_until_selection_leaves_it() {
        assert_eq!(
            visible_row_range(100, 0, 10),
            RowWindow { start: 0, end: 10 }
        );
        assert_eq!(
            visible_row_range(100, 9, 10),
            RowWindow { start: 0, end: 10 }
        );
    }

    #[test]
    fn row_window_trails_so_selection_is_last_visible() {
        assert_eq!(
            visible_row_range(100, 55, 10),
            RowWindow { start: 46, end: 56 }
        );
        assert_eq!(
            visible_row_range(100, 10, 10),
            RowWindow { start: 1, end: 11 }
        );
    }

    #[test]
    fn row_window_clamps_to_data_bounds() {
        assert_eq!(
            visible_row_range(100, 99, 10),
            RowWindow { start: 90, end: 100 }
        );
        assert_eq!(
            visible_row_range(100, 150, 10),
            RowWindow { start: 90, end: 100 }
        );
    }

    #[test]
    fn row_window_shrinks_to_short_data() {
        assert_eq!(visible_row_range(3, 2, 10), RowWindow { start: 0, end: 3 });
        assert_eq!(visible_row_range(0, 0, 10), RowWindow { start: 0, end: 0 });
        assert_eq!(visible_row_range(5, 2, 0), RowWindow { start: 0, end: 0 });
    }

    #[test]
    fn natural_width_clamps_between_bounds() {
        assert_eq!(natural_column_width("id", &["1".to_string(), "2".to_string()]), 8);
        assert_eq!(
            natural_column_width("description", &["x".repeat(40)]),
            30
        );
        assert_eq!(
            natural_column_width("a_header_name", &["short".to_string()]),
            13
        );
        assert_eq!(natural_column_width("id", &[]), 8);
    }

    #[test]
    fn column_span_packs_with_gap_and_reports_hidden() {
        let span = visible_column_span(&[5, 5, 5], 0, 14);
        assert_eq!(span.start, 0);
        assert_eq!(span.end, 2);
        assert_eq!(span.widths, vec![5, 5]);
        assert_eq!(span.hidden_left, 0);
        assert_eq!(span.hidden_right, 1);
    }

    #[test]
    fn column_span_starts_from_scroll_offset() {
        let span = visible_column_span(&[5, 5, 5], 1, 14);
        assert_eq!(span.start, 1);
        assert_eq!(span.end, 3);
        assert_eq!(span.hidden_left, 1);
        assert_eq!(span.hidden_right, 0);
    }

    #[test]
    fn oversized_first_column_is_clipped_not_dropped() {
        let span = visible_column_span(&[30], 0, 12);
        assert_eq!(span.widths, vec![12]);
        assert_eq!(span.end, 1);

        let span = visible_column_span(&[30], 0, 5);
        assert_eq!(span.widths, vec![8]);

        let span = visible_column_span(&[], 0, 10);
        assert!(span.is_empty());
    }

    #[test]
    fn max_start_packs_backward_from_last_column() {
        assert_eq!(max_column_start(&[5, 5, 5], 14), 1);
        assert_eq!(max_column_start(&[5, 5, 5], 30), 0);
        assert_eq!(max_column_start(&[5], 14), 0);
        assert_eq!(max_column_start(&[10, 40], 20), 1);
        assert_eq!(max_column_start(&[], 20), 0);
    }

    #[test]
    fn null_formats_to_empty_string() {
        assert_eq!(format_cell("name", &json!(null)), "");
    }

    #[test]
    fn timestamp_columns_format_as_dates() {
        let formatted = format_cell("__createdtime__", &json!(1_700_000_000_000_i64));
        assert!(formatted.contains('-'));
        assert!(formatted.contains(':'));
        assert_ne!(formatted, "1700000000000");

        let fractional = format_cell("__updatedtime__", &json!(1_700_000_000_000.25));
        assert!(fractional.contains('-'));

        assert_eq!(format_cell("count", &json!(1_700_000_000_000_i64)), "1700000000000");
    }

    #[test]
    fn structured_values_format_as_compact_json() {
        assert_eq!(format_cell("meta", &json!({ "a": 1 })), "{\"a\":1}");
        assert_eq!(format_cell("tags", &json!([1, 2])), "[1,2]");
    }

    #[test]
    fn scalars_stringify_with_newlines_collapsed() {
        assert_eq!(format_cell("note", &json!("line one\nline two")), "line one line two");
        assert_eq!(format_cell("note", &json!("a\r\nb")), "a b");
        assert_eq!(format_cell("ok", &json!(true)), "true");
        assert_eq!(format_cell("age", &json!(42)), "42");
    }
}
