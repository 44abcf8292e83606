//! Table layouts: initial rows, column widths and row styling.

use serde::{Deserialize, Serialize};

use crate::constants::{
    FORBIDDEN_SHEET_CHARS, MAX_SHEET_NAME_CHARS, TRUNCATED_SHEET_NAME_CHARS,
};
use crate::store::cell::{Row, text_row};

/// Column headers of a calendar table, in storage order.
pub const EVENT_HEADERS: [&str; 8] = [
    "Title",
    "Start Time",
    "End Time",
    "Location",
    "Description",
    "Guests",
    "Created",
    "ID",
];

const EVENT_COLUMN_WIDTHS: [u32; 8] = [200, 150, 150, 120, 300, 200, 150, 200];

/// Number of columns in a calendar table.
pub const EVENT_COLUMNS: usize = EVENT_HEADERS.len();

/// Index of the start time column (0-based).
pub const START_TIME_COLUMN: usize = 1;

/// Styling applied to part of one row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowStyle {
    /// 1-based row number.
    pub row: usize,
    /// Number of leading columns the style covers.
    pub columns: usize,
    #[serde(default)]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

/// Everything needed to create a table the first time it is requested.
#[derive(Debug, Clone)]
pub struct TableLayout {
    pub name: String,
    /// Rows written when the table is created (header, preamble).
    pub initial_rows: Vec<Row>,
    /// Column widths in pixels, column 1 first.
    pub column_widths: Vec<u32>,
    pub styles: Vec<RowStyle>,
}

impl TableLayout {
    /// Layout of a per-calendar event table.
    pub fn events(name: &str) -> Self {
        TableLayout {
            name: name.to_string(),
            initial_rows: vec![text_row(&EVENT_HEADERS)],
            column_widths: EVENT_COLUMN_WIDTHS.to_vec(),
            styles: vec![RowStyle {
                row: 1,
                columns: EVENT_COLUMNS,
                bold: true,
                font_size: None,
                background: Some("#4285f4".into()),
                font_color: Some("#ffffff".into()),
            }],
        }
    }
}

/// Deterministic table name for a calendar.
///
/// Forbidden characters become `_`. Names longer than 30 characters keep
/// their first 27 characters followed by `...`.
pub fn sheet_name(prefix: &str, calendar_name: &str) -> String {
    let sanitized: String = calendar_name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();

    let name = format!("{prefix}{sanitized}");

    if name.chars().count() > MAX_SHEET_NAME_CHARS {
        let head: String = name.chars().take(TRUNCATED_SHEET_NAME_CHARS).collect();
        format!("{head}...")
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sheet_name_sanitizes() {
        assert_eq!(sheet_name("Calendar_", "Work/Home: [x]"), "Calendar_Work_Home_ _x_");
        assert_eq!(sheet_name("Calendar_", "a?b*c\\d"), "Calendar_a_b_c_d");
    }

    #[test]
    fn test_sheet_name_short_names_untouched() {
        assert_eq!(sheet_name("Calendar_", "Personal"), "Calendar_Personal");
        // Exactly 30 characters stays as-is
        let name = sheet_name("Calendar_", &"x".repeat(21));
        assert_eq!(name.chars().count(), 30);
        assert!(!name.ends_with("..."));
    }

    #[test]
    fn test_sheet_name_truncates_long_names() {
        let name = sheet_name("Calendar_", "Engineering team shared calendar");
        assert_eq!(name, "Calendar_Engineering team s...");
        assert_eq!(name.chars().count(), 30);
    }

    #[test]
    fn test_sheet_name_truncates_by_characters() {
        let name = sheet_name("Calendar_", &"日本語".repeat(10));
        assert_eq!(name.chars().count(), 30);
        assert!(name.ends_with("..."));
    }

    #[test]
    fn test_event_layout_has_single_styled_header() {
        let layout = TableLayout::events("Calendar_Personal");
        assert_eq!(layout.initial_rows.len(), 1);
        assert_eq!(layout.initial_rows[0].len(), EVENT_COLUMNS);
        assert_eq!(layout.column_widths.len(), EVENT_COLUMNS);
        assert!(layout.styles[0].bold);
    }
}
