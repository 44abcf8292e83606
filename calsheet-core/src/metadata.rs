//! Per-calendar backup summary rows.
//!
//! All calendars share one metadata table. It opens with a short preamble,
//! then a marker row, then the column header, then one row per calendar:
//!
//! ```text
//! Calendar Backup
//! Created        | 2025-06-15 05:00
//! ...
//! Backed-up calendars
//! Calendar Name  | Calendar ID | Last Backup | Event Count
//! Work           | work@...    | 2025-06-15  | 42
//! ```

use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::constants::{METADATA_MARKER, METADATA_SHEET_NAME};
use crate::error::{CalSheetError, CalSheetResult};
use crate::event::CalendarRef;
use crate::store::cell::text_row;
use crate::store::{Cell, Row, RowStyle, TableHandle, TableLayout, TableStore};

pub const METADATA_HEADERS: [&str; 4] = ["Calendar Name", "Calendar ID", "Last Backup", "Event Count"];

const METADATA_COLUMNS: usize = METADATA_HEADERS.len();
const METADATA_COLUMN_WIDTHS: [u32; 4] = [200, 300, 180, 100];

/// Column holding the calendar id (0-based).
const ID_COLUMN: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataEntry {
    pub calendar_name: String,
    pub calendar_id: String,
    pub last_backup_at: Option<DateTime<FixedOffset>>,
    pub event_count: u64,
}

impl MetadataEntry {
    fn from_row(row: &Row) -> Option<Self> {
        let calendar_id = row
            .get(ID_COLUMN)?
            .as_text()
            .filter(|id| !id.is_empty())?
            .to_string();
        Some(MetadataEntry {
            calendar_name: row
                .first()
                .and_then(Cell::as_text)
                .unwrap_or_default()
                .to_string(),
            calendar_id,
            last_backup_at: row.get(2).and_then(Cell::as_datetime),
            event_count: row
                .get(3)
                .and_then(Cell::as_number)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
        })
    }
}

pub struct MetadataTracker {
    table_name: String,
    backup_months_future: u32,
    backup_hour: u32,
}

impl MetadataTracker {
    pub fn new(config: &SyncConfig) -> Self {
        MetadataTracker {
            table_name: METADATA_SHEET_NAME.to_string(),
            backup_months_future: config.backup_months_future,
            backup_hour: config.backup_hour,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Layout used when the metadata table is first created.
    pub fn layout(&self, now: DateTime<Local>) -> TableLayout {
        let created = now.format("%Y-%m-%d %H:%M").to_string();
        let range = format!("Today until {} months ahead", self.backup_months_future);
        let run_at = format!("Daily at {:02}:00", self.backup_hour);

        let initial_rows = vec![
            text_row(&["Calendar Backup"]),
            Row::new(),
            text_row(&["Created", created.as_str()]),
            text_row(&["Backup range", range.as_str()]),
            text_row(&["Scheduled run", run_at.as_str()]),
            text_row(&["Refresh mode", "Rows from today onward are deleted and fetched again"]),
            Row::new(),
            text_row(&[METADATA_MARKER]),
            text_row(&METADATA_HEADERS),
        ];
        let marker_row = initial_rows.len() - 1;

        TableLayout {
            name: self.table_name.clone(),
            initial_rows,
            column_widths: METADATA_COLUMN_WIDTHS.to_vec(),
            styles: vec![
                RowStyle {
                    row: 1,
                    columns: 1,
                    bold: true,
                    font_size: Some(16),
                    ..RowStyle::default()
                },
                RowStyle {
                    row: marker_row,
                    columns: 1,
                    bold: true,
                    background: Some("#e8f5e8".into()),
                    ..RowStyle::default()
                },
                RowStyle {
                    row: marker_row + 1,
                    columns: METADATA_COLUMNS,
                    bold: true,
                    background: Some("#f0f0f0".into()),
                    ..RowStyle::default()
                },
            ],
        }
    }

    /// First row that can hold an entry: two rows below the marker.
    fn first_entry_row<T: TableStore>(&self, store: &T, table: &TableHandle) -> CalSheetResult<usize> {
        let last_row = store.last_row(table)?;
        let first_column = store.read_range(table, 1, last_row, 1)?;

        first_column
            .iter()
            .position(|row| row.first().and_then(Cell::as_text) == Some(METADATA_MARKER))
            .map(|index| index + 1 + 2)
            .ok_or_else(|| CalSheetError::MissingMarker {
                table: self.table_name.clone(),
                marker: METADATA_MARKER.to_string(),
            })
    }

    /// Insert or overwrite the entry for `calendar`.
    pub fn record_backup<T: TableStore>(
        &self,
        store: &mut T,
        calendar: &CalendarRef,
        event_count: usize,
        now: DateTime<Local>,
    ) -> CalSheetResult<()> {
        let table = store.get_or_create_table(&self.layout(now))?;
        let first = self.first_entry_row(store, &table)?;
        let last_row = store.last_row(&table)?;

        let row: Row = vec![
            Cell::from(calendar.name.clone()),
            Cell::from(calendar.id.clone()),
            Cell::from(now.fixed_offset()),
            Cell::from(event_count as i64),
        ];

        let existing = if last_row >= first {
            store
                .read_range(&table, first, last_row - first + 1, METADATA_COLUMNS)?
                .iter()
                .position(|r| r.get(ID_COLUMN).and_then(Cell::as_text) == Some(calendar.id.as_str()))
                .map(|offset| first + offset)
        } else {
            None
        };

        match existing {
            Some(row_index) => {
                debug!(calendar_id = %calendar.id, row = row_index, "updating metadata entry");
                store.write_row(&table, row_index, &row)?;
            }
            None => {
                debug!(calendar_id = %calendar.id, "adding metadata entry");
                store.append_rows(&table, &[row])?;
            }
        }

        info!(calendar = %calendar.name, event_count, "backup metadata updated");
        Ok(())
    }

    /// Entries in table order. A missing table has none.
    pub fn entries<T: TableStore>(&self, store: &T) -> CalSheetResult<Vec<MetadataEntry>> {
        let Some(table) = store.find_table(&self.table_name) else {
            return Ok(Vec::new());
        };
        let first = self.first_entry_row(store, &table)?;
        let last_row = store.last_row(&table)?;
        if last_row < first {
            return Ok(Vec::new());
        }

        Ok(store
            .read_range(&table, first, last_row - first + 1, METADATA_COLUMNS)?
            .iter()
            .filter_map(MetadataEntry::from_row)
            .collect())
    }

    /// Blank every entry row, keeping the preamble and header.
    pub fn clear_entries<T: TableStore>(&self, store: &mut T) -> CalSheetResult<()> {
        let Some(table) = store.find_table(&self.table_name) else {
            return Ok(());
        };
        let first = self.first_entry_row(store, &table)?;
        let last_row = store.last_row(&table)?;
        if last_row >= first {
            store.clear_range(&table, first, last_row - first + 1, METADATA_COLUMNS)?;
        }
        Ok(())
    }
}
