//! Spreadsheet-style table storage.
//!
//! A workbook holds named tables. Rows and columns are 1-based, matching the
//! way spreadsheets address cells; row 1 of an event table is its header.

pub mod cell;
mod json;
pub mod layout;
mod workbook;

use std::fmt;

pub use cell::{Cell, Row};
pub use json::JsonWorkbook;
pub use layout::{RowStyle, TableLayout, sheet_name};
pub use workbook::{Sheet, Workbook};

use crate::error::CalSheetResult;

/// Handle to a table, identified by its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableHandle(String);

impl TableHandle {
    pub fn new(name: &str) -> Self {
        TableHandle(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row-level access to a collection of named tables.
pub trait TableStore {
    /// Return the table named `layout.name`, creating it from the layout if
    /// it does not exist yet. Existing tables are returned untouched.
    fn get_or_create_table(&mut self, layout: &TableLayout) -> CalSheetResult<TableHandle>;

    fn find_table(&self, name: &str) -> Option<TableHandle>;

    fn table_names(&self) -> Vec<String>;

    fn delete_table(&mut self, table: &TableHandle) -> CalSheetResult<()>;

    /// Append rows after the last non-empty row.
    fn append_rows(&mut self, table: &TableHandle, rows: &[Row]) -> CalSheetResult<()>;

    /// Overwrite the leading cells of `row_index` with `row`.
    fn write_row(&mut self, table: &TableHandle, row_index: usize, row: &Row)
    -> CalSheetResult<()>;

    /// Read a rectangular range. Cells past the stored data read as empty.
    fn read_range(
        &self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<Vec<Row>>;

    /// Blank a rectangular range without removing rows.
    fn clear_range(
        &mut self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<()>;

    /// Remove a row, shifting the rows below it up by one.
    fn delete_row(&mut self, table: &TableHandle, row_index: usize) -> CalSheetResult<()>;

    /// Index of the last row holding any non-empty cell, 0 for an empty table.
    fn last_row(&self, table: &TableHandle) -> CalSheetResult<usize>;

    /// Delete several rows. Indices are deleted from the highest down so
    /// that earlier deletions never shift a row that is still pending.
    fn delete_rows(&mut self, table: &TableHandle, row_indices: &[usize]) -> CalSheetResult<()> {
        let mut sorted = row_indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        for row_index in sorted.into_iter().rev() {
            self.delete_row(table, row_index)?;
        }
        Ok(())
    }
}
