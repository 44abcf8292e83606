//! Workbook persisted as a single JSON file.

use std::path::{Path, PathBuf};

use crate::error::{CalSheetError, CalSheetResult};
use crate::store::cell::Row;
use crate::store::layout::TableLayout;
use crate::store::workbook::Workbook;
use crate::store::{TableHandle, TableStore};

/// A [`Workbook`] that is written back to disk after every mutation, so rows
/// appended by one fetch window survive even if a later window never runs.
pub struct JsonWorkbook {
    path: PathBuf,
    book: Workbook,
}

impl JsonWorkbook {
    /// Open an existing workbook file.
    pub fn open(path: &Path) -> CalSheetResult<Self> {
        if !path.exists() {
            return Err(CalSheetError::WorkbookNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let book: Workbook = serde_json::from_str(&content)?;

        Ok(JsonWorkbook {
            path: path.to_path_buf(),
            book,
        })
    }

    /// Open the workbook, creating an empty one (and its directory) if needed.
    pub fn open_or_create(path: &Path) -> CalSheetResult<Self> {
        if path.exists() {
            return Self::open(path);
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let workbook = JsonWorkbook {
            path: path.to_path_buf(),
            book: Workbook::new(),
        };
        workbook.persist()?;
        Ok(workbook)
    }

    pub fn workbook(&self) -> &Workbook {
        &self.book
    }

    fn persist(&self) -> CalSheetResult<()> {
        let content = serde_json::to_string_pretty(&self.book)?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl TableStore for JsonWorkbook {
    fn get_or_create_table(&mut self, layout: &TableLayout) -> CalSheetResult<TableHandle> {
        let existed = self.book.find_table(&layout.name).is_some();
        let handle = self.book.get_or_create_table(layout)?;
        if !existed {
            self.persist()?;
        }
        Ok(handle)
    }

    fn find_table(&self, name: &str) -> Option<TableHandle> {
        self.book.find_table(name)
    }

    fn table_names(&self) -> Vec<String> {
        self.book.table_names()
    }

    fn delete_table(&mut self, table: &TableHandle) -> CalSheetResult<()> {
        self.book.delete_table(table)?;
        self.persist()
    }

    fn append_rows(&mut self, table: &TableHandle, rows: &[Row]) -> CalSheetResult<()> {
        self.book.append_rows(table, rows)?;
        self.persist()
    }

    fn write_row(
        &mut self,
        table: &TableHandle,
        row_index: usize,
        row: &Row,
    ) -> CalSheetResult<()> {
        self.book.write_row(table, row_index, row)?;
        self.persist()
    }

    fn read_range(
        &self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<Vec<Row>> {
        self.book.read_range(table, row_start, row_count, col_count)
    }

    fn clear_range(
        &mut self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<()> {
        self.book.clear_range(table, row_start, row_count, col_count)?;
        self.persist()
    }

    fn delete_row(&mut self, table: &TableHandle, row_index: usize) -> CalSheetResult<()> {
        self.book.delete_row(table, row_index)?;
        self.persist()
    }

    fn last_row(&self, table: &TableHandle) -> CalSheetResult<usize> {
        self.book.last_row(table)
    }

    // One write for the whole batch instead of one per row.
    fn delete_rows(&mut self, table: &TableHandle, row_indices: &[usize]) -> CalSheetResult<()> {
        self.book.delete_rows(table, row_indices)?;
        self.persist()
    }
}
