//! In-memory workbook.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CalSheetError, CalSheetResult};
use crate::store::cell::{Cell, Row};
use crate::store::layout::{RowStyle, TableLayout};
use crate::store::{TableHandle, TableStore};

/// A single named table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub column_widths: Vec<u32>,
    #[serde(default)]
    pub styles: Vec<RowStyle>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Sheet {
    fn from_layout(layout: &TableLayout) -> Self {
        Sheet {
            name: layout.name.clone(),
            column_widths: layout.column_widths.clone(),
            styles: layout.styles.clone(),
            rows: layout.initial_rows.clone(),
        }
    }

    fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_empty()))
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Drop blank rows at the bottom so they don't linger after a clear.
    fn trim(&mut self) {
        let last = self.last_row();
        self.rows.truncate(last);
    }

    fn check_row(&self, row_index: usize) -> CalSheetResult<()> {
        if row_index == 0 {
            return Err(CalSheetError::RowOutOfRange {
                table: self.name.clone(),
                row: row_index,
            });
        }
        Ok(())
    }
}

/// A workbook kept entirely in memory.
///
/// Also the serialized form of [`crate::store::JsonWorkbook`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub tables: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.tables.iter().find(|s| s.name == name)
    }

    fn sheet_for(&self, table: &TableHandle) -> CalSheetResult<&Sheet> {
        self.sheet(table.name())
            .ok_or_else(|| CalSheetError::TableNotFound(table.name().to_string()))
    }

    fn sheet_for_mut(&mut self, table: &TableHandle) -> CalSheetResult<&mut Sheet> {
        self.tables
            .iter_mut()
            .find(|s| s.name == table.name())
            .ok_or_else(|| CalSheetError::TableNotFound(table.name().to_string()))
    }
}

impl TableStore for Workbook {
    fn get_or_create_table(&mut self, layout: &TableLayout) -> CalSheetResult<TableHandle> {
        if self.sheet(&layout.name).is_some() {
            debug!(sheet = %layout.name, "using existing sheet");
        } else {
            self.tables.push(Sheet::from_layout(layout));
            info!(sheet = %layout.name, "created sheet");
        }
        Ok(TableHandle::new(&layout.name))
    }

    fn find_table(&self, name: &str) -> Option<TableHandle> {
        self.sheet(name).map(|s| TableHandle::new(&s.name))
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|s| s.name.clone()).collect()
    }

    fn delete_table(&mut self, table: &TableHandle) -> CalSheetResult<()> {
        let before = self.tables.len();
        self.tables.retain(|s| s.name != table.name());
        if self.tables.len() == before {
            return Err(CalSheetError::TableNotFound(table.name().to_string()));
        }
        Ok(())
    }

    fn append_rows(&mut self, table: &TableHandle, rows: &[Row]) -> CalSheetResult<()> {
        let sheet = self.sheet_for_mut(table)?;
        sheet.trim();
        sheet.rows.extend(rows.iter().cloned());
        Ok(())
    }

    fn write_row(
        &mut self,
        table: &TableHandle,
        row_index: usize,
        row: &Row,
    ) -> CalSheetResult<()> {
        let sheet = self.sheet_for_mut(table)?;
        sheet.check_row(row_index)?;

        if sheet.rows.len() < row_index {
            sheet.rows.resize(row_index, Row::new());
        }

        let target = &mut sheet.rows[row_index - 1];
        if target.len() < row.len() {
            target.resize(row.len(), Cell::Empty);
        }
        for (i, cell) in row.iter().enumerate() {
            target[i] = cell.clone();
        }
        Ok(())
    }

    fn read_range(
        &self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<Vec<Row>> {
        let sheet = self.sheet_for(table)?;
        sheet.check_row(row_start)?;

        let grid: Vec<Row> = (row_start..row_start + row_count)
            .map(|row_index| {
                let stored = sheet.rows.get(row_index - 1);
                (0..col_count)
                    .map(|col| {
                        stored
                            .and_then(|r| r.get(col))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect::<Row>()
            })
            .collect();

        Ok(grid)
    }

    fn clear_range(
        &mut self,
        table: &TableHandle,
        row_start: usize,
        row_count: usize,
        col_count: usize,
    ) -> CalSheetResult<()> {
        let sheet = self.sheet_for_mut(table)?;
        sheet.check_row(row_start)?;

        for row in sheet
            .rows
            .iter_mut()
            .skip(row_start - 1)
            .take(row_count)
        {
            for cell in row.iter_mut().take(col_count) {
                *cell = Cell::Empty;
            }
        }
        sheet.trim();
        Ok(())
    }

    fn delete_row(&mut self, table: &TableHandle, row_index: usize) -> CalSheetResult<()> {
        let sheet = self.sheet_for_mut(table)?;
        if row_index == 0 || row_index > sheet.rows.len() {
            return Err(CalSheetError::RowOutOfRange {
                table: sheet.name.clone(),
                row: row_index,
            });
        }
        sheet.rows.remove(row_index - 1);
        Ok(())
    }

    fn last_row(&self, table: &TableHandle) -> CalSheetResult<usize> {
        Ok(self.sheet_for(table)?.last_row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::cell::text_row;

    fn book_with_rows(values: &[&str]) -> (Workbook, TableHandle) {
        let mut book = Workbook::new();
        let table = book
            .get_or_create_table(&TableLayout::events("Calendar_Test"))
            .unwrap();
        let rows: Vec<Row> = values.iter().map(|v| text_row(&[*v])).collect();
        book.append_rows(&table, &rows).unwrap();
        (book, table)
    }

    fn first_column(book: &Workbook, table: &TableHandle) -> Vec<String> {
        let last = book.last_row(table).unwrap();
        book.read_range(table, 1, last, 1)
            .unwrap()
            .into_iter()
            .map(|r| r[0].to_string())
            .collect()
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut book = Workbook::new();
        let layout = TableLayout::events("Calendar_Personal");

        let a = book.get_or_create_table(&layout).unwrap();
        book.append_rows(&a, &[text_row(&["Lunch"])]).unwrap();
        let b = book.get_or_create_table(&layout).unwrap();

        assert_eq!(a, b);
        assert_eq!(book.table_names(), vec!["Calendar_Personal".to_string()]);
        assert_eq!(book.last_row(&b).unwrap(), 2, "existing rows are kept");
    }

    #[test]
    fn test_append_goes_after_last_row() {
        let (book, table) = book_with_rows(&["a", "b"]);
        assert_eq!(book.last_row(&table).unwrap(), 3);
        assert_eq!(first_column(&book, &table), vec!["Title", "a", "b"]);
    }

    #[test]
    fn test_clear_range_leaves_header() {
        let (mut book, table) = book_with_rows(&["a", "b", "c"]);
        let last = book.last_row(&table).unwrap();

        book.clear_range(&table, 2, last - 1, 8).unwrap();

        assert_eq!(book.last_row(&table).unwrap(), 1);
        book.append_rows(&table, &[text_row(&["d"])]).unwrap();
        assert_eq!(first_column(&book, &table), vec!["Title", "d"]);
    }

    #[test]
    fn test_delete_rows_descending_keeps_other_rows() {
        let (mut book, table) = book_with_rows(&["a", "b", "c", "d", "e"]);

        // rows 3 ("b") and 5 ("d"), given out of order
        book.delete_rows(&table, &[5, 3]).unwrap();

        assert_eq!(first_column(&book, &table), vec!["Title", "a", "c", "e"]);
    }

    #[test]
    fn test_delete_row_out_of_range() {
        let (mut book, table) = book_with_rows(&["a"]);
        assert!(matches!(
            book.delete_row(&table, 9),
            Err(CalSheetError::RowOutOfRange { row: 9, .. })
        ));
    }

    #[test]
    fn test_read_range_pads_missing_cells() {
        let (book, table) = book_with_rows(&["a"]);
        let grid = book.read_range(&table, 2, 2, 3).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0], vec![Cell::from("a"), Cell::Empty, Cell::Empty]);
        assert!(grid[1].iter().all(Cell::is_empty));
    }

    #[test]
    fn test_write_row_overwrites_in_place() {
        let (mut book, table) = book_with_rows(&["a", "b"]);
        book.write_row(&table, 2, &text_row(&["z"])).unwrap();
        assert_eq!(first_column(&book, &table), vec!["Title", "z", "b"]);
    }

    #[test]
    fn test_missing_table() {
        let book = Workbook::new();
        let ghost = TableHandle::new("ghost");
        assert!(matches!(
            book.last_row(&ghost),
            Err(CalSheetError::TableNotFound(_))
        ));
    }
}
