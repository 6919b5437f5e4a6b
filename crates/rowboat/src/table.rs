//! The table: a column catalog plus an ordered row store.

use std::fmt;

use indexmap::IndexMap;

use crate::catalog::ColumnCatalog;
use crate::error::{Result, TableError};
use crate::value::{CellValue, FromCell};

/// Mutable in-memory table of named, typed columns and ordered rows.
///
/// Every row holds exactly one [`CellValue`] per column, in catalog order;
/// short rows are padded with empty text on append. Derivations such as
/// [`Table::sub_table`] or [`Table::merge`](crate::Table::merge) produce a
/// brand-new table and never alias this table's storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) catalog: ColumnCatalog,
    pub(crate) rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Creates a table with no columns and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from already-parsed data.
    ///
    /// Column names must be unique. Each row is normalized to the catalog
    /// width: short rows are padded with empty text, excess cells are
    /// dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let catalog = ColumnCatalog::from_names(columns)?;
        let width = catalog.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Text(String::new()));
                row
            })
            .collect();
        Ok(Self { catalog, rows })
    }

    /// Internal constructor for derivations whose rows are already the
    /// right width.
    pub(crate) fn from_parts(catalog: ColumnCatalog, rows: Vec<Vec<CellValue>>) -> Self {
        Self { catalog, rows }
    }

    /// Column names in positional order.
    pub fn column_names(&self) -> &[String] {
        self.catalog.names()
    }

    pub fn column_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True if the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.catalog.contains(name)
    }

    /// Position of a column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.catalog.index_of(name)
    }

    /// All rows, in order. Each row's length equals the column count.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Borrows the cell at (row, column).
    pub fn value(&self, row: usize, col_name: &str) -> Result<&CellValue> {
        let col = self.catalog.require(col_name)?;
        let row = self.rows.get(row).ok_or(TableError::IndexOutOfRange {
            index: row,
            len: self.rows.len(),
        })?;
        Ok(&row[col])
    }

    /// Retrieves a cell converted to `T` (see [`FromCell`] for the
    /// coercion rules).
    pub fn get<T: FromCell>(&self, row: usize, col_name: &str) -> Result<T> {
        T::from_cell(self.value(row, col_name)?)
    }

    /// Overwrites the cell at (row, column).
    pub fn set(&mut self, row: usize, col_name: &str, value: impl Into<CellValue>) -> Result<()> {
        let col = self.catalog.require(col_name)?;
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(row)
            .ok_or(TableError::IndexOutOfRange { index: row, len })?;
        row[col] = value.into();
        Ok(())
    }

    /// Borrows a row view.
    pub fn row(&self, index: usize) -> Result<Row<'_>> {
        if index >= self.rows.len() {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(Row { table: self, index })
    }

    /// Iterates over row views in order.
    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).map(|index| Row { table: self, index })
    }

    /// Adds a column, appending the default value to every existing row.
    pub fn add_column(&mut self, name: &str, default: impl Into<CellValue>) -> Result<()> {
        self.catalog.push(name)?;
        let default = default.into();
        for row in &mut self.rows {
            row.push(default.clone());
        }
        Ok(())
    }

    /// Deletes a column, removing its slot from every row. Positions of
    /// subsequent columns shift down by one.
    pub fn delete_column(&mut self, name: &str) -> Result<()> {
        let index = self.catalog.remove(name)?;
        for row in &mut self.rows {
            row.remove(index);
        }
        Ok(())
    }

    /// Deletes several columns. The whole batch is validated first, so an
    /// unknown name removes nothing.
    pub fn delete_columns(&mut self, names: &[&str]) -> Result<()> {
        for name in names {
            self.catalog.require(name)?;
        }
        for name in names {
            self.delete_column(name)?;
        }
        Ok(())
    }

    /// Renames columns as a batch; see [`ColumnCatalog::rename`] for the
    /// validation rules. Row storage is untouched.
    pub fn rename_columns(&mut self, renames: &IndexMap<String, String>) -> Result<()> {
        self.catalog.rename(renames)
    }

    /// Appends a row, padding short input with empty text and dropping
    /// cells beyond the catalog width.
    pub fn append_row(&mut self, mut values: Vec<CellValue>) {
        values.resize(self.catalog.len(), CellValue::Text(String::new()));
        self.rows.push(values);
    }

    /// Deletes the row at `index`.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(TableError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        self.rows.remove(index);
        Ok(())
    }

    /// Removes every row for which the predicate returns true.
    pub fn remove_rows_if(&mut self, mut predicate: impl FnMut(&[CellValue]) -> bool) {
        self.rows.retain(|row| !predicate(row));
    }

    /// Appends another table's rows.
    ///
    /// An empty table adopts the other's columns and rows. Otherwise the
    /// column names must match exactly, in order.
    pub fn append_table(&mut self, other: &Table) -> Result<()> {
        if other.catalog.is_empty() {
            return Ok(());
        }
        if self.catalog.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        if self.catalog.names() != other.catalog.names() {
            return Err(TableError::ColumnMismatch(
                "columns do not match for appending".to_string(),
            ));
        }
        self.rows.extend(other.rows.iter().cloned());
        Ok(())
    }

    /// Builds a new table holding copies of the selected rows, catalog
    /// unchanged. Any out-of-range index fails before rows are copied.
    pub fn sub_table(&self, row_indices: &[usize]) -> Result<Table> {
        for &index in row_indices {
            if index >= self.rows.len() {
                return Err(TableError::IndexOutOfRange {
                    index,
                    len: self.rows.len(),
                });
            }
        }
        let rows = row_indices.iter().map(|&i| self.rows[i].clone()).collect();
        Ok(Table::from_parts(self.catalog.clone(), rows))
    }

    /// Calls `f` once per row index, allowing in-place edits through the
    /// mutable table reference.
    pub fn modify(&mut self, mut f: impl FnMut(usize, &mut Table)) {
        let count = self.rows.len();
        for index in 0..count {
            if index >= self.rows.len() {
                break;
            }
            f(index, self);
        }
    }
}

/// Read-only view of a single table row.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Index of this row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// All cells of this row, in catalog order.
    pub fn values(&self) -> &'a [CellValue] {
        &self.table.rows[self.index]
    }

    /// Borrows the cell in the named column.
    pub fn value(&self, col_name: &str) -> Result<&'a CellValue> {
        let col = self.table.catalog.require(col_name)?;
        Ok(&self.table.rows[self.index][col])
    }

    /// Retrieves the cell in the named column converted to `T`.
    pub fn get<T: FromCell>(&self, col_name: &str) -> Result<T> {
        T::from_cell(self.value(col_name)?)
    }
}

impl fmt::Display for Row<'_> {
    /// Comma-joined cell string forms.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells = self.values();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("index", &self.index)
            .field("values", &self.values())
            .finish()
    }
}
