//! Query and transform operations: filter, sort, missing-data handling,
//! deduplication, column typing, and sorted search.

use std::cmp::Ordering;

use indexmap::IndexSet;

use crate::error::{Result, TableError};
use crate::table::Table;
use crate::value::{CellValue, FromCell};

impl Table {
    /// Returns the indices of rows matching the predicate, in order.
    ///
    /// The predicate sees `(row_index, table)`. Typed access inside the
    /// predicate returns `Result`, so a caller that wants malformed cells
    /// treated as non-matching applies that policy itself:
    ///
    /// ```
    /// # use rowboat::Table;
    /// # let table = Table::new(vec!["Age".into()], vec![vec![30.into()]]).unwrap();
    /// let adults = table.filter_rows(|i, t| {
    ///     t.get::<i64>(i, "Age").map(|age| age >= 18).unwrap_or(false)
    /// });
    /// ```
    pub fn filter_rows(&self, predicate: impl Fn(usize, &Table) -> bool) -> Vec<usize> {
        (0..self.row_count())
            .filter(|&i| predicate(i, self))
            .collect()
    }

    /// Builds a new table from the rows matching the predicate. Equivalent
    /// to `filter_rows` followed by [`Table::sub_table`].
    pub fn filter_table(&self, predicate: impl Fn(usize, &Table) -> bool) -> Table {
        let rows = self
            .rows()
            .iter()
            .enumerate()
            .filter(|&(i, _)| predicate(i, self))
            .map(|(_, row)| row.clone())
            .collect();
        Table::from_parts(self.catalog.clone(), rows)
    }

    /// Sorts rows by one column, converting each cell to `T` for
    /// comparison.
    ///
    /// Every cell is converted before any reordering, so a conversion
    /// failure leaves the table untouched. The sort is stable: ties keep
    /// their original relative order in both directions.
    pub fn sort_by_column<T>(&mut self, col_name: &str, ascending: bool) -> Result<()>
    where
        T: FromCell + PartialOrd,
    {
        let col = self.catalog.require(col_name)?;
        let taken = std::mem::take(&mut self.rows);
        let mut keyed: Vec<(T, Vec<CellValue>)> = Vec::with_capacity(taken.len());
        let mut pending = taken.into_iter();
        while let Some(row) = pending.next() {
            match T::from_cell(&row[col]) {
                Ok(key) => keyed.push((key, row)),
                Err(err) => {
                    // Put every row back, untouched, before failing.
                    let mut rows: Vec<_> = keyed.into_iter().map(|(_, r)| r).collect();
                    rows.push(row);
                    rows.extend(pending);
                    self.rows = rows;
                    return Err(err);
                }
            }
        }
        keyed.sort_by(|a, b| {
            let ord = a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal);
            if ascending { ord } else { ord.reverse() }
        });
        self.rows = keyed.into_iter().map(|(_, row)| row).collect();
        Ok(())
    }

    /// Keeps the first row per distinct composite key, in original order.
    ///
    /// The key is the `|`-joined string form of the named columns; an
    /// empty list means all columns.
    pub fn drop_duplicates(&mut self, columns: &[&str]) -> Result<()> {
        let cols = self.resolve_columns(columns)?;
        let mut seen: IndexSet<String> = IndexSet::with_capacity(self.rows.len());
        let mut kept = Vec::with_capacity(self.rows.len());
        for row in self.rows.drain(..) {
            if seen.insert(composite_key(&row, &cols)) {
                kept.push(row);
            }
        }
        self.rows = kept;
        Ok(())
    }

    /// Drops rows holding a missing value in any of the named columns
    /// (all columns if the list is empty). Only textual cells can be
    /// missing.
    pub fn dropna(&mut self, columns: &[&str]) -> Result<()> {
        let cols = self.resolve_columns(columns)?;
        self.rows
            .retain(|row| !cols.iter().any(|&c| row[c].is_missing()));
        Ok(())
    }

    /// Replaces missing values in the named columns with `value`.
    pub fn fillna(&mut self, columns: &[&str], value: impl Into<CellValue>) -> Result<()> {
        let cols: Vec<usize> = columns
            .iter()
            .map(|name| self.catalog.require(name))
            .collect::<Result<_>>()?;
        let fill = value.into();
        for row in &mut self.rows {
            for &c in &cols {
                if row[c].is_missing() {
                    row[c] = fill.clone();
                }
            }
        }
        Ok(())
    }

    /// Converts every cell in a column to `T`, aborting on the first
    /// failure. Missing values fail too; the table is unchanged on error.
    pub fn set_column_type<T>(&mut self, col_name: &str) -> Result<()>
    where
        T: FromCell + Into<CellValue>,
    {
        let col = self.catalog.require(col_name)?;
        let converted: Vec<T> = self
            .rows
            .iter()
            .map(|row| strict_convert(&row[col]))
            .collect::<Result<_>>()?;
        for (row, value) in self.rows.iter_mut().zip(converted) {
            row[col] = value.into();
        }
        Ok(())
    }

    /// Converts every cell in a column to `T`, substituting `default` for
    /// missing or unconvertible cells.
    pub fn set_column_type_or<T>(&mut self, col_name: &str, default: T) -> Result<()>
    where
        T: FromCell + Into<CellValue> + Clone,
    {
        let col = self.catalog.require(col_name)?;
        for row in &mut self.rows {
            let value = strict_convert::<T>(&row[col]).unwrap_or_else(|_| default.clone());
            row[col] = value.into();
        }
        Ok(())
    }

    /// Applies `f` to each cell of a column, writing the returned value
    /// back.
    ///
    /// The closure receives `Some(v)` when the cell converts to `T` and
    /// `None` when it cannot (missing or malformed), so the fallback for
    /// bad cells is explicit at the call site.
    pub fn apply_to_column<T, F>(&mut self, col_name: &str, mut f: F) -> Result<()>
    where
        T: FromCell,
        F: FnMut(Option<T>) -> CellValue,
    {
        let col = self.catalog.require(col_name)?;
        for row in &mut self.rows {
            let value = strict_convert::<T>(&row[col]).ok();
            row[col] = f(value);
        }
        Ok(())
    }

    /// Sets every cell of a column to a single value.
    pub fn set_column_to_value(
        &mut self,
        col_name: &str,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        let col = self.catalog.require(col_name)?;
        let value = value.into();
        for row in &mut self.rows {
            row[col] = value.clone();
        }
        Ok(())
    }

    /// Returns a column converted to `T`, failing on the first
    /// unconvertible cell.
    pub fn column_as<T: FromCell>(&self, col_name: &str) -> Result<Vec<T>> {
        let col = self.catalog.require(col_name)?;
        self.rows.iter().map(|row| T::from_cell(&row[col])).collect()
    }

    /// Keeps rows at indices 0, n, 2n, …; `n == 0` clears the table and
    /// `n == 1` keeps everything.
    pub fn keep_every_nth_row(&mut self, n: usize) {
        if n == 0 {
            self.rows.clear();
            return;
        }
        if n == 1 {
            return;
        }
        let mut index = 0;
        self.rows.retain(|_| {
            let keep = index % n == 0;
            index += 1;
            keep
        });
    }

    /// First row index whose cell in `col_name` is not less than `value`,
    /// assuming the table is sorted ascending by that column under `T`.
    /// Returns `row_count()` when every row is less.
    pub fn lower_bound<T>(&self, col_name: &str, value: &T) -> Result<usize>
    where
        T: FromCell + PartialOrd,
    {
        let col = self.catalog.require(col_name)?;
        let mut lo = 0;
        let mut hi = self.rows.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let cell: T = T::from_cell(&self.rows[mid][col])?;
            if cell < *value {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        Ok(lo)
    }

    /// Binary search for an exact match in a column sorted ascending by
    /// `T`. Returns the matching row index, if any.
    pub fn find_sorted<T>(&self, col_name: &str, value: &T) -> Result<Option<usize>>
    where
        T: FromCell + PartialOrd,
    {
        let index = self.lower_bound(col_name, value)?;
        if index < self.rows.len() {
            let col = self.catalog.require(col_name)?;
            let cell: T = T::from_cell(&self.rows[index][col])?;
            if cell == *value {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Resolves a column-name list to indices; empty means all columns.
    fn resolve_columns(&self, columns: &[&str]) -> Result<Vec<usize>> {
        if columns.is_empty() {
            return Ok((0..self.catalog.len()).collect());
        }
        columns
            .iter()
            .map(|name| self.catalog.require(name))
            .collect()
    }
}

/// Like [`FromCell::from_cell`] but missing textual cells always fail,
/// even for targets (such as `String`) that would accept them.
fn strict_convert<T: FromCell>(cell: &CellValue) -> Result<T> {
    if let CellValue::Text(s) = cell {
        if crate::value::is_missing(s) {
            return Err(TableError::ConversionFailed {
                value: s.clone(),
                to: T::TYPE_NAME,
            });
        }
    }
    T::from_cell(cell)
}

/// Composite textual key over the given column positions.
pub(crate) fn composite_key(row: &[CellValue], cols: &[usize]) -> String {
    let mut key = String::new();
    for &c in cols {
        key.push_str(&row[c].to_string());
        key.push('|');
    }
    key
}
