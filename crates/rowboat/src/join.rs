//! Key-based merge and positional join between two tables.

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::catalog::ColumnCatalog;
use crate::error::{Result, TableError};
use crate::table::Table;
use crate::transform::composite_key;
use crate::value::CellValue;

/// Which unmatched rows a merge or join retains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinMode {
    /// Only matched pairs.
    Inner,
    /// Every left row, matched or not.
    Left,
    /// Every right row, matched or not.
    Right,
    /// Every row from both sides.
    Outer,
}

impl FromStr for JoinMode {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "inner" => Ok(JoinMode::Inner),
            "left" => Ok(JoinMode::Left),
            "right" => Ok(JoinMode::Right),
            "outer" => Ok(JoinMode::Outer),
            other => Err(TableError::InvalidJoinType(other.to_string())),
        }
    }
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinMode::Inner => "inner",
            JoinMode::Left => "left",
            JoinMode::Right => "right",
            JoinMode::Outer => "outer",
        })
    }
}

/// First name in the sequence `base`, `base_other`, `base_other1`,
/// `base_other2`, … not claimed by `is_taken`.
pub(crate) fn collision_free_name(is_taken: impl Fn(&str) -> bool, base: &str) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    let mut candidate = format!("{base}_other");
    let mut suffix = 1;
    while is_taken(&candidate) {
        candidate = format!("{base}_other{suffix}");
        suffix += 1;
    }
    candidate
}

/// Key → indices of the rows carrying that key, in first-occurrence order.
fn key_groups(rows: &[Vec<CellValue>], cols: &[usize]) -> IndexMap<String, Vec<usize>> {
    let mut groups: IndexMap<String, Vec<usize>> = IndexMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        groups.entry(composite_key(row, cols)).or_default().push(i);
    }
    groups
}

impl Table {
    /// Key-based merge with another table.
    ///
    /// Rows match when the `|`-joined string forms of the `on_columns`
    /// cells are equal. The output holds all of this table's columns
    /// followed by the other table's non-key columns, renamed on collision
    /// via [`collision_free_name`]. `on_columns` need not be unique keys:
    /// every matching (left, right) pair produces an output row. Unmatched
    /// sides are filled with empty text according to `mode`.
    ///
    /// Output order is deterministic: key groups emit in first-occurrence
    /// row order, left side first (right side for unmatched-right rows).
    pub fn merge(&self, other: &Table, on_columns: &[&str], mode: JoinMode) -> Result<Table> {
        let mut left_on = Vec::with_capacity(on_columns.len());
        let mut right_on = Vec::with_capacity(on_columns.len());
        for name in on_columns {
            left_on.push(self.catalog.require(name)?);
            right_on.push(other.catalog.require(name)?);
        }

        // Output layout: left columns keep their slots; the other table's
        // non-key columns are appended, collision-renamed.
        let mut out_names: IndexSet<String> =
            self.catalog.names().iter().cloned().collect();
        // (column index in `other`, column index in the output)
        let mut right_extra: Vec<(usize, usize)> = Vec::new();
        for (i, name) in other.catalog.names().iter().enumerate() {
            if on_columns.contains(&name.as_str()) {
                continue;
            }
            let free = collision_free_name(|n| out_names.contains(n), name);
            out_names.insert(free);
            right_extra.push((i, out_names.len() - 1));
        }
        let catalog = ColumnCatalog::from_names(out_names.into_iter().collect())?;

        let left_width = self.catalog.len();
        let width = catalog.len();
        let left_groups = key_groups(&self.rows, &left_on);
        let right_groups = key_groups(&other.rows, &right_on);
        let mut out_rows: Vec<Vec<CellValue>> =
            Vec::with_capacity(self.rows.len().max(other.rows.len()));

        let empty_row = || vec![CellValue::Text(String::new()); width];

        let emit_pair = |out_rows: &mut Vec<Vec<CellValue>>, left: usize, right: usize| {
            let mut row = empty_row();
            row[..left_width].clone_from_slice(&self.rows[left]);
            for &(src, dst) in &right_extra {
                row[dst] = other.rows[right][src].clone();
            }
            out_rows.push(row);
        };

        let emit_left_only = |out_rows: &mut Vec<Vec<CellValue>>, left: usize| {
            let mut row = empty_row();
            row[..left_width].clone_from_slice(&self.rows[left]);
            out_rows.push(row);
        };

        let emit_right_only = |out_rows: &mut Vec<Vec<CellValue>>, right: usize| {
            let mut row = empty_row();
            for (&l, &r) in left_on.iter().zip(&right_on) {
                row[l] = other.rows[right][r].clone();
            }
            for &(src, dst) in &right_extra {
                row[dst] = other.rows[right][src].clone();
            }
            out_rows.push(row);
        };

        match mode {
            JoinMode::Inner | JoinMode::Left | JoinMode::Outer => {
                for (key, left_indices) in &left_groups {
                    match right_groups.get(key) {
                        Some(right_indices) => {
                            for &l in left_indices {
                                for &r in right_indices {
                                    emit_pair(&mut out_rows, l, r);
                                }
                            }
                        }
                        None => {
                            if mode != JoinMode::Inner {
                                for &l in left_indices {
                                    emit_left_only(&mut out_rows, l);
                                }
                            }
                        }
                    }
                }
                if mode == JoinMode::Outer {
                    for (key, right_indices) in &right_groups {
                        if left_groups.contains_key(key) {
                            continue;
                        }
                        for &r in right_indices {
                            emit_right_only(&mut out_rows, r);
                        }
                    }
                }
            }
            JoinMode::Right => {
                for (key, right_indices) in &right_groups {
                    match left_groups.get(key) {
                        Some(left_indices) => {
                            for &r in right_indices {
                                for &l in left_indices {
                                    emit_pair(&mut out_rows, l, r);
                                }
                            }
                        }
                        None => {
                            for &r in right_indices {
                                emit_right_only(&mut out_rows, r);
                            }
                        }
                    }
                }
            }
        }

        Ok(Table::from_parts(catalog, out_rows))
    }

    /// Positional join with another table, pairing rows by index and
    /// ignoring column values entirely.
    ///
    /// The output holds all of this table's columns followed by all of the
    /// other's, collision-renamed. Row counts: inner = min, left = this
    /// table's count, right = the other's, outer = max; past the end of a
    /// side, its cells are empty text.
    pub fn join(&self, other: &Table, mode: JoinMode) -> Result<Table> {
        let mut out_names: IndexSet<String> =
            self.catalog.names().iter().cloned().collect();
        for name in other.catalog.names() {
            let free = collision_free_name(|n| out_names.contains(n), name);
            out_names.insert(free);
        }
        let catalog = ColumnCatalog::from_names(out_names.into_iter().collect())?;

        let count = match mode {
            JoinMode::Inner => self.rows.len().min(other.rows.len()),
            JoinMode::Left => self.rows.len(),
            JoinMode::Right => other.rows.len(),
            JoinMode::Outer => self.rows.len().max(other.rows.len()),
        };

        let left_width = self.catalog.len();
        let right_width = other.catalog.len();
        let mut out_rows = Vec::with_capacity(count);
        for i in 0..count {
            let mut row = Vec::with_capacity(left_width + right_width);
            match self.rows.get(i) {
                Some(left) => row.extend(left.iter().cloned()),
                None => row.resize(left_width, CellValue::Text(String::new())),
            }
            match other.rows.get(i) {
                Some(right) => row.extend(right.iter().cloned()),
                None => row.resize(left_width + right_width, CellValue::Text(String::new())),
            }
            out_rows.push(row);
        }

        Ok(Table::from_parts(catalog, out_rows))
    }
}
