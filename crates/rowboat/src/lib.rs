//! Rowboat: an in-memory tabular data engine for CSV cleaning pipelines.
//!
//! Rowboat loads delimited text into a typed, column-addressed table and
//! exposes the everyday operations of a cleaning pipeline: filtering,
//! sorting, type coercion, deduplication, key-based merges, and basic
//! column statistics.
//!
//! # Core Principles
//!
//! - **Typed cells**: every field is parsed into the narrowest fitting
//!   kind (bool, integer, unsigned, float, or text)
//! - **Fail-fast**: operations validate their inputs up front and leave
//!   the table untouched on error
//! - **Deterministic**: merges and deduplication preserve first-seen
//!   order, so the same input always yields the same output
//!
//! # Example
//!
//! ```no_run
//! use rowboat::{io, JoinMode};
//!
//! let people = io::read_path("people.csv", &io::ReadOptions::default()).unwrap();
//! let scores = io::read_path("scores.csv", &io::ReadOptions::default()).unwrap();
//!
//! let merged = people.merge(&scores, &["id"], JoinMode::Left).unwrap();
//! println!("{} rows, {} columns", merged.row_count(), merged.column_count());
//! ```

pub mod catalog;
pub mod error;
pub mod io;
pub mod join;
pub mod stats;
pub mod table;
pub mod transform;
pub mod value;

pub use catalog::ColumnCatalog;
pub use error::{Result, TableError};
pub use join::JoinMode;
pub use table::{Row, Table};
pub use value::{CellValue, FromCell, MISSING_MARKERS};
