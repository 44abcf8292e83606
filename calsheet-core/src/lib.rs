//! Core of calsheet: backs calendar events up into spreadsheet-style tables.
//!
//! This crate holds everything except the command line:
//! - `source` reads events from a provider binary
//! - `store` holds the per-calendar tables and the metadata table
//! - `policy` runs full and incremental backups on top of `fetch`

pub mod clock;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod error;
pub mod event;
pub mod fetch;
pub mod metadata;
pub mod policy;
pub mod properties;
pub mod registry;
pub mod schedule;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{CalSheetError, CalSheetResult, ErrorKind};
pub use event::{CalendarRef, EventRecord};
