//! Whole-database operations built on the [`Walker`](crate::walker::Walker).
//!
//! - [`SyncDriver::full_export`] writes every root collection in folder mode.
//! - [`SyncDriver::full_import`] wipes the store, then mirrors a folder tree.
//! - [`SyncDriver::export_structure`] and [`SyncDriver::import_structure`]
//!   use the single-file nested snapshot.

mod driver;

pub use driver::SyncDriver;
