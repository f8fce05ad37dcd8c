//! Mirror a hierarchical document database to and from JSON files.
//!
//! Export walks every collection and writes one JSON array per collection,
//! nesting sub-collections in folders named after their parent document.
//! Import makes the store match those files exactly. A second format keeps
//! the whole tree in one nested JSON document.

pub mod config;
pub mod models;
pub mod normalize;
pub mod store;
pub mod sync;
pub mod walker;

pub use config::{Config, ConfigError};
pub use normalize::Normalizer;
pub use store::{DocumentStore, FirestoreStore, MemoryStore, StoreError};
pub use sync::SyncDriver;
pub use walker::{SyncReport, WalkError, Walker};
