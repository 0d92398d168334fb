//! Storage module for persisting captured pages
//!
//! Pages are persisted as plain files: the storage key chosen by the URL
//! mapper, joined under a fixed output root. There is no database and no
//! compression.

mod fs;
mod traits;

pub use fs::FsStore;
pub use traits::{PageStore, StorageError, StorageResult};
