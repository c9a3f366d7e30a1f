//! Source registry: CRUD store and row types for the `sources` table.

pub mod store;
pub mod types;

pub use store::{SourceStore, SourceStoreError};
pub use types::{CreateSource, Source, UpdateSource};
