//! Record sink: CRUD/query store and row types for the `properties` table.

pub mod store;
pub mod types;

pub use store::{PropertyStore, PropertyStoreError};
pub use types::{
    CreateProperty, ListPropertiesParams, NewProperty, Property, PropertyQuery,
    PropertyStatistics, UpdateProperty,
};
