pub mod config;
pub mod error;
pub mod mapping;
pub mod paths;
pub mod record;

pub use config::Config;
pub use error::IngestError;
pub use mapping::MappingSchema;
pub use paths::{is_truthy, resolve};
pub use record::merge;
