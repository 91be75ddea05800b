//! Enriched metadata to SQL DDL.

mod dialect;
pub mod emitter;
pub mod order;
pub mod types;

pub use dialect::{Dialect, DialectSpec, UnsupportedDialect};
pub use emitter::{SqlArtifacts, emit};
pub use order::order;
pub use types::map_type;
