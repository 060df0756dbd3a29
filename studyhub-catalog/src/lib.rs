//! Learning-platform data model types and YAML seed loading.
//!
//! This crate defines the value objects handed between the persistence layer
//! and its callers without any database dependencies. Rows are hydrated into
//! these types by `studyhub-db`; fixtures are read from YAML by [`yaml`].

pub mod types;
pub mod yaml;

pub use types::*;
pub use yaml::{load_seed, parse_seed, SeedData, YamlError};
