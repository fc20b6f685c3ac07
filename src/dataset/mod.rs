//! Client dataset: schema, CSV loading and the read-only store

pub mod loader;
pub mod schema;
pub mod store;

pub use loader::{Dataset, DatasetLoader};
pub use schema::{Column, ColumnKind, ColumnSpec, Schema, Value};
pub use store::{ClientRecord, ClientStore};
