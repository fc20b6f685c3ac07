//! HTTP surface of the query service

pub mod error;
pub mod handlers;
pub mod router;

pub use error::{ApiError, ErrorBody};
pub use router::build_router;
