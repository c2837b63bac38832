//! API layer - HTTP entry points.

pub mod error;
pub mod http;
pub mod identity;

pub use error::ApiError;
pub use identity::Caller;
