//! Wire types and errors shared across `certseal` crates.

pub mod error;
pub mod protocol;

pub use error::ServiceError;
