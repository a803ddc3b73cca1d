//! Request handler module
//!
//! Routes each request to one of the greeting handlers and turns the outcome
//! into a JSON response.

pub mod greet;
pub mod params;
pub mod router;

// Re-export main entry point
pub use router::Router;
