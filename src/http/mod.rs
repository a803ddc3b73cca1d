//! HTTP protocol layer module
//!
//! JSON response construction shared by the dispatcher and the server.

pub mod response;

// Re-export commonly used types
pub use response::{error_response, json_response, Message};
