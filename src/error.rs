//! Dispatcher error taxonomy
//!
//! Every variant resolves to a JSON error response; none of them is fatal to
//! the process.

use hyper::StatusCode;
use thiserror::Error;

pub const MALFORMED_BODY: &str = "Invalid JSON in request body";
pub const BODY_READ_FAILED: &str = "Failed to read request body";
pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GreetError {
    /// A required path, query or body field is absent
    #[error("{0}")]
    MissingParameter(&'static str),

    #[error("Invalid JSON in request body")]
    MalformedBody,

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Route not found")]
    RouteNotFound,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl GreetError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::MalformedBody | Self::BodyRead(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client; internal details stay in the logs
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::MissingParameter(msg) => *msg,
            Self::MalformedBody => MALFORMED_BODY,
            Self::BodyRead(_) => BODY_READ_FAILED,
            Self::RouteNotFound => ROUTE_NOT_FOUND,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}
