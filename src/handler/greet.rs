//! Greeting handlers
//!
//! Pure functions from extracted request parts to a greeting message.

use super::params::{self, QueryParams};
use crate::error::GreetError;
use crate::http::Message;

pub const QUERY_PARAMS_MISSING: &str = "Name or age query parameter missing";
pub const BODY_FIELDS_MISSING: &str = "Name or age missing in request body";

/// `GET /`
pub fn root() -> Message {
    Message::new("Hello World!!!")
}

/// `GET /greet/{name}`
pub fn greet_path(path: &str) -> Result<Message, GreetError> {
    let name = params::path_name(path)?;
    Ok(Message::new(format!("Hello {name}!")))
}

/// `GET /greeting?name=..&age=..`
pub fn greet_query(query: &QueryParams) -> Result<Message, GreetError> {
    match (
        params::required_query(query, "name"),
        params::required_query(query, "age"),
    ) {
        (Some(name), Some(age)) => Ok(introduction(name, age)),
        _ => Err(GreetError::MissingParameter(QUERY_PARAMS_MISSING)),
    }
}

/// `POST /greet`, called with the fully buffered body
pub fn greet_body(body: &[u8]) -> Result<Message, GreetError> {
    let doc = params::parse_json_body(body)?;
    match (
        params::required_field(&doc, "name"),
        params::required_field(&doc, "age"),
    ) {
        (Some(name), Some(age)) => Ok(introduction(&name, &age)),
        _ => Err(GreetError::MissingParameter(BODY_FIELDS_MISSING)),
    }
}

fn introduction(name: &str, age: &str) -> Message {
    Message::new(format!(
        "Hello my name is {name} and im {age} years old."
    ))
}
