//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, parameter
//! extraction and response building. Every request yields exactly one
//! response.

use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};

use super::greet;
use super::params;
use crate::error::GreetError;
use crate::http::{self, Message};
use crate::logger;
use crate::routing::{self, Route, RouteAction};

/// Request dispatcher over the ordered greeting route table
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: routing::greeting_routes(),
        }
    }

    pub fn match_route(&self, method: &Method, path: &str) -> Option<&Route> {
        routing::match_route(method, path, &self.routes)
    }

    /// Dispatch a request to its handler
    ///
    /// The body is only read when the matched route needs it, and then it is
    /// collected to completion before parsing.
    pub async fn dispatch<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body,
        B::Error: std::fmt::Display,
    {
        let Some(route) = self.match_route(req.method(), req.uri().path()) else {
            return http::error_response(&GreetError::RouteNotFound);
        };
        let action = route.action;

        let result = if action.needs_body() {
            match read_body(req).await {
                Ok(body) => run_action(action, "", None, Some(&body)),
                Err(e) => Err(e),
            }
        } else {
            run_action(action, req.uri().path(), req.uri().query(), None)
        };

        match result {
            Ok(message) => http::json_response(StatusCode::OK, &message),
            Err(err) => {
                if let GreetError::Internal(_) | GreetError::BodyRead(_) = err {
                    logger::log_error(&format!("[{}] {err}", route.name));
                }
                http::error_response(&err)
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn run_action(
    action: RouteAction,
    path: &str,
    query: Option<&str>,
    body: Option<&Bytes>,
) -> Result<Message, GreetError> {
    match action {
        RouteAction::Root => Ok(greet::root()),
        RouteAction::GreetPath => greet::greet_path(path),
        RouteAction::GreetQuery => greet::greet_query(&params::parse_query(query)),
        RouteAction::GreetBody => greet::greet_body(body.map_or(&[][..], |b| &b[..])),
    }
}

/// Buffer the whole request body
async fn read_body<B>(req: Request<B>) -> Result<Bytes, GreetError>
where
    B: Body,
    B::Error: std::fmt::Display,
{
    req.into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| GreetError::BodyRead(e.to_string()))
}
