//! Route table
//!
//! The greeting routes in evaluation order. The first route whose method and
//! path rule both match wins.

use hyper::Method;

/// Path matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRule {
    /// Path must equal the pattern
    Exact(&'static str),
    /// Path must start with the pattern
    Prefix(&'static str),
}

/// Handler a matched route dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    /// `GET /`
    Root,
    /// `GET /greet/{name}`
    GreetPath,
    /// `GET /greeting?name=..&age=..`
    GreetQuery,
    /// `POST /greet` with a JSON body
    GreetBody,
}

impl RouteAction {
    /// Only the body greeting needs the request body buffered
    pub const fn needs_body(self) -> bool {
        matches!(self, Self::GreetBody)
    }
}

#[derive(Debug, Clone)]
pub struct Route {
    pub name: &'static str,
    pub method: Method,
    pub rule: PathRule,
    pub action: RouteAction,
}

impl Route {
    const fn new(name: &'static str, method: Method, rule: PathRule, action: RouteAction) -> Self {
        Self {
            name,
            method,
            rule,
            action,
        }
    }
}

/// The fixed greeting routes
pub fn greeting_routes() -> Vec<Route> {
    vec![
        Route::new("root", Method::GET, PathRule::Exact("/"), RouteAction::Root),
        // Owns every GET under /greet/; the handler rejects malformed names
        Route::new(
            "greet_path",
            Method::GET,
            PathRule::Prefix("/greet/"),
            RouteAction::GreetPath,
        ),
        Route::new(
            "greet_query",
            Method::GET,
            PathRule::Exact("/greeting"),
            RouteAction::GreetQuery,
        ),
        Route::new(
            "greet_body",
            Method::POST,
            PathRule::Exact("/greet"),
            RouteAction::GreetBody,
        ),
    ]
}
