//! Route matching module
//!
//! Implements method and path matching over an ordered route table.

use hyper::Method;

use super::table::{PathRule, Route};

/// Find the first matching route for a given method and path
pub fn match_route<'a>(method: &Method, path: &str, routes: &'a [Route]) -> Option<&'a Route> {
    routes
        .iter()
        .find(|route| route.method == *method && match_path(route.rule, path))
}

/// Check if a path matches a route rule
pub fn match_path(rule: PathRule, path: &str) -> bool {
    match rule {
        PathRule::Exact(exact) => path == exact,
        PathRule::Prefix(prefix) => path.starts_with(prefix),
    }
}
