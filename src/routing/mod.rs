//! Routing module
//!
//! Ordered route table keyed by method and path rule, with a
//! first-match-wins matcher. No match means 404.

mod matcher;
mod table;

pub use matcher::match_route;
pub use table::{greeting_routes, Route, RouteAction};
