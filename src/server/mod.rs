//! Server module
//!
//! Owns the listening socket and the accept loop. `GreetServer` is built once
//! by the process entry point; `start` binds and spawns the loop on the
//! current `LocalSet`, and the returned `ServerHandle` stops it.

pub mod connection;
pub mod listener;
pub mod signal;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::config::{Config, LoggingConfig};
use crate::handler::Router;
use crate::logger;

pub use listener::create_listener;

/// Immutable state shared by every connection
#[derive(Debug)]
pub struct ServerState {
    pub router: Router,
    pub logging: LoggingConfig,
    pub keep_alive: bool,
}

/// The greeting service, constructed once at startup
pub struct GreetServer {
    config: Config,
}

impl GreetServer {
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind the configured address and start accepting connections.
    ///
    /// Must be called from within a `LocalSet`.
    pub fn start(self) -> Result<ServerHandle, Box<dyn std::error::Error>> {
        let addr = self.config.get_socket_addr()?;
        let listener = create_listener(addr, self.config.performance.listen_backlog)?;
        let local_addr = listener.local_addr()?;

        let state = Arc::new(ServerState {
            router: Router::new(),
            logging: self.config.logging,
            keep_alive: self.config.performance.keep_alive,
        });
        let shutdown = Arc::new(Notify::new());
        let task = tokio::task::spawn_local(accept_loop(listener, state, Arc::clone(&shutdown)));

        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
        })
    }
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ServerHandle {
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting and wait for the accept loop to exit.
    ///
    /// Connections already being served are not waited for.
    pub async fn stop(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            logger::log_error(&format!("Accept loop ended abnormally: {e}"));
        }
        logger::log_server_stop(&self.local_addr);
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<ServerState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::serve_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_warning(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};
    use hyper::body::Bytes;
    use hyper::{Method, Request, StatusCode};
    use hyper_util::client::legacy::Client;
    use hyper_util::rt::TokioExecutor;
    use serde_json::{json, Value};

    fn test_config() -> Config {
        let mut cfg = Config::load_from("does-not-exist/greeter").unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 0;
        cfg.logging.access_log = false;
        cfg
    }

    async fn call(addr: SocketAddr, method: Method, path: &str, body: &str) -> (StatusCode, Value) {
        let client = Client::builder(TokioExecutor::new()).build_http::<Full<Bytes>>();
        let req = Request::builder()
            .method(method)
            .uri(format!("http://{addr}{path}"))
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let resp = client.request(req).await.unwrap();
        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "application/json"
        );
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_serves_routes_over_tcp() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let handle = GreetServer::new(test_config()).start().unwrap();
                let addr = handle.local_addr();

                let (status, body) = call(addr, Method::GET, "/", "").await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, json!({"msg": "Hello World!!!"}));

                let (status, body) = call(addr, Method::GET, "/greet/John", "").await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(body, json!({"msg": "Hello John!"}));

                let (status, body) =
                    call(addr, Method::POST, "/greet", r#"{"name":"Bob","age":30}"#).await;
                assert_eq!(status, StatusCode::OK);
                assert_eq!(
                    body,
                    json!({"msg": "Hello my name is Bob and im 30 years old."})
                );

                let (status, body) = call(addr, Method::POST, "/greet", "{not json").await;
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, json!({"error": "Invalid JSON in request body"}));

                let (status, body) = call(addr, Method::DELETE, "/", "").await;
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, json!({"error": "Route not found"}));

                handle.stop().await;
            })
            .await;
    }

    #[tokio::test]
    async fn test_stop_releases_listener() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let handle = GreetServer::new(test_config()).start().unwrap();
                let addr = handle.local_addr();
                handle.stop().await;

                // The listener is dropped with the accept loop, so the port can be bound again
                let rebound = create_listener(addr, 16);
                assert!(rebound.is_ok());
            })
            .await;
    }
}
