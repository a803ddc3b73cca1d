// Connection handling module
// Serves one accepted TCP connection with the greeting dispatcher

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use hyper::body::Body;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;

use super::ServerState;
use crate::logger::{self, AccessLogEntry};

/// Serve a single connection in a local task.
///
/// Requests on the connection are handled one after another; the connection
/// ends when the client closes it. No read or write timeout is applied.
///
/// # Arguments
///
/// * `stream` - The accepted TCP stream
/// * `peer_addr` - The peer's socket address, used for access logging
/// * `state` - Shared server state
pub fn serve_connection(
    stream: tokio::net::TcpStream,
    peer_addr: std::net::SocketAddr,
    state: Arc<ServerState>,
) {
    tokio::task::spawn_local(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(state.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                async move {
                    let started = Instant::now();
                    let mut entry = state.logging.access_log.then(|| {
                        let mut entry = AccessLogEntry::new(
                            peer_addr.ip().to_string(),
                            req.method().to_string(),
                            req.uri().path().to_string(),
                        );
                        entry.query = req.uri().query().map(ToString::to_string);
                        entry
                    });

                    let response = state.router.dispatch(req).await;

                    if let Some(entry) = entry.as_mut() {
                        entry.status = response.status().as_u16();
                        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
                        entry.request_time_us =
                            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
                        logger::log_access(entry, state.logging.access_log_format);
                    }

                    Ok::<_, Infallible>(response)
                }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }
    });
}
