// Signal handling module
//
// Supported signals:
// - SIGTERM: stop the server
// - SIGINT:  stop the server (Ctrl+C)

/// Wait until the process is asked to terminate (Unix)
///
/// Returns the name of the signal that arrived.
///
/// | Signal  | Action      |
/// |---------|-------------|
/// | SIGTERM | Stop server |
/// | SIGINT  | Stop server |
#[cfg(unix)]
pub async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
