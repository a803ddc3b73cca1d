mod config;
mod error;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;

    // Single-threaded runtime; connections run as local tasks
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let handle = server::GreetServer::new(cfg.clone()).start()?;
    logger::log_server_start(&handle.local_addr(), &cfg);

    let signal = server::signal::wait_for_shutdown().await?;
    logger::log_signal(signal);

    handle.stop().await;
    Ok(())
}
