fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()?;

    log::info!("Starting keygate {}", env!("CARGO_PKG_VERSION"));
    let channels = keygate_bridge::BridgeChannels::default();
    keygate_backend::run(channels.backend_rx, channels.backend_tx);
    keygate_frontend::run(channels.frontend_rx, channels.frontend_tx)
}
