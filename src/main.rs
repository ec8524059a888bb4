//! Reverse gNMI telemetry bridge.
//!
//! Dials a gNMI target and a gNMIReverse collector, then relays telemetry
//! updates from the target's Subscribe stream to the collector's Publish
//! stream, restarting the session pair on any failure.

use clap::Parser;
use tracing::info;

use gnmi_reverse_bridge::args::Args;
use gnmi_reverse_bridge::bridge::{Bridge, Immediate};
use gnmi_reverse_bridge::config::Config;
use gnmi_reverse_bridge::tls::TransportSecurity;

fn init_tracing(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = Config::from_args(args)?;

    // Pure local credential construction; no network I/O yet.
    let credentials = TransportSecurity::from_settings(&config.tls)?;

    // TODO: apply collector VRF and source_addr to the dial once their
    // semantics are settled; both are parsed and validated above.
    let collector = credentials.connect(&config.collector.host_port).await?;
    info!(collector = %config.collector, "connected to collector");

    let target = TransportSecurity::Plaintext
        .connect(&config.target_addr)
        .await?;
    info!(target = %config.target_addr, paths = config.paths.len(), "connected to target");

    let bridge = Bridge::new(config, target, collector);
    bridge.run(Immediate).await?;
    Ok(())
}
