mod config;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context};
use bridge_core::{Bridge, Scheduler, TokioTimers};
use clap::Parser;
use config::{load_settings, Settings};
use device_codec::DeviceCommand;
use shared::protocol::RemoteCommand;
use tokio::{
    net::{lookup_host, UdpSocket},
    sync::mpsc,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use transport::{
    device::DeviceConnection,
    remote::{spawn_listener, spawn_writer, UdpLink},
};

/// Mirrors the remote display onto the hand-held controller and forwards its
/// buttons back.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Host of the remote display server
    #[arg(long)]
    ip: Option<String>,
    /// Port the remote display server listens on
    #[arg(long)]
    port: Option<u16>,
    /// Local port to receive display updates on
    #[arg(long)]
    listen: Option<u16>,
    /// Substring of the controller's MIDI port name
    #[arg(long)]
    device: Option<String>,
    /// Config file (defaults to ./bridge.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// tracing filter directives, e.g. "debug" or "bridge_core=debug"
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn apply(&self, settings: &mut Settings) {
        if let Some(ip) = &self.ip {
            settings.remote_host = ip.clone();
        }
        if let Some(port) = self.port {
            settings.remote_port = port;
        }
        if let Some(listen) = self.listen {
            settings.listen_port = listen;
        }
        if let Some(device) = &self.device {
            settings.device_filter = device.clone();
        }
        if let Some(filter) = &self.log_filter {
            settings.log_filter = filter.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    let directives = match (&args.log_filter, std::env::var("RUST_LOG")) {
        (None, Ok(from_env)) => from_env,
        _ => settings.log_filter.clone(),
    };
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter '{directives}'"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    run(settings).await
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let scheduler = Scheduler::new();

    let (device_tx, device_rx) = mpsc::unbounded_channel::<DeviceCommand>();
    let device = DeviceConnection::open(&settings.device_filter, scheduler.handle(), device_rx)
        .with_context(|| {
            format!(
                "controller port matching '{}' is required",
                settings.device_filter
            )
        })?;

    let socket = UdpSocket::bind(("0.0.0.0", settings.listen_port))
        .await
        .with_context(|| format!("failed to bind UDP port {}", settings.listen_port))?;
    let socket = Arc::new(socket);
    let remote_addr = resolve_remote(&settings.remote_host, settings.remote_port).await?;

    let (remote_tx, remote_rx) = mpsc::unbounded_channel::<RemoteCommand>();
    remote_tx
        .send(RemoteCommand::Connect {
            listen_port: settings.listen_port,
        })
        .context("remote writer queue closed")?;
    let writer = spawn_writer(UdpLink::new(Arc::clone(&socket), remote_addr), remote_rx);
    let listener = spawn_listener(socket, scheduler.handle());
    info!(
        remote = %remote_addr,
        listen_port = settings.listen_port,
        device = device.port_name(),
        "bridge: running"
    );

    let timers = TokioTimers::new(scheduler.handle());
    let mut bridge =
        Bridge::with_quiet_window(device_tx, remote_tx, timers, settings.quiet_window());
    bridge.start();
    scheduler.run(&mut bridge, shutdown_signal()).await;

    listener.abort();
    drop(bridge);
    if let Err(err) = writer.await {
        warn!(%err, "bridge: remote writer task failed");
    }
    device.close().await;
    info!("bridge: stopped");
    Ok(())
}

async fn resolve_remote(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    lookup_host((host, port))
        .await
        .with_context(|| format!("failed to resolve remote host '{host}'"))?
        .next()
        .ok_or_else(|| anyhow!("remote host '{host}' resolved to no addresses"))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "bridge: failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
