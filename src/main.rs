mod cli;
mod core;
mod error;
mod logging;

use clap::Parser;
use cli::Args;
use core::Core;
use dnsrelay_cache::CacheFacade;
use dnsrelay_server::{Transport, UdpEndpoint};
use error::RelayError;
use std::time::Duration;

async fn run(args: Args) -> Result<(), RelayError> {
    logging::init(args.log.as_deref(), args.log_mask).map_err(|source| RelayError::LogFileOpen {
            path: args.log.clone().unwrap_or_default(),
            source,
        })?;

    tracing::info!("preparing dnsrelay");

    let mut cache = CacheFacade::new();
    let hosts_text = std::fs::read_to_string(&args.hosts).map_err(|source| RelayError::HostsFileOpen {
            path: args.hosts.clone(),
            source,
        })?;
    let malformed = cache.load_hosts(&hosts_text);
    for error in &malformed {
        tracing::error!("malformed hosts line: {error}");
    }
    tracing::info!("loaded hosts file {:?} ({} malformed lines skipped)", args.hosts, malformed.len());

    let server = UdpEndpoint::bind(args.server_addr)
    .await
    .map_err(|source| RelayError::Bind { addr: args.server_addr, source })?;
    // ephemeral local port — only this relay ever reads the replies landing here.
    let client_bind: std::net::SocketAddr = "0.0.0.0:0".parse().unwrap();
    let client = UdpEndpoint::bind(client_bind)
    .await
    .map_err(|source| RelayError::Bind { addr: client_bind, source })?;

    tracing::info!("listening on {:?}, forwarding misses to {:?}", args.server_addr, args.upstream_addr());

    let mut core = Core::new(
        cache,
        Duration::from_secs(args.timeout_secs),
        args.retries,
        args.upstream_addr(),
    );
    core.run(&server as &dyn Transport, &client as &dyn Transport).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(error) = run(args).await {
        eprintln!("dnsrelay: {error}");
        std::process::exit(error.exit_code());
    }
}
