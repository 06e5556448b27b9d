use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use tandem_netd::{OccupiedPolicy, RelayConfig, RoomRouter, net::ws::run_ws_listener};
use tandem_netproto::constants::{DEFAULT_MAX_PAYLOAD, DEFAULT_RELAY_PORT};

/// Tandem room relay
#[derive(Parser, Debug)]
#[command(name = "tandem-netd")]
#[command(about = "Two-seat room relay for tandem pedal sessions", long_about = None)]
struct Args {
    /// WebSocket bind address
    #[arg(short, long, default_value_t = SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_RELAY_PORT)))]
    bind: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    /// Maximum inbound message size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    max_payload: usize,

    /// Per-connection outbound queue depth
    #[arg(long, default_value_t = 256)]
    outbound_queue: usize,

    /// What to do when a role that is already seated joins again
    #[arg(long, value_enum, default_value_t = OccupiedPolicy::Reject)]
    occupied_policy: OccupiedPolicy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if args.max_payload == 0 || args.outbound_queue == 0 {
        anyhow::bail!("--max-payload and --outbound-queue must be greater than zero");
    }

    let config = RelayConfig {
        max_payload: args.max_payload,
        outbound_queue: args.outbound_queue,
        occupied_policy: args.occupied_policy,
    };

    info!("Relay starting on {}", args.bind);
    info!("Log level: {}", args.log_level);
    info!("Occupied seat policy: {:?}", config.occupied_policy);

    run_ws_listener(args.bind, Arc::new(RoomRouter::new()), config).await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_come_from_protocol_constants() {
        let args = Args::try_parse_from(["tandem-netd"]).unwrap();
        assert_eq!(args.bind.port(), DEFAULT_RELAY_PORT);
        assert!(args.bind.ip().is_unspecified());
        assert_eq!(args.max_payload, DEFAULT_MAX_PAYLOAD);
        assert_eq!(args.occupied_policy, OccupiedPolicy::Reject);
    }
}
