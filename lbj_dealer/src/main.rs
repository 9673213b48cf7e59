//! LAN blackjack dealer.
//!
//! Binds a TCP listener on an OS-assigned port, announces it over UDP
//! broadcast once a second, and serves every player that connects on
//! its own thread.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, UdpSocket};

use anyhow::Error;
use ctrlc::set_handler;
use lan_blackjack::{discovery, messages::Offer, server};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a LAN blackjack dealer

USAGE:
  lbj_dealer [OPTIONS]

OPTIONS:
  --name       NAME        Dealer name announced in offers  [default: env LBJ_DEALER_NAME or \"lan-blackjack dealer\"]
  --offer-port PORT        UDP port offers are broadcast on  [default: env LBJ_OFFER_PORT or 13122]
  --broadcast  IP:PORT     Extra directed broadcast address  [default: env LBJ_BROADCAST or none]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  LBJ_DEALER_NAME          Dealer name announced in offers
  LBJ_OFFER_PORT           UDP offer port
  LBJ_BROADCAST            Directed broadcast address (e.g., 192.168.1.255:13122)
";

struct Args {
    name: String,
    offer_port: u16,
    broadcast: Option<SocketAddr>,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        name: pargs.value_from_str("--name").unwrap_or_else(|_| {
            std::env::var("LBJ_DEALER_NAME")
                .unwrap_or_else(|_| discovery::DEFAULT_DEALER_NAME.to_string())
        }),
        offer_port: pargs.value_from_str("--offer-port").unwrap_or_else(|_| {
            std::env::var("LBJ_OFFER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(discovery::OFFER_PORT)
        }),
        broadcast: pargs
            .opt_value_from_str("--broadcast")
            .ok()
            .flatten()
            .or_else(|| std::env::var("LBJ_BROADCAST").ok().and_then(|v| v.parse().ok())),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    let tcp_port = listener.local_addr()?.port();
    info!(
        "Server started, listening on IP address {}, TCP port {tcp_port}",
        local_ip()
    );

    let offer = Offer::new(tcp_port, &args.name);
    let _broadcaster = discovery::spawn_broadcaster(&offer, args.offer_port, args.broadcast)?;
    info!(
        "Broadcasting {offer} on UDP port {}. Press Ctrl+C to stop.",
        args.offer_port
    );

    server::serve(listener)?;

    Ok(())
}

/// Best-effort local address for the startup banner. Connecting a UDP
/// socket picks the outbound interface without sending anything.
fn local_ip() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect(("8.8.8.8", 80))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
