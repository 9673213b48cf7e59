//! LAN blackjack player.
//!
//! Listens for dealer offers over UDP broadcast, connects over TCP,
//! and plays the requested rounds interactively. After a session ends
//! (or a connect fails) the player goes straight back to listening.

mod console;

use std::io::{self, Write};

use anyhow::{Error, bail};
use console::ConsoleView;
use ctrlc::set_handler;
use lan_blackjack::{
    Session,
    discovery::{self, ListenerConfig},
    messages::Request,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Play LAN blackjack against a broadcasting dealer

USAGE:
  lbj_player [OPTIONS]

OPTIONS:
  --name       NAME        Player name sent to the dealer  [default: env LBJ_PLAYER_NAME or OS username]
  --rounds     N           Rounds per session, 1-255  [default: prompted]
  --expect     NAME        Dealer name to hold out for  [default: env LBJ_EXPECT_DEALER or \"lan-blackjack dealer\"]
  --offer-port PORT        UDP port offers arrive on  [default: env LBJ_OFFER_PORT or 13122]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  LBJ_PLAYER_NAME          Player name sent to the dealer
  LBJ_EXPECT_DEALER        Dealer name to hold out for
  LBJ_OFFER_PORT           UDP offer port
";

struct Args {
    name: String,
    rounds: Option<u8>,
    expect: String,
    offer_port: u16,
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
            std::env::var("LBJ_PLAYER_NAME").unwrap_or_else(|_| whoami::username())
        }),
        rounds: pargs.opt_value_from_str("--rounds").ok().flatten(),
        expect: pargs.value_from_str("--expect").unwrap_or_else(|_| {
            std::env::var("LBJ_EXPECT_DEALER")
                .unwrap_or_else(|_| discovery::DEFAULT_DEALER_NAME.to_string())
        }),
        offer_port: pargs.value_from_str("--offer-port").unwrap_or_else(|_| {
            std::env::var("LBJ_OFFER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(discovery::OFFER_PORT)
        }),
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let rounds = match args.rounds.filter(|&n| n >= 1) {
        Some(rounds) => rounds,
        None => ask_rounds()?,
    };
    let request = Request::new(rounds, &args.name)?;

    let config = ListenerConfig {
        offer_port: args.offer_port,
        expected_name: Some(args.expect),
        ..ListenerConfig::default()
    };

    loop {
        println!(
            "Client started, listening for offer requests on UDP {}...",
            config.offer_port
        );
        let dealer = discovery::listen_for_offer(&config)?;
        println!(
            "Received offer from {} (server_name={}, tcp_port={})",
            dealer.addr.ip(),
            dealer.server_name,
            dealer.addr.port()
        );

        let session = match Session::connect(&dealer.addr, &request) {
            Ok(session) => {
                info!("Connected to {} at {}", dealer.server_name, dealer.addr);
                session
            }
            Err(error) => {
                println!(
                    "Failed to connect to {} ({error}). Looking for another offer...",
                    dealer.addr
                );
                continue;
            }
        };
        println!("Sent TCP request: rounds={rounds}, client_name={}", request.client_name);

        let tally = session.play(&mut ConsoleView);
        println!(
            "\nFinished playing {} rounds, win rate: {:.3} (W={}, L={}, T={})\n",
            tally.rounds(),
            tally.win_rate(),
            tally.wins,
            tally.losses,
            tally.ties
        );
        // Back to discovery right away.
    }
}

/// Prompts for the round count until a number in 1..=255 arrives.
fn ask_rounds() -> Result<u8, Error> {
    loop {
        print!("How many rounds to play each session (1-255)? ");
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            bail!("stdin closed before a round count was given");
        }
        match input.trim().parse::<u8>() {
            Ok(rounds) if rounds >= 1 => return Ok(rounds),
            _ => println!("Please enter a number between 1 and 255."),
        }
    }
}
