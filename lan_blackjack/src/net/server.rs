//! The dealer's TCP serving loop.
//!
//! Each accepted connection gets its own thread and plays one full
//! session: a request handshake, then the requested number of rounds.

use log::{error, info, warn};
use std::{
    io::{self, Read},
    net::{TcpListener, TcpStream},
    thread,
    time::Duration,
};

use super::{
    super::game::{
        entities::Deck,
        round::{Round, RoundResult},
    },
    errors::WireError,
    messages::{CardMessage, Decision, Request},
    wire::{self, WireMessage},
};

/// How long a freshly accepted connection gets to send its request
/// (20 seconds)
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

/// How long the dealer waits for each hit-or-stand decision
/// (120 seconds)
pub const DECISION_TIMEOUT: Duration = Duration::from_secs(120);

/// Name booked for players whose request arrived as plain text.
pub const UNKNOWN_TEXT_CLIENT: &str = "UnknownTextClient";

/// Accepts connections forever, one thread per player.
pub fn serve(listener: TcpListener) -> io::Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                thread::spawn(move || handle_connection(stream));
            }
            Err(error) => error!("Failed to accept connection: {error}"),
        }
    }
    Ok(())
}

fn handle_connection(mut stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown peer".to_string());
    info!("Connection from {peer}");

    let request = match read_request(&mut stream) {
        Ok(Some(request)) => request,
        Ok(None) => {
            warn!("No valid request from {peer}, closing");
            return;
        }
        Err(error) => {
            warn!("Request from {peer} failed: {error}");
            return;
        }
    };
    info!("{request} from {peer}");

    match run_session(&mut stream, &request) {
        Ok(()) => info!(
            "Finished {} round(s) with {}",
            request.rounds, request.client_name
        ),
        Err(error) => warn!("Session with {} ended early: {error}", request.client_name),
    }
}

/// Reads the session request: a 38-byte binary frame, or a plain text
/// line like "3\n" from clients that never learned the codec.
fn read_request(stream: &mut TcpStream) -> io::Result<Option<Request>> {
    stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
    let mut buf = [0u8; Request::WIRE_SIZE];
    match stream.read_exact(&mut buf) {
        Ok(()) => {}
        Err(error)
            if matches!(
                error.kind(),
                io::ErrorKind::WouldBlock
                    | io::ErrorKind::TimedOut
                    | io::ErrorKind::UnexpectedEof
            ) =>
        {
            return Ok(None);
        }
        Err(error) => return Err(error),
    }
    match Request::decode(&buf) {
        Ok(request) => Ok(Some(request)),
        Err(_) => Ok(read_text_request(stream, &buf)),
    }
}

/// Treats an undecodable request frame as the start of a text line and
/// books the player under a placeholder name.
fn read_text_request(stream: &mut TcpStream, first: &[u8]) -> Option<Request> {
    let mut text = String::from_utf8_lossy(first).into_owned();
    let mut chunk = [0u8; 32];
    while !text.contains('\n') && text.len() < 128 {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => text.push_str(&String::from_utf8_lossy(&chunk[..n])),
        }
    }
    let rounds = text.split_whitespace().next()?.parse::<u8>().ok()?;
    Request::new(rounds, UNKNOWN_TEXT_CLIENT).ok()
}

fn run_session(stream: &mut TcpStream, request: &Request) -> io::Result<()> {
    for round in 1..=request.rounds {
        info!(
            "Round {round}/{} with {}",
            request.rounds, request.client_name
        );
        play_round(stream)?;
    }
    Ok(())
}

/// Plays one round on the connection: initial deal, the player's
/// decisions, then the dealer's reveal and draws.
fn play_round(stream: &mut TcpStream) -> io::Result<()> {
    let mut deck = Deck::default();
    deck.shuffle();
    let (mut round, initial) = Round::deal(deck);

    for card in initial.player_cards {
        wire::write_message(stream, &CardMessage::new(RoundResult::NotOver, card))?;
    }
    wire::write_message(
        stream,
        &CardMessage::new(RoundResult::NotOver, initial.dealer_upcard),
    )?;

    stream.set_read_timeout(Some(DECISION_TIMEOUT))?;
    loop {
        match read_decision(stream)? {
            Decision::Hit => {
                let (card, result) = round.player_hit();
                wire::write_message(stream, &CardMessage::new(result, card))?;
                if result != RoundResult::NotOver {
                    info!("Round over: {result} (player bust at {})", round.player_sum());
                    return Ok(());
                }
            }
            Decision::Stand => break,
        }
    }

    let (hidden, reveal) = round.reveal_dealer();
    wire::write_message(stream, &CardMessage::new(reveal, hidden))?;
    let mut result = reveal;
    while result == RoundResult::NotOver {
        let (card, next) = round.dealer_hit();
        wire::write_message(stream, &CardMessage::new(next, card))?;
        result = next;
    }
    info!(
        "Round over: {result} (player {}, dealer {})",
        round.player_sum(),
        round.dealer_sum()
    );
    Ok(())
}

/// Reads decisions until one is recognized. An unknown token in a
/// well-formed frame is logged and skipped; anything else kills the
/// connection.
fn read_decision(stream: &mut TcpStream) -> io::Result<Decision> {
    loop {
        let mut buf = [0u8; Decision::WIRE_SIZE];
        stream.read_exact(&mut buf)?;
        match Decision::decode(&buf) {
            Ok(decision) => return Ok(decision),
            Err(WireError::UnrecognizedDecision) => {
                warn!("Ignoring unrecognized decision token");
            }
            Err(error) => return Err(io::Error::new(io::ErrorKind::InvalidData, error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::SocketAddr;

    use super::*;
    use crate::game::round::decide_result;

    fn start_server() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || serve(listener));
        addr
    }

    fn connect(addr: SocketAddr) -> TcpStream {
        let stream = TcpStream::connect(addr).unwrap();
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .unwrap();
        stream
    }

    /// Reads the three initial cards and returns the player's sum and
    /// the upcard value.
    fn read_initial_deal(stream: &mut TcpStream) -> (u8, u8) {
        let mut own_sum = 0u8;
        for _ in 0..2 {
            let msg: CardMessage = wire::read_message(stream).unwrap();
            assert_eq!(msg.result, RoundResult::NotOver);
            own_sum = own_sum.saturating_add(msg.card.value());
        }
        let upcard: CardMessage = wire::read_message(stream).unwrap();
        assert_eq!(upcard.result, RoundResult::NotOver);
        (own_sum, upcard.card.value())
    }

    #[test]
    fn serves_stand_round_consistently() {
        let addr = start_server();
        let mut stream = connect(addr);

        wire::write_message(&mut stream, &Request::new(1, "tester").unwrap()).unwrap();
        let (own_sum, upcard_value) = read_initial_deal(&mut stream);

        wire::write_message(&mut stream, &Decision::Stand).unwrap();

        // Reveal plus draws until a terminal result.
        let mut dealer_sum = upcard_value;
        let mut last = RoundResult::NotOver;
        while last == RoundResult::NotOver {
            let msg: CardMessage = wire::read_message(&mut stream).unwrap();
            dealer_sum = dealer_sum.saturating_add(msg.card.value());
            last = msg.result;
        }
        assert!(dealer_sum >= 17);
        assert_eq!(last, decide_result(own_sum, dealer_sum));
    }

    #[test]
    fn hitting_forever_always_busts() {
        let addr = start_server();
        let mut stream = connect(addr);

        wire::write_message(&mut stream, &Request::new(1, "hitter").unwrap()).unwrap();
        let (mut sum, _) = read_initial_deal(&mut stream);

        let mut result = RoundResult::NotOver;
        let mut hits = 0;
        while result == RoundResult::NotOver && hits < 20 {
            wire::write_message(&mut stream, &Decision::Hit).unwrap();
            let msg: CardMessage = wire::read_message(&mut stream).unwrap();
            sum = sum.saturating_add(msg.card.value());
            result = msg.result;
            hits += 1;
        }
        assert_eq!(result, RoundResult::Loss);
        assert!(sum > 21);
    }

    #[test]
    fn plays_all_requested_rounds() {
        let addr = start_server();
        let mut stream = connect(addr);

        wire::write_message(&mut stream, &Request::new(3, "grinder").unwrap()).unwrap();
        for _ in 0..3 {
            read_initial_deal(&mut stream);
            wire::write_message(&mut stream, &Decision::Stand).unwrap();
            let mut last = RoundResult::NotOver;
            while last == RoundResult::NotOver {
                let msg: CardMessage = wire::read_message(&mut stream).unwrap();
                last = msg.result;
            }
        }

        // Session complete; dealer hangs up.
        let mut buf = [0u8; 1];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn accepts_text_request() {
        let addr = start_server();
        let mut stream = connect(addr);

        // A text line padded out to the binary frame width.
        let mut line = b"1\n".to_vec();
        line.resize(Request::WIRE_SIZE, b' ');
        stream.write_all(&line).unwrap();

        let msg: CardMessage = wire::read_message(&mut stream).unwrap();
        assert_eq!(msg.result, RoundResult::NotOver);
    }

    #[test]
    fn closes_on_invalid_request() {
        let addr = start_server();
        let mut stream = connect(addr);

        let mut garbage = vec![b'x'; Request::WIRE_SIZE - 1];
        garbage.push(b'\n');
        stream.write_all(&garbage).unwrap();

        // Neither binary nor a text round count, so the dealer hangs
        // up without dealing.
        let mut buf = [0u8; 1];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn skips_unknown_decision_tokens() {
        let addr = start_server();
        let mut stream = connect(addr);

        wire::write_message(&mut stream, &Request::new(1, "typo").unwrap()).unwrap();
        read_initial_deal(&mut stream);

        let mut frame = Decision::Stand.encode();
        frame[5..].copy_from_slice(b"Foldd");
        stream.write_all(&frame).unwrap();
        wire::write_message(&mut stream, &Decision::Stand).unwrap();

        let mut last = RoundResult::NotOver;
        while last == RoundResult::NotOver {
            let msg: CardMessage = wire::read_message(&mut stream).unwrap();
            last = msg.result;
        }
        assert_ne!(last, RoundResult::NotOver);
    }

    #[test]
    fn aborts_on_malformed_decision_frame() {
        let addr = start_server();
        let mut stream = connect(addr);

        wire::write_message(&mut stream, &Request::new(1, "mangler").unwrap()).unwrap();
        read_initial_deal(&mut stream);

        stream.write_all(&[0u8; Decision::WIRE_SIZE]).unwrap();

        let mut buf = [0u8; 1];
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
    }
}
