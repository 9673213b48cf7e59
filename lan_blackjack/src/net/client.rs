//! A blocking TCP blackjack player session.
//!
//! The session is synchronous and reports everything the dealer sends
//! through a [`TableView`], so the same loop backs the interactive
//! console and scripted tests.

use anyhow::Error;
use log::warn;
use std::{
    net::{SocketAddr, TcpStream},
    time::Duration,
};

use super::{
    super::game::{entities::Card, round::RoundResult},
    messages::{CardMessage, Decision, Request},
    wire,
};

/// Default timeout for the initial TCP connect (3 seconds)
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default timeout for reading from the dealer (15 seconds)
pub const READ_TIMEOUT: Duration = Duration::from_secs(15);

/// Default timeout for writing to the dealer (1 second)
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Callbacks a session drives while playing. Implementations render
/// the table and pick hit or stand.
pub trait TableView {
    /// A new round is starting (1-based `round` out of `rounds`).
    fn round_started(&mut self, round: u8, rounds: u8);
    /// The player was dealt or drew a card; `sum` is the hand total.
    fn own_card(&mut self, card: Card, sum: u8);
    /// The dealer showed a card.
    fn dealer_card(&mut self, card: Card);
    /// The player must decide.
    fn choose(&mut self) -> Decision;
    /// The round finished.
    fn round_over(&mut self, result: RoundResult);
}

/// Round outcomes accumulated over one session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SessionTally {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl SessionTally {
    fn record(&mut self, result: RoundResult) {
        match result {
            RoundResult::Win => self.wins += 1,
            RoundResult::Loss => self.losses += 1,
            RoundResult::Tie => self.ties += 1,
            RoundResult::NotOver => {}
        }
    }

    /// Number of rounds that reached a result.
    pub fn rounds(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// Fraction of finished rounds won. Zero when nothing finished.
    pub fn win_rate(&self) -> f64 {
        if self.rounds() == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.rounds())
    }
}

/// A blocking session against one dealer.
pub struct Session {
    rounds: u8,
    stream: TcpStream,
}

impl Session {
    /// Connects to a dealer and sends the session request. A single
    /// attempt only; on failure the caller goes back to discovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the dealer is unreachable or the request
    /// cannot be written.
    pub fn connect(addr: &SocketAddr, request: &Request) -> Result<Self, Error> {
        let mut stream = TcpStream::connect_timeout(addr, CONNECT_TIMEOUT)?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
        wire::write_message(&mut stream, request)?;
        Ok(Self {
            rounds: request.rounds,
            stream,
        })
    }

    /// Plays all requested rounds, driving `view`. A transport fault
    /// ends the session early; the tally covers only finished rounds.
    pub fn play(mut self, view: &mut dyn TableView) -> SessionTally {
        let mut tally = SessionTally::default();
        for round in 1..=self.rounds {
            view.round_started(round, self.rounds);
            match self.play_round(view) {
                Ok(result) => {
                    tally.record(result);
                    view.round_over(result);
                }
                Err(error) => {
                    warn!("Session ended early in round {round}: {error}");
                    break;
                }
            }
        }
        tally
    }

    fn play_round(&mut self, view: &mut dyn TableView) -> Result<RoundResult, Error> {
        let mut sum = 0u8;

        // Two own cards, then the dealer's upcard. All three carry a
        // not-over result.
        for _ in 0..2 {
            let msg: CardMessage = wire::read_message(&mut self.stream)?;
            sum = sum.saturating_add(msg.card.value());
            view.own_card(msg.card, sum);
        }
        let msg: CardMessage = wire::read_message(&mut self.stream)?;
        view.dealer_card(msg.card);

        // Hit until standing or a terminal result arrives.
        loop {
            match view.choose() {
                Decision::Hit => {
                    wire::write_message(&mut self.stream, &Decision::Hit)?;
                    let msg: CardMessage = wire::read_message(&mut self.stream)?;
                    sum = sum.saturating_add(msg.card.value());
                    view.own_card(msg.card, sum);
                    if msg.result != RoundResult::NotOver {
                        return Ok(msg.result);
                    }
                }
                Decision::Stand => {
                    wire::write_message(&mut self.stream, &Decision::Stand)?;
                    break;
                }
            }
        }

        // Dealer reveals and draws until the result is final.
        loop {
            let msg: CardMessage = wire::read_message(&mut self.stream)?;
            view.dealer_card(msg.card);
            if msg.result != RoundResult::NotOver {
                return Ok(msg.result);
            }
        }
    }
}
