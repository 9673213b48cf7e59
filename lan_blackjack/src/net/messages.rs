use std::fmt;

use super::super::game::{
    entities::{Card, Suit},
    round::RoundResult,
};
use super::errors::WireError;

/// Fixed width of the name field carried by offer and request frames.
pub const NAME_LEN: usize = 32;

/// Width of the decision token field.
pub const TOKEN_LEN: usize = 5;

/// Cuts a display name at the first NUL and truncates it to at most
/// `NAME_LEN` bytes on a character boundary, so the name survives a
/// trip through the wire unchanged.
fn normalize_name(name: &str) -> String {
    let name = match name.find('\0') {
        Some(at) => &name[..at],
        None => name,
    };
    let mut cut = name.len().min(NAME_LEN);
    while !name.is_char_boundary(cut) {
        cut -= 1;
    }
    name[..cut].to_string()
}

/// A dealer advertisement, broadcast over UDP while the dealer waits
/// for players.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Offer {
    /// TCP port the dealer accepts sessions on.
    pub tcp_port: u16,
    /// Dealer's display name, at most `NAME_LEN` bytes.
    pub server_name: String,
}

impl Offer {
    pub fn new(tcp_port: u16, server_name: &str) -> Self {
        Self {
            tcp_port,
            server_name: normalize_name(server_name),
        }
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (TCP port {})", self.server_name, self.tcp_port)
    }
}

/// A session request, sent by a player right after connecting.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    /// Number of rounds the player wants to play, at least 1.
    pub rounds: u8,
    /// Player's display name, at most `NAME_LEN` bytes.
    pub client_name: String,
}

impl Request {
    pub fn new(rounds: u8, client_name: &str) -> Result<Self, WireError> {
        if rounds == 0 {
            return Err(WireError::ZeroRounds);
        }
        Ok(Self {
            rounds,
            client_name: normalize_name(client_name),
        })
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} requesting {} round(s)", self.client_name, self.rounds)
    }
}

/// A player's move, carried on the wire as a fixed five-byte token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Hit,
    Stand,
}

impl Decision {
    pub fn token(&self) -> &'static [u8; TOKEN_LEN] {
        match self {
            Self::Hit => b"Hittt",
            Self::Stand => b"Stand",
        }
    }

    pub fn from_token(token: &[u8; TOKEN_LEN]) -> Result<Self, WireError> {
        match token {
            b"Hittt" => Ok(Self::Hit),
            b"Stand" => Ok(Self::Stand),
            _ => Err(WireError::UnrecognizedDecision),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hit => "Hit",
            Self::Stand => "Stand",
        };
        write!(f, "{repr}")
    }
}

/// One dealt card along with the round state after it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CardMessage {
    /// Round state after this card. `NotOver` means more cards or
    /// another decision follow.
    pub result: RoundResult,
    pub card: Card,
}

impl CardMessage {
    pub fn new(result: RoundResult, card: Card) -> Self {
        Self { result, card }
    }
}

impl fmt::Display for CardMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.card, self.result)
    }
}

impl From<Suit> for u8 {
    fn from(suit: Suit) -> Self {
        match suit {
            Suit::Heart => 0,
            Suit::Diamond => 1,
            Suit::Club => 2,
            Suit::Spade => 3,
        }
    }
}

impl TryFrom<u8> for Suit {
    type Error = WireError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Heart),
            1 => Ok(Self::Diamond),
            2 => Ok(Self::Club),
            3 => Ok(Self::Spade),
            code => Err(WireError::SuitOutOfRange(code)),
        }
    }
}

impl From<RoundResult> for u8 {
    fn from(result: RoundResult) -> Self {
        match result {
            RoundResult::NotOver => 0,
            RoundResult::Tie => 1,
            RoundResult::Loss => 2,
            RoundResult::Win => 3,
        }
    }
}

impl TryFrom<u8> for RoundResult {
    type Error = WireError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::NotOver),
            1 => Ok(Self::Tie),
            2 => Ok(Self::Loss),
            3 => Ok(Self::Win),
            code => Err(WireError::ResultOutOfRange(code)),
        }
    }
}
