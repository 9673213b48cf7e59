//! # LAN Blackjack
//!
//! A LAN blackjack implementation: dealers announce themselves over
//! UDP broadcast, players discover them and play hit-or-stand rounds
//! over a fixed-layout binary TCP protocol.
//!
//! Each frame opens with a magic cookie and a type tag, so both sides
//! always know exactly how many bytes to read next. The dealer serves
//! every player on its own thread; the player side is a blocking
//! session that drives a [`net::client::TableView`].
//!
//! ## House Rules
//!
//! - An ace always counts as 11, face cards count as 10.
//! - The player hits or stands; a bust loses immediately.
//! - The dealer reveals its hidden card after the player stands, then
//!   draws until reaching 17 or busting.
//!
//! ## Core Modules
//!
//! - [`game`]: Deck handling, round flow, and result resolution
//! - [`net`]: Discovery, wire codec, dealer loop, and player session
//!
//! ## Example
//!
//! ```
//! use lan_blackjack::{Deck, Round, RoundResult};
//!
//! let mut deck = Deck::default();
//! deck.shuffle();
//!
//! let (mut round, initial) = Round::deal(deck);
//! println!(
//!     "You hold {} and {}, the dealer shows {}",
//!     initial.player_cards[0], initial.player_cards[1], initial.dealer_upcard,
//! );
//!
//! // Stand right away and let the dealer draw.
//! let (_, mut result) = round.reveal_dealer();
//! while result == RoundResult::NotOver {
//!     (_, result) = round.dealer_hit();
//! }
//! println!("{result}");
//! ```

/// Networking components for dealer-player communication.
pub mod net;
pub use net::{
    client::{Session, SessionTally, TableView},
    discovery, errors, messages, server, wire,
};

/// Core game logic and entities.
pub mod game;
pub use game::{
    constants,
    entities::{self, Card, Deck, Suit},
    round::{Round, RoundResult, decide_result},
};
