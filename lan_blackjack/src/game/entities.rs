use rand::{rng, seq::SliceRandom};
use std::fmt;

use super::constants;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Suit {
    Heart,
    Diamond,
    Club,
    Spade,
}

impl Suit {
    /// All four suits, in wire-encoding order.
    pub const ALL: [Suit; 4] = [Suit::Heart, Suit::Diamond, Suit::Club, Suit::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Heart => "H",
            Self::Diamond => "D",
            Self::Club => "C",
            Self::Spade => "S",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card ranks.
pub type Rank = u8;

/// A card is a tuple of a uInt8 rank (ace=1u8, jack=11u8, queen=12u8,
/// king=13u8) and a suit.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Card(pub Rank, pub Suit);

impl Card {
    /// Blackjack value of the card. An ace always counts as 11 and
    /// face cards count as 10.
    pub fn value(&self) -> u8 {
        match self.0 {
            1 => 11,
            r @ 2..=10 => r,
            _ => 10,
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rank = match self.0 {
            1 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            r => &r.to_string(),
        };
        write!(f, "{rank}{}", self.1)
    }
}

#[derive(Debug)]
pub struct Deck {
    cards: [Card; constants::DECK_SIZE],
    pub deck_idx: usize,
}

impl Deck {
    pub fn deal_card(&mut self) -> Card {
        let card = self.cards[self.deck_idx];
        self.deck_idx += 1;
        card
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rng());
        self.deck_idx = 0;
    }
}

impl Default for Deck {
    fn default() -> Self {
        let mut cards: [Card; constants::DECK_SIZE] = [Card(1, Suit::Heart); constants::DECK_SIZE];
        for (i, rank) in (1u8..=13u8).enumerate() {
            for (j, suit) in Suit::ALL.into_iter().enumerate() {
                cards[4 * i + j] = Card(rank, suit);
            }
        }
        Self { cards, deck_idx: 0 }
    }
}

impl From<[Card; constants::DECK_SIZE]> for Deck {
    fn from(cards: [Card; constants::DECK_SIZE]) -> Self {
        Self { cards, deck_idx: 0 }
    }
}

/// Cards held by one side of the table along with their running sum.
#[derive(Debug, Default)]
pub struct Hand {
    cards: Vec<Card>,
    sum: u8,
}

impl Hand {
    pub fn push(&mut self, card: Card) {
        self.sum = self.sum.saturating_add(card.value());
        self.cards.push(card);
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn sum(&self) -> u8 {
        self.sum
    }
}
