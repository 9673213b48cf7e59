//! Single-round dealing and resolution.

use std::fmt;

use super::constants;
use super::entities::{Card, Deck, Hand};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundResult {
    NotOver,
    Tie,
    Loss,
    Win,
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::NotOver => "NOT_OVER",
            Self::Tie => "TIE",
            Self::Loss => "LOSS",
            Self::Win => "WIN",
        };
        write!(f, "{repr}")
    }
}

/// Final result of a round from the player's perspective. A player
/// bust takes precedence over everything else, then a dealer bust,
/// then the higher sum.
pub fn decide_result(player_sum: u8, dealer_sum: u8) -> RoundResult {
    if player_sum > constants::BUST_THRESHOLD {
        return RoundResult::Loss;
    }
    if dealer_sum > constants::BUST_THRESHOLD {
        return RoundResult::Win;
    }
    if player_sum > dealer_sum {
        return RoundResult::Win;
    }
    if player_sum < dealer_sum {
        return RoundResult::Loss;
    }
    RoundResult::Tie
}

/// Cards exposed by the initial deal. The dealer's second card stays
/// hidden until the player stands.
#[derive(Clone, Copy, Debug)]
pub struct InitialDeal {
    pub player_cards: [Card; 2],
    pub dealer_upcard: Card,
}

/// One round of blackjack between the dealer and a single player.
#[derive(Debug)]
pub struct Round {
    deck: Deck,
    player: Hand,
    dealer: Hand,
}

impl Round {
    /// Deals two cards to the player, then the dealer's upcard and
    /// hidden card, in that order.
    pub fn deal(mut deck: Deck) -> (Self, InitialDeal) {
        let mut player = Hand::default();
        let mut dealer = Hand::default();
        player.push(deck.deal_card());
        player.push(deck.deal_card());
        dealer.push(deck.deal_card());
        dealer.push(deck.deal_card());
        let initial = InitialDeal {
            player_cards: [player.cards()[0], player.cards()[1]],
            dealer_upcard: dealer.cards()[0],
        };
        let round = Self {
            deck,
            player,
            dealer,
        };
        (round, initial)
    }

    /// Deals one card to the player. The round ends immediately with a
    /// loss when the player busts, and the dealer never plays.
    pub fn player_hit(&mut self) -> (Card, RoundResult) {
        let card = self.deck.deal_card();
        self.player.push(card);
        let result = if self.player.sum() > constants::BUST_THRESHOLD {
            RoundResult::Loss
        } else {
            RoundResult::NotOver
        };
        (card, result)
    }

    /// Reveals the dealer's hidden card. The result is final when the
    /// dealer already stands at 17 or more.
    pub fn reveal_dealer(&self) -> (Card, RoundResult) {
        let hidden = self.dealer.cards()[1];
        (hidden, self.dealer_result())
    }

    /// Deals one card to the dealer. The result stays `NotOver` until
    /// the dealer reaches 17, at which point the round is decided.
    pub fn dealer_hit(&mut self) -> (Card, RoundResult) {
        let card = self.deck.deal_card();
        self.dealer.push(card);
        (card, self.dealer_result())
    }

    pub fn player_sum(&self) -> u8 {
        self.player.sum()
    }

    pub fn dealer_sum(&self) -> u8 {
        self.dealer.sum()
    }

    fn dealer_result(&self) -> RoundResult {
        if self.dealer.sum() >= constants::DEALER_STAND_MIN {
            decide_result(self.player.sum(), self.dealer.sum())
        } else {
            RoundResult::NotOver
        }
    }
}
