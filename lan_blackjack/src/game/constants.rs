//! Table rule constants shared by the dealer and player sides.

/// Hand sums above this value are busts (21)
pub const BUST_THRESHOLD: u8 = 21;

/// The dealer keeps drawing until reaching at least this sum (17)
pub const DEALER_STAND_MIN: u8 = 17;

/// Number of cards in a standard deck
pub const DECK_SIZE: usize = 52;
