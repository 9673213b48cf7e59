//! Blackjack game engine - deck handling and round resolution.
//!
//! This module provides the table-side game implementation including:
//! - Standard 52-card deck with cursor-based dealing
//! - Hit/stand round flow for a single player versus the dealer
//! - Result resolution from the player's perspective

// Submodules
pub mod constants;
pub mod entities;
pub mod round;
