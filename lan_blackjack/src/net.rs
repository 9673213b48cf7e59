//! Networking layer for dealer-player communication.
//!
//! This module provides UDP offer discovery plus TCP gameplay over a
//! fixed-layout binary protocol. The dealer serves each player on its
//! own thread.

/// Blocking TCP session for playing against a dealer.
pub mod client;

/// UDP offer broadcasting and discovery.
pub mod discovery;

/// Error types for wire codec operations.
pub mod errors;

/// Message types for the discovery and gameplay protocol.
pub mod messages;

/// Thread-per-connection dealer loop.
pub mod server;

/// Fixed-layout binary encoding and framing.
pub mod wire;
