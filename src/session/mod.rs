//! Session-oriented host API.
//!
//! A [`crate::Player`] ties one embedded surface to its request multiplexer and event
//! dispatcher.

pub(crate) mod bridge;
pub(crate) mod inbox;
pub(crate) mod player;
