//! Farkle rules engine: dice, scoring, the two-player turn state machine and
//! the per-channel game store, plus the wire protocol the server speaks.

pub mod dice;
pub mod game;
pub mod player;
pub mod protocol;
pub mod scoring;
pub mod store;
