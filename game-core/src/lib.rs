//! Cross-process coordination core for the territory arbiter game.
//!
//! This crate holds everything that must agree bit-for-bit across the
//! arbiter, agent and observer processes: the shared-region layouts, the
//! shared-memory handle, the writer-preferring rw-lock, the observer
//! rendezvous and the per-agent move tokens. The game rules built on top of
//! these primitives live in the three binary crates.

pub mod board;
pub mod constants;
pub mod error;
pub mod layout;
pub mod movetoken;
pub mod region;
pub mod rendezvous;
pub mod rwlock;
mod sem;

pub use error::{GameError, GameResult};
pub use layout::{AgentRecord, GameState, GameSync};
pub use region::SharedRegion;
pub use rwlock::StateLock;
