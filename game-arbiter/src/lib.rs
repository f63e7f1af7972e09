//! Arbiter library: everything `src/main.rs` wires up, exposed so the
//! integration tests in `tests/` can drive a full game without shelling out
//! to the `game-arbiter` binary itself.

pub mod arbiter;
pub mod cli;
pub mod init;
pub mod resources;
pub mod roundrobin;

pub use arbiter::run_game;
pub use cli::{Args, ResolvedArgs};

use game_core::error::GameError;

/// Maps a top-level error to the process exit code in SPEC_FULL.md §6.
pub fn exit_code_for(err: &GameError) -> i32 {
    match err {
        GameError::ArgumentError(_) => 1,
        GameError::ResourceError(_) | GameError::ResourceErrorNix(_) => 2,
        GameError::ChildSpawnError(_) => 3,
        GameError::ChannelClosed | GameError::AgentMisbehavior(_) | GameError::InterruptedWait => 1,
    }
}
