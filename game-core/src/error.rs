//! Error taxonomy for the coordination core (spec §7).
//!
//! Recoverable kinds (`ChannelClosed`, `AgentMisbehavior`, `InterruptedWait`)
//! are expected to be handled locally by callers and never bubble up to
//! `main`. `ResourceError` and `ChildSpawnError` are fatal for the arbiter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid argument: {0}")]
    ArgumentError(String),

    #[error("resource initialization failed: {0}")]
    ResourceError(#[from] std::io::Error),

    #[error("resource initialization failed: {0}")]
    ResourceErrorNix(#[from] nix::Error),

    #[error("failed to spawn child process: {0}")]
    ChildSpawnError(String),

    #[error("channel closed")]
    ChannelClosed,

    #[error("agent submitted an invalid move: {0}")]
    AgentMisbehavior(String),

    #[error("wait interrupted by a signal")]
    InterruptedWait,
}

pub type GameResult<T> = Result<T, GameError>;
