//! Per-agent move tokens (spec §4.4).
//!
//! Each agent's token is a one-slot ticket: the agent waits on it before
//! submitting a move, and only the arbiter ever posts it, after consuming
//! and validating that move. This bounds the number of in-flight moves per
//! agent to one.

use crate::constants::MAX_AGENTS;
use crate::layout::GameSync;

/// The arbiter's handle on agent `idx`'s token: posts only.
pub struct MoveTokenPoster<'a> {
    sync: &'a GameSync,
    idx: usize,
}

impl<'a> MoveTokenPoster<'a> {
    pub fn new(sync: &'a GameSync, idx: usize) -> Self {
        assert!(idx < MAX_AGENTS);
        Self { sync, idx }
    }

    /// Re-enables agent `idx` to submit its next move.
    pub fn post(&self) {
        unsafe {
            self.sync.move_token[self.idx].post();
        }
    }
}

/// An agent's handle on its own token: waits only. Agents never post their
/// own token (spec §4.6: "The agent never posts its own move token").
pub struct MoveTokenWaiter<'a> {
    sync: &'a GameSync,
    idx: usize,
}

impl<'a> MoveTokenWaiter<'a> {
    pub fn new(sync: &'a GameSync, idx: usize) -> Self {
        assert!(idx < MAX_AGENTS);
        Self { sync, idx }
    }

    /// Blocks until the arbiter re-enables this agent's token.
    pub fn wait(&self) {
        unsafe {
            self.sync.move_token[self.idx].wait();
        }
    }
}
