//! Fixed sizes and names shared by every participant.
//!
//! These values are part of the cross-process layout contract (spec §3):
//! every binary in the workspace links against this crate, so they can
//! never drift between the arbiter, the agents and the observer.

/// Maximum number of agents a single game can seat.
pub const MAX_AGENTS: usize = 9;

/// Length of an agent's nul-padded display name.
pub const AGENT_NAME_LEN: usize = 16;

/// Largest board width this layout can represent without resizing the
/// fixed-capacity `board` array. See SPEC_FULL.md §9 "Fixed-capacity board".
pub const MAX_WIDTH: usize = 64;

/// Largest board height this layout can represent.
pub const MAX_HEIGHT: usize = 64;

/// Total number of board cells the `State` region reserves.
pub const MAX_CELLS: usize = MAX_WIDTH * MAX_HEIGHT;

/// Minimum board width accepted on the command line.
pub const MIN_WIDTH: u16 = 10;

/// Minimum board height accepted on the command line.
pub const MIN_HEIGHT: u16 = 10;

/// Default board width.
pub const DEFAULT_WIDTH: u16 = 10;

/// Default board height.
pub const DEFAULT_HEIGHT: u16 = 10;

/// Default delay, in milliseconds, the arbiter sleeps after each observer
/// rendezvous.
pub const DEFAULT_DISPLAY_DELAY_MS: u64 = 200;

/// Default liveness timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Name of the POSIX shared memory object backing the `State` region.
pub const STATE_SHM_NAME: &str = "/game_state";

/// Name of the POSIX shared memory object backing the `Sync` region.
pub const SYNC_SHM_NAME: &str = "/game_sync";

/// Direction deltas, indexed `0..8`. Index 0 is straight up; indices 1..7
/// rotate clockwise at 45 degree steps (spec §4.5 "Direction encoding").
pub const DX: [i32; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
pub const DY: [i32; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];

/// Number of distinct directions a move byte may encode.
pub const NUM_DIRECTIONS: usize = 8;
