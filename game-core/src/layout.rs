//! The `GameState` and `GameSync` shared-region layouts (spec §3).
//!
//! Both structs are `#[repr(C)]` with explicit padding so that every
//! participant — three independent processes, each with its own mapping of
//! the same named shared-memory object — agrees on field offsets exactly.
//! Compare to the original C reference (`game_state.h`/`game_sync.h`), whose
//! `int board[]` flexible array member has no safe Rust equivalent; here the
//! board is a fixed-capacity array instead (see SPEC_FULL.md §9).

use std::cell::UnsafeCell;

use crate::constants::{AGENT_NAME_LEN, MAX_AGENTS, MAX_CELLS};
use crate::sem::RawSem;

/// A single agent's record within the `GameState` region.
#[repr(C)]
pub struct AgentRecord {
    /// Display name, nul-padded, not necessarily nul-terminated if it fills
    /// the full width.
    pub name: [u8; AGENT_NAME_LEN],
    pub score: u32,
    pub valid_moves: u32,
    pub invalid_moves: u32,
    pub x: u16,
    pub y: u16,
    pub pid: libc::pid_t,
    blocked: u8,
    _pad: [u8; 3],
}

static_assertions::assert_eq_size!(libc::pid_t, i32);

impl AgentRecord {
    pub fn is_blocked(&self) -> bool {
        self.blocked != 0
    }

    /// Sets `blocked`. Monotone by construction: callers never clear it
    /// (spec invariant 5: `blocked == true` never reverts).
    pub fn set_blocked(&mut self, blocked: bool) {
        self.blocked = blocked as u8;
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = [0u8; AGENT_NAME_LEN];
        let bytes = name.as_bytes();
        let n = bytes.len().min(AGENT_NAME_LEN);
        self.name[..n].copy_from_slice(&bytes[..n]);
    }

    pub fn name_str(&self) -> std::borrow::Cow<'_, str> {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end])
    }
}

static_assertions::assert_eq_size!(AgentRecord, [u8; 40]);

/// The full game state: board dimensions, every agent's record, the
/// termination flag and the board itself.
#[repr(C)]
pub struct GameState {
    pub width: u16,
    pub height: u16,
    pub agent_count: u32,
    pub agents: [AgentRecord; MAX_AGENTS],
    finished: u8,
    _pad: [u8; 3],
    /// Row-major board. Only `width*height` entries are meaningful; see
    /// [`crate::constants::MAX_CELLS`].
    pub board: [i32; MAX_CELLS],
}

impl GameState {
    pub fn is_finished(&self) -> bool {
        self.finished != 0
    }

    /// Sets `finished`. Monotone: callers never clear it (spec invariant 6).
    pub fn set_finished(&mut self, finished: bool) {
        self.finished = finished as u8;
    }

    #[inline]
    pub fn cell_index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u16) < self.width && (y as u16) < self.height
    }

    pub fn cell(&self, x: u16, y: u16) -> i32 {
        self.board[self.cell_index(x, y)]
    }

    pub fn set_cell(&mut self, x: u16, y: u16, value: i32) {
        let idx = self.cell_index(x, y);
        self.board[idx] = value;
    }

    /// Claims cell `(x, y)` for agent `idx` (spec §3: claimed cells carry
    /// `-idx`, with `0` reserved for "claimed by agent 0").
    pub fn claim(&mut self, x: u16, y: u16, idx: usize) {
        self.set_cell(x, y, -(idx as i32));
    }

    /// Whether cell `(x, y)` is claimed (value `<= 0`).
    pub fn is_claimed(&self, x: u16, y: u16) -> bool {
        self.cell(x, y) <= 0
    }
}

/// Synchronization primitives shared by every participant (spec §3 "Sync
/// region"). Contains only semaphores and the reader counter; no game data.
#[repr(C)]
pub struct GameSync {
    pub view_update_ready: RawSem,
    pub view_print_done: RawSem,
    pub writer_gate: RawSem,
    pub state_lock: RawSem,
    pub reader_count_lock: RawSem,
    /// Guarded exclusively by `reader_count_lock` (spec §5 "Shared-resource
    /// policy"); `UnsafeCell` documents that mutation happens through a
    /// shared reference, the way every other field of this process-shared
    /// region necessarily does.
    reader_count: UnsafeCell<u32>,
    pub move_token: [RawSem; MAX_AGENTS],
}

// SAFETY: every field is either a semaphore (kernel-synchronized) or
// `reader_count`, which is only ever touched while `reader_count_lock` is
// held. Concurrent access across threads/processes is the entire point of
// this type.
unsafe impl std::marker::Sync for GameSync {}

impl GameSync {
    /// Initializes every primitive in place. Must run exactly once, before
    /// any other participant attaches (spec §3 "Lifecycle").
    ///
    /// # Safety
    /// `self` must be backed by process-shared memory, not yet initialized.
    pub unsafe fn init_in_place(&mut self) -> crate::error::GameResult<()> {
        self.view_update_ready.init(0)?;
        self.view_print_done.init(0)?;
        self.writer_gate.init(1)?;
        self.state_lock.init(1)?;
        self.reader_count_lock.init(1)?;
        *self.reader_count.get() = 0;
        // All agents start enabled (spec §9 open question resolution): every
        // slot is initialized to 1, not just the first.
        for token in self.move_token.iter_mut() {
            token.init(1)?;
        }
        Ok(())
    }

    /// Destroys every primitive. Must run after every other participant has
    /// detached (spec §3 "Lifecycle").
    ///
    /// # Safety
    /// `self` must not be used again afterwards.
    pub unsafe fn destroy_in_place(&self) {
        self.view_update_ready.destroy();
        self.view_print_done.destroy();
        self.writer_gate.destroy();
        self.state_lock.destroy();
        self.reader_count_lock.destroy();
        for token in &self.move_token {
            token.destroy();
        }
    }

    /// Reads `reader_count`. Caller must hold `reader_count_lock`.
    ///
    /// # Safety
    /// Caller must hold `reader_count_lock` for the duration of the read.
    pub(crate) unsafe fn reader_count(&self) -> u32 {
        *self.reader_count.get()
    }

    /// Overwrites `reader_count`. Caller must hold `reader_count_lock`.
    ///
    /// # Safety
    /// Caller must hold `reader_count_lock` for the duration of the write.
    pub(crate) unsafe fn set_reader_count(&self, value: u32) {
        *self.reader_count.get() = value;
    }
}
