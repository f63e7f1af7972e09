//! The writer-preferring reader/writer lock (spec §4.2).
//!
//! This is the cross-process generalization of the teacher crate's
//! [`qrwlock`](https://github.com/pskrgag/rust-qrwlock) ticket-based rw-lock:
//! the scoped-guard shape (`ReadGuard`/`WriteGuard`, release on every `Drop`
//! path) is kept, but the primitive backing the turnstile changes from an
//! in-process `spin::TicketMutex` to a `sem_t`-based mutex living in the
//! `GameSync` region, since the readers and the writer here are different
//! OS processes rather than threads of one address space.
//!
//! Algorithm (classic turnstile + counter):
//! - Reader entry: pass through `writer_gate` (acquire, release
//!   immediately — this is what forces a reader arriving after a writer
//!   queued to wait behind it); then, under `reader_count_lock`, increment
//!   `reader_count` and, if it became 1, acquire `state_lock`.
//! - Reader exit: under `reader_count_lock`, decrement `reader_count` and,
//!   if it dropped to 0, release `state_lock`.
//! - Writer entry: acquire `writer_gate` (blocks new readers at the
//!   turnstile); acquire `state_lock` (waits for the current reader
//!   cohort); release `writer_gate`.
//! - Writer exit: release `state_lock`.

use crate::layout::{GameState, GameSync};

/// A view of the `GameState` region guarded by the protocol in [`GameSync`].
/// Does not own either region; both are expected to outlive it.
pub struct StateLock<'a> {
    sync: &'a GameSync,
    state: *mut GameState,
}

// SAFETY: `state` points into a process-shared mapping and all access to it
// is mediated by `sync`'s semaphores.
unsafe impl<'a> Send for StateLock<'a> {}
unsafe impl<'a> std::marker::Sync for StateLock<'a> {}

impl<'a> StateLock<'a> {
    /// # Safety
    /// `state` must point at a live `GameState` mapped from the same region
    /// `sync` coordinates, and must outlive every guard produced here.
    pub unsafe fn new(sync: &'a GameSync, state: *mut GameState) -> Self {
        Self { sync, state }
    }

    fn reader_enter(&self) {
        unsafe {
            // Pass through the turnstile: forces us to wait behind any
            // writer that is already queued.
            self.sync.writer_gate.wait();
            self.sync.writer_gate.post();

            self.sync.reader_count_lock.wait();
            let count = self.sync.reader_count() + 1;
            self.sync.set_reader_count(count);
            if count == 1 {
                self.sync.state_lock.wait();
            }
            self.sync.reader_count_lock.post();
        }
    }

    fn reader_exit(&self) {
        unsafe {
            self.sync.reader_count_lock.wait();
            let count = self.sync.reader_count() - 1;
            self.sync.set_reader_count(count);
            if count == 0 {
                self.sync.state_lock.post();
            }
            self.sync.reader_count_lock.post();
        }
    }

    fn writer_enter(&self) {
        unsafe {
            self.sync.writer_gate.wait();
            self.sync.state_lock.wait();
            self.sync.writer_gate.post();
        }
    }

    fn writer_exit(&self) {
        unsafe {
            self.sync.state_lock.post();
        }
    }

    /// Acquires a read lock.
    pub fn read(&self) -> ReadGuard<'_> {
        self.reader_enter();
        ReadGuard {
            lock: self,
            state: unsafe { &*self.state },
        }
    }

    /// Acquires the write lock. The caller (the arbiter) is the only
    /// participant ever expected to call this.
    pub fn write(&self) -> WriteGuard<'_> {
        self.writer_enter();
        WriteGuard {
            lock: self,
            state: unsafe { &mut *self.state },
        }
    }

    /// Runs `f` with a read lock held, guaranteeing release even if `f`
    /// panics.
    pub fn run_as_reader<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&GameState) -> R,
    {
        let guard = self.read();
        f(&guard)
    }

    /// Runs `f` with the write lock held, guaranteeing release even if `f`
    /// panics. Callers must never post to the observer rendezvous while
    /// still holding this lock (spec §5 "Deadlock freedom argument").
    pub fn run_as_writer<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut GameState) -> R,
    {
        let mut guard = self.write();
        f(&mut guard)
    }
}

/// Read access to the `GameState` region. Releases on drop.
pub struct ReadGuard<'a> {
    lock: &'a StateLock<'a>,
    state: &'a GameState,
}

impl<'a> std::ops::Deref for ReadGuard<'a> {
    type Target = GameState;
    fn deref(&self) -> &GameState {
        self.state
    }
}

impl<'a> Drop for ReadGuard<'a> {
    fn drop(&mut self) {
        self.lock.reader_exit();
    }
}

/// Exclusive write access to the `GameState` region. Releases on drop.
pub struct WriteGuard<'a> {
    lock: &'a StateLock<'a>,
    state: &'a mut GameState,
}

impl<'a> std::ops::Deref for WriteGuard<'a> {
    type Target = GameState;
    fn deref(&self) -> &GameState {
        self.state
    }
}

impl<'a> std::ops::DerefMut for WriteGuard<'a> {
    fn deref_mut(&mut self) -> &mut GameState {
        self.state
    }
}

impl<'a> Drop for WriteGuard<'a> {
    fn drop(&mut self) {
        self.lock.writer_exit();
    }
}
