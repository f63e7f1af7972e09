//! A thin wrapper around a POSIX unnamed semaphore (`sem_t`) living inside a
//! process-shared memory mapping.
//!
//! `RawSem` is `#[repr(transparent)]` over `libc::sem_t` so it can be
//! embedded directly as a field of a `#[repr(C)]` struct mapped into the
//! `Sync` region: every participant that maps that region sees the same
//! bytes at the same offset, and `sem_init`'s `pshared` flag tells the
//! kernel the semaphore is shared across address spaces rather than
//! threads of one process.

use std::mem::MaybeUninit;

use crate::error::{GameError, GameResult};

#[repr(transparent)]
pub struct RawSem(MaybeUninit<libc::sem_t>);

impl RawSem {
    /// Initializes the semaphore in place with the given initial value.
    /// Must be called exactly once, by the region's creator, before any
    /// other participant attaches.
    ///
    /// # Safety
    /// `self` must be backed by process-shared memory and not yet
    /// initialized.
    pub unsafe fn init(&mut self, initial: u32) -> GameResult<()> {
        let rc = libc::sem_init(self.0.as_mut_ptr(), 1, initial);
        if rc != 0 {
            return Err(GameError::ResourceError(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Blocks until the semaphore can be decremented, retrying
    /// automatically on `EINTR` (spec §7 `InterruptedWait`).
    ///
    /// # Safety
    /// `self` must have been `init`ialized.
    pub unsafe fn wait(&self) {
        loop {
            let rc = libc::sem_wait(self.raw_ptr());
            if rc == 0 {
                return;
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                // A named, process-shared semaphore that returns anything
                // other than EINTR here indicates a corrupted shared
                // mapping; there is no sane recovery.
                panic!("sem_wait failed: {err}");
            }
        }
    }

    /// Non-blocking variant of [`wait`](Self::wait). Returns `true` if the
    /// semaphore was decremented.
    ///
    /// # Safety
    /// `self` must have been `init`ialized.
    pub unsafe fn try_wait(&self) -> bool {
        libc::sem_trywait(self.raw_ptr()) == 0
    }

    /// Increments the semaphore, waking one waiter if any.
    ///
    /// # Safety
    /// `self` must have been `init`ialized.
    pub unsafe fn post(&self) {
        let rc = libc::sem_post(self.raw_ptr());
        debug_assert_eq!(rc, 0, "sem_post failed: {}", std::io::Error::last_os_error());
    }

    /// Destroys the semaphore. Must be called by the region's owner after
    /// every other participant has detached.
    ///
    /// # Safety
    /// `self` must not be used again afterwards.
    pub unsafe fn destroy(&self) {
        libc::sem_destroy(self.raw_ptr());
    }

    fn raw_ptr(&self) -> *mut libc::sem_t {
        self.0.as_ptr() as *mut libc::sem_t
    }
}

static_assertions::assert_eq_size!(RawSem, libc::sem_t);
