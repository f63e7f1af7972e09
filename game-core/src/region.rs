//! A small typed handle over a POSIX shared-memory object (spec §4.1).
//!
//! Grounded on the create/open/mmap sequence used by the pack's IPC-shaped
//! examples (notably `shmempipe`'s `create`/`open_existing`), generalized
//! into a reusable `create`/`open`/`pointer`/`close`/`destroy` handle rather
//! than one struct hard-wired to a single message layout, since this crate
//! only ever needs two region shapes (`GameState`, `GameSync`) and both are
//! fixed-size.

use std::ffi::CString;
use std::marker::PhantomData;
use std::os::unix::io::RawFd;
use std::ptr::NonNull;

use nix::fcntl::OFlag;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::ftruncate;

use crate::error::{GameError, GameResult};

/// Owns `(name, size, file descriptor, mapped pointer)` for one shared
/// memory region. `T` is the type the region is interpreted as; the caller
/// is responsible for initializing it in place before any other participant
/// attaches (see [`crate::layout::GameState`]/[`crate::layout::GameSync`]).
pub struct SharedRegion<T> {
    /// Present only on the handle that created the region: only the
    /// creator is allowed to unlink it (spec §4.1: "sole creator and sole
    /// unlinker").
    name: Option<CString>,
    fd: RawFd,
    ptr: NonNull<T>,
    size: usize,
    closed: bool,
    _marker: PhantomData<T>,
}

impl<T> SharedRegion<T> {
    /// Creates the region with exclusive-creation semantics, truncates it to
    /// `size` and maps it read-write.
    pub fn create(name: &str, size: usize) -> GameResult<Self> {
        let cname = CString::new(name)
            .map_err(|_| GameError::ArgumentError(format!("invalid shm name: {name}")))?;

        let flags = OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR;
        let mode = Mode::S_IRUSR | Mode::S_IWUSR;

        let fd = shm_open(cname.as_c_str(), flags, mode)?;

        if let Err(e) = ftruncate(fd, size as i64) {
            let _ = nix::unistd::close(fd);
            let _ = shm_unlink(cname.as_c_str());
            return Err(e.into());
        }

        let ptr = match map_region(fd, size, ProtFlags::PROT_READ | ProtFlags::PROT_WRITE) {
            Ok(ptr) => ptr,
            Err(e) => {
                let _ = nix::unistd::close(fd);
                let _ = shm_unlink(cname.as_c_str());
                return Err(e);
            }
        };

        Ok(Self {
            name: Some(cname),
            fd,
            ptr,
            size,
            closed: false,
            _marker: PhantomData,
        })
    }

    /// Attaches to an existing region by name, mapping it with `write`
    /// permission if requested.
    pub fn open(name: &str, size: usize, write: bool) -> GameResult<Self> {
        let cname = CString::new(name)
            .map_err(|_| GameError::ArgumentError(format!("invalid shm name: {name}")))?;

        let oflag = if write { OFlag::O_RDWR } else { OFlag::O_RDONLY };
        let fd = shm_open(cname.as_c_str(), oflag, Mode::empty())?;

        let prot = if write {
            ProtFlags::PROT_READ | ProtFlags::PROT_WRITE
        } else {
            ProtFlags::PROT_READ
        };

        let ptr = match map_region(fd, size, prot) {
            Ok(ptr) => ptr,
            Err(e) => {
                let _ = nix::unistd::close(fd);
                return Err(e);
            }
        };

        Ok(Self {
            name: None,
            fd,
            ptr,
            size,
            closed: false,
            _marker: PhantomData,
        })
    }

    /// Returns the mapped base pointer.
    pub fn pointer(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Unmaps and closes the descriptor. Safe to call more than once.
    pub fn close(&mut self) -> GameResult<()> {
        if self.closed {
            return Ok(());
        }
        unsafe {
            munmap(self.ptr.as_ptr().cast(), self.size)?;
        }
        nix::unistd::close(self.fd)?;
        self.closed = true;
        Ok(())
    }

    /// Unmaps, closes and unlinks the shared memory object's name. Only
    /// meaningful on a handle obtained through [`create`](Self::create).
    /// Calling this twice is an error.
    pub fn destroy(&mut self) -> GameResult<()> {
        let name = self
            .name
            .take()
            .ok_or_else(|| GameError::ArgumentError("destroy() called more than once, or on a non-owning handle".into()))?;
        self.close()?;
        shm_unlink(name.as_c_str())?;
        Ok(())
    }
}

fn map_region<T>(fd: RawFd, size: usize, prot: ProtFlags) -> GameResult<NonNull<T>> {
    let len = std::num::NonZeroUsize::new(size)
        .ok_or_else(|| GameError::ArgumentError("region size must be non-zero".into()))?;
    let ptr = unsafe { mmap(None, len, prot, MapFlags::MAP_SHARED, fd, 0) }?;
    NonNull::new(ptr.cast()).ok_or_else(|| {
        GameError::ResourceError(std::io::Error::new(
            std::io::ErrorKind::Other,
            "mmap returned a null pointer",
        ))
    })
}

// SAFETY: the pointee lives in shared memory and is synchronized externally
// (via `GameSync`'s semaphores) by every caller of this crate.
unsafe impl<T> Send for SharedRegion<T> {}
unsafe impl<T> std::marker::Sync for SharedRegion<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_name(tag: &str) -> String {
        format!("/game-core-test-{tag}-{}", std::process::id())
    }

    #[test]
    fn create_open_roundtrip() {
        let name = unique_name("roundtrip");
        let mut created: SharedRegion<u64> = SharedRegion::create(&name, 8).unwrap();
        unsafe {
            *created.pointer() = 0xdead_beef;
        }

        let opened: SharedRegion<u64> = SharedRegion::open(&name, 8, false).unwrap();
        assert_eq!(unsafe { *opened.pointer() }, 0xdead_beef);

        created.destroy().unwrap();
    }

    #[test]
    fn double_destroy_is_an_error() {
        let name = unique_name("double-destroy");
        let mut region: SharedRegion<u32> = SharedRegion::create(&name, 4).unwrap();
        region.destroy().unwrap();
        assert!(region.destroy().is_err());
    }

    #[test]
    fn open_nonexistent_is_an_error() {
        let name = unique_name("does-not-exist");
        let result: GameResult<SharedRegion<u32>> = SharedRegion::open(&name, 4, false);
        assert!(result.is_err());
    }

    #[test]
    fn create_twice_is_an_error() {
        let name = unique_name("create-twice");
        let mut first: SharedRegion<u32> = SharedRegion::create(&name, 4).unwrap();
        let second: GameResult<SharedRegion<u32>> = SharedRegion::create(&name, 4);
        assert!(second.is_err());
        first.destroy().unwrap();
    }
}
