//! Shared-region and child-process resource management for the arbiter
//! (spec §4.5 "Responsibilities", §3 "Lifecycle").

use std::io::Read;
use std::process::{Child, Command, Stdio};

use game_core::constants::{STATE_SHM_NAME, SYNC_SHM_NAME};
use game_core::error::{GameError, GameResult};
use game_core::{GameState, GameSync, SharedRegion};

use crate::cli::ResolvedArgs;

/// One agent's live child handle: its process and the read end of its
/// stdout pipe, or `None` once the pipe has been closed (spec §4.5 step 6:
/// "close and forget the pipe").
pub struct AgentHandle {
    pub child: Child,
    pub stdout: Option<std::process::ChildStdout>,
}

/// Everything the arbiter owns for the duration of one game.
pub struct GameResources {
    pub state_region: SharedRegion<GameState>,
    pub sync_region: SharedRegion<GameSync>,
    pub agents: Vec<AgentHandle>,
    pub observer: Option<Child>,
}

impl GameResources {
    /// Creates both shared regions and initializes every synchronization
    /// primitive (spec §4.5 initialization steps 1-2, partial: board and
    /// agent_count/width/height are filled in by `init::init_game_state`
    /// after this returns).
    pub fn create(agent_count: usize) -> GameResult<Self> {
        let sync_size = std::mem::size_of::<GameSync>();
        let mut sync_region: SharedRegion<GameSync> = SharedRegion::create(SYNC_SHM_NAME, sync_size)?;
        unsafe {
            (*sync_region.pointer()).init_in_place()?;
        }

        let state_size = std::mem::size_of::<GameState>();
        let state_region: SharedRegion<GameState> = match SharedRegion::create(STATE_SHM_NAME, state_size) {
            Ok(region) => region,
            Err(e) => {
                let _ = sync_region.destroy();
                return Err(e);
            }
        };

        Ok(Self {
            state_region,
            sync_region,
            agents: Vec::with_capacity(agent_count),
            observer: None,
        })
    }

    pub fn state_ptr(&self) -> *mut GameState {
        self.state_region.pointer()
    }

    /// Raw pointer to the mapped `GameSync` region. The pointer is stable
    /// for the lifetime of `self` regardless of borrows taken against
    /// `self` elsewhere, since it comes from `mmap`, not from Rust's own
    /// allocator; callers may safely derive a `&GameSync` detached from
    /// `self`'s borrow to hold alongside a `&mut GameResources`.
    pub fn sync_ptr(&self) -> *mut GameSync {
        self.sync_region.pointer()
    }

    /// Spawns the observer (if configured) and then every agent, wiring
    /// each agent's pipe before recording its pid into `GameState`. Order
    /// matches spec §4.5 step 5.
    pub fn launch_children(&mut self, args: &ResolvedArgs) -> GameResult<()> {
        let width = args.width.to_string();
        let height = args.height.to_string();

        if let Some(path) = &args.observer_path {
            let child = Command::new(path)
                .arg(&width)
                .arg(&height)
                .spawn()
                .map_err(|e| GameError::ChildSpawnError(format!("observer {path}: {e}")))?;
            self.observer = Some(child);
        }

        for path in &args.agent_paths {
            let mut child = Command::new(path)
                .arg(&width)
                .arg(&height)
                .stdout(Stdio::piped())
                .spawn()
                .map_err(|e| GameError::ChildSpawnError(format!("agent {path}: {e}")))?;
            let stdout = child.stdout.take();
            self.agents.push(AgentHandle { child, stdout });
        }

        Ok(())
    }

    /// Records every spawned agent's pid into its `GameState` record, so
    /// agents can identify themselves (spec §4.5 step 5, §4.6).
    pub fn record_pids(&self, state: &mut GameState) {
        for (i, handle) in self.agents.iter().enumerate() {
            state.agents[i].pid = handle.child.id() as libc::pid_t;
        }
    }

    /// Reads one move byte from agent `idx`'s pipe. Returns `Ok(None)` on
    /// end-of-file (spec §4.5 step 6).
    pub fn read_move(&mut self, idx: usize) -> GameResult<Option<u8>> {
        let handle = &mut self.agents[idx];
        let Some(stdout) = handle.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buf = [0u8; 1];
        match stdout.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => Err(GameError::InterruptedWait),
            Err(_) => Ok(None),
        }
    }

    /// Closes and forgets agent `idx`'s pipe (spec §4.5 step 6, on EOF).
    pub fn close_agent_pipe(&mut self, idx: usize) {
        self.agents[idx].stdout = None;
    }

    /// Waits for every spawned child, in the order spec §4.5 "Teardown"
    /// describes (observer, then agents), returning each one's exit status
    /// alongside its (agent index, pid) for printing.
    pub fn wait_for_children(&mut self) -> Vec<(Option<usize>, u32, std::io::Result<std::process::ExitStatus>)> {
        let mut results = Vec::new();
        if let Some(mut observer) = self.observer.take() {
            let pid = observer.id();
            results.push((None, pid, observer.wait()));
        }
        for (i, handle) in self.agents.iter_mut().enumerate() {
            let pid = handle.child.id();
            results.push((Some(i), pid, handle.child.wait()));
        }
        results
    }

    /// Destroys both shared regions. Must run after [`wait_for_children`]
    /// (spec §5 "Shutdown ordering").
    pub fn destroy(&mut self) -> GameResult<()> {
        unsafe {
            (*self.sync_ptr()).destroy_in_place();
        }
        self.sync_region.destroy()?;
        self.state_region.destroy()?;
        Ok(())
    }
}
