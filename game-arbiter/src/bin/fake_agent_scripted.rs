//! Test-only scripted stand-in for `game-agent`, used by the integration
//! tests under `tests/` to drive the arbiter's main loop through exact,
//! reproducible move sequences instead of the real neighbor-selection rule.
//!
//! Takes the same `<width> <height>` arguments as a real agent (the arbiter
//! never special-cases this binary). Its move script is instead read from
//! `FAKE_AGENT_SCRIPT_<index>` in its environment, a comma-separated list of
//! direction bytes, once it has identified its own index by pid. Waits on
//! its own move token before each scripted byte; once the script is
//! exhausted it closes stdout and exits, exactly like a real agent with no
//! reachable reward (spec §4.6 step 4).

use game_core::movetoken::MoveTokenWaiter;
use game_core::rwlock::StateLock;
use game_core::{GameState, GameSync, SharedRegion};

fn main() {
    let mut args = std::env::args();
    let _program = args.next();
    let _width = args.next().expect("width");
    let _height = args.next().expect("height");

    let state_region: SharedRegion<GameState> =
        SharedRegion::open(game_core::constants::STATE_SHM_NAME, std::mem::size_of::<GameState>(), false)
            .expect("attach state");
    let sync_region: SharedRegion<GameSync> =
        SharedRegion::open(game_core::constants::SYNC_SHM_NAME, std::mem::size_of::<GameSync>(), true)
            .expect("attach sync");

    let sync = unsafe { &*sync_region.pointer() };
    let state_lock = unsafe { StateLock::new(sync, state_region.pointer()) };

    let pid = std::process::id() as libc::pid_t;
    let me = identify_self(&state_lock, pid).expect("pid must be registered");

    // S5-style fixture: stay alive without ever writing, to exercise the
    // arbiter's liveness timeout instead of the closed-pipe path.
    if std::env::var(format!("FAKE_AGENT_HANG_{me}")).is_ok() {
        std::thread::sleep(std::time::Duration::from_secs(30));
        return;
    }

    let script: Vec<u8> = std::env::var(format!("FAKE_AGENT_SCRIPT_{me}"))
        .ok()
        .map(|s| s.split(',').filter(|s| !s.is_empty()).map(|s| s.parse().expect("script bytes must be 0..=7")).collect())
        .unwrap_or_default();

    let waiter = MoveTokenWaiter::new(sync, me);
    for dir in script {
        waiter.wait();
        let finished = state_lock.run_as_reader(|state| state.is_finished());
        if finished {
            return;
        }
        use std::io::Write;
        if std::io::stdout().write_all(&[dir]).is_err() {
            return;
        }
        let _ = std::io::stdout().flush();
    }
    // Script exhausted: behave like an agent with no reachable reward.
}

fn identify_self(state_lock: &StateLock<'_>, pid: libc::pid_t) -> Option<usize> {
    for attempt in 0..40 {
        let found = state_lock.run_as_reader(|state| {
            let count = (state.agent_count as usize).min(game_core::constants::MAX_AGENTS);
            (0..count).find(|&i| state.agents[i].pid == pid)
        });
        if found.is_some() {
            return found;
        }
        if attempt + 1 < 40 {
            std::thread::sleep(std::time::Duration::from_millis(25));
        }
    }
    None
}
