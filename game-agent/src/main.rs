//! Agent entry point (spec §4.6): identifies itself by pid, then loops
//! waiting on its move token, reading a snapshot of its surroundings under
//! the reader lock, and writing one direction byte to standard output.

mod decision;

use std::time::Duration;

use log::{info, warn};

use game_core::constants::{DX, DY, NUM_DIRECTIONS};
use game_core::movetoken::MoveTokenWaiter;
use game_core::rwlock::StateLock;
use game_core::{GameState, GameSync, SharedRegion};

use decision::choose_direction;

const IDENTIFY_RETRIES: u32 = 20;
const IDENTIFY_RETRY_DELAY: Duration = Duration::from_millis(50);

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_default();
    let (Some(_width), Some(_height)) = (args.next(), args.next()) else {
        eprintln!("{program}: usage: {program} <width> <height>");
        std::process::exit(1);
    };

    ignore_sigpipe();

    let state_region: SharedRegion<GameState> =
        match SharedRegion::open(game_core::constants::STATE_SHM_NAME, std::mem::size_of::<GameState>(), false) {
            Ok(region) => region,
            Err(e) => {
                eprintln!("{program}: failed to attach to game state: {e}");
                std::process::exit(1);
            }
        };
    let sync_region: SharedRegion<GameSync> =
        match SharedRegion::open(game_core::constants::SYNC_SHM_NAME, std::mem::size_of::<GameSync>(), true) {
            Ok(region) => region,
            Err(e) => {
                eprintln!("{program}: failed to attach to game sync: {e}");
                std::process::exit(1);
            }
        };

    let sync = unsafe { &*sync_region.pointer() };
    let state_lock = unsafe { StateLock::new(sync, state_region.pointer()) };

    let pid = std::process::id() as libc::pid_t;
    let Some(me) = identify_self(&state_lock, pid) else {
        return;
    };

    info!("agent {me} (pid {pid}) starting");
    run_loop(&state_lock, sync, me);
}

fn ignore_sigpipe() {
    unsafe {
        let _ = nix::sys::signal::signal(nix::sys::signal::Signal::SIGPIPE, nix::sys::signal::SigHandler::SigIgn);
    }
}

/// Scans `agents[0..agent_count]` for the entry matching `pid`, retrying
/// briefly since the arbiter writes pids only after spawning (spec §4.6).
/// Returns `None` if the game was already finished when found, or if
/// identification never succeeded (the caller should simply return).
fn identify_self(state_lock: &StateLock<'_>, pid: libc::pid_t) -> Option<usize> {
    for attempt in 0..IDENTIFY_RETRIES {
        let found = state_lock.run_as_reader(|state| {
            let count = (state.agent_count as usize).min(game_core::constants::MAX_AGENTS);
            for i in 0..count {
                if state.agents[i].pid == pid {
                    return Some((i, state.is_finished()));
                }
            }
            None
        });

        if let Some((idx, finished)) = found {
            if finished {
                return None;
            }
            return Some(idx);
        }

        if attempt + 1 < IDENTIFY_RETRIES {
            std::thread::sleep(IDENTIFY_RETRY_DELAY);
        }
    }
    warn!("pid {pid} never appeared in the agent table; giving up");
    None
}

fn run_loop(state_lock: &StateLock<'_>, sync: &GameSync, me: usize) {
    let waiter = MoveTokenWaiter::new(sync, me);

    loop {
        waiter.wait();

        let snapshot = state_lock.run_as_reader(|state| {
            if state.is_finished() {
                return None;
            }
            let agent = &state.agents[me];
            let x = agent.x as i32;
            let y = agent.y as i32;
            let mut values = [0i32; NUM_DIRECTIONS];
            let mut in_bounds = [false; NUM_DIRECTIONS];
            for dir in 0..NUM_DIRECTIONS {
                let nx = x + DX[dir];
                let ny = y + DY[dir];
                in_bounds[dir] = state.in_bounds(nx, ny);
                if in_bounds[dir] {
                    values[dir] = state.cell(nx as u16, ny as u16);
                }
            }
            Some((values, in_bounds))
        });

        let Some((values, in_bounds)) = snapshot else {
            info!("agent {me}: game finished, exiting");
            return;
        };

        let Some(dir) = choose_direction(&values, &in_bounds) else {
            info!("agent {me}: no reachable reward, closing stdout");
            return;
        };

        if !write_direction(dir) {
            info!("agent {me}: write failed, exiting");
            return;
        }
    }
}

/// Writes exactly one direction byte to standard output. Returns whether the
/// write succeeded (spec §4.6 step 5: "If the write fails, exit 0").
fn write_direction(dir: u8) -> bool {
    use std::io::Write;
    match std::io::stdout().write_all(&[dir]) {
        Ok(()) => std::io::stdout().flush().is_ok(),
        Err(_) => false,
    }
}
