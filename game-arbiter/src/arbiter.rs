//! The arbiter main loop (spec §4.5).

use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};

use log::{info, warn};
use nix::poll::{poll, PollFd, PollFlags};

use game_core::constants::{DX, DY, MAX_AGENTS, NUM_DIRECTIONS};
use game_core::error::GameResult;
use game_core::movetoken::MoveTokenPoster;
use game_core::rendezvous::ObserverNotifier;
use game_core::rwlock::StateLock;
use game_core::GameState;

use crate::cli::ResolvedArgs;
use crate::resources::GameResources;
use crate::roundrobin::pick_next;

/// Runs initialization, the main arbitration loop and teardown for one
/// game. The single entry point `main.rs` calls.
pub fn run_game(args: ResolvedArgs) -> GameResult<()> {
    info!(
        "width={} height={} display_delay_ms={} timeout_seconds={} seed={} observer={} agents={}",
        args.width,
        args.height,
        args.display_delay_ms,
        args.timeout_seconds,
        args.seed,
        args.observer_path.as_deref().unwrap_or("<none>"),
        args.agent_paths.len(),
    );

    let mut resources = GameResources::create(args.agent_paths.len())?;

    // Step 3-4: board and agent layout, before any child can read them.
    unsafe {
        crate::init::init_game_state(&mut *resources.state_ptr(), &args);
    }

    // Step 5: spawn observer then agents; wire pids once known.
    resources.launch_children(&args)?;
    unsafe {
        resources.record_pids(&mut *resources.state_ptr());
    }

    let has_observer = args.observer_path.is_some();
    let agent_count = args.agent_paths.len();

    // `sync` is derived from a raw pointer, not from a borrow of
    // `resources`, so it can be held alongside `&mut resources` below: the
    // mapped region's address is independent of where the `GameResources`
    // value itself lives, and it stays valid until `resources.destroy()`.
    let sync = unsafe { &*resources.sync_ptr() };
    let state_lock = unsafe { StateLock::new(sync, resources.state_ptr()) };
    let notifier = ObserverNotifier::new(sync, has_observer);

    // Step 6: render the initial state once.
    notifier.notify_and_wait();

    main_loop(&args, &mut resources, sync, &state_lock, &notifier, agent_count);

    teardown(&mut resources);

    Ok(())
}

fn main_loop(
    args: &ResolvedArgs,
    resources: &mut GameResources,
    sync: &game_core::GameSync,
    state_lock: &StateLock<'_>,
    notifier: &ObserverNotifier<'_>,
    agent_count: usize,
) {
    let mut cursor = 0usize;
    let timeout = Duration::from_secs(args.timeout_seconds);
    let mut last_valid = Instant::now();

    loop {
        // Step 1: build the watch set.
        let mut watched_idx: Vec<usize> = Vec::with_capacity(agent_count);
        let mut poll_fds: Vec<PollFd> = Vec::with_capacity(agent_count);
        state_lock.run_as_reader(|state| {
            for i in 0..agent_count {
                if state.agents[i].is_blocked() {
                    continue;
                }
                if let Some(stdout) = resources.agents[i].stdout.as_ref() {
                    watched_idx.push(i);
                    poll_fds.push(PollFd::new(stdout.as_raw_fd(), PollFlags::POLLIN));
                }
            }
        });

        // Step 2: nobody left to watch.
        if watched_idx.is_empty() {
            finish(state_lock, notifier, "no active agents remain");
            break;
        }

        // Step 3-4: liveness deadline.
        let elapsed = last_valid.elapsed();
        if elapsed >= timeout {
            finish(state_lock, notifier, "no valid move accepted within the timeout");
            break;
        }
        let remaining = timeout - elapsed;

        // Step 4: wait on the watch set with that deadline.
        let timeout_ms = remaining.as_millis().min(i32::MAX as u128) as i32;
        let ready_count = match poll(&mut poll_fds, timeout_ms) {
            Ok(n) => n,
            Err(nix::Error::EINTR) => continue,
            Err(e) => {
                warn!("poll failed: {e}");
                0
            }
        };
        if ready_count == 0 {
            finish(state_lock, notifier, "poll deadline expired with no readiness");
            break;
        }

        // Step 5: round-robin selection among ready pipes. `ready` is kept in
        // the same full `0..agent_count` index space as `cursor` (not the
        // compacted `watched_idx`/`poll_fds` space), so a blocked agent's
        // slot just reads `false` instead of shifting every later agent's
        // index down and desynchronizing the cursor.
        let mut ready = vec![false; agent_count];
        for (slot, &idx) in watched_idx.iter().enumerate() {
            ready[idx] = poll_fds[slot]
                .revents()
                .map(|r| r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP))
                .unwrap_or(false);
        }
        let Some(picked) = pick_next(&ready, cursor) else {
            continue;
        };

        let had_valid_move = process_move(args, resources, sync, state_lock, notifier, picked);
        if had_valid_move {
            last_valid = Instant::now();
        }

        cursor = (picked + 1) % agent_count;

        // Step 7: global immobility check.
        let active_can_move = state_lock.run_as_reader(|state| any_active_agent_can_move(state));
        if !active_can_move {
            finish(state_lock, notifier, "no agent has a reachable reward");
            break;
        }
    }
}

/// Processes one move from agent `idx` (spec §4.5 step 6). Returns whether
/// a valid move occurred.
fn process_move(
    args: &ResolvedArgs,
    resources: &mut GameResources,
    sync: &game_core::GameSync,
    state_lock: &StateLock<'_>,
    notifier: &ObserverNotifier<'_>,
    idx: usize,
) -> bool {
    let byte = loop {
        match resources.read_move(idx) {
            Ok(v) => break v,
            Err(game_core::GameError::InterruptedWait) => continue,
            Err(_) => break None,
        }
    };

    let Some(byte) = byte else {
        state_lock.run_as_writer(|state| state.agents[idx].set_blocked(true));
        resources.close_agent_pipe(idx);
        info!("agent {idx} pipe closed, marked blocked");
        notifier.notify_and_wait();
        return false;
    };

    let valid = state_lock.run_as_writer(|state| apply_move(state, idx, byte));

    MoveTokenPoster::new(sync, idx).post();

    notifier.notify_and_wait();
    if args.display_delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(args.display_delay_ms));
    }

    valid
}

/// Validates and applies one move byte against `state` (spec §4.5 step 6).
/// Must be called with the writer lock held.
fn apply_move(state: &mut GameState, idx: usize, byte: u8) -> bool {
    let dir = byte as usize;
    if dir >= NUM_DIRECTIONS {
        state.agents[idx].invalid_moves += 1;
        return false;
    }

    let agent_x = state.agents[idx].x as i32;
    let agent_y = state.agents[idx].y as i32;
    let nx = agent_x + DX[dir];
    let ny = agent_y + DY[dir];

    if state.in_bounds(nx, ny) && state.cell(nx as u16, ny as u16) > 0 {
        let reward = state.cell(nx as u16, ny as u16);
        state.agents[idx].score += reward as u32;
        state.agents[idx].x = nx as u16;
        state.agents[idx].y = ny as u16;
        state.claim(nx as u16, ny as u16, idx);
        state.agents[idx].valid_moves += 1;
        true
    } else {
        state.agents[idx].invalid_moves += 1;
        false
    }
}

/// Whether any non-blocked agent has at least one in-bounds neighbor with a
/// positive (unclaimed) reward (spec §4.5 step 7 "global immobility").
fn any_active_agent_can_move(state: &GameState) -> bool {
    for i in 0..state.agent_count as usize {
        if i >= MAX_AGENTS || state.agents[i].is_blocked() {
            continue;
        }
        let x = state.agents[i].x as i32;
        let y = state.agents[i].y as i32;
        for dir in 0..NUM_DIRECTIONS {
            let nx = x + DX[dir];
            let ny = y + DY[dir];
            if state.in_bounds(nx, ny) && state.cell(nx as u16, ny as u16) > 0 {
                return true;
            }
        }
    }
    false
}

fn finish(state_lock: &StateLock<'_>, notifier: &ObserverNotifier<'_>, reason: &str) {
    info!("terminating: {reason}");
    state_lock.run_as_writer(|state| state.set_finished(true));
    notifier.notify_and_wait();
}

fn teardown(resources: &mut GameResources) {
    let results = resources.wait_for_children();
    let state = unsafe { &*resources.state_ptr() };
    for (agent_idx, pid, status) in results {
        match agent_idx {
            None => {
                let code = status.map(|s| s.code().unwrap_or(-1)).unwrap_or(-1);
                println!("Observer (PID {pid}) exited ({code})");
            }
            Some(i) => {
                let code = status.map(|s| s.code().unwrap_or(-1)).unwrap_or(-1);
                let agent = &state.agents[i];
                println!(
                    "Agent {i} (PID {pid}) exited ({code}) with a score of {} / {} / {}.",
                    agent.score, agent.valid_moves, agent.invalid_moves
                );
            }
        }
    }
    if let Err(e) = resources.destroy() {
        warn!("failed to tear down shared regions: {e}");
    }
}
