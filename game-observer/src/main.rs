//! Observer entry point (spec §4.7): on every `view_update_ready` signal,
//! snapshots the board and agent table under the reader lock, renders one
//! frame, and confirms with `view_print_done`.

mod render;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};

use game_core::rendezvous::ObserverWaiter;
use game_core::rwlock::StateLock;
use game_core::{GameState, GameSync, SharedRegion};

use render::AgentSummary;

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_default();
    let (Some(_width), Some(_height)) = (args.next(), args.next()) else {
        eprintln!("{program}: usage: {program} <width> <height>");
        std::process::exit(1);
    };

    let stop_requested = Arc::new(AtomicBool::new(false));
    if let Err(e) = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&stop_requested)) {
        warn!("failed to install SIGINT handler: {e}");
    }

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
    let waiter = ObserverWaiter::new(sync);

    info!("observer attached, waiting for the first frame");
    run_loop(&state_lock, &waiter, &stop_requested);
}

fn run_loop(state_lock: &StateLock<'_>, waiter: &ObserverWaiter<'_>, stop_requested: &AtomicBool) {
    // Persists across frames: once an agent claims a cell it stays that
    // agent's in `owner_map` even after it moves on (spec §4.7: "persistent
    // claimant"). `head_map` is rebuilt from scratch each frame.
    let mut owner_map: Vec<Option<usize>> = Vec::new();
    let mut head_map: Vec<Option<usize>> = Vec::new();

    while !stop_requested.load(Ordering::Relaxed) {
        waiter.wait_for_update();

        let frame = state_lock.run_as_reader(|state| {
            let cells = state.width as usize * state.height as usize;
            if owner_map.len() != cells {
                owner_map = vec![None; cells];
            }
            head_map = vec![None; cells];

            let agent_count = (state.agent_count as usize).min(game_core::constants::MAX_AGENTS);
            let mut agents = Vec::with_capacity(agent_count);
            for i in 0..agent_count {
                let agent = &state.agents[i];
                if (agent.x as usize) < state.width as usize && (agent.y as usize) < state.height as usize {
                    let idx = agent.y as usize * state.width as usize + agent.x as usize;
                    owner_map[idx] = Some(i);
                    head_map[idx] = Some(i);
                }
                agents.push(AgentSummary {
                    name: agent.name_str().into_owned(),
                    score: agent.score,
                    x: agent.x,
                    y: agent.y,
                    valid_moves: agent.valid_moves,
                    invalid_moves: agent.invalid_moves,
                    blocked: agent.is_blocked(),
                });
            }

            render::draw_frame(state.width, state.height, &state.board[..cells], &owner_map, &head_map, &agents, state.is_finished())
        });

        print!("{frame}");

        waiter.confirm_done();
    }
}
