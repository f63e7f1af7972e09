//! Game-state initialization (spec §4.5 initialization steps 2-4).

use game_core::board::{generate_rewards, spawn_position};
use game_core::GameState;

use crate::cli::ResolvedArgs;

/// Fills in `width`, `height`, `agent_count`, the reward board and every
/// agent's spawn position/score/counters. Agent pids are filled in
/// separately once children have been spawned (spec §4.5 step 5).
pub fn init_game_state(state: &mut GameState, args: &ResolvedArgs) {
    state.width = args.width;
    state.height = args.height;
    state.agent_count = args.agent_paths.len() as u32;
    state.set_finished(false);

    let rewards = generate_rewards(args.width, args.height, args.seed);
    for (i, &value) in rewards.iter().enumerate() {
        state.board[i] = value;
    }

    let agent_count = state.agent_count;
    for i in 0..agent_count {
        let (x, y) = spawn_position(args.width, args.height, agent_count, i);
        let agent = &mut state.agents[i as usize];
        agent.set_name(&format!("agent {i}"));
        agent.score = 0;
        agent.valid_moves = 0;
        agent.invalid_moves = 0;
        agent.x = x;
        agent.y = y;
        agent.set_blocked(false);
        // pid is filled in once the child has been spawned.

        // Claim the spawn cell (spec §4.5 step 4: "Overwrite board[x,y]
        // with -i"). Reward overwritten at spawn is not counted as score
        // (spec §3 invariant 2).
        state.claim(x, y, i as usize);
    }
}
