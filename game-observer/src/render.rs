//! Plain-text frame rendering (spec §4.7 "Render the board and agent list").
//!
//! The original `view.c` draws this same information with `ncurses` boxes
//! and per-agent colors; the visual choices are explicitly out of scope
//! here (spec.md §1), so this renders the same structure — a bordered board
//! grid and an agent score table — as plain text. Kept as a pure function of
//! already-snapshotted data so it can be unit tested without shared memory.

/// One agent's row in the score table, snapshotted under the reader lock.
pub struct AgentSummary {
    pub name: String,
    pub score: u32,
    pub x: u16,
    pub y: u16,
    pub valid_moves: u32,
    pub invalid_moves: u32,
    pub blocked: bool,
}

/// Renders one frame: a bordered board grid (head cells in `[brackets]`,
/// claimed-but-not-head cells as plain numbers) followed by an agent score
/// table and the `finished` flag.
pub fn draw_frame(
    width: u16,
    height: u16,
    board: &[i32],
    owner_map: &[Option<usize>],
    head_map: &[Option<usize>],
    agents: &[AgentSummary],
    finished: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("==== Board {width}x{height} ====\n"));

    let border = "+".to_string() + &"-".repeat(width as usize * 5) + "+";
    out.push_str(&border);
    out.push('\n');

    for row in 0..height as usize {
        out.push('|');
        for col in 0..width as usize {
            let idx = row * width as usize + col;
            let cell = board[idx];
            let is_head = head_map[idx].is_some();
            if is_head {
                out.push_str(&format!("[{cell:>3}]"));
            } else {
                out.push_str(&format!(" {cell:>3} "));
            }
        }
        out.push_str("|\n");
    }
    out.push_str(&border);
    out.push('\n');

    let _ = owner_map;

    out.push_str(&format!("---- Agents: {} ----\n", agents.len()));
    for (i, agent) in agents.iter().enumerate() {
        out.push_str(&format!(
            "Agent {i} - {} | score {} | pos ({},{}) | moves: {} ok, {} invalid | {}\n",
            agent.name,
            agent.score,
            agent.x,
            agent.y,
            agent.valid_moves,
            agent.invalid_moves,
            if agent.blocked { "blocked" } else { "active" }
        ));
    }

    out.push_str(&format!("finished={finished}\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(name: &str, score: u32, x: u16, y: u16, blocked: bool) -> AgentSummary {
        AgentSummary {
            name: name.to_string(),
            score,
            x,
            y,
            valid_moves: 0,
            invalid_moves: 0,
            blocked,
        }
    }

    #[test]
    fn marks_head_cells_with_brackets() {
        let board = vec![5, 3, 0, 0];
        let owner = vec![Some(0), None, None, None];
        let head = vec![Some(0), None, None, None];
        let agents = vec![summary("agent 0", 10, 0, 0, false)];
        let frame = draw_frame(2, 2, &board, &owner, &head, &agents, false);
        assert!(frame.contains("[  5]"));
        assert!(frame.contains("finished=false"));
    }

    #[test]
    fn lists_every_agent_with_its_status() {
        let board = vec![0; 4];
        let owner = vec![None; 4];
        let head = vec![None; 4];
        let agents = vec![summary("agent 0", 4, 1, 1, false), summary("agent 1", 0, 0, 0, true)];
        let frame = draw_frame(2, 2, &board, &owner, &head, &agents, true);
        assert!(frame.contains("Agent 0 - agent 0"));
        assert!(frame.contains("Agent 1 - agent 1 | score 0 | pos (0,0) | moves: 0 ok, 0 invalid | blocked"));
        assert!(frame.contains("finished=true"));
    }

    #[test]
    fn non_head_claimed_cells_render_without_brackets() {
        let board = vec![-1, 2, 0, 0];
        let owner = vec![Some(0), None, None, None];
        let head = vec![None, None, None, None];
        let agents = vec![];
        let frame = draw_frame(2, 2, &board, &owner, &head, &agents, false);
        assert!(frame.contains(" -1 "));
        assert!(!frame.contains("[ -1]"));
    }
}
