//! Command-line surface for the arbiter (spec §6).

use clap::Parser;
use game_core::constants::{
    DEFAULT_DISPLAY_DELAY_MS, DEFAULT_HEIGHT, DEFAULT_TIMEOUT_SECONDS, DEFAULT_WIDTH, MAX_AGENTS,
    MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH,
};
use game_core::error::{GameError, GameResult};

/// Territory arbiter: runs a turn-arbitrated multi-agent game over shared
/// memory.
#[derive(Parser, Debug)]
#[command(name = "game-arbiter")]
pub struct Args {
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u16,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u16,

    #[arg(long, default_value_t = DEFAULT_DISPLAY_DELAY_MS)]
    pub display_delay_ms: u64,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Defaults to the current Unix timestamp if not given.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub observer_path: Option<String>,

    #[arg(long = "agent-path", required = true, num_args = 1..)]
    pub agent_paths: Vec<String>,
}

pub struct ResolvedArgs {
    pub width: u16,
    pub height: u16,
    pub display_delay_ms: u64,
    pub timeout_seconds: u64,
    pub seed: u64,
    pub observer_path: Option<String>,
    pub agent_paths: Vec<String>,
}

impl Args {
    pub fn resolve(self) -> GameResult<ResolvedArgs> {
        if self.width < MIN_WIDTH {
            return Err(GameError::ArgumentError(format!(
                "width must be at least {MIN_WIDTH}, got {}",
                self.width
            )));
        }
        if self.height < MIN_HEIGHT {
            return Err(GameError::ArgumentError(format!(
                "height must be at least {MIN_HEIGHT}, got {}",
                self.height
            )));
        }
        if self.width as usize > MAX_WIDTH {
            return Err(GameError::ArgumentError(format!(
                "width must be at most {MAX_WIDTH}, got {}",
                self.width
            )));
        }
        if self.height as usize > MAX_HEIGHT {
            return Err(GameError::ArgumentError(format!(
                "height must be at most {MAX_HEIGHT}, got {}",
                self.height
            )));
        }
        if self.agent_paths.is_empty() {
            return Err(GameError::ArgumentError("at least one agent is required".into()));
        }
        if self.agent_paths.len() > MAX_AGENTS {
            return Err(GameError::ArgumentError(format!(
                "at most {MAX_AGENTS} agents are supported, got {}",
                self.agent_paths.len()
            )));
        }

        let seed = self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        Ok(ResolvedArgs {
            width: self.width,
            height: self.height,
            display_delay_ms: self.display_delay_ms,
            timeout_seconds: self.timeout_seconds,
            seed,
            observer_path: self.observer_path,
            agent_paths: self.agent_paths,
        })
    }
}
