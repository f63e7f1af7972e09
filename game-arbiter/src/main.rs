//! Arbiter entry point: parses arguments, runs the game, and maps the
//! outcome to the exit codes in SPEC_FULL.md §6.

use clap::Parser;
use game_arbiter::{exit_code_for, run_game, Args};

fn main() {
    env_logger::init();

    let args = Args::parse();
    let resolved = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("game-arbiter: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_game(resolved) {
        eprintln!("game-arbiter: {e}");
        std::process::exit(exit_code_for(&e));
    }
}
