//! CLI entry point for the Block Slider solver.
//!
//! Usage:
//!   block-slider solve <puzzle.txt> [options]
//!   block-slider solve --stdin [options]
//!
//! Options:
//!   --max-depth <n>   Maximum moves per solution (default: 6)
//!   --json            Emit machine-readable JSON instead of text

mod board;
mod puzzle;
mod solver;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;

use board::Board;
use puzzle::{Move, Puzzle};
use solver::Solver;

#[derive(Parser)]
#[command(name = "block-slider")]
#[command(about = "Exhaustive bounded solver for the Block Slider puzzle")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find every solution of a puzzle within a move bound
    Solve {
        /// Path to a puzzle description file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the puzzle description from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Maximum number of moves in any one solution
        #[arg(long, default_value = "6")]
        max_depth: usize,

        /// Emit machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solution_count: usize,
    max_depth: usize,
    time_elapsed_ms: u64,
    solutions: Vec<Vec<Move>>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            stdin,
            max_depth,
            json,
        } => {
            // Read the puzzle description
            let text = if stdin {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .expect("Failed to read from stdin");
                buffer
            } else if let Some(path) = file {
                fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("Failed to read file {:?}: {}", path, e))
            } else {
                eprintln!("Error: Must provide either a file path or --stdin");
                std::process::exit(1);
            };

            // Parse the puzzle
            let puzzle = match Puzzle::parse(&text) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error parsing puzzle description: {}", e);
                    std::process::exit(1);
                }
            };

            // Run the solver
            let mut board = Board::from_puzzle(puzzle);
            let mut solver = Solver::new(max_depth);
            let start = Instant::now();
            solver.solve(&mut board);
            let elapsed_ms = start.elapsed().as_millis() as u64;

            if json {
                let output = SolveOutput {
                    solution_count: solver.solutions().len(),
                    max_depth,
                    time_elapsed_ms: elapsed_ms,
                    solutions: solver.solutions().to_vec(),
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            } else {
                println!("{}", board);
                println!();
                println!("Number of solutions found: {}", solver.solutions().len());
                solver.print_solutions();
            }

            // Exit with appropriate code
            if solver.solutions().is_empty() {
                std::process::exit(1);
            }
        }
    }
}
