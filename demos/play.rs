//! Tic-Tac-Toe against the thought-tree agent
//!
//! The human plays X and moves first; the agent plays O. After every agent
//! move the explored tree is printed.
//!
//! ```bash
//! cargo run --example play -- --beam 2 --depth 3
//! RUST_LOG=debug cargo run --example play -- --oracle-cmd ./my_oracle.sh
//! ```

use std::io::{self, BufRead, Write};

use clap::Parser;
use thought_tree::{
    Board, CommandOracle, GameSession, GameStatus, Mark, NoProposals, ProposalOracle,
    SearchConfig,
};

#[derive(Parser, Debug)]
#[command(about = "Tic-Tac-Toe with a beam-searched thought tree")]
struct Args {
    /// Beam width for search
    #[arg(long, default_value_t = 2)]
    beam: usize,

    /// Max search depth
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// External oracle program; reads a request as JSON on stdin, prints a
    /// move set as JSON on stdout. Without it every legal cell is tried.
    #[arg(long)]
    oracle_cmd: Option<String>,

    /// Print the Graphviz rendering of each tree as well
    #[arg(long)]
    dot: bool,

    /// Do not print the tree after agent moves
    #[arg(long)]
    quiet: bool,
}

fn main() {
    // Initialize logging
    env_logger::init();
    let args = Args::parse();

    let config = SearchConfig::default()
        .with_beam_width(args.beam)
        .with_max_depth(args.depth);
    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        std::process::exit(2);
    }

    let oracle: Box<dyn ProposalOracle> = match &args.oracle_cmd {
        Some(cmd) => Box::new(CommandOracle::new("sh").with_args(["-c", cmd.as_str()])),
        None => Box::new(NoProposals),
    };

    println!("Thought-Tree Tic-Tac-Toe");
    println!("========================");
    println!();

    let mut game = GameSession::new(Mark::O);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while game.status() == GameStatus::InProgress {
        print_board(game.board());

        if game.to_move() == Mark::X {
            print!("Your move as X (row col), or 'q' to quit: ");
            let _ = io::stdout().flush();

            let Some(Ok(input)) = lines.next() else {
                break;
            };
            let input = input.trim();
            if matches!(input, "q" | "quit" | "exit") {
                println!("Goodbye!");
                return;
            }

            let coords: Vec<usize> = input
                .split_whitespace()
                .filter_map(|s| s.parse::<usize>().ok())
                .collect();
            if coords.len() != 2 {
                println!("Invalid input. Please enter two integers 0..2, e.g. '1 2'.");
                continue;
            }
            if let Err(e) = game.play(coords[0], coords[1]) {
                println!("{}. Try again.", e);
            }
        } else {
            println!("Agent is thinking...");
            match game.play_agent(&oracle, &config) {
                Ok(outcome) => {
                    if !args.quiet {
                        println!("\n=== Thought Tree ===\n{}\n", outcome.rendered_tree);
                    }
                    if args.dot {
                        println!("=== Graphviz DOT ===\n{}\n", outcome.dot());
                    }
                    match outcome.first_step() {
                        Some(step) => println!(
                            "Agent (O) plays {}. Reason: {}",
                            step.position, step.justification
                        ),
                        None => {
                            println!("Agent found no move; skipping.");
                            continue;
                        }
                    }
                    println!("{}", outcome.statistics.summary());
                }
                Err(e) => {
                    println!("Error: {}", e);
                    break;
                }
            }
        }
    }

    print_board(game.board());
    match game.status() {
        GameStatus::Won(Mark::X) => println!("You (X) win!"),
        GameStatus::Won(Mark::O) => println!("Agent (O) wins!"),
        GameStatus::Draw => println!("It's a draw."),
        GameStatus::InProgress => println!("Game abandoned."),
    }
}

fn print_board(board: &Board) {
    println!("\n------- CURRENT STATE -------");
    print!("{}", board);
    println!("-----------------------------\n");
}
