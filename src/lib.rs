//! # thought-tree
//!
//! A beam-limited, depth-bounded Tic-Tac-Toe search that builds an explicit,
//! inspectable tree of every position it considers.
//!
//! At each node the search asks an external move-proposal oracle for
//! candidate moves, scores every resulting position with a static
//! heuristic, keeps the best `beam_width` children, and recurses to a fixed
//! depth. One mark (the *perspective*) maximizes the score, the other
//! minimizes the same score, and the best line is backtracked to the root.
//!
//! ## Features
//!
//! - Pluggable oracles behind the [`ProposalOracle`] trait, including an
//!   external-process oracle speaking JSON
//! - Filtering, deduplication and capping of untrusted proposals, with
//!   fallback to every legal cell when the oracle has nothing
//! - An append-only [`ThoughtTree`] that records pruned children too, with
//!   text, Graphviz and JSON renderings
//! - Search statistics and `log`-based tracing of every decision
//!
//! ## Basic Usage
//!
//! ```
//! use thought_tree::{run_search, Board, Mark, NoProposals, Position, SearchConfig};
//!
//! fn main() -> Result<(), thought_tree::SearchError> {
//!     // O to move with two in the top row
//!     let board: Board = "OO. XX. X..".parse()?;
//!
//!     let config = SearchConfig::default()
//!         .with_beam_width(2)
//!         .with_max_depth(2);
//!
//!     // With no oracle every legal cell is a candidate
//!     let outcome = run_search(&board, Mark::O, NoProposals, &config)?;
//!
//!     assert_eq!(outcome.chosen_move, Some(Position::new(0, 2)));
//!     assert_eq!(outcome.score, 100);
//!     println!("{}", outcome.rendered_tree);
//!     Ok(())
//! }
//! ```
//!
//! ## Playing a game
//!
//! [`GameSession`] owns the real board and applies only the first step of
//! each computed line:
//!
//! ```
//! use thought_tree::{GameSession, Mark, NoProposals, SearchConfig};
//!
//! let mut game = GameSession::new(Mark::O);
//! game.play(1, 1).unwrap();
//! let outcome = game.play_agent(NoProposals, &SearchConfig::default()).unwrap();
//! assert!(outcome.chosen_move.is_some());
//! assert_eq!(game.to_move(), Mark::X);
//! ```

pub mod board;
pub mod config;
pub mod oracle;
pub mod scoring;
pub mod search;
pub mod session;
pub mod stats;
pub mod tree;

pub use board::{Board, Mark, Outcome, Position};
pub use config::SearchConfig;
pub use oracle::{
    CommandOracle, FixtureOracle, MoveProposal, MoveSet, NoProposals, OracleAdapter,
    ProposalOracle, ProposalRequest, ShuffledOracle,
};
pub use scoring::score;
pub use search::{run_search, BeamSearch, PathStep, SearchOutcome};
pub use session::{GameSession, GameStatus};
pub use stats::SearchStatistics;
pub use tree::{NodeId, NodeMover, ThoughtNode, ThoughtTree, TreeView};

/// Error types for the search
#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    /// A move targeted an occupied or off-board cell
    #[error("Invalid move ({row},{col}): {reason}")]
    InvalidMove {
        row: usize,
        col: usize,
        reason: String,
    },

    /// Board text or layout could not be parsed
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A tree operation referenced a missing node or a second root
    #[error("Invalid tree operation: {0}")]
    InvalidTree(String),

    /// The game is already decided
    #[error("Game is already over")]
    GameOver,

    /// An oracle could not produce proposals
    #[error("Oracle unavailable: {0}")]
    Oracle(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
