//! Move-proposal oracles and the adapter that sanitises their output
//!
//! The search asks an external [`ProposalOracle`] for candidate moves at
//! every node it expands. Oracles are untrusted: they may fail, return
//! nothing, propose occupied or out-of-range cells, or repeat themselves.
//! [`OracleAdapter`] turns any of that into a clean, legal, duplicate-free
//! and bounded candidate list, with an empty list standing in for
//! "unavailable".

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Mark, Position};
use crate::{Result, SearchError};

/// Justification attached to candidates produced by fallback enumeration
pub const FALLBACK_JUSTIFICATION: &str = "fallback: legal move";

/// A candidate move with the oracle's justification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveProposal {
    pub row: usize,
    pub col: usize,
    #[serde(alias = "reason")]
    pub justification: String,
}

impl MoveProposal {
    pub fn new(row: usize, col: usize, justification: impl Into<String>) -> Self {
        MoveProposal {
            row,
            col,
            justification: justification.into(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Oracle response payload: candidates in priority order, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSet {
    #[serde(default)]
    pub moves: Vec<MoveProposal>,
}

/// What an oracle is asked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRequest {
    /// Three rows of three marks, `-` for empty, e.g. `"X - O"`
    pub board: [String; 3],
    pub mover: Mark,
    /// Legal cells as `[row, col]`, sorted row-major
    pub legal: Vec<[usize; 2]>,
}

impl ProposalRequest {
    pub fn new(board: &Board, legal: &[Position], mover: Mark) -> Self {
        let mut legal: Vec<[usize; 2]> = legal.iter().map(|p| [p.row, p.col]).collect();
        legal.sort_unstable();
        ProposalRequest {
            board: board.rows(),
            mover,
            legal,
        }
    }

    /// Parses the `board` rows back into a [`Board`]
    pub fn parse_board(&self) -> Result<Board> {
        self.board.join("/").parse()
    }
}

/// An external source of candidate moves
///
/// Implementations return proposals best-first. Returning an empty list or
/// an error both mean "no proposals"; the adapter never lets either reach
/// the search.
pub trait ProposalOracle: Send + Sync {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>>;
}

impl<O: ProposalOracle + ?Sized> ProposalOracle for Box<O> {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        (**self).propose(request)
    }
}

impl<O: ProposalOracle + ?Sized> ProposalOracle for &O {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        (**self).propose(request)
    }
}

/// Oracle that never has anything to say
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProposals;

impl ProposalOracle for NoProposals {
    fn propose(&self, _request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        Ok(Vec::new())
    }
}

/// Deterministic oracle returning canned proposals
///
/// Boards registered with [`FixtureOracle::with_board`] get their own list;
/// every other board gets the default list. Lists are returned verbatim,
/// illegal entries included, so the adapter's filtering can be exercised.
#[derive(Debug, Clone, Default)]
pub struct FixtureOracle {
    default: Vec<MoveProposal>,
    per_board: HashMap<Board, Vec<MoveProposal>>,
    calls: std::sync::Arc<AtomicUsize>,
}

impl FixtureOracle {
    pub fn new(default: Vec<MoveProposal>) -> Self {
        FixtureOracle {
            default,
            ..FixtureOracle::default()
        }
    }

    pub fn with_board(mut self, board: Board, proposals: Vec<MoveProposal>) -> Self {
        self.per_board.insert(board, proposals);
        self
    }

    /// Number of times the oracle has been consulted
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ProposalOracle for FixtureOracle {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let board = request.parse_board()?;
        Ok(self
            .per_board
            .get(&board)
            .unwrap_or(&self.default)
            .clone())
    }
}

/// Seeded oracle proposing every legal cell in random order
///
/// Each answer is salted with a repeated proposal and an out-of-range one,
/// the way a sloppy remote model behaves.
#[derive(Debug)]
pub struct ShuffledOracle {
    rng: Mutex<StdRng>,
}

impl ShuffledOracle {
    pub fn new(seed: u64) -> Self {
        ShuffledOracle {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ProposalOracle for ShuffledOracle {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        let mut cells = request.legal.clone();
        {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| SearchError::Oracle("shuffled oracle rng poisoned".to_string()))?;
            cells.shuffle(&mut *rng);
        }
        let mut proposals: Vec<MoveProposal> = cells
            .iter()
            .map(|&[row, col]| MoveProposal::new(row, col, "shuffled"))
            .collect();
        if let Some(first) = proposals.first().cloned() {
            proposals.push(MoveProposal::new(first.row, first.col, "repeated"));
        }
        proposals.insert(0, MoveProposal::new(3, 3, "off the board"));
        Ok(proposals)
    }
}

/// Oracle backed by an external program
///
/// The program receives one [`ProposalRequest`] as JSON on stdin and must
/// print a [`MoveSet`] as JSON on stdout. There are no retries: a spawn
/// failure, a non-zero exit or unparsable output is an error, which the
/// adapter treats as "no proposals".
#[derive(Debug, Clone)]
pub struct CommandOracle {
    program: String,
    args: Vec<String>,
}

impl CommandOracle {
    pub fn new(program: impl Into<String>) -> Self {
        CommandOracle {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl ProposalOracle for CommandOracle {
    fn propose(&self, request: &ProposalRequest) -> Result<Vec<MoveProposal>> {
        let payload = serde_json::to_vec(request)?;
        let oracle_err =
            |what: &str, e: std::io::Error| SearchError::Oracle(format!("{} '{}': {}", what, self.program, e));

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| oracle_err("failed to spawn", e))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload) {
                drop(stdin);
                let _ = child.kill();
                let _ = child.wait();
                return Err(oracle_err("failed to write request to", e));
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| oracle_err("failed to wait for", e))?;
        if !output.status.success() {
            return Err(SearchError::Oracle(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let set: MoveSet = serde_json::from_slice(&output.stdout).map_err(|e| {
            SearchError::Oracle(format!("bad response from '{}': {}", self.program, e))
        })?;
        Ok(set.moves)
    }
}

/// Sanitising wrapper around a [`ProposalOracle`]
pub struct OracleAdapter<O> {
    oracle: O,
    max_proposals: usize,
    rejected: AtomicUsize,
}

impl<O: ProposalOracle> OracleAdapter<O> {
    pub fn new(oracle: O, max_proposals: usize) -> Self {
        OracleAdapter {
            oracle,
            max_proposals,
            rejected: AtomicUsize::new(0),
        }
    }

    /// Legal, duplicate-free candidates for `mover`, best first.
    ///
    /// Never fails: oracle errors are logged and reported as an empty list.
    /// Proposals outside `legal` are dropped, repeats keep their first
    /// occurrence, and the result holds at most `max_proposals` entries.
    pub fn propose(&self, board: &Board, legal: &[Position], mover: Mark) -> Vec<MoveProposal> {
        let request = ProposalRequest::new(board, legal, mover);
        let raw = match self.oracle.propose(&request) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[oracle] unavailable for {}: {}", mover, e);
                return Vec::new();
            }
        };
        debug!("[oracle] proposed {} moves for {} (pre-filter)", raw.len(), mover);

        let legal: HashSet<Position> = legal.iter().copied().collect();
        let mut seen = HashSet::new();
        let mut accepted = Vec::new();
        let mut rejected = 0;
        for proposal in raw {
            let pos = proposal.position();
            if !legal.contains(&pos) || !seen.insert(pos) {
                rejected += 1;
                continue;
            }
            if accepted.len() < self.max_proposals {
                accepted.push(proposal);
            }
        }
        self.rejected.fetch_add(rejected, Ordering::Relaxed);
        debug!("[oracle] using {} legal & unique moves for {}", accepted.len(), mover);
        accepted
    }

    /// Proposals dropped as illegal or duplicate so far
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    pub fn max_proposals(&self) -> usize {
        self.max_proposals
    }

    pub fn into_inner(self) -> O {
        self.oracle
    }
}

/// Every legal cell as a fallback candidate, in row-major order
pub fn enumerate_fallback(legal: &[Position]) -> Vec<MoveProposal> {
    let mut cells = legal.to_vec();
    cells.sort_unstable();
    cells
        .into_iter()
        .map(|p| MoveProposal::new(p.row, p.col, FALLBACK_JUSTIFICATION))
        .collect()
}
