//! Beam-limited, depth-bounded search over oracle-proposed moves
//!
//! Every node is evaluated in a fixed order:
//!
//! 1. **Terminal check**: a won or drawn position returns +100, -100 or 0,
//!    even at depth 0 and even past the depth bound.
//! 2. **Depth cutoff**: at `max_depth` the node returns its own heuristic
//!    score.
//! 3. **No legal moves**: returns 0.
//! 4. **Candidates**: the oracle's proposals, or every legal cell when the
//!    oracle has none.
//! 5. **Expansion**: each candidate becomes a child node in the tree.
//! 6. **Beam selection**: children are stably sorted by score (descending
//!    for the perspective mark, ascending for its opponent) and the first
//!    `beam_width` are kept.
//! 7. **Recursion** into the kept children with the other mark to move.
//! 8. **Backtracking**: the strictly best child result wins, ties keep the
//!    earliest child, and this ply is prepended to its continuation.
//!
//! Scores are always expressed for the configured perspective mark.

use std::cmp::Reverse;
use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, Mark, Outcome, Position},
    config::SearchConfig,
    oracle::{enumerate_fallback, MoveProposal, OracleAdapter, ProposalOracle},
    scoring::{self, DRAW_SCORE, LOSS_SCORE, WIN_SCORE},
    stats::SearchStatistics,
    tree::{ChildSpec, NodeId, ThoughtTree},
    Result, SearchError,
};

/// One ply of a computed best line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub mover: Mark,
    pub position: Position,
    pub justification: String,
    /// Heuristic score of the resulting state
    pub score: i32,
    /// Tree node holding the resulting state
    pub node: NodeId,
}

/// An expanded child awaiting beam selection
#[derive(Debug, Clone)]
struct Candidate {
    proposal: MoveProposal,
    score: i32,
    board: Board,
    node: NodeId,
}

/// Everything a caller needs from one top-level search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// First move of the best line; `None` means skip this ply
    pub chosen_move: Option<Position>,
    pub justification: String,
    /// Best achievable score from the perspective mark
    pub score: i32,
    /// Resulting-state scores along the best line
    pub score_trace: Vec<i32>,
    pub path: Vec<PathStep>,
    /// Text rendering of the full tree
    pub rendered_tree: String,
    pub tree: ThoughtTree,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    pub fn first_step(&self) -> Option<&PathStep> {
        self.path.first()
    }

    /// Graphviz rendering of the full tree
    pub fn dot(&self) -> String {
        self.tree.to_dot()
    }
}

/// The beam search engine
///
/// Holds the oracle (behind an [`OracleAdapter`]), the configuration, and
/// the statistics of the most recent search.
pub struct BeamSearch<O> {
    adapter: OracleAdapter<O>,
    config: SearchConfig,
    statistics: SearchStatistics,
}

impl<O: ProposalOracle> BeamSearch<O> {
    /// Creates an engine, rejecting invalid configurations
    pub fn new(oracle: O, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(BeamSearch {
            adapter: OracleAdapter::new(oracle, config.max_proposals),
            config,
            statistics: SearchStatistics::new(),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the statistics of the last search
    pub fn get_statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Builds a fresh tree for `board`, searches it, and packages the result
    pub fn run(&mut self, board: &Board, mover: Mark) -> Result<SearchOutcome> {
        let mut tree = ThoughtTree::new();
        let root = tree.add_root(*board, scoring::score(board, self.config.perspective))?;
        let (score, path) = self.search(board, mover, &mut tree, root)?;

        let first = path.first();
        let chosen_move = first.map(|s| s.position);
        let justification = first.map(|s| s.justification.clone()).unwrap_or_default();
        match first {
            Some(step) => info!(
                "{} plays {} (score {}): {}",
                mover, step.position, score, step.justification
            ),
            None => info!("{} has no path from this position; skipping move", mover),
        }

        Ok(SearchOutcome {
            chosen_move,
            justification,
            score,
            score_trace: path.iter().map(|s| s.score).collect(),
            path,
            rendered_tree: tree.render_text(),
            tree,
            statistics: self.statistics.clone(),
        })
    }

    /// Searches from `root`, which must already hold `board`'s heuristic
    /// score, with `mover` to play.
    ///
    /// Returns the best achievable score and the line realizing it. The
    /// line is empty only when the root is terminal, has no legal moves,
    /// or `max_depth` is zero.
    pub fn search(
        &mut self,
        board: &Board,
        mover: Mark,
        tree: &mut ThoughtTree,
        root: NodeId,
    ) -> Result<(i32, Vec<PathStep>)> {
        self.statistics = SearchStatistics::new();
        let rejected_before = self.adapter.rejected();
        let start = Instant::now();

        let result = self.evaluate(board, mover, tree, root, 0);

        self.statistics.total_time = start.elapsed();
        self.statistics.nodes_created = tree.len();
        self.statistics.rejected_proposals = self.adapter.rejected() - rejected_before;
        result
    }

    fn evaluate(
        &mut self,
        board: &Board,
        mover: Mark,
        tree: &mut ThoughtTree,
        node: NodeId,
        depth: usize,
    ) -> Result<(i32, Vec<PathStep>)> {
        let here = tree
            .get(node)
            .map(|n| n.score)
            .ok_or_else(|| SearchError::InvalidTree(format!("no node #{}", node)))?;
        let indent = "│   ".repeat(depth);
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(depth);
        debug!(
            "{}↳ Explore node #{} (depth={}/{}, to_move={}) | score_here={}",
            indent, node, depth, self.config.max_depth, mover, here
        );

        if let Some((outcome, value)) = self.terminal_value(board) {
            tree.mark_terminal(node, outcome)?;
            debug!("{}  Terminal: {} ({})", indent, outcome, value);
            return Ok((value, Vec::new()));
        }

        if depth >= self.config.max_depth {
            debug!(
                "{}  Depth cutoff at {}. Returning heuristic={}",
                indent, self.config.max_depth, here
            );
            return Ok((here, Vec::new()));
        }

        let legal = board.legal_cells();
        if legal.is_empty() {
            debug!("{}  No legal moves. Returning 0.", indent);
            return Ok((DRAW_SCORE, Vec::new()));
        }

        self.statistics.oracle_calls += 1;
        let mut proposals = self.adapter.propose(board, &legal, mover);
        if proposals.is_empty() {
            debug!("{}  [fallback] Enumerating {} legal moves.", indent, legal.len());
            self.statistics.fallbacks += 1;
            proposals = enumerate_fallback(&legal);
        }

        self.statistics.nodes_expanded += 1;
        let mut candidates = self.expand(board, mover, tree, node, proposals)?;
        if candidates.is_empty() {
            warn!("{}  Every candidate at node #{} was skipped. Returning 0.", indent, node);
            return Ok((DRAW_SCORE, Vec::new()));
        }

        // One signed key serves both sides: the perspective mark maximizes.
        let sign = if mover == self.config.perspective { 1 } else { -1 };
        candidates.sort_by_key(|c| Reverse(sign * c.score));
        candidates.truncate(self.config.beam_width);
        debug!(
            "{}  Beam for {}: {}",
            indent,
            mover,
            candidates
                .iter()
                .map(|c| format!("#{} {}={}", c.node, c.proposal.position(), c.score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut best: Option<(i32, Vec<PathStep>)> = None;
        for candidate in candidates {
            let (value, mut line) =
                self.evaluate(&candidate.board, mover.opponent(), tree, candidate.node, depth + 1)?;
            let better = match &best {
                None => true,
                Some((best_value, _)) => sign * value > sign * best_value,
            };
            if better {
                line.insert(
                    0,
                    PathStep {
                        mover,
                        position: candidate.proposal.position(),
                        justification: candidate.proposal.justification,
                        score: candidate.score,
                        node: candidate.node,
                    },
                );
                best = Some((value, line));
            }
        }

        Ok(best.unwrap_or((DRAW_SCORE, Vec::new())))
    }

    /// Terminal outcome and value, checked perspective-win first
    fn terminal_value(&self, board: &Board) -> Option<(Outcome, i32)> {
        let perspective = self.config.perspective;
        if board.is_win(perspective) {
            Some((Outcome::Win(perspective), WIN_SCORE))
        } else if board.is_win(perspective.opponent()) {
            Some((Outcome::Win(perspective.opponent()), LOSS_SCORE))
        } else if board.is_draw() {
            Some((Outcome::Draw, DRAW_SCORE))
        } else {
            None
        }
    }

    /// Applies, scores and records every proposal in order.
    ///
    /// A proposal that cannot be applied is skipped with a warning, or
    /// aborts the search in strict mode.
    fn expand(
        &mut self,
        board: &Board,
        mover: Mark,
        tree: &mut ThoughtTree,
        parent: NodeId,
        proposals: Vec<MoveProposal>,
    ) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            match self.expand_one(board, mover, tree, parent, &proposal) {
                Ok((next, score, node)) => candidates.push(Candidate {
                    proposal,
                    score,
                    board: next,
                    node,
                }),
                Err(e) if self.config.strict => return Err(e),
                Err(e) => {
                    warn!("Skipping candidate {} for {}: {}", proposal.position(), mover, e);
                    self.statistics.skipped_candidates += 1;
                }
            }
        }
        Ok(candidates)
    }

    fn expand_one(
        &self,
        board: &Board,
        mover: Mark,
        tree: &mut ThoughtTree,
        parent: NodeId,
        proposal: &MoveProposal,
    ) -> Result<(Board, i32, NodeId)> {
        let next = board.apply(proposal.row, proposal.col, mover)?;
        let score = scoring::score(&next, self.config.perspective);
        let node = tree.add_child(
            parent,
            ChildSpec {
                mover,
                position: proposal.position(),
                justification: proposal.justification.clone(),
                score,
                board: next,
            },
        )?;
        Ok((next, score, node))
    }
}

/// Runs one complete search for `mover` on `board`.
///
/// The caller applies `chosen_move` to its own game state; the rest of the
/// computed line is advisory.
pub fn run_search<O: ProposalOracle>(
    board: &Board,
    mover: Mark,
    oracle: O,
    config: &SearchConfig,
) -> Result<SearchOutcome> {
    BeamSearch::new(oracle, config.clone())?.run(board, mover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{FixtureOracle, NoProposals};

    fn board(s: &str) -> Board {
        s.parse().unwrap()
    }

    fn seeded(b: &Board, perspective: Mark) -> (ThoughtTree, NodeId) {
        let mut tree = ThoughtTree::new();
        let root = tree.add_root(*b, scoring::score(b, perspective)).unwrap();
        (tree, root)
    }

    #[test]
    fn bad_candidate_is_skipped_by_default() {
        let b = board("X.. ... ...");
        let mut engine = BeamSearch::new(NoProposals, SearchConfig::default()).unwrap();
        let (mut tree, root) = seeded(&b, Mark::O);
        let got = engine
            .expand(
                &b,
                Mark::O,
                &mut tree,
                root,
                vec![MoveProposal::new(0, 0, "occupied"), MoveProposal::new(1, 1, "center")],
            )
            .unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].proposal.position(), Position::new(1, 1));
        assert_eq!(tree.len(), 2);
        assert_eq!(engine.statistics.skipped_candidates, 1);
    }

    #[test]
    fn bad_candidate_aborts_in_strict_mode() {
        let b = board("X.. ... ...");
        let config = SearchConfig::default().with_strict(true);
        let mut engine = BeamSearch::new(NoProposals, config).unwrap();
        let (mut tree, root) = seeded(&b, Mark::O);
        let got = engine.expand(
            &b,
            Mark::O,
            &mut tree,
            root,
            vec![MoveProposal::new(1, 1, "center"), MoveProposal::new(0, 0, "occupied")],
        );
        assert!(matches!(got, Err(SearchError::InvalidMove { row: 0, col: 0, .. })));
        // The child created before the failure stays recorded
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn rejects_zero_beam_width() {
        let config = SearchConfig::default().with_beam_width(0);
        assert!(matches!(
            BeamSearch::new(NoProposals, config),
            Err(SearchError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn ties_keep_expansion_order_in_the_beam() {
        // Both corners score the same for O; the oracle lists (2,2) first.
        let b = board("... .X. ...");
        let oracle = FixtureOracle::new(vec![
            MoveProposal::new(2, 2, "far corner"),
            MoveProposal::new(0, 0, "near corner"),
        ]);
        let config = SearchConfig::default().with_beam_width(1).with_max_depth(1);
        let outcome = BeamSearch::new(oracle, config).unwrap().run(&b, Mark::O).unwrap();
        assert_eq!(outcome.chosen_move, Some(Position::new(2, 2)));
        assert_eq!(outcome.tree.get(0).unwrap().children, vec![1, 2]);
    }

    #[test]
    fn minimizing_side_keeps_lowest_scores() {
        // X to move, O is the perspective: X's best is the lowest O score.
        let b = board("OO. ... ...");
        let config = SearchConfig::default().with_beam_width(1).with_max_depth(1);
        let outcome = run_search(&b, Mark::X, NoProposals, &config).unwrap();
        // Blocking at (0,2) removes O's open two
        assert_eq!(outcome.chosen_move, Some(Position::new(0, 2)));
        assert_eq!(outcome.score, outcome.score_trace[0]);
    }

    #[test]
    fn statistics_track_fallbacks_and_nodes() {
        let config = SearchConfig::default().with_beam_width(2).with_max_depth(2);
        let mut engine = BeamSearch::new(NoProposals, config).unwrap();
        let outcome = engine.run(&Board::new(), Mark::O).unwrap();
        let stats = engine.get_statistics();
        // Root expands 9, two beam children expand 8 each
        assert_eq!(stats.nodes_created, 1 + 9 + 8 + 8);
        assert_eq!(stats.nodes_expanded, 3);
        assert_eq!(stats.oracle_calls, 3);
        assert_eq!(stats.fallbacks, 3);
        assert_eq!(stats.max_depth_reached, 2);
        assert_eq!(outcome.tree.len(), stats.nodes_created);
    }
}
