//! A game between a human and the search agent
//!
//! The session owns the authoritative board. The search only ever works on
//! copies; the session applies the first step of the returned line and
//! discards the rest, since the opponent's real reply is unknown.

use log::info;

use crate::{
    board::{Board, Mark, Outcome, Position},
    config::SearchConfig,
    oracle::ProposalOracle,
    search::{BeamSearch, SearchOutcome},
    Result, SearchError,
};

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won(Mark),
    Draw,
}

/// Authoritative game state plus whose turn it is
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    to_move: Mark,
    agent: Mark,
    history: Vec<(Mark, Position)>,
}

impl GameSession {
    /// New empty game; X moves first
    pub fn new(agent: Mark) -> Self {
        GameSession::from_board(Board::new(), Mark::X, agent)
    }

    /// Resumes from an arbitrary position
    pub fn from_board(board: Board, to_move: Mark, agent: Mark) -> Self {
        GameSession {
            board,
            to_move,
            agent,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    pub fn agent(&self) -> Mark {
        self.agent
    }

    /// Moves played through this session, in order
    pub fn history(&self) -> &[(Mark, Position)] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        match self.board.outcome() {
            Some(Outcome::Win(mark)) => GameStatus::Won(mark),
            Some(Outcome::Draw) => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// Plays a move for the side to move
    pub fn play(&mut self, row: usize, col: usize) -> Result<GameStatus> {
        if self.status() != GameStatus::InProgress {
            return Err(SearchError::GameOver);
        }
        self.board = self.board.apply(row, col, self.to_move)?;
        self.history.push((self.to_move, Position::new(row, col)));
        self.to_move = self.to_move.opponent();
        Ok(self.status())
    }

    /// Searches for the agent's move and plays its first step.
    ///
    /// The search is scored from the agent's perspective. An empty line is
    /// a skipped ply: the board is left unchanged and the turn passes.
    pub fn play_agent<O: ProposalOracle>(
        &mut self,
        oracle: O,
        config: &SearchConfig,
    ) -> Result<SearchOutcome> {
        if self.status() != GameStatus::InProgress {
            return Err(SearchError::GameOver);
        }
        let config = config.clone().with_perspective(self.agent);
        let mut engine = BeamSearch::new(oracle, config)?;
        let outcome = engine.run(&self.board, self.to_move)?;

        match outcome.chosen_move {
            Some(pos) => {
                self.play(pos.row, pos.col)?;
            }
            None => {
                info!("[agent] No path found; skipping move.");
                self.to_move = self.to_move.opponent();
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::NoProposals;

    #[test]
    fn turns_alternate_and_history_is_recorded() {
        let mut game = GameSession::new(Mark::O);
        assert_eq!(game.play(1, 1).unwrap(), GameStatus::InProgress);
        assert_eq!(game.to_move(), Mark::O);
        game.play(0, 0).unwrap();
        assert_eq!(
            game.history(),
            &[(Mark::X, Position::new(1, 1)), (Mark::O, Position::new(0, 0))]
        );
    }

    #[test]
    fn occupied_cell_surfaces_invalid_move() {
        let mut game = GameSession::new(Mark::O);
        game.play(1, 1).unwrap();
        assert!(matches!(game.play(1, 1), Err(SearchError::InvalidMove { .. })));
        assert_eq!(game.to_move(), Mark::O);
    }

    #[test]
    fn agent_takes_immediate_win() {
        let board: Board = "OO. XX. X..".parse().unwrap();
        let mut game = GameSession::from_board(board, Mark::O, Mark::O);
        let outcome = game.play_agent(NoProposals, &SearchConfig::default()).unwrap();
        assert_eq!(outcome.chosen_move, Some(Position::new(0, 2)));
        assert_eq!(game.status(), GameStatus::Won(Mark::O));
    }

    #[test]
    fn skipped_agent_move_passes_the_turn() {
        let mut game = GameSession::new(Mark::O);
        game.play(1, 1).unwrap();
        let config = SearchConfig::default().with_max_depth(0);
        let outcome = game.play_agent(NoProposals, &config).unwrap();
        assert_eq!(outcome.chosen_move, None);
        assert_eq!(game.to_move(), Mark::X);
        assert_eq!(game.board().legal_cells().len(), 8);

        game.play(0, 0).unwrap();
        assert_eq!(game.board().get(0, 0), Some(Mark::X));
        assert_eq!(game.to_move(), Mark::O);
    }

    #[test]
    fn finished_game_refuses_moves() {
        let board: Board = "XXX OO. ...".parse().unwrap();
        let mut game = GameSession::from_board(board, Mark::O, Mark::O);
        assert!(matches!(game.play(2, 2), Err(SearchError::GameOver)));
        assert!(matches!(
            game.play_agent(NoProposals, &SearchConfig::default()),
            Err(SearchError::GameOver)
        ));
    }
}
