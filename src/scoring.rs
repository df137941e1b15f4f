//! Static positional heuristic
//!
//! Scores are always expressed from one fixed `perspective` mark: higher is
//! better for that mark regardless of whose move produced the position.

use crate::board::{Board, Mark, LINES};

/// Score of a won position
pub const WIN_SCORE: i32 = 100;
/// Score of a lost position
pub const LOSS_SCORE: i32 = -100;
/// Score of a drawn position
pub const DRAW_SCORE: i32 = 0;

const CENTER_WEIGHT: i32 = 3;
const CORNER_WEIGHT: i32 = 2;
const EDGE_WEIGHT: i32 = 1;
const OPEN_TWO_BONUS: i32 = 5;
// Blocking is weighted above building.
const OPPONENT_OPEN_TWO_PENALTY: i32 = 6;

const CENTER: (usize, usize) = (1, 1);
const CORNERS: [(usize, usize); 4] = [(0, 0), (0, 2), (2, 0), (2, 2)];
const EDGES: [(usize, usize); 4] = [(0, 1), (1, 0), (1, 2), (2, 1)];

/// Heuristic desirability of `board` for `perspective`.
///
/// Returns [`WIN_SCORE`] / [`LOSS_SCORE`] for decided positions. Otherwise
/// the sum of cell control (center 3, corners 2, edges 1, signed by owner)
/// plus +5 for every line holding two `perspective` marks and one empty
/// cell, and -6 for every such line held by the opponent.
pub fn score(board: &Board, perspective: Mark) -> i32 {
    let opponent = perspective.opponent();
    if board.is_win(perspective) {
        return WIN_SCORE;
    }
    if board.is_win(opponent) {
        return LOSS_SCORE;
    }

    let control = |cells: &[(usize, usize)], weight: i32| -> i32 {
        cells
            .iter()
            .map(|&(r, c)| match board.get(r, c) {
                Some(m) if m == perspective => weight,
                Some(_) => -weight,
                None => 0,
            })
            .sum()
    };

    let mut total = control(&[CENTER], CENTER_WEIGHT)
        + control(&CORNERS, CORNER_WEIGHT)
        + control(&EDGES, EDGE_WEIGHT);

    for line in LINES.iter() {
        let mut own = 0;
        let mut theirs = 0;
        let mut empty = 0;
        for &(r, c) in line {
            match board.get(r, c) {
                Some(m) if m == perspective => own += 1,
                Some(_) => theirs += 1,
                None => empty += 1,
            }
        }
        if own == 2 && empty == 1 {
            total += OPEN_TWO_BONUS;
        }
        if theirs == 2 && empty == 1 {
            total -= OPPONENT_OPEN_TWO_PENALTY;
        }
    }

    total
}
