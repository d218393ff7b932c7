//! Move evaluation on cloned boards.
//!
//! Every simulation clones the given board and applies one move to the
//! clone; the caller's board is never touched.

use crate::core::{Board, Move, PlayerColor};
use crate::engine::EngineError;
use crate::logic::{apply_move, is_winning, legal_moves};
use log::error;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics of the position reached by one candidate move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub own_score: usize,
    pub opponent_score: usize,
}

impl Evaluation {
    /// 自分の最大群 - 相手の最大群
    pub fn differential(&self) -> i32 {
        self.own_score as i32 - self.opponent_score as i32
    }
}

#[derive(Debug, Default)]
pub struct MoveEvaluator {
    simulations: AtomicUsize,
}

impl MoveEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of simulated moves so far.
    pub fn simulations(&self) -> usize {
        self.simulations.load(Ordering::Relaxed)
    }

    /// Applies `mv` to a clone of `board`.
    ///
    /// Failure means an enumerated candidate was not legal for the board it
    /// was enumerated from.
    pub fn simulate(&self, board: &Board, mv: &Move) -> Result<Board, EngineError> {
        self.simulations.fetch_add(1, Ordering::Relaxed);
        apply_move(board, mv)
            .map_err(|source| EngineError::IllegalMoveAgainstClone { mv: *mv, source })
    }

    /// `simulate`, logging a contract violation and skipping the move.
    pub fn try_simulate(&self, board: &Board, mv: &Move) -> Option<Board> {
        match self.simulate(board, mv) {
            Ok(next) => Some(next),
            Err(e) => {
                error!("{}; skipping candidate", e);
                None
            }
        }
    }

    pub fn evaluate(&self, board: &Board, mv: &Move, color: PlayerColor) -> Option<Evaluation> {
        let next = self.try_simulate(board, mv)?;
        Some(Evaluation {
            own_score: next.score_for(color),
            opponent_score: next.score_for(color.opponent()),
        })
    }

    /// Does `mv` win on the spot for `color`?
    pub fn wins(&self, board: &Board, mv: &Move, color: PlayerColor) -> Option<bool> {
        let next = self.try_simulate(board, mv)?;
        Some(is_winning(&next, color))
    }

    /// Does `mv` leave the opponent of `color` with a single swarm?
    pub fn hands_opponent_win(&self, board: &Board, mv: &Move, color: PlayerColor) -> Option<bool> {
        let next = self.try_simulate(board, mv)?;
        Some(is_winning(&next, color.opponent()))
    }

    /// Can the opponent win with any single reply after `mv`? One ply only.
    pub fn allows_winning_reply(
        &self,
        board: &Board,
        mv: &Move,
        color: PlayerColor,
    ) -> Option<bool> {
        let next = self.try_simulate(board, mv)?;
        let opponent = color.opponent();
        let winning_reply = legal_moves(&next)
            .iter()
            .filter_map(|reply| self.try_simulate(&next, reply))
            .any(|after| is_winning(&after, opponent));
        Some(winning_reply)
    }
}
