use super::evaluator::MoveEvaluator;
use super::strategy::first_maximizer;
use crate::core::{Board, Move, PlayerColor};
use crate::logic::legal_moves;
use rayon::prelude::*;

/// 深さ制限付き探索
///
/// On `color`'s turns every move is expanded and the best value kept. On
/// the opponent's turns only its greedy reply (the one maximising its own
/// swarm right away) is followed. Leaves score `color`'s largest swarm.
pub fn search_value(
    evaluator: &MoveEvaluator,
    board: &Board,
    color: PlayerColor,
    depth: u32,
) -> usize {
    if depth == 0 {
        return board.score_for(color);
    }

    let moves = legal_moves(board);
    if moves.is_empty() {
        return board.score_for(color);
    }

    if board.current_color() == color {
        moves
            .iter()
            .filter_map(|mv| evaluator.try_simulate(board, mv))
            .map(|next| search_value(evaluator, &next, color, depth - 1))
            .max()
            .unwrap_or_else(|| board.score_for(color))
    } else {
        match greedy_reply(evaluator, board, &moves) {
            Some(next) => search_value(evaluator, &next, color, depth - 1),
            None => board.score_for(color),
        }
    }
}

/// The reply that maximises the mover's own score, first one on ties.
fn greedy_reply(evaluator: &MoveEvaluator, board: &Board, moves: &[Move]) -> Option<Board> {
    let mover = board.current_color();
    let mut best: Option<(usize, Board)> = None;
    for mv in moves {
        let Some(next) = evaluator.try_simulate(board, mv) else {
            continue;
        };
        let score = next.score_for(mover);
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, next));
        }
    }
    best.map(|(_, next)| next)
}

/// Root of the search: each candidate is searched `depth - 1` further plies.
///
/// Candidates are searched in parallel; the reduction runs in candidate
/// order so the first maximiser still wins ties.
pub fn best_move(
    evaluator: &MoveEvaluator,
    board: &Board,
    color: PlayerColor,
    candidates: &[Move],
    depth: u32,
) -> Option<Move> {
    let remaining = depth.saturating_sub(1);
    let values: Vec<Option<usize>> = candidates
        .par_iter()
        .map(|mv| {
            evaluator
                .try_simulate(board, mv)
                .map(|next| search_value(evaluator, &next, color, remaining))
        })
        .collect();

    first_maximizer(
        candidates
            .iter()
            .zip(values)
            .filter_map(|(mv, value)| value.map(|v| (*mv, v as i32))),
    )
}
