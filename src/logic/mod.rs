//! ルールエンジン: 合法手生成、着手、勝敗判定

pub mod swarm;

use crate::core::{Board, Direction, Field, Move, PlayerColor, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// ラウンド数の上限 (1ラウンド = 両者1手ずつ)
pub const ROUND_LIMIT: u32 = 30;

/// Why a move cannot be played on a given board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IllegalMove {
    #[error("no piece of the side to move on {0}")]
    NoOwnPiece(Position),
    #[error("destination leaves the board")]
    OffBoard,
    #[error("destination {0} is an obstacle")]
    OntoObstacle(Position),
    #[error("destination {0} holds an own piece")]
    OntoOwnPiece(Position),
    #[error("path jumps over the opponent on {0}")]
    JumpsOpponent(Position),
}

/// 移動距離 = 移動方向の直線上にある駒の数 (自分自身を含む、障害物は数えない)
pub fn move_distance(board: &Board, from: Position, direction: Direction) -> usize {
    let count_towards = |dir: Direction| {
        let (dx, dy) = dir.shift();
        (1..)
            .map_while(|step| from.offset(dx, dy, step))
            .filter(|&pos| board.piece_at(pos).is_some())
            .count()
    };
    1 + count_towards(direction) + count_towards(direction.reverse())
}

/// Landing square of `mv`, or `None` when it would leave the board.
/// Does not check legality.
pub fn destination(board: &Board, mv: &Move) -> Option<Position> {
    let (dx, dy) = mv.direction.shift();
    let distance = move_distance(board, mv.from, mv.direction) as i32;
    mv.from.offset(dx, dy, distance)
}

/// 合法性チェック。合法なら着地点を返す。
pub fn validate_move(board: &Board, mv: &Move) -> Result<Position, IllegalMove> {
    let color = board.current_color();
    if board.piece_at(mv.from) != Some(color) {
        return Err(IllegalMove::NoOwnPiece(mv.from));
    }

    let (dx, dy) = mv.direction.shift();
    let distance = move_distance(board, mv.from, mv.direction) as i32;
    let to = mv.from.offset(dx, dy, distance).ok_or(IllegalMove::OffBoard)?;

    // 相手の駒は飛び越えられない (自分の駒と障害物は可)
    for between in (1..distance).filter_map(|step| mv.from.offset(dx, dy, step)) {
        if board.piece_at(between) == Some(color.opponent()) {
            return Err(IllegalMove::JumpsOpponent(between));
        }
    }

    match board.field(to) {
        Field::Obstacle => Err(IllegalMove::OntoObstacle(to)),
        Field::Piranha(c) if c == color => Err(IllegalMove::OntoOwnPiece(to)),
        _ => Ok(to),
    }
}

/// 合法手生成 (駒は列優先の走査順、方向は `Direction::ALL` の順)
pub fn legal_moves(board: &Board) -> Vec<Move> {
    board
        .pieces_of(board.current_color())
        .into_iter()
        .flat_map(|from| Direction::ALL.into_iter().map(move |dir| Move::new(from, dir)))
        .filter(|mv| validate_move(board, mv).is_ok())
        .collect()
}

/// 移動適用。入力の盤面は変更しない。
pub fn apply_move(board: &Board, mv: &Move) -> Result<Board, IllegalMove> {
    let to = validate_move(board, mv)?;
    let mover = board.current_color();

    let mut next = board.clone();
    next.remove_piece(mv.from);
    // 相手の駒がいれば上書きで捕獲
    next.place_piece(to, mover);
    next.current = mover.opponent();
    next.turn += 1;
    next.last_move = Some(*mv);
    Ok(next)
}

/// A color wins when all of its pieces form a single swarm.
pub fn is_winning(board: &Board, color: PlayerColor) -> bool {
    let count = board.piece_count_for(color);
    count > 0 && board.score_for(color) == count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// One side joined all of its pieces.
    Swarm,
    /// Both sides joined their pieces in the same round.
    BothSwarms,
    RoundLimit,
    /// The side to move had no legal move.
    NoMoves,
    /// The side to move sent an illegal move or none at all.
    Forfeit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            EndReason::Swarm => "single swarm",
            EndReason::BothSwarms => "both sides formed a single swarm",
            EndReason::RoundLimit => "round limit reached",
            EndReason::NoMoves => "no legal moves",
            EndReason::Forfeit => "forfeit",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// `None` is a draw.
    pub winner: Option<PlayerColor>,
    pub reason: EndReason,
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.winner {
            Some(color) => write!(f, "{} wins ({})", color, self.reason),
            None => write!(f, "draw ({})", self.reason),
        }
    }
}

/// 勝敗判定
///
/// Swarm wins are only decided at round boundaries, so the second player
/// always gets a reply. Returns `None` while the game continues.
pub fn game_result(board: &Board) -> Option<GameResult> {
    if board.turn > 0 && board.turn % 2 == 0 {
        let red = is_winning(board, PlayerColor::Red);
        let blue = is_winning(board, PlayerColor::Blue);
        match (red, blue) {
            (true, false) => return Some(win(PlayerColor::Red, EndReason::Swarm)),
            (false, true) => return Some(win(PlayerColor::Blue, EndReason::Swarm)),
            (true, true) => return Some(compare_swarms(board, EndReason::BothSwarms)),
            (false, false) => {}
        }
        if board.round() >= ROUND_LIMIT {
            return Some(compare_swarms(board, EndReason::RoundLimit));
        }
    }

    if legal_moves(board).is_empty() {
        return Some(win(board.current_color().opponent(), EndReason::NoMoves));
    }
    None
}

fn win(winner: PlayerColor, reason: EndReason) -> GameResult {
    GameResult {
        winner: Some(winner),
        reason,
    }
}

fn compare_swarms(board: &Board, reason: EndReason) -> GameResult {
    let red = board.score_for(PlayerColor::Red);
    let blue = board.score_for(PlayerColor::Blue);
    let winner = match red.cmp(&blue) {
        std::cmp::Ordering::Greater => Some(PlayerColor::Red),
        std::cmp::Ordering::Less => Some(PlayerColor::Blue),
        std::cmp::Ordering::Equal => None,
    };
    GameResult { winner, reason }
}
