use super::r#move::Move;
use super::types::{Field, PlayerColor, Position, BOARD_SIZE};
use serde::{Deserialize, Serialize};

/// 盤面
///
/// Fixed-size grid, so `clone()` is a flat copy with no heap allocation.
/// Simulation always works on clones; the authoritative board is replaced
/// wholesale on each state update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// `fields[x][y]`
    pub fields: [[Field; BOARD_SIZE]; BOARD_SIZE],
    /// 手番
    pub current: PlayerColor,
    /// 0 から数えた手数 (Red は偶数手)
    pub turn: u32,
    pub last_move: Option<Move>,
}

impl Board {
    pub fn new() -> Self {
        Board {
            fields: [[Field::Empty; BOARD_SIZE]; BOARD_SIZE],
            current: PlayerColor::Red,
            turn: 0,
            last_move: None,
        }
    }

    pub fn field(&self, pos: Position) -> Field {
        self.fields[pos.x][pos.y]
    }

    pub fn set_field(&mut self, pos: Position, field: Field) {
        self.fields[pos.x][pos.y] = field;
    }

    pub fn place_piece(&mut self, pos: Position, color: PlayerColor) {
        self.set_field(pos, Field::Piranha(color));
    }

    pub fn remove_piece(&mut self, pos: Position) -> Option<PlayerColor> {
        let removed = self.piece_at(pos);
        if removed.is_some() {
            self.set_field(pos, Field::Empty);
        }
        removed
    }

    pub fn piece_at(&self, pos: Position) -> Option<PlayerColor> {
        self.field(pos).piranha()
    }

    pub fn current_color(&self) -> PlayerColor {
        self.current
    }

    /// Positions of all pieces of `color`, column-major.
    pub fn pieces_of(&self, color: PlayerColor) -> Vec<Position> {
        Position::all()
            .filter(|&pos| self.piece_at(pos) == Some(color))
            .collect()
    }

    pub fn piece_count_for(&self, color: PlayerColor) -> usize {
        Position::all()
            .filter(|&pos| self.piece_at(pos) == Some(color))
            .count()
    }

    /// Size of the largest swarm of `color`.
    pub fn score_for(&self, color: PlayerColor) -> usize {
        crate::logic::swarm::largest_swarm_size(self, color)
    }

    /// Completed rounds (one move by each side).
    pub fn round(&self) -> u32 {
        self.turn / 2
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
