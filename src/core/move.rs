use super::types::{Direction, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 指し手: 移動元と方向。移動距離は盤面から決まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Position,
    pub direction: Direction,
}

impl Move {
    pub fn new(from: Position, direction: Direction) -> Self {
        Move { from, direction }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {:?}", self.from, self.direction)
    }
}
