//! Swarm (connectivity) analysis.
//!
//! A swarm is a maximal group of same-colored pieces connected through the
//! 8 surrounding squares. A color's score is the size of its largest swarm.

use crate::core::{Board, PlayerColor, Position, BOARD_SIZE};
use std::collections::VecDeque;

fn neighbours(pos: Position) -> impl Iterator<Item = Position> {
    (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
        .filter_map(move |(dx, dy)| pos.offset(dx, dy, 1))
}

/// Partitions the pieces of `color` into swarms (flood fill, column-major).
pub fn swarms(board: &Board, color: PlayerColor) -> Vec<Vec<Position>> {
    let mut visited = [[false; BOARD_SIZE]; BOARD_SIZE];
    let mut result = Vec::new();

    for start in board.pieces_of(color) {
        if visited[start.x][start.y] {
            continue;
        }
        visited[start.x][start.y] = true;

        let mut swarm = Vec::new();
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            swarm.push(pos);
            for next in neighbours(pos) {
                if !visited[next.x][next.y] && board.piece_at(next) == Some(color) {
                    visited[next.x][next.y] = true;
                    queue.push_back(next);
                }
            }
        }
        result.push(swarm);
    }
    result
}

pub fn largest_swarm_size(board: &Board, color: PlayerColor) -> usize {
    swarms(board, color)
        .iter()
        .map(|swarm| swarm.len())
        .max()
        .unwrap_or(0)
}

/// Positions whose capture would split a swarm of `color` in two or more.
///
/// Meant for a color that already forms one swarm; for several swarms the
/// cut points of each are returned. Articulation points via DFS low-links.
pub fn cut_points(board: &Board, color: PlayerColor) -> Vec<Position> {
    let mut search = CutSearch {
        board,
        color,
        disc: [[0; BOARD_SIZE]; BOARD_SIZE],
        low: [[0; BOARD_SIZE]; BOARD_SIZE],
        timer: 0,
        cuts: Vec::new(),
    };
    for pos in board.pieces_of(color) {
        if search.disc[pos.x][pos.y] == 0 {
            search.visit(pos, None);
        }
    }

    let mut cuts = search.cuts;
    cuts.sort_by_key(|p| (p.x, p.y));
    cuts
}

struct CutSearch<'a> {
    board: &'a Board,
    color: PlayerColor,
    /// 0 = 未訪問
    disc: [[usize; BOARD_SIZE]; BOARD_SIZE],
    low: [[usize; BOARD_SIZE]; BOARD_SIZE],
    timer: usize,
    cuts: Vec<Position>,
}

impl CutSearch<'_> {
    fn visit(&mut self, pos: Position, parent: Option<Position>) {
        self.timer += 1;
        self.disc[pos.x][pos.y] = self.timer;
        self.low[pos.x][pos.y] = self.timer;

        let mut children = 0;
        let mut is_cut = false;

        for next in neighbours(pos) {
            if self.board.piece_at(next) != Some(self.color) || Some(next) == parent {
                continue;
            }
            if self.disc[next.x][next.y] == 0 {
                children += 1;
                self.visit(next, Some(pos));
                self.low[pos.x][pos.y] = self.low[pos.x][pos.y].min(self.low[next.x][next.y]);
                if parent.is_some() && self.low[next.x][next.y] >= self.disc[pos.x][pos.y] {
                    is_cut = true;
                }
            } else {
                self.low[pos.x][pos.y] = self.low[pos.x][pos.y].min(self.disc[next.x][next.y]);
            }
        }

        if parent.is_none() && children > 1 {
            is_cut = true;
        }
        if is_cut {
            self.cuts.push(pos);
        }
    }
}
