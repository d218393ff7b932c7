use super::config::StrategyKind;
use super::evaluator::MoveEvaluator;
use super::search;
use crate::core::{Board, Move, PlayerColor};
use crate::logic::{destination, is_winning, swarm::cut_points};
use crate::player::controller::{MoveRequest, MoveSelector};
use log::{debug, info};
use rand::seq::SliceRandom;

/// First item with the largest score; later equal scores never replace it.
pub(crate) fn first_maximizer<I>(scored: I) -> Option<Move>
where
    I: IntoIterator<Item = (Move, i32)>,
{
    let mut best: Option<(Move, i32)> = None;
    for (mv, score) in scored {
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((mv, score));
        }
    }
    best.map(|(mv, _)| mv)
}

/// Outcome of a pipeline stage.
enum Stage {
    Selected(Move),
    Continue(Vec<Move>),
}

pub struct StrategySelector {
    pub kind: StrategyKind,
    pub search_depth: u32,
    pub evaluator: MoveEvaluator,
    name: String,
}

impl StrategySelector {
    pub fn new(kind: StrategyKind, search_depth: u32) -> Self {
        StrategySelector {
            kind,
            search_depth,
            evaluator: MoveEvaluator::new(),
            name: kind.name().to_string(),
        }
    }

    fn run(&self, request: &MoveRequest) -> Option<Move> {
        let MoveRequest {
            board,
            color,
            candidates,
        } = request;
        let color = *color;

        // 1. 候補が1つだけなら評価しない
        match candidates.as_slice() {
            [] => return None,
            [only] => {
                debug!("{}: single option {}", self.name, only);
                return Some(*only);
            }
            _ => {}
        }

        // 2. 即勝ち
        if let Some(mv) = self.immediate_win(board, candidates, color) {
            info!("{}: winning move {}", self.name, mv);
            return Some(mv);
        }

        // 3. 相手を勝たせる手を除く
        let survivors = match self.safety_filter(board, candidates, color) {
            Stage::Selected(mv) => return Some(mv),
            Stage::Continue(survivors) => survivors,
        };

        if self.kind == StrategyKind::WinNowFirst {
            let mut rng = rand::thread_rng();
            return survivors.choose(&mut rng).copied();
        }

        // 4. 相手の群を分断する
        if matches!(
            self.kind,
            StrategyKind::DestructiveCapture | StrategyKind::BoundedDepthSearch
        ) {
            if let Some(mv) = destructive_defense(board, &survivors, color) {
                info!("{}: breaking opponent swarm with {}", self.name, mv);
                return Some(mv);
            }
        }

        if self.kind == StrategyKind::BoundedDepthSearch {
            return search::best_move(&self.evaluator, board, color, &survivors, self.search_depth)
                .or_else(|| survivors.first().copied());
        }

        // 5, 6. 評価値 + 1手先読み
        Some(self.weighted_with_lookahead(board, survivors, color))
    }

    fn immediate_win(
        &self,
        board: &Board,
        candidates: &[Move],
        color: PlayerColor,
    ) -> Option<Move> {
        candidates
            .iter()
            .find(|mv| self.evaluator.wins(board, mv, color) == Some(true))
            .copied()
    }

    fn safety_filter(&self, board: &Board, candidates: &[Move], color: PlayerColor) -> Stage {
        let survivors: Vec<Move> = candidates
            .iter()
            .filter(|mv| self.evaluator.hands_opponent_win(board, mv, color) == Some(false))
            .copied()
            .collect();

        match survivors.as_slice() {
            // 負け確定: 元の先頭を返す
            [] => {
                info!("{}: every move loses, taking the first", self.name);
                Stage::Selected(candidates[0])
            }
            [only] => Stage::Selected(*only),
            _ => Stage::Continue(survivors),
        }
    }

    fn weighted(&self, board: &Board, candidates: &[Move], color: PlayerColor) -> Option<Move> {
        first_maximizer(candidates.iter().filter_map(|mv| {
            self.evaluator
                .evaluate(board, mv, color)
                .map(|eval| (*mv, eval.differential()))
        }))
    }

    fn weighted_with_lookahead(
        &self,
        board: &Board,
        mut candidates: Vec<Move>,
        color: PlayerColor,
    ) -> Move {
        loop {
            let Some(best) = self.weighted(board, &candidates, color) else {
                return candidates[0];
            };
            if candidates.len() < 2
                || self.evaluator.allows_winning_reply(board, &best, color) != Some(true)
            {
                return best;
            }
            debug!("{}: {} allows a winning reply, rescoring", self.name, best);
            candidates.retain(|mv| *mv != best);
            if candidates.len() < 2 {
                return candidates[0];
            }
        }
    }
}

/// 相手が既に1つの群になっていれば、その切断点を取る最初の候補
fn destructive_defense(board: &Board, candidates: &[Move], color: PlayerColor) -> Option<Move> {
    let opponent = color.opponent();
    if !is_winning(board, opponent) {
        return None;
    }
    let cuts = cut_points(board, opponent);
    candidates
        .iter()
        .find(|mv| destination(board, mv).map_or(false, |to| cuts.contains(&to)))
        .copied()
}

impl MoveSelector for StrategySelector {
    fn choose_move(&self, request: &MoveRequest) -> Option<Move> {
        let before = self.evaluator.simulations();
        let chosen = self.run(request);
        debug!(
            "{}: {} simulations for {} candidates",
            self.name,
            self.evaluator.simulations() - before,
            request.candidates.len()
        );
        chosen
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Position};
    use crate::logic::legal_moves;

    fn board_with(red: &[(usize, usize)], blue: &[(usize, usize)]) -> Board {
        let mut board = Board::new();
        for &(x, y) in red {
            board.place_piece(Position::new(x, y), PlayerColor::Red);
        }
        for &(x, y) in blue {
            board.place_piece(Position::new(x, y), PlayerColor::Blue);
        }
        board
    }

    fn mv(x: usize, y: usize, direction: Direction) -> Move {
        Move::new(Position::new(x, y), direction)
    }

    fn request(board: &Board, candidates: Vec<Move>) -> MoveRequest {
        MoveRequest::new(board.clone(), board.current_color(), candidates)
    }

    #[test]
    fn first_maximizer_keeps_the_first_tie() {
        let a = mv(0, 0, Direction::Up);
        let b = mv(0, 1, Direction::Up);
        let c = mv(0, 2, Direction::Up);
        assert_eq!(first_maximizer([(a, 1), (b, 3), (c, 3)]), Some(b));
        assert_eq!(first_maximizer(Vec::new()), None);
    }

    #[test]
    fn single_option_skips_evaluation() {
        let board = board_with(&[(0, 0)], &[(6, 6)]);
        for kind in StrategyKind::ALL {
            let selector = StrategySelector::new(kind, 4);
            let only = mv(0, 0, Direction::Up);
            assert_eq!(selector.choose_move(&request(&board, vec![only])), Some(only));
            assert_eq!(selector.evaluator.simulations(), 0);
        }
    }

    #[test]
    fn no_candidates_is_none() {
        let board = board_with(&[(0, 0)], &[(6, 6)]);
        let selector = StrategySelector::new(StrategyKind::default(), 4);
        assert_eq!(selector.choose_move(&request(&board, vec![])), None);
    }

    #[test]
    fn takes_an_immediate_win() {
        // (0,3) → (0,4) で (1,5) と斜めにつながる
        let board = board_with(&[(0, 3), (1, 5)], &[(6, 6)]);
        let winning = mv(0, 3, Direction::Up);
        let other = mv(1, 5, Direction::Right);
        for kind in StrategyKind::ALL {
            let selector = StrategySelector::new(kind, 2);
            assert_eq!(
                selector.choose_move(&request(&board, vec![other, winning])),
                Some(winning),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn never_hands_the_opponent_a_win() {
        // (0,0)→(2,0) で取ると Blue は (6,6),(6,7) の1群だけになる
        let board = board_with(&[(0, 0), (0, 5)], &[(2, 0), (6, 6), (6, 7)]);
        let gives_win = mv(0, 0, Direction::Right);
        let safe = mv(0, 0, Direction::Up);
        for kind in StrategyKind::ALL {
            let selector = StrategySelector::new(kind, 2);
            assert_eq!(
                selector.choose_move(&request(&board, vec![gives_win, safe])),
                Some(safe),
                "{}",
                kind.name()
            );
        }
    }

    #[test]
    fn unavoidable_loss_takes_the_first_candidate() {
        let board = board_with(&[(0, 0), (0, 5)], &[(2, 0), (6, 6), (6, 7)]);
        let gives_win = mv(0, 0, Direction::Right);
        let selector = StrategySelector::new(StrategyKind::WeightedDifferential, 2);
        // 同じ負け手を2つ渡す
        let candidates = vec![gives_win, gives_win];
        assert_eq!(selector.choose_move(&request(&board, candidates)), Some(gives_win));
    }

    #[test]
    fn destructive_defense_takes_the_first_cut_point_capture() {
        // Blue (3..=7, 5) は1列の群で (4,5),(5,5),(6,5) が切断点
        let blue: Vec<(usize, usize)> = (3..=7).map(|x| (x, 5)).collect();
        let board = board_with(&[(4, 3), (6, 3), (7, 6)], &blue);
        let candidates = legal_moves(&board);

        let first = mv(4, 3, Direction::Up); // (4,5) を取る
        let middle = mv(6, 3, Direction::Up); // (6,5) を取る
        let last = mv(6, 3, Direction::UpLeft); // (4,5) を取る
        for capture in [first, middle, last] {
            assert!(candidates.contains(&capture));
        }

        // 分断しない手はすべて相手の勝ちになるので、残るのは3つの捕獲だけ
        let selector = StrategySelector::new(StrategyKind::DestructiveCapture, 4);
        match selector.safety_filter(&board, &candidates, PlayerColor::Red) {
            Stage::Continue(survivors) => assert_eq!(survivors, vec![first, middle, last]),
            Stage::Selected(mv) => panic!("filter selected {} on its own", mv),
        }
        assert_eq!(destructive_defense(&board, &[middle, last], PlayerColor::Red), Some(middle));
        assert_eq!(selector.choose_move(&request(&board, candidates.clone())), Some(first));

        // 評価値では middle (-1) が最良だが (7,5) → (6,6) でつながるので棄却、
        // first も (3,5) → (4,6) で棄却され last が残る
        let weighted = StrategySelector::new(StrategyKind::WeightedDifferential, 4);
        assert_eq!(
            weighted.weighted(&board, &[first, middle, last], PlayerColor::Red),
            Some(middle)
        );
        assert_eq!(weighted.choose_move(&request(&board, candidates)), Some(last));
    }

    #[test]
    fn destructive_defense_waits_until_the_opponent_is_joined() {
        // Blue は2群なので何もしない
        let board = board_with(&[(4, 3), (6, 3)], &[(3, 5), (4, 5), (7, 5)]);
        let candidates = legal_moves(&board);
        assert_eq!(destructive_defense(&board, &candidates, PlayerColor::Red), None);
    }

    #[test]
    fn look_ahead_rejects_a_move_that_allows_a_winning_reply() {
        let board = board_with(&[(1, 0), (1, 1), (1, 5)], &[(0, 9), (2, 9)]);
        let ignores = mv(1, 0, Direction::Right);
        let blocks = mv(1, 5, Direction::Up);
        let selector = StrategySelector::new(StrategyKind::WeightedDifferential, 4);

        // 評価値はどちらも 1 で先頭が選ばれるが、先読みで棄却される
        assert_eq!(selector.weighted(&board, &[ignores, blocks], PlayerColor::Red), Some(ignores));
        assert_eq!(
            selector.choose_move(&request(&board, vec![ignores, blocks])),
            Some(blocks)
        );
    }

    #[test]
    fn every_kind_returns_a_candidate_from_the_start_position() {
        let board = crate::core::standard_board([Position::new(3, 4), Position::new(6, 2)]);
        let candidates = legal_moves(&board);
        for kind in StrategyKind::ALL {
            let selector = StrategySelector::new(kind, 2);
            let chosen = selector.choose_move(&request(&board, candidates.clone())).unwrap();
            assert!(candidates.contains(&chosen), "{}", kind.name());
        }
    }
}
