//! Move-request lifecycle.
//!
//! Each request races the selection pipeline (on the blocking pool) against
//! a [`DeadlineGuard`]. Whichever dispatches first through the request's
//! [`Dispatcher`] decides the move that goes out.

pub mod dispatcher;
pub mod guard;

pub use dispatcher::{DispatchSource, Dispatched, Dispatcher};
pub use guard::{DeadlineGuard, GuardCancel};

use crate::core::{Board, Move, PlayerColor};
use crate::logic::{legal_moves, GameResult, IllegalMove};
use crate::player::ai::{EngineConfig, StrategySelector};
use crate::player::{MoveRequest, MoveSelector};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("candidate {mv} could not be applied to a board clone")]
    IllegalMoveAgainstClone {
        mv: Move,
        #[source]
        source: IllegalMove,
    },
    #[error("no move selected within {budget_ms} ms")]
    DeadlineExceeded { budget_ms: u64 },
    #[error("move requested before any board state was received")]
    NoPosition,
    #[error("no legal move available")]
    NoCandidates,
}

pub struct Engine {
    config: EngineConfig,
    selector: Arc<dyn MoveSelector>,
    outbound: UnboundedSender<Move>,
    /// 最新の盤面と手番
    state: Option<(Board, PlayerColor)>,
}

impl Engine {
    pub fn new(config: EngineConfig, outbound: UnboundedSender<Move>) -> Self {
        let selector = Arc::new(StrategySelector::new(config.strategy, config.search.depth));
        Self::with_selector(config, selector, outbound)
    }

    pub fn with_selector(
        config: EngineConfig,
        selector: Arc<dyn MoveSelector>,
        outbound: UnboundedSender<Move>,
    ) -> Self {
        Engine {
            config,
            selector,
            outbound,
            state: None,
        }
    }

    pub fn selector_name(&self) -> &str {
        self.selector.name()
    }

    pub fn on_state_updated(&mut self, board: Board, active: PlayerColor) {
        debug!("state updated: turn {}, {} to move", board.turn, active);
        self.state = Some((board, active));
    }

    pub fn on_game_ended(&mut self, result: &GameResult) {
        info!("[{}] game over: {}", self.selector.name(), result);
        self.state = None;
    }

    /// Picks a move for the current state and dispatches it.
    ///
    /// Returns once a move has gone out. If the deadline fires first the
    /// pipeline keeps running in the background and its result is dropped.
    pub async fn on_move_requested(&self) -> Result<Dispatched, EngineError> {
        let (mut board, color) = self.state.clone().ok_or(EngineError::NoPosition)?;
        // 手番は通知された色を優先する
        board.current = color;
        let candidates = legal_moves(&board);
        if candidates.is_empty() {
            return Err(EngineError::NoCandidates);
        }
        debug!("move requested for {} with {} candidates", color, candidates.len());

        let dispatcher = Arc::new(Dispatcher::new(self.outbound.clone()));
        let (mut guard, cancel) = DeadlineGuard::arm(
            Arc::clone(&dispatcher),
            candidates.clone(),
            self.config.deadline(),
        );

        let selector = Arc::clone(&self.selector);
        let pipeline_dispatcher = Arc::clone(&dispatcher);
        let request = MoveRequest::new(board, color, candidates);
        let mut pipeline = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            match selector.choose_move(&request) {
                Some(mv) => {
                    if pipeline_dispatcher.dispatch(mv, DispatchSource::Pipeline) {
                        cancel.cancel();
                        info!(
                            "[{}] {} chose {} in {:?}",
                            selector.name(),
                            request.color,
                            mv,
                            start.elapsed()
                        );
                    } else {
                        debug!("[{}] {} arrived after the deadline", selector.name(), mv);
                    }
                }
                None => warn!("[{}] no move selected", selector.name()),
            }
        });

        tokio::select! {
            res = &mut pipeline => {
                if let Err(e) = res {
                    error!("selection pipeline failed: {}", e);
                }
                // パイプラインが送れなかった場合は保険タイマーを待つ
                guard.finished().await;
            }
            _ = guard.finished() => {}
        }

        dispatcher.dispatched().ok_or(EngineError::NoCandidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, Position};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn request_without_state_is_an_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let engine = Engine::new(EngineConfig::default(), tx);
        assert!(matches!(engine.on_move_requested().await, Err(EngineError::NoPosition)));
    }

    #[tokio::test]
    async fn dispatches_the_only_legal_move() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut engine = Engine::new(EngineConfig::default(), tx);

        let mut board = Board::new();
        board.place_piece(Position::new(0, 0), PlayerColor::Red);
        board.place_piece(Position::new(0, 1), PlayerColor::Blue);
        board.place_piece(Position::new(1, 1), PlayerColor::Blue);
        // 上と右上は Blue を飛び越えるので不可
        let only = Move::new(Position::new(0, 0), Direction::Right);
        assert_eq!(legal_moves(&board), vec![only]);

        engine.on_state_updated(board, PlayerColor::Red);
        let dispatched = engine.on_move_requested().await.unwrap();
        assert_eq!(dispatched.source, DispatchSource::Pipeline);
        assert_eq!(dispatched.mv, only);
        assert_eq!(rx.recv().await, Some(only));
    }

    #[test]
    fn contract_violation_names_the_move() {
        let mv = Move::new(Position::new(0, 0), Direction::Right);
        let err = EngineError::IllegalMoveAgainstClone {
            mv,
            source: IllegalMove::OffBoard,
        };
        assert!(err.to_string().contains(&mv.to_string()));
        assert!(std::error::Error::source(&err).is_some());
    }
}
