//! Local matches between two engines in one process.

use crate::core::{Board, Move, PlayerColor};
use crate::engine::Engine;
use crate::logic::{apply_move, game_result, EndReason, GameResult};
use crate::player::ai::EngineConfig;
use chrono::{DateTime, Local};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// 棋譜
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub red: String,
    pub blue: String,
    pub started_at: DateTime<Local>,
    pub initial_board: Board,
    pub moves: Vec<Move>,
    pub result: GameResult,
}

impl GameRecord {
    /// Replays the moves from the initial board.
    pub fn final_board(&self) -> anyhow::Result<Board> {
        let mut board = self.initial_board.clone();
        for mv in &self.moves {
            board = apply_move(&board, mv)?;
        }
        Ok(board)
    }
}

struct Side {
    engine: Engine,
    moves: UnboundedReceiver<Move>,
}

impl Side {
    fn new(config: EngineConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Side {
            engine: Engine::new(config, tx),
            moves: rx,
        }
    }
}

/// Plays `board` to the end, Red using `red_config` and Blue `blue_config`.
pub async fn play_local(
    red_config: EngineConfig,
    blue_config: EngineConfig,
    board: Board,
) -> anyhow::Result<GameRecord> {
    let mut red = Side::new(red_config);
    let mut blue = Side::new(blue_config);
    let started_at = Local::now();
    let initial_board = board.clone();
    let mut board = board;
    let mut moves = Vec::new();

    info!(
        "local match: {} (Red) vs {} (Blue)",
        red.engine.selector_name(),
        blue.engine.selector_name()
    );

    let result = loop {
        if let Some(result) = game_result(&board) {
            break result;
        }

        let mover = board.current_color();
        red.engine.on_state_updated(board.clone(), mover);
        blue.engine.on_state_updated(board.clone(), mover);
        let side = match mover {
            PlayerColor::Red => &mut red,
            PlayerColor::Blue => &mut blue,
        };

        let dispatched = side.engine.on_move_requested().await?;
        let mv = side
            .moves
            .recv()
            .await
            .ok_or_else(|| anyhow::anyhow!("{} outbound channel closed", mover))?;
        debug_assert_eq!(mv, dispatched.mv);

        match apply_move(&board, &mv) {
            Ok(next) => {
                info!("turn {}: {} plays {} ({:?})", board.turn, mover, mv, dispatched.source);
                board = next;
                moves.push(mv);
            }
            Err(e) => {
                warn!("{} played illegal move {}: {}", mover, mv, e);
                break GameResult {
                    winner: Some(mover.opponent()),
                    reason: EndReason::Forfeit,
                };
            }
        }
    };

    red.engine.on_game_ended(&result);
    blue.engine.on_game_ended(&result);

    Ok(GameRecord {
        red: red.engine.selector_name().to_string(),
        blue: blue.engine.selector_name().to_string(),
        started_at,
        initial_board,
        moves,
        result,
    })
}

/// Writes the record as JSON under `dir` and returns the file path.
pub fn save_record(record: &GameRecord, dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let filename = dir.join(format!(
        "game_{}_{}_vs_{}.json",
        record.started_at.format("%Y%m%d_%H%M%S"),
        record.red,
        record.blue
    ));

    let file = std::fs::File::create(&filename)?;
    serde_json::to_writer(file, record)?;
    Ok(filename)
}

pub fn load_record(path: &Path) -> anyhow::Result<GameRecord> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{standard_board, Direction, Position};

    fn record() -> GameRecord {
        let initial_board = standard_board([Position::new(3, 4), Position::new(6, 2)]);
        GameRecord {
            red: "weighted-differential".to_string(),
            blue: "win-now-first".to_string(),
            started_at: Local::now(),
            initial_board,
            moves: vec![Move::new(Position::new(0, 1), Direction::Right)],
            result: GameResult {
                winner: None,
                reason: EndReason::RoundLimit,
            },
        }
    }

    #[test]
    fn record_is_saved_and_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let record = record();
        let path = save_record(&record, dir.path()).unwrap();
        assert!(path.starts_with(dir.path()));

        let loaded = load_record(&path).unwrap();
        assert_eq!(loaded.moves, record.moves);
        assert_eq!(loaded.result, record.result);
        assert_eq!(loaded.final_board().unwrap(), record.final_board().unwrap());
    }

    #[test]
    fn replayed_board_remembers_the_last_move() {
        let record = record();
        let board = record.final_board().unwrap();
        assert_eq!(board.last_move, record.moves.last().copied());
        assert_eq!(record.initial_board.last_move, None);
    }

    #[test]
    fn replay_rejects_an_illegal_move() {
        let mut record = record();
        // 駒のないマスから
        record.moves.push(Move::new(Position::new(5, 5), Direction::Up));
        assert!(record.final_board().is_err());
    }
}
