use crate::core::{Board, Move, PlayerColor};

/// 1回の着手要求に必要な情報 (要求ごとに生成して使い捨てる)
#[derive(Debug, Clone)]
pub struct MoveRequest {
    pub board: Board,
    /// 手番の色 (= エンジン自身の色)
    pub color: PlayerColor,
    /// 合法手 (列挙順を保持)
    pub candidates: Vec<Move>,
}

impl MoveRequest {
    pub fn new(board: Board, color: PlayerColor, candidates: Vec<Move>) -> Self {
        MoveRequest {
            board,
            color,
            candidates,
        }
    }
}

/// 指し手選択の trait
pub trait MoveSelector: Send + Sync {
    /// Picks one of `request.candidates`; `None` only when there are none.
    fn choose_move(&self, request: &MoveRequest) -> Option<Move>;
    fn name(&self) -> &str;
}
