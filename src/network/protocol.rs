use crate::core::{Board, Move, PlayerColor};
use crate::logic::EndReason;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// 1行1メッセージの JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NetMessage {
    // Client -> Server
    Join {
        name: String,
    },
    MakeMove {
        mv: Move,
    },

    // Server -> Client
    Welcome {
        color: PlayerColor,
    },
    Update {
        board: Board,
    },
    MoveRequest,
    GameOver {
        winner: Option<PlayerColor>,
        reason: EndReason,
    },
    Error {
        message: String,
    },
}

pub async fn send_msg<W>(writer: &mut W, msg: &NetMessage) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(msg)? + "\n";
    writer.write_all(json.as_bytes()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{standard_board, Direction, Position};

    #[test]
    fn messages_are_single_json_lines() {
        let board = standard_board([Position::new(3, 4), Position::new(6, 2)]);
        let messages = vec![
            NetMessage::Join { name: "swarm-ai".to_string() },
            NetMessage::MakeMove {
                mv: Move::new(Position::new(0, 1), Direction::Right),
            },
            NetMessage::Welcome { color: PlayerColor::Blue },
            NetMessage::Update { board },
            NetMessage::MoveRequest,
            NetMessage::GameOver {
                winner: None,
                reason: EndReason::RoundLimit,
            },
        ];
        for msg in messages {
            let json = serde_json::to_string(&msg).unwrap();
            assert!(!json.contains('\n'));
            assert_eq!(serde_json::from_str::<NetMessage>(&json).unwrap(), msg);
        }
    }

    #[tokio::test]
    async fn send_msg_terminates_with_newline() {
        let mut out: Vec<u8> = Vec::new();
        send_msg(&mut out, &NetMessage::MoveRequest).await.unwrap();
        assert_eq!(out, b"\"MoveRequest\"\n");
    }
}
