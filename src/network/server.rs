//! Referee server: pairs clients, owns the authoritative board and
//! validates every move.

use crate::core::{random_standard_board, Board, Move, PlayerColor};
use crate::logic::{apply_move, game_result, EndReason, GameResult};
use crate::network::protocol::{send_msg, NetMessage};
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// 接続済みのプレイヤー
pub struct Seat {
    pub name: String,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Seat {
    async fn send(&mut self, msg: &NetMessage) -> anyhow::Result<()> {
        send_msg(&mut self.writer, msg).await
    }

    /// Next `MakeMove`; `None` when the connection closed.
    async fn read_move(&mut self) -> anyhow::Result<Option<Move>> {
        while let Some(line) = self.lines.next_line().await? {
            match serde_json::from_str::<NetMessage>(&line)? {
                NetMessage::MakeMove { mv } => return Ok(Some(mv)),
                other => warn!("{}: ignoring {:?}", self.name, other),
            }
        }
        Ok(None)
    }
}

pub async fn start_server(addr: &str, move_timeout: Duration) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("server started on {}", addr);
    serve(listener, move_timeout).await
}

/// Accepts clients forever, starting a match for every two that join.
pub async fn serve(listener: TcpListener, move_timeout: Duration) -> anyhow::Result<()> {
    let waiting_room: Arc<Mutex<Option<Seat>>> = Arc::new(Mutex::new(None));

    loop {
        let (socket, peer) = listener.accept().await?;
        let waiting_room = Arc::clone(&waiting_room);

        tokio::spawn(async move {
            if let Err(e) = handle_new_connection(socket, waiting_room, move_timeout).await {
                error!("error handling connection from {}: {}", peer, e);
            }
        });
    }
}

async fn handle_new_connection(
    socket: TcpStream,
    waiting_room: Arc<Mutex<Option<Seat>>>,
    move_timeout: Duration,
) -> anyhow::Result<()> {
    let (reader, writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    let line = lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow::anyhow!("connection closed before Join"))?;
    let name = match serde_json::from_str::<NetMessage>(&line)? {
        NetMessage::Join { name } => name,
        _ => return Err(anyhow::anyhow!("Expected Join message")),
    };
    let seat = Seat {
        name,
        lines,
        writer,
    };

    let mut lock = waiting_room.lock().await;
    if let Some(red) = lock.take() {
        drop(lock);
        let board = random_standard_board(&mut rand::thread_rng());
        run_match(red, seat, board, move_timeout).await?;
    } else {
        info!("{} is waiting for an opponent", seat.name);
        *lock = Some(seat);
    }
    Ok(())
}

/// Referees one game; the first seat plays Red.
pub async fn run_match(
    mut red: Seat,
    mut blue: Seat,
    mut board: Board,
    move_timeout: Duration,
) -> anyhow::Result<GameResult> {
    info!("match found: {} (Red) vs {} (Blue)", red.name, blue.name);
    red.send(&NetMessage::Welcome { color: PlayerColor::Red }).await?;
    blue.send(&NetMessage::Welcome { color: PlayerColor::Blue }).await?;

    let result = loop {
        let update = NetMessage::Update { board: board.clone() };
        red.send(&update).await?;
        blue.send(&update).await?;

        if let Some(result) = game_result(&board) {
            break result;
        }

        let mover = board.current_color();
        let seat = match mover {
            PlayerColor::Red => &mut red,
            PlayerColor::Blue => &mut blue,
        };
        seat.send(&NetMessage::MoveRequest).await?;

        let answer = tokio::time::timeout(move_timeout, seat.read_move()).await;
        let mv = match answer {
            Ok(Ok(Some(mv))) => mv,
            Ok(Ok(None)) => {
                warn!("{} disconnected", seat.name);
                break forfeit(mover);
            }
            Ok(Err(e)) => {
                warn!("{} sent garbage: {}", seat.name, e);
                break forfeit(mover);
            }
            Err(_) => {
                warn!("{} exceeded {:?}", seat.name, move_timeout);
                break forfeit(mover);
            }
        };

        match apply_move(&board, &mv) {
            Ok(next) => {
                info!("turn {}: {} plays {}", board.turn, mover, mv);
                board = next;
            }
            Err(e) => {
                warn!("{} sent illegal move {}: {}", seat.name, mv, e);
                seat.send(&NetMessage::Error {
                    message: format!("illegal move {}: {}", mv, e),
                })
                .await?;
                break forfeit(mover);
            }
        }
    };

    info!("{} vs {}: {}", red.name, blue.name, result);
    let over = NetMessage::GameOver {
        winner: result.winner,
        reason: result.reason,
    };
    // 片方が切断済みでももう片方には通知する
    if let Err(e) = red.send(&over).await {
        warn!("could not notify {}: {}", red.name, e);
    }
    if let Err(e) = blue.send(&over).await {
        warn!("could not notify {}: {}", blue.name, e);
    }
    Ok(result)
}

fn forfeit(loser: PlayerColor) -> GameResult {
    GameResult {
        winner: Some(loser.opponent()),
        reason: EndReason::Forfeit,
    }
}
