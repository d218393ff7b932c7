use crate::core::{Move, PlayerColor};
use crate::engine::Engine;
use crate::logic::GameResult;
use crate::network::protocol::{send_msg, NetMessage};
use crate::player::ai::EngineConfig;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;

pub struct NetworkClient {
    stream: TcpStream,
}

impl NetworkClient {
    pub async fn connect(addr: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self { stream })
    }

    /// Plays one game with an engine built from `config`.
    ///
    /// Returns the result announced by the server, or `None` if the
    /// connection closed first.
    pub async fn run(self, config: EngineConfig) -> anyhow::Result<Option<GameResult>> {
        let (reader, mut writer) = self.stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        // 1. Join
        let join = NetMessage::Join {
            name: config.network.name.clone(),
        };
        send_msg(&mut writer, &join).await?;

        // 2. エンジンの送信チャネルをソケットへ流す
        let (move_tx, mut move_rx) = mpsc::unbounded_channel::<Move>();
        let writer_task = tokio::spawn(async move {
            while let Some(mv) = move_rx.recv().await {
                if let Err(e) = send_msg(&mut writer, &NetMessage::MakeMove { mv }).await {
                    error!("failed to send move {}: {}", mv, e);
                    break;
                }
            }
        });

        let mut engine = Engine::new(config, move_tx);
        let mut my_color: Option<PlayerColor> = None;
        let mut result = None;

        // 3. Message loop
        while let Some(line) = lines.next_line().await? {
            let msg: NetMessage = serde_json::from_str(&line)?;
            match msg {
                NetMessage::Welcome { color } => {
                    info!("joined as {} using {}", color, engine.selector_name());
                    my_color = Some(color);
                }
                NetMessage::Update { board } => {
                    if let Some(mv) = board.last_move {
                        info!("turn {}: {} played {}", board.turn, board.current.opponent(), mv);
                    }
                    let active = board.current_color();
                    engine.on_state_updated(board, active);
                }
                NetMessage::MoveRequest => {
                    if let Some(color) = my_color {
                        if let Err(e) = engine.on_move_requested().await {
                            warn!("{} could not answer the move request: {}", color, e);
                        }
                    } else {
                        warn!("move request before welcome, ignored");
                    }
                }
                NetMessage::GameOver { winner, reason } => {
                    let game_result = GameResult { winner, reason };
                    engine.on_game_ended(&game_result);
                    result = Some(game_result);
                    break;
                }
                NetMessage::Error { message } => {
                    warn!("server error: {}", message);
                }
                other => {
                    warn!("unexpected message from server: {:?}", other);
                }
            }
        }

        // engine が送信側を持っているので先に落とす
        drop(engine);
        if let Err(e) = writer_task.await {
            error!("move writer task failed: {}", e);
        }
        Ok(result)
    }
}
