use swarm_ai::core::random_standard_board;
use swarm_ai::game::{play_local, save_record};
use swarm_ai::network::client::NetworkClient;
use swarm_ai::network::server::start_server;
use swarm_ai::player::ai::{EngineConfig, StrategyKind};

use log::info;
use std::path::Path;

const RECORD_DIR: &str = "game_records";

fn usage() {
    println!("Usage:");
    println!("  swarm-ai client [addr]");
    println!("  swarm-ai server [addr]");
    println!("  swarm-ai local [red-strategy] [blue-strategy]");
    println!();
    println!("Strategies:");
    for kind in StrategyKind::ALL {
        println!("  {}", kind.name());
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EngineConfig::load_or_default();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = args.first().map(String::as_str).unwrap_or("client");

    match mode {
        "client" => {
            let addr = args.get(1).cloned().unwrap_or_else(|| config.network.addr.clone());
            info!("connecting to {} as {}", addr, config.network.name);
            let client = NetworkClient::connect(&addr).await?;
            match client.run(config).await? {
                Some(result) => info!("finished: {}", result),
                None => info!("server closed the connection"),
            }
        }
        "server" => {
            let addr = args.get(1).cloned().unwrap_or_else(|| config.network.addr.clone());
            start_server(&addr, config.move_timeout()).await?;
        }
        "local" => {
            let mut red = config.clone();
            let mut blue = config;
            if let Some(kind) = args.get(1) {
                red.strategy = kind.parse()?;
            }
            if let Some(kind) = args.get(2) {
                blue.strategy = kind.parse()?;
            }

            let board = random_standard_board(&mut rand::thread_rng());
            let record = play_local(red, blue, board).await?;
            println!(
                "{} vs {}: {} after {} moves",
                record.red,
                record.blue,
                record.result,
                record.moves.len()
            );
            let path = save_record(&record, Path::new(RECORD_DIR))?;
            info!("record saved to {}", path.display());
        }
        _ => usage(),
    }

    Ok(())
}
