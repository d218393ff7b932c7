use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// 設定ファイルの既定パス
pub const CONFIG_PATH: &str = "swarm_config.json";

/// 指し手選択の方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Win now if possible, avoid handing over the win, otherwise random.
    WinNowFirst,
    /// Maximise own swarm minus opponent swarm, with one-ply look-ahead.
    WeightedDifferential,
    /// `WeightedDifferential`, but first break a joined opponent swarm.
    #[default]
    DestructiveCapture,
    /// Depth-bounded search against a greedy opponent.
    BoundedDepthSearch,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::WinNowFirst,
        StrategyKind::WeightedDifferential,
        StrategyKind::DestructiveCapture,
        StrategyKind::BoundedDepthSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::WinNowFirst => "win-now-first",
            StrategyKind::WeightedDifferential => "weighted-differential",
            StrategyKind::DestructiveCapture => "destructive-capture",
            StrategyKind::BoundedDepthSearch => "bounded-depth-search",
        }
    }
}

impl FromStr for StrategyKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown strategy '{}'", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub version: String,
    pub strategy: StrategyKind,
    pub search: SearchConfig,
    pub timing: TimingConfig,
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub depth: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// 保険タイマー: この時間内にパイプラインが終わらなければランダムな手を送る
    pub deadline_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub addr: String,
    pub name: String,
    /// サーバー側の持ち時間 (1手あたり)
    pub move_timeout_ms: u64,
}

impl EngineConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| Self::default())
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.timing.deadline_ms)
    }

    pub fn move_timeout(&self) -> Duration {
        Duration::from_millis(self.network.move_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            version: "1.0".to_string(),
            strategy: StrategyKind::default(),
            search: SearchConfig { depth: 4 },
            timing: TimingConfig { deadline_ms: 800 },
            network: NetworkConfig {
                addr: "127.0.0.1:8080".to_string(),
                name: "swarm-ai".to_string(),
                move_timeout_ms: 2000,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_documented_budget() {
        let config = EngineConfig::default();
        assert_eq!(config.deadline(), Duration::from_millis(800));
        assert_eq!(config.search.depth, 4);
        assert_eq!(config.strategy, StrategyKind::DestructiveCapture);
    }

    #[test]
    fn loads_from_json_file() {
        let mut config = EngineConfig::default();
        config.strategy = StrategyKind::BoundedDepthSearch;
        config.search.depth = 2;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(loaded.strategy, StrategyKind::BoundedDepthSearch);
        assert_eq!(loaded.search.depth, 2);
    }

    #[test]
    fn broken_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(EngineConfig::load_from(file.path()).is_err());
    }

    #[test]
    fn strategy_names_parse_back() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
        }
        assert!("minimax".parse::<StrategyKind>().is_err());
    }
}
