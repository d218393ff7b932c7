pub mod config;
pub mod evaluator;
pub mod search;
pub mod strategy;

pub use config::{EngineConfig, StrategyKind};
pub use evaluator::{Evaluation, MoveEvaluator};
pub use strategy::StrategySelector;
