pub mod ai;
pub mod controller;

pub use ai::{StrategyKind, StrategySelector};
pub use controller::{MoveRequest, MoveSelector};
