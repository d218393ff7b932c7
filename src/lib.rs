pub mod core;
pub mod engine;
pub mod game;
pub mod logic;
pub mod network;
pub mod player;
