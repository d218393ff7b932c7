pub mod board;
pub mod r#move;
pub mod setup;
pub mod types;

pub use board::Board;
pub use r#move::Move;
pub use setup::{random_standard_board, setup_from_strings, standard_board};
pub use types::{Direction, Field, PlayerColor, Position, BOARD_SIZE};
