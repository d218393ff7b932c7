use crate::core::{Board, Field, PlayerColor, Position, BOARD_SIZE};
use rand::Rng;

/// 文字列配列から盤面を初期化する
///
/// Rows are listed top to bottom, so the first row is `y = 9`. Each row is
/// whitespace-separated: `R` red, `B` blue, `O` obstacle, `.` empty.
/// Rows may be shorter than the board; missing cells stay empty.
pub fn setup_from_strings(setup: &[&str], current: PlayerColor) -> Board {
    let mut board = Board::new();
    board.current = current;
    board.turn = if current == PlayerColor::Red { 0 } else { 1 };

    for (row, line) in setup.iter().take(BOARD_SIZE).enumerate() {
        let y = BOARD_SIZE - 1 - row;
        for (x, s) in line.split_whitespace().take(BOARD_SIZE).enumerate() {
            let field = match s {
                "R" | "r" => Field::Piranha(PlayerColor::Red),
                "B" | "b" => Field::Piranha(PlayerColor::Blue),
                "O" | "o" => Field::Obstacle,
                _ => Field::Empty,
            };
            board.set_field(Position::new(x, y), field);
        }
    }
    board
}

/// 標準の初期配置 (障害物の位置を指定)
///
/// Red holds columns 0 and 9, Blue holds rows 0 and 9, corners stay empty.
pub fn standard_board(obstacles: [Position; 2]) -> Board {
    let mut board = Board::new();
    for i in 1..BOARD_SIZE - 1 {
        board.place_piece(Position::new(0, i), PlayerColor::Red);
        board.place_piece(Position::new(BOARD_SIZE - 1, i), PlayerColor::Red);
        board.place_piece(Position::new(i, 0), PlayerColor::Blue);
        board.place_piece(Position::new(i, BOARD_SIZE - 1), PlayerColor::Blue);
    }
    for pos in obstacles {
        board.set_field(pos, Field::Obstacle);
    }
    board
}

/// 障害物をランダムに置いた標準配置
///
/// Both obstacles land inside the central 6x6 square and never share a
/// row, column or diagonal.
pub fn random_standard_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    let first = Position::new(rng.gen_range(2..8), rng.gen_range(2..8));
    let second = loop {
        let candidate = Position::new(rng.gen_range(2..8), rng.gen_range(2..8));
        if obstacles_compatible(first, candidate) {
            break candidate;
        }
    };
    standard_board([first, second])
}

fn obstacles_compatible(a: Position, b: Position) -> bool {
    let dx = a.x.abs_diff(b.x);
    let dy = a.y.abs_diff(b.y);
    dx != 0 && dy != 0 && dx != dy
}
