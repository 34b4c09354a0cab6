use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rules::RuleError;

/// 棋盘边长，固定为 3×3。
pub const BOARD_SIZE: usize = 3;

const WIN_LINES: [[(usize, usize); 3]; 8] = [
    // rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// 玩家标记，X 永远先手。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Player::X
    }
}

impl FromStr for Player {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Player::X),
            "O" | "o" => Ok(Player::O),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    X,
    O,
}

impl Cell {
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::X => Some(Player::X),
            Cell::O => Some(Player::O),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

/// 一步落子：行、列坐标（0..=2）。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self) -> bool {
        self.row < BOARD_SIZE && self.col < BOARD_SIZE
    }

    pub fn index(&self) -> usize {
        self.row * BOARD_SIZE + self.col
    }

    /// 将画布坐标换算为格子，`square_size` 为单格像素宽度。
    pub fn from_point(x: f64, y: f64, square_size: f64) -> Option<Self> {
        if !(square_size > 0.0) || !(x >= 0.0) || !(y >= 0.0) {
            return None;
        }
        let mv = Move::new((y / square_size).floor() as usize, (x / square_size).floor() as usize);
        mv.in_bounds().then_some(mv)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// 对局结果，总是由棋盘即时推导，不单独存储。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameResult {
    InProgress,
    Win { winner: Player },
    Draw,
}

impl GameResult {
    pub fn is_finished(&self) -> bool {
        !matches!(self, GameResult::InProgress)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    pub fn rows(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn get(&self, mv: Move) -> Option<Cell> {
        self.cells.get(mv.row).and_then(|row| row.get(mv.col)).copied()
    }

    pub fn apply(&mut self, mv: Move, player: Player) -> Result<(), RuleError> {
        match self.get(mv) {
            Some(Cell::Empty) => {
                self.cells[mv.row][mv.col] = Cell::from(player);
                Ok(())
            }
            Some(_) => Err(RuleError::InvalidMove {
                row: mv.row,
                col: mv.col,
                occupied: true,
            }),
            None => Err(RuleError::InvalidMove {
                row: mv.row,
                col: mv.col,
                occupied: false,
            }),
        }
    }

    /// 撤销一步，仅供搜索回溯使用。
    pub fn undo(&mut self, mv: Move) {
        debug_assert!(mv.in_bounds(), "undo of out-of-range move {mv}");
        if let Some(cell) = self.cells.get_mut(mv.row).and_then(|row| row.get_mut(mv.col)) {
            *cell = Cell::Empty;
        }
    }

    /// Scans all eight lines; hypothetical search states may hold more than one.
    pub fn winner(&self) -> Option<Player> {
        WIN_LINES.iter().find_map(|line| {
            let [a, b, c] = line.map(|(row, col)| self.cells[row][col]);
            if a == b && b == c {
                a.player()
            } else {
                None
            }
        })
    }

    /// Every player owning a complete line, in X-then-O order.
    pub fn line_winners(&self) -> Vec<Player> {
        [Player::X, Player::O]
            .into_iter()
            .filter(|player| {
                let mark = Cell::from(*player);
                WIN_LINES
                    .iter()
                    .any(|line| line.iter().all(|&(row, col)| self.cells[row][col] == mark))
            })
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|cell| !cell.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.winner().is_some() || self.is_full()
    }

    pub fn empty_cells(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(BOARD_SIZE * BOARD_SIZE);
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_empty() {
                    moves.push(Move::new(row, col));
                }
            }
        }
        moves
    }

    pub fn move_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| !cell.is_empty()).count()
    }

    pub fn result(&self) -> GameResult {
        if let Some(winner) = self.winner() {
            GameResult::Win { winner }
        } else if self.is_full() {
            GameResult::Draw
        } else {
            GameResult::InProgress
        }
    }

    pub fn reset(&mut self) {
        self.cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, row) in self.cells.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::X => 'X',
                    Cell::O => 'O',
                };
                write!(f, "{symbol}")?;
            }
        }
        Ok(())
    }
}
