//! 井字棋核心逻辑模块（棋盘、规则、对局流程）。

pub mod board;
pub mod rules;
pub mod session;

pub use board::{Board, Cell, GameResult, Move, Player, BOARD_SIZE};
pub use rules::{GameEvent, MoveResolution, RuleError};
pub use session::{GameMode, GameSession};
