use std::fmt;

use serde::{Deserialize, Serialize};

use super::board::{Board, GameResult, Move, Player};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RuleError {
    InvalidMove {
        row: usize,
        col: usize,
        occupied: bool,
    },
    NoLegalMoves,
    GameFinished,
    NotPlayerTurn {
        expected: Player,
    },
    NoBotConfigured,
    IntegrityViolation {
        x_marks: usize,
        o_marks: usize,
    },
    StaleDecision,
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::InvalidMove {
                row,
                col,
                occupied: true,
            } => write!(f, "cell ({row}, {col}) is already taken"),
            RuleError::InvalidMove { row, col, .. } => {
                write!(f, "cell ({row}, {col}) is outside the board")
            }
            RuleError::NoLegalMoves => write!(f, "no legal moves left on the board"),
            RuleError::GameFinished => write!(f, "the game is already over"),
            RuleError::NotPlayerTurn { expected } => write!(f, "it is {expected}'s turn"),
            RuleError::NoBotConfigured => write!(f, "this mode has no bot opponent"),
            RuleError::IntegrityViolation { x_marks, o_marks } => write!(
                f,
                "board with {x_marks} X and {o_marks} O marks is not a reachable position"
            ),
            RuleError::StaleDecision => {
                write!(f, "bot decision was computed for another position")
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// 对局事件流。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum GameEvent {
    MovePlayed { player: Player, row: usize, col: usize },
    GameWon { winner: Player },
    GameDrawn,
}

impl GameEvent {
    pub fn move_played(player: Player, mv: Move) -> Self {
        GameEvent::MovePlayed {
            player,
            row: mv.row,
            col: mv.col,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveResolution {
    pub board: Board,
    pub events: Vec<GameEvent>,
    pub result: GameResult,
}

impl MoveResolution {
    pub fn new(board: Board, mut events: Vec<GameEvent>) -> Self {
        let result = board.result();
        let closing = match result {
            GameResult::Win { winner } => Some(GameEvent::GameWon { winner }),
            GameResult::Draw => Some(GameEvent::GameDrawn),
            GameResult::InProgress => None,
        };
        if let Some(event) = closing {
            if !events.contains(&event) {
                events.push(event);
            }
        }

        Self {
            board,
            events,
            result,
        }
    }

    /// 合并后续结算（例如人类落子后紧跟的 AI 回应）。
    pub fn extend(&mut self, other: MoveResolution) {
        self.events.retain(|event| matches!(event, GameEvent::MovePlayed { .. }));
        self.events.extend(other.events);
        self.board = other.board;
        self.result = other.result;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Cell;

    #[test]
    fn resolution_appends_closing_event_once() {
        let board = Board::from_rows([
            [Cell::X, Cell::X, Cell::X],
            [Cell::O, Cell::O, Cell::Empty],
            [Cell::Empty, Cell::Empty, Cell::Empty],
        ]);
        let events = vec![
            GameEvent::move_played(Player::X, Move::new(0, 2)),
            GameEvent::GameWon { winner: Player::X },
        ];
        let resolution = MoveResolution::new(board, events);
        assert_eq!(resolution.result, GameResult::Win { winner: Player::X });
        assert_eq!(
            resolution
                .events
                .iter()
                .filter(|event| matches!(event, GameEvent::GameWon { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn extend_keeps_both_moves_and_latest_result() {
        let mut board = Board::new();
        board.apply(Move::new(1, 1), Player::X).expect("empty");
        let mut first = MoveResolution::new(
            board,
            vec![GameEvent::move_played(Player::X, Move::new(1, 1))],
        );

        board.apply(Move::new(0, 0), Player::O).expect("empty");
        let second = MoveResolution::new(
            board,
            vec![GameEvent::move_played(Player::O, Move::new(0, 0))],
        );

        first.extend(second);
        assert_eq!(first.events.len(), 2);
        assert_eq!(first.board.move_count(), 2);
        assert_eq!(first.result, GameResult::InProgress);
    }

    #[test]
    fn errors_serialize_with_type_tag() {
        let json = serde_json::to_string(&RuleError::NoLegalMoves).expect("serializable");
        assert_eq!(json, r#"{"type":"NoLegalMoves"}"#);

        let json = serde_json::to_string(&RuleError::InvalidMove {
            row: 0,
            col: 1,
            occupied: true,
        })
        .expect("serializable");
        assert_eq!(json, r#"{"type":"InvalidMove","row":0,"col":1,"occupied":true}"#);
    }
}
