use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ai::{AiDecision, Policy, SearchEngine};

use super::board::{Board, Cell, GameResult, Move, Player};
use super::rules::{GameEvent, MoveResolution, RuleError};

/// 对局模式：双人对战，或与某种策略的机器人对战。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    HumanVsHuman,
    RandomBot,
    ShortcutBot,
    BestBot,
}

impl GameMode {
    pub fn policy(self) -> Option<Policy> {
        match self {
            GameMode::HumanVsHuman => None,
            GameMode::RandomBot => Some(Policy::Random),
            GameMode::ShortcutBot => Some(Policy::ShortcutThenOptimal),
            GameMode::BestBot => Some(Policy::MinimaxOptimal),
        }
    }
}

impl FromStr for GameMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "human-vs-human" | "pvp" | "two-player" => Ok(GameMode::HumanVsHuman),
            "random" | "random-bot" => Ok(GameMode::RandomBot),
            "shortcut" | "shortcut-bot" | "toggle" => Ok(GameMode::ShortcutBot),
            "best" | "best-bot" | "minimax" | "optimal" => Ok(GameMode::BestBot),
            _ => Err(()),
        }
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::BestBot
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    turn: Player,
    mode: GameMode,
    #[serde(default)]
    human: Player,
}

impl GameSession {
    pub fn new(mode: GameMode) -> Self {
        Self::with_human(mode, Player::X)
    }

    /// 指定人类执哪一方；人类执 O 时机器人先手。
    pub fn with_human(mode: GameMode, human: Player) -> Self {
        Self {
            board: Board::new(),
            turn: Player::X,
            mode,
            human,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn result(&self) -> GameResult {
        self.board.result()
    }

    pub fn is_finished(&self) -> bool {
        self.board.is_terminal()
    }

    pub fn human(&self) -> Player {
        self.human
    }

    /// 换边会重新开局。
    pub fn set_human(&mut self, human: Player) {
        self.human = human;
        self.reset();
    }

    pub fn bot_player(&self) -> Option<Player> {
        self.mode.policy().map(|_| self.human.opponent())
    }

    pub fn is_bot_turn(&self) -> bool {
        self.bot_player() == Some(self.turn)
    }

    pub fn reset(&mut self) {
        self.board.reset();
        self.turn = Player::X;
    }

    /// 切换模式会重新开局。
    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
        self.reset();
    }

    /// Human move for the side to play.
    pub fn play(&mut self, mv: Move) -> Result<MoveResolution, RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if self.is_bot_turn() {
            return Err(RuleError::NotPlayerTurn {
                expected: self.turn,
            });
        }
        self.commit(mv)
    }

    pub fn play_bot(&mut self, engine: &mut SearchEngine) -> Result<MoveResolution, RuleError> {
        let decision = self.bot_decision(engine)?;
        self.apply_decision(&decision)
    }

    /// 提交事先算好的机器人决策（例如前端延迟展示之后）。
    /// 决策只对它所基于的局面有效。
    pub fn apply_decision(&mut self, decision: &AiDecision) -> Result<MoveResolution, RuleError> {
        if self.bot_player() != Some(decision.player) {
            return Err(RuleError::NoBotConfigured);
        }
        if decision.player != self.turn {
            return Err(RuleError::NotPlayerTurn {
                expected: self.turn,
            });
        }
        if decision.board != self.board {
            return Err(RuleError::StaleDecision);
        }
        self.commit(decision.action)
    }

    /// 只计算机器人的下一步，不落子。
    pub fn bot_decision(&self, engine: &mut SearchEngine) -> Result<AiDecision, RuleError> {
        let (bot, policy) = match (self.bot_player(), self.mode.policy()) {
            (Some(bot), Some(policy)) => (bot, policy),
            _ => return Err(RuleError::NoBotConfigured),
        };
        if self.is_finished() {
            return Err(RuleError::GameFinished);
        }
        if self.turn != bot {
            return Err(RuleError::NotPlayerTurn {
                expected: self.turn,
            });
        }
        engine.decide(&self.board, bot, policy)
    }

    /// 人类落子后，若对局未结束且有机器人，立即由机器人回应。
    pub fn play_turn(
        &mut self,
        mv: Move,
        engine: &mut SearchEngine,
    ) -> Result<MoveResolution, RuleError> {
        let mut resolution = self.play(mv)?;
        if !resolution.result.is_finished() && self.is_bot_turn() {
            resolution.extend(self.play_bot(engine)?);
        }
        Ok(resolution)
    }

    /// Checks that the board is reachable by legal play and matches the turn;
    /// used when a session is loaded from JSON.
    pub fn integrity_check(&self) -> Result<(), RuleError> {
        let cells = self.board.rows().iter().flatten();
        let (x_marks, o_marks) = cells.fold((0usize, 0usize), |(x, o), cell| match cell {
            Cell::X => (x + 1, o),
            Cell::O => (x, o + 1),
            Cell::Empty => (x, o),
        });
        let violation = RuleError::IntegrityViolation { x_marks, o_marks };

        let expected = if x_marks == o_marks {
            Player::X
        } else {
            Player::O
        };
        if (x_marks != o_marks && x_marks != o_marks + 1) || expected != self.turn {
            return Err(violation);
        }

        match self.board.line_winners().as_slice() {
            [] => Ok(()),
            // 胜者必须是最后落子的一方
            [winner] if *winner == self.turn.opponent() => Ok(()),
            _ => Err(violation),
        }
    }

    fn commit(&mut self, mv: Move) -> Result<MoveResolution, RuleError> {
        if self.is_finished() {
            return Err(RuleError::GameFinished);
        }
        let player = self.turn;
        self.board.apply(mv, player)?;
        self.turn = player.opponent();
        Ok(MoveResolution::new(
            self.board,
            vec![GameEvent::move_played(player, mv)],
        ))
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameMode::default())
    }
}
