use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Move, Player, RuleError};

pub const WIN_SCORE: i32 = 10;
pub const LOSS_SCORE: i32 = -10;
pub const DRAW_SCORE: i32 = 0;

/// 机器人的选步策略。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    Random,
    ShortcutThenOptimal,
    MinimaxOptimal,
}

impl FromStr for Policy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "easy" => Ok(Policy::Random),
            "shortcut" | "shortcut-then-optimal" | "toggle" | "smart" => {
                Ok(Policy::ShortcutThenOptimal)
            }
            "minimax" | "minimax-optimal" | "optimal" | "best" => Ok(Policy::MinimaxOptimal),
            _ => Err(()),
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::MinimaxOptimal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiDecision {
    pub action: Move,
    pub player: Player,
    pub policy: Policy,
    /// Minimax value of `action` for `player`; absent for random picks and shortcut wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    pub nodes: u64,
    pub shortcut: bool,
    /// 做出决策时的局面，提交前用来识别过期决策。
    pub board: Board,
}

struct SearchStats {
    nodes: u64,
}

impl SearchStats {
    fn new() -> Self {
        Self { nodes: 0 }
    }
}

pub struct SearchEngine {
    rng: SmallRng,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn choose_move(
        &mut self,
        board: &Board,
        player: Player,
        policy: Policy,
    ) -> Result<Move, RuleError> {
        self.decide(board, player, policy)
            .map(|decision| decision.action)
    }

    /// 计算 `player` 的下一步，不修改调用方的棋盘。
    pub fn decide(
        &mut self,
        board: &Board,
        player: Player,
        policy: Policy,
    ) -> Result<AiDecision, RuleError> {
        if board.is_terminal() {
            return Err(RuleError::NoLegalMoves);
        }

        // 在副本上做落子/撤销回溯
        let mut scratch = *board;
        let decision = match policy {
            Policy::Random => self.random_decision(&scratch, player)?,
            Policy::ShortcutThenOptimal => match immediate_win(&mut scratch, player)? {
                Some(action) => AiDecision {
                    action,
                    player,
                    policy,
                    score: None,
                    nodes: 0,
                    shortcut: true,
                    board: *board,
                },
                None => optimal_decision(&mut scratch, player, policy)?,
            },
            Policy::MinimaxOptimal => optimal_decision(&mut scratch, player, policy)?,
        };
        debug_assert_eq!(&scratch, board, "search must restore every explored cell");

        Ok(decision)
    }

    fn random_decision(&mut self, board: &Board, player: Player) -> Result<AiDecision, RuleError> {
        let action = board
            .empty_cells()
            .choose(&mut self.rng)
            .copied()
            .ok_or(RuleError::NoLegalMoves)?;

        Ok(AiDecision {
            action,
            player,
            policy: Policy::Random,
            score: None,
            nodes: 1,
            shortcut: false,
            board: *board,
        })
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// First empty cell, in row-major order, that completes a line for `player`.
fn immediate_win(board: &mut Board, player: Player) -> Result<Option<Move>, RuleError> {
    for action in board.empty_cells() {
        board.apply(action, player)?;
        let wins = board.winner() == Some(player);
        board.undo(action);
        if wins {
            return Ok(Some(action));
        }
    }
    Ok(None)
}

fn optimal_decision(
    board: &mut Board,
    player: Player,
    policy: Policy,
) -> Result<AiDecision, RuleError> {
    let position = *board;
    let mut stats = SearchStats::new();
    let mut best: Option<(Move, i32)> = None;

    for action in board.empty_cells() {
        board.apply(action, player)?;
        let score = minimax(board, player, false, &mut stats);
        board.undo(action);
        let score = score?;

        // 严格大于：同分时保留行优先顺序中最早的一步
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((action, score));
        }
    }

    let (action, score) = best.ok_or(RuleError::NoLegalMoves)?;
    Ok(AiDecision {
        action,
        player,
        policy,
        score: Some(score),
        nodes: stats.nodes,
        shortcut: false,
        board: position,
    })
}

fn minimax(
    board: &mut Board,
    ai: Player,
    maximizing: bool,
    stats: &mut SearchStats,
) -> Result<i32, RuleError> {
    stats.nodes += 1;

    if let Some(winner) = board.winner() {
        return Ok(if winner == ai { WIN_SCORE } else { LOSS_SCORE });
    }
    if board.is_full() {
        return Ok(DRAW_SCORE);
    }

    let actor = if maximizing { ai } else { ai.opponent() };
    let mut value = if maximizing { i32::MIN } else { i32::MAX };
    for action in board.empty_cells() {
        board.apply(action, actor)?;
        let score = minimax(board, ai, !maximizing, stats);
        board.undo(action);
        let score = score?;
        value = if maximizing {
            value.max(score)
        } else {
            value.min(score)
        };
    }
    Ok(value)
}
