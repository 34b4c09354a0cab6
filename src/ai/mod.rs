//! AI 算法模块（随机、抢胜、极小化极大搜索）。

pub mod minimax;

pub use minimax::{AiDecision, Policy, SearchEngine, DRAW_SCORE, LOSS_SCORE, WIN_SCORE};
