pub mod ai;
pub mod game;
pub mod utils;

use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, to_value};
use std::str::FromStr;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::js_sys::Promise;

pub use ai::{AiDecision, Policy, SearchEngine};
pub use game::{
    Board, Cell, GameEvent, GameMode, GameResult, GameSession, Move, MoveResolution, Player,
    RuleError,
};

#[cfg(all(feature = "wee_alloc", target_arch = "wasm32"))]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn start() {
    utils::set_panic_hook();
}

fn to_js_error(error: RuleError) -> JsValue {
    to_value(&error).unwrap_or_else(|serialize_err| JsValue::from_str(&serialize_err.to_string()))
}

fn serde_to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_mode(value: Option<&str>) -> GameMode {
    match value {
        Some(raw) => GameMode::from_str(raw).unwrap_or_else(|_| {
            utils::console_warn(&format!("unknown game mode `{raw}`, using best bot"));
            GameMode::default()
        }),
        None => GameMode::default(),
    }
}

fn parse_policy(value: Option<&str>) -> Policy {
    match value {
        Some(raw) => Policy::from_str(raw).unwrap_or_else(|_| {
            utils::console_warn(&format!("unknown policy `{raw}`, using minimax"));
            Policy::default()
        }),
        None => Policy::default(),
    }
}

fn announce(resolution: &MoveResolution) {
    match resolution.result {
        GameResult::Win { winner } => crate::log!("Player {winner} wins!"),
        GameResult::Draw => crate::log!("It's a draw!"),
        GameResult::InProgress => {}
    }
}

fn make_resolution_json(resolution: &MoveResolution) -> Result<String, JsValue> {
    announce(resolution);
    serde_json::to_string(resolution).map_err(serde_to_js_error)
}

#[derive(Serialize)]
struct AiMoveResponse {
    decision: AiDecision,
    applied: MoveResolution,
}

#[wasm_bindgen]
pub struct GameEngine {
    session: GameSession,
    search: SearchEngine,
}

#[wasm_bindgen]
impl GameEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>) -> GameEngine {
        GameEngine {
            session: GameSession::new(parse_mode(mode.as_deref())),
            search: SearchEngine::new(),
        }
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session).map_err(serde_to_js_error)
    }

    pub fn set_state_json(&mut self, json: &str) -> Result<(), JsValue> {
        let session: GameSession = serde_json::from_str(json).map_err(serde_to_js_error)?;
        session.integrity_check().map_err(to_js_error)?;
        self.session = session;
        Ok(())
    }

    pub fn board(&self) -> Result<JsValue, JsValue> {
        to_value(self.session.board()).map_err(JsValue::from)
    }

    pub fn result_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.result()).map_err(serde_to_js_error)
    }

    pub fn turn(&self) -> String {
        self.session.turn().to_string()
    }

    pub fn is_bot_turn(&self) -> bool {
        self.session.is_bot_turn()
    }

    pub fn set_mode(&mut self, mode: &str) {
        self.session.set_mode(parse_mode(Some(mode)));
    }

    /// 人类改执 `side`（"X" 或 "O"），并重新开局。
    pub fn set_human(&mut self, side: &str) -> Result<(), JsValue> {
        let human = Player::from_str(side)
            .map_err(|_| JsValue::from_str(&format!("unknown side `{side}`")))?;
        self.session.set_human(human);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// 仅落下当前一方的棋子（双人模式或异步 AI 流程使用）。
    pub fn play(&mut self, row: usize, col: usize) -> Result<String, JsValue> {
        let resolution = self
            .session
            .play(Move::new(row, col))
            .map_err(to_js_error)?;
        make_resolution_json(&resolution)
    }

    /// 人类落子，并在需要时立刻附上机器人的回应。
    pub fn play_turn(&mut self, row: usize, col: usize) -> Result<String, JsValue> {
        let resolution = self
            .session
            .play_turn(Move::new(row, col), &mut self.search)
            .map_err(to_js_error)?;
        make_resolution_json(&resolution)
    }

    pub fn apply_ai_move(&mut self) -> Result<String, JsValue> {
        let decision = self
            .session
            .bot_decision(&mut self.search)
            .map_err(to_js_error)?;
        let applied = self
            .session
            .apply_decision(&decision)
            .map_err(to_js_error)?;
        announce(&applied);

        let response = AiMoveResponse { decision, applied };
        serde_json::to_string(&response).map_err(serde_to_js_error)
    }

    /// 提交 `think_ai` 返回的决策 JSON。
    pub fn apply_decision_json(&mut self, decision_json: &str) -> Result<String, JsValue> {
        let decision: AiDecision =
            serde_json::from_str(decision_json).map_err(serde_to_js_error)?;
        let resolution = self
            .session
            .apply_decision(&decision)
            .map_err(to_js_error)?;
        make_resolution_json(&resolution)
    }

    /// 异步计算机器人决策，`delay_ms` 只是展示用的停顿。
    pub fn think_ai(&self, delay_ms: Option<u32>) -> Promise {
        let session = self.session.clone();
        let delay = delay_ms.unwrap_or(0);

        future_to_promise(async move {
            if delay > 0 {
                TimeoutFuture::new(delay).await;
            }
            let mut search = SearchEngine::new();
            let decision = session.bot_decision(&mut search).map_err(to_js_error)?;
            let json = serde_json::to_string(&decision).map_err(serde_to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }
}

/// 对任意棋盘计算指定玩家的一步。
#[wasm_bindgen(js_name = "computeAiMove")]
pub fn compute_ai_move(
    board: JsValue,
    player: JsValue,
    policy: Option<String>,
) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    let player: Player = from_value(player).map_err(JsValue::from)?;
    let mut search = SearchEngine::new();
    let decision = search
        .decide(&board, player, parse_policy(policy.as_deref()))
        .map_err(to_js_error)?;
    to_value(&decision).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "checkWinner")]
pub fn check_winner(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.result()).map_err(JsValue::from)
}

#[wasm_bindgen(js_name = "emptyCells")]
pub fn empty_cells(board: JsValue) -> Result<JsValue, JsValue> {
    let board: Board = from_value(board).map_err(JsValue::from)?;
    to_value(&board.empty_cells()).map_err(JsValue::from)
}

/// 画布点击坐标 → 格子；点击在棋盘外时返回 `null`。
#[wasm_bindgen(js_name = "cellFromPoint")]
pub fn cell_from_point(x: f64, y: f64, square_size: f64) -> Result<JsValue, JsValue> {
    to_value(&Move::from_point(x, y, square_size)).map_err(JsValue::from)
}
