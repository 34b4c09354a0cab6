use tictactoe_wasm::{Board, GameResult, Player, Policy, SearchEngine};

/// 穷举对手的所有走法，机器人每步用 `policy` 应对；返回遍历到的终局数。
fn explore_all_lines(
    board: &mut Board,
    turn: Player,
    bot: Player,
    policy: Policy,
    engine: &mut SearchEngine,
) -> usize {
    match board.result() {
        GameResult::Win { winner } => {
            assert_eq!(winner, bot, "bot lost on\n{board}");
            return 1;
        }
        GameResult::Draw => return 1,
        GameResult::InProgress => {}
    }

    if turn == bot {
        let action = engine
            .choose_move(board, bot, policy)
            .expect("non-terminal board has moves");
        board.apply(action, bot).expect("engine picks empty cells");
        let leaves = explore_all_lines(board, turn.opponent(), bot, policy, engine);
        board.undo(action);
        leaves
    } else {
        let mut leaves = 0;
        for action in board.empty_cells() {
            board.apply(action, turn).expect("empty cell");
            leaves += explore_all_lines(board, turn.opponent(), bot, policy, engine);
            board.undo(action);
        }
        leaves
    }
}

fn play_out(x_policy: Policy, o_policy: Policy, seed: u64) -> GameResult {
    let mut engine = SearchEngine::with_seed(seed);
    let mut board = Board::new();
    let mut turn = Player::X;
    while !board.is_terminal() {
        let policy = match turn {
            Player::X => x_policy,
            Player::O => o_policy,
        };
        let action = engine
            .choose_move(&board, turn, policy)
            .expect("non-terminal board has moves");
        board.apply(action, turn).expect("engine picks empty cells");
        turn = turn.opponent();
    }
    board.result()
}

#[test]
fn minimax_as_o_never_loses_to_any_line() {
    let mut engine = SearchEngine::with_seed(1);
    let mut board = Board::new();
    let leaves = explore_all_lines(
        &mut board,
        Player::X,
        Player::O,
        Policy::MinimaxOptimal,
        &mut engine,
    );
    assert!(leaves > 0);
    assert_eq!(board, Board::new());
}

#[test]
fn minimax_as_x_never_loses_to_any_line() {
    let mut engine = SearchEngine::with_seed(1);
    let mut board = Board::new();
    explore_all_lines(
        &mut board,
        Player::X,
        Player::X,
        Policy::MinimaxOptimal,
        &mut engine,
    );
}

#[test]
fn shortcut_bot_never_loses_to_any_line() {
    let mut engine = SearchEngine::with_seed(1);
    let mut board = Board::new();
    explore_all_lines(
        &mut board,
        Player::X,
        Player::O,
        Policy::ShortcutThenOptimal,
        &mut engine,
    );
}

#[test]
fn optimal_self_play_is_a_draw() {
    assert_eq!(
        play_out(Policy::MinimaxOptimal, Policy::MinimaxOptimal, 0),
        GameResult::Draw
    );
    assert_eq!(
        play_out(Policy::MinimaxOptimal, Policy::ShortcutThenOptimal, 0),
        GameResult::Draw
    );
    assert_eq!(
        play_out(Policy::ShortcutThenOptimal, Policy::MinimaxOptimal, 0),
        GameResult::Draw
    );
}

#[test]
fn minimax_never_loses_to_random_bot() {
    for seed in 0..50 {
        let result = play_out(Policy::MinimaxOptimal, Policy::Random, seed);
        assert_ne!(result, GameResult::Win { winner: Player::O }, "seed {seed}");

        let result = play_out(Policy::Random, Policy::MinimaxOptimal, seed);
        assert_ne!(result, GameResult::Win { winner: Player::X }, "seed {seed}");
    }
}
