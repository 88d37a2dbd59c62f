//! Integration tests for HEX3-TABOO
//!
//! Tests the full stack: board, rule engine, line evaluator and AI players

use hextaboo_core::{
    new_game, Action, ActionKind, AiStrategy, Cell, Difficulty, GameError, GameState, Hex,
    OutcomeKind, Phase, Player,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Play a list of placements, alternating seats, stopping at the first error
fn play_sequence(state: &mut GameState, cells: &[(i32, i32)]) -> Result<(), GameError> {
    for &(q, r) in cells {
        state.play(Action::Place(Hex::new(q, r)))?;
    }
    Ok(())
}

/// Run two strategies against each other until the game ends
fn ai_game(radius: u32, p1: Difficulty, p2: Difficulty, seed: u64) -> GameState {
    let mut state = new_game(radius).unwrap();
    let mut seats = [
        AiStrategy::with_seed(p1, Player::One, seed),
        AiStrategy::with_seed(p2, Player::Two, seed.wrapping_add(1)),
    ];

    let limit = state.board().len() * 2;
    for _ in 0..limit {
        if state.is_over() {
            break;
        }
        seats[state.current_player().index()]
            .take_turn(&mut state)
            .unwrap();
    }
    assert!(state.is_over(), "game did not finish");
    state
}

// ============================================================================
// RULE ENGINE SCENARIOS
// ============================================================================

#[test]
fn test_isolated_three_loses() {
    let mut state = new_game(3).unwrap();
    play_sequence(&mut state, &[(0, 0), (1, -1), (0, 1), (1, 0), (0, -1)]).unwrap();

    let outcome = state.outcome().unwrap();
    assert_eq!(outcome.kind, OutcomeKind::Loss);
    assert_eq!(outcome.player, Player::One);
    assert_eq!(outcome.winner(), Some(Player::Two));
    assert_eq!(state.current_player(), Player::One);
    assert_eq!(state.phase(), Phase::Lost);

    let mut line = state.last_detected_line().to_vec();
    line.sort();
    assert_eq!(line, vec![Hex::new(0, -1), Hex::new(0, 0), Hex::new(0, 1)]);
}

#[test]
fn test_three_in_a_row_ends_before_four() {
    // Player 1's fifth-move three is isolated, so the game is already lost
    // before the fourth stone can be placed.
    let mut state = new_game(3).unwrap();
    let sequence = [(0, 0), (2, -1), (0, 1), (2, 0), (0, -1), (2, 1), (0, -2)];

    assert_eq!(play_sequence(&mut state, &sequence), Err(GameError::GameOver));
    assert_eq!(state.outcome().unwrap().kind, OutcomeKind::Loss);
    assert_eq!(state.history().len(), 5);
}

#[test]
fn test_four_in_a_row_wins() {
    let mut state = new_game(3).unwrap();
    play_sequence(
        &mut state,
        &[(0, 0), (2, -1), (0, 1), (2, 1), (0, -2), (-2, 0), (0, -1)],
    )
    .unwrap();

    let outcome = state.outcome().unwrap();
    assert_eq!(outcome.kind, OutcomeKind::Win);
    assert_eq!(outcome.winner(), Some(Player::One));
    assert_eq!(outcome.line.len(), 4);
    assert_eq!(state.phase(), Phase::Won);
}

#[test]
fn test_neutralization_lifecycle() {
    let mut state = new_game(2).unwrap();
    play_sequence(&mut state, &[(0, 0), (1, 0), (-1, 0)]).unwrap();

    assert!(state.can_neutralize());
    assert_eq!(state.play(Action::Neutralize), Ok(None));
    assert_eq!(state.board().get(Hex::new(-1, 0)), Ok(Cell::Neutralized));
    assert_eq!(state.forbidden_cell(Player::One), Some(Hex::new(-1, 0)));
    assert!(state.removal_used(Player::Two));

    assert_eq!(
        state.play(Action::Place(Hex::new(-1, 0))),
        Err(GameError::ForbiddenCell(Hex::new(-1, 0)))
    );
    assert_eq!(state.current_player(), Player::One);

    state.play(Action::Place(Hex::new(0, 1))).unwrap();
    assert_eq!(state.forbidden_cell(Player::One), None);

    assert!(!state.can_neutralize());
    assert_eq!(state.play(Action::Neutralize), Err(GameError::NotAvailable));
}

#[test]
fn test_player_one_cannot_neutralize() {
    let mut state = new_game(2).unwrap();
    play_sequence(&mut state, &[(0, 0), (1, 0)]).unwrap();
    assert!(!state.can_neutralize());
    assert_eq!(state.play(Action::Neutralize), Err(GameError::NotAvailable));
}

#[test]
fn test_invalid_radius() {
    assert_eq!(new_game(0).err(), Some(GameError::InvalidRadius(0)));
    assert_eq!(new_game(33).err(), Some(GameError::InvalidRadius(33)));
    assert!(new_game(1).is_ok());
}

// ============================================================================
// RANDOM PLAYOUTS
// ============================================================================

#[test]
fn test_random_playouts_keep_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);

    for _ in 0..50 {
        let mut state = new_game(3).unwrap();
        while !state.is_over() {
            let actions = state.legal_actions();
            let action = *actions.choose(&mut rng).unwrap();
            let mover = state.current_player();
            let outcome = state.play(action).unwrap();

            match outcome {
                Some(_) => assert_eq!(state.current_player(), mover),
                None => assert_eq!(state.current_player(), mover.opponent()),
            }
            if let Some(hex) = state.forbidden_cell(Player::One) {
                assert_eq!(state.board().get(hex), Ok(Cell::Neutralized));
            }
        }

        let neutralizations = state
            .history()
            .iter()
            .filter(|mv| mv.action == ActionKind::Neutralize)
            .count();
        assert!(neutralizations <= 1);
        assert!(state.legal_actions().is_empty());
        assert_eq!(
            state.play(Action::Place(Hex::ORIGIN)),
            Err(GameError::GameOver)
        );
    }
}

// ============================================================================
// AI TESTS
// ============================================================================

#[test]
fn test_ai_games_complete() {
    let tiers = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard { depth: 2 }];
    for (i, &p1) in tiers.iter().enumerate() {
        for &p2 in &tiers {
            let state = ai_game(2, p1, p2, i as u64);
            assert!(state.outcome().is_some());
        }
    }
}

#[test]
fn test_ai_games_deterministic() {
    let a = ai_game(3, Difficulty::Medium, Difficulty::Hard { depth: 2 }, 42);
    let b = ai_game(3, Difficulty::Medium, Difficulty::Hard { depth: 2 }, 42);
    assert_eq!(a.history(), b.history());
    assert_eq!(a.outcome(), b.outcome());
}

#[test]
fn test_hard_takes_immediate_win_from_random_positions() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut checked = 0;

    for _ in 0..200 {
        let mut state = new_game(3).unwrap();
        let plies = rand::Rng::gen_range(&mut rng, 4..14);
        for _ in 0..plies {
            if state.is_over() {
                break;
            }
            let cells = state.legal_cells();
            let hex = *cells.choose(&mut rng).unwrap();
            state.play(Action::Place(hex)).unwrap();
        }
        if state.is_over() {
            continue;
        }

        let player = state.current_player();
        let winning: Vec<Hex> = state
            .legal_cells()
            .into_iter()
            .filter(|&hex| {
                let mut probe = state.clone();
                matches!(
                    probe.play(Action::Place(hex)),
                    Ok(Some(outcome)) if outcome.kind == OutcomeKind::Win
                )
            })
            .collect();
        if winning.is_empty() {
            continue;
        }

        let mut ai = AiStrategy::with_seed(Difficulty::hard(), player, 1);
        match ai.choose_action(&state) {
            Some(Action::Place(hex)) => assert!(winning.contains(&hex)),
            other => panic!("hard AI passed up a win: {:?}", other),
        }
        checked += 1;
    }

    assert!(checked > 0, "no winning positions generated");
}

#[test]
fn test_ai_does_not_act_out_of_turn() {
    let mut state = new_game(2).unwrap();
    let mut ai = AiStrategy::new(Difficulty::Easy, Player::Two);
    assert_eq!(ai.choose_action(&state), None);
    assert_eq!(
        ai.take_turn(&mut state),
        Err(GameError::NotYourTurn(Player::Two))
    );
}
