//! Evaluation function integration tests.

use proptest::prelude::*;
use rust_2048::core::{Direction, Grid};
use rust_2048::eval::features;
use rust_2048::eval::{EvalConfig, EvaluationFunction, Feature};

fn grid(rows: &[[u32; 4]; 4]) -> Grid {
    let rows: Vec<Vec<u32>> = rows.iter().map(|r| r.to_vec()).collect();
    Grid::from_rows(4, 4, &rows).unwrap()
}

fn single(feature: Feature) -> EvaluationFunction {
    EvaluationFunction::new(EvalConfig::empty().with_weight(feature, 1.0))
}

// =============================================================================
// Division Fallbacks
// =============================================================================

#[test]
fn test_empty_grid_features_are_zero() {
    let g = Grid::empty(4, 4).unwrap();
    for feature in Feature::ALL {
        let value = single(feature).evaluate(&g, None);
        if feature == Feature::Zeros {
            assert_eq!(value, 16.0);
        } else if feature == Feature::ZeroField {
            assert_eq!(value, 9.0);
        } else {
            assert_eq!(value, 0.0, "{} on an empty grid", feature);
        }
    }
}

#[test]
fn test_ratio_fallbacks() {
    // Only low tiles: low_to_high falls back to the raw low count
    let low = grid(&[[2, 4, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    assert_eq!(features::low_to_high(&low, 256), 2.0 / 2.0);
    assert_eq!(features::high_to_low(&low, 256), 0.0);

    // Only high tiles
    let high = grid(&[[512, 256, 1024, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    assert_eq!(features::high_to_low(&high, 256), 3.0 / 3.0);
    assert_eq!(features::low_to_high(&high, 256), 0.0);
}

#[test]
fn test_uniform_grid_has_no_gradient() {
    let g = grid(&[[2, 2, 2, 2], [2, 2, 2, 2], [2, 2, 2, 2], [2, 2, 2, 2]]);
    assert_eq!(features::monotonicity(&g), 0.0);
    assert_eq!(features::smoothness(&g), 0.0);
    assert_eq!(features::flatness(&g), 0.0);
}

// =============================================================================
// Presets
// =============================================================================

#[test]
fn test_expectimax_prefers_open_boards() {
    let eval = EvaluationFunction::new(EvalConfig::expectimax());
    let open = grid(&[[4, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    let crowded = grid(&[[4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 0, 0], [0, 0, 0, 0]]);

    assert!(eval.evaluate(&open, None) > eval.evaluate(&crowded, None));
}

#[test]
fn test_mcts_rewards_merges() {
    let eval = EvaluationFunction::new(EvalConfig::mcts());
    let g = grid(&[[8, 8, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);

    let mut merged = g.clone();
    merged.apply(Direction::Left);
    let mut slid = g.clone();
    slid.apply(Direction::Down);

    assert_eq!(merged.last_move_score(), Some(16));
    assert!(eval.evaluate(&merged, None) > eval.evaluate(&slid, None));
}

#[test]
fn test_weights_from_toml() {
    let config: EvalConfig = toml::from_str(
        r#"
        pair_values = [2, 4]

        [weights]
        pairs = 1.0
        "#,
    )
    .unwrap();
    let eval = EvaluationFunction::new(config);

    // 8s are filtered out; the pair of 2s counts 2 / 16
    let g = grid(&[[2, 2, 8, 8], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    assert_eq!(eval.evaluate(&g, None), 2.0 / 16.0);
}

#[test]
fn test_breakdown_names_each_weight() {
    let eval = EvaluationFunction::new(EvalConfig::mcts());
    let g = grid(&[[8, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
    let names: Vec<Feature> = eval.breakdown(&g, None).into_iter().map(|(f, _)| f).collect();

    assert_eq!(names, vec![Feature::Zeros, Feature::HigherOnEdge, Feature::MoveScore]);
}

// =============================================================================
// Properties
// =============================================================================

fn arb_grid() -> impl Strategy<Value = Grid> {
    let tile = prop_oneof![
        2 => Just(0u32),
        3 => (1u32..=13).prop_map(|exp| 1 << exp),
    ];
    prop::collection::vec(tile, 16).prop_map(|cells| Grid::from_cells(4, 4, &cells).unwrap())
}

proptest! {
    #[test]
    fn prop_features_are_finite(g in arb_grid()) {
        for feature in Feature::ALL {
            let value = single(feature).evaluate(&g, Some(64));
            prop_assert!(value.is_finite(), "{} = {}", feature, value);
            prop_assert!(value >= 0.0, "{} = {}", feature, value);
        }
    }

    #[test]
    fn prop_evaluate_is_linear(g in arb_grid(), a in 0.0f64..10.0, b in 0.0f64..10.0) {
        let both = EvaluationFunction::new(
            EvalConfig::empty()
                .with_weight(Feature::Zeros, a)
                .with_weight(Feature::Smoothness, b),
        );
        let expected = a * features::zeros(&g) + b * features::smoothness(&g);
        prop_assert!((both.evaluate(&g, None) - expected).abs() < 1e-9);
    }
}
