//! Statistical checks on chance recipes.
//!
//! The sift recipe yields a gem with weight 1 and sand with weight 3. Over
//! many cycles the split has to match those weights.

use millwork_core::config::EngineConfig;
use millwork_core::fixed::Fixed64;
use millwork_core::rng::SimRng;
use millwork_core::test_utils::*;

/// 99.9th percentile of the chi-square distribution.
const CHI2_CRIT_1_DOF: f64 = 10.828;
const CHI2_CRIT_2_DOF: f64 = 13.816;

fn chi_square(observed: &[u64], weights: &[f64]) -> f64 {
    let total: u64 = observed.iter().sum();
    let weight_sum: f64 = weights.iter().sum();
    observed
        .iter()
        .zip(weights)
        .map(|(&o, &w)| {
            let expected = total as f64 * w / weight_sum;
            (o as f64 - expected).powi(2) / expected
        })
        .sum()
}

#[test]
fn sifter_outcomes_follow_weights() {
    let mut engine = test_engine_with(EngineConfig {
        seed: 0x5EED,
        ..Default::default()
    });
    let sifter = place_built(&mut engine, "sifter");
    let gravel = resource(&engine, "gravel");
    let gem = resource(&engine, "gem");
    let sand = resource(&engine, "sand");

    let mut counts = [0u64; 2];
    let mut cycles = 0u64;
    while cycles < 10_000 {
        engine.set_amount(sifter, gravel, fx(5)).unwrap();
        engine.set_amount(sifter, gem, Fixed64::ZERO).unwrap();
        engine.set_amount(sifter, sand, Fixed64::ZERO).unwrap();
        engine.step();

        let gems = amount(&engine, sifter, "gem");
        let sands = amount(&engine, sifter, "sand");
        // Exactly one outcome per completed cycle.
        assert!(gems + sands <= Fixed64::ONE);
        if gems == Fixed64::ONE {
            counts[0] += 1;
            cycles += 1;
        } else if sands == Fixed64::ONE {
            counts[1] += 1;
            cycles += 1;
        }
    }

    let chi2 = chi_square(&counts, &[1.0, 3.0]);
    assert!(
        chi2 < CHI2_CRIT_1_DOF,
        "gem/sand split {counts:?} gives chi-square {chi2:.2}"
    );
}

#[test]
fn weighted_pick_matches_three_way_split() {
    let mut rng = SimRng::new(7);
    let weights = [fx(2), fx(5), fx(3)];
    let mut counts = [0u64; 3];
    for _ in 0..30_000 {
        let index = rng.pick_weighted(&weights).unwrap();
        counts[index] += 1;
    }
    let chi2 = chi_square(&counts, &[2.0, 5.0, 3.0]);
    assert!(
        chi2 < CHI2_CRIT_2_DOF,
        "split {counts:?} gives chi-square {chi2:.2}"
    );
}

#[test]
fn fractional_weights_are_honored() {
    let mut rng = SimRng::new(99);
    let weights = [Fixed64::from_num(0.25), Fixed64::from_num(0.75)];
    let mut counts = [0u64; 2];
    for _ in 0..20_000 {
        counts[rng.pick_weighted(&weights).unwrap()] += 1;
    }
    let chi2 = chi_square(&counts, &[0.25, 0.75]);
    assert!(chi2 < CHI2_CRIT_1_DOF, "split {counts:?}");
}
