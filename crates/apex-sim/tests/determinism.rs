//! End-to-end determinism and fallback-accounting tests.
//!
//! Each test: build a driver from a fixed seed, run laps, rebuild an
//! identical driver, rerun, and compare the summaries structurally.

use apex_core::{CircuitConfig, LapId};
use apex_sim::{LapDriver, LapSummary};
use apex_synth::Weather;

const DIM: usize = 32;

fn fresh_driver(seed: u64, anomaly_probability: f64) -> LapDriver {
    LapDriver::builder()
        .circuit(CircuitConfig::aspar())
        .embedding_dim(DIM)
        .seed(seed)
        .frames_per_sector(12)
        .anomaly_probability(anomaly_probability)
        .build()
        .expect("test driver config is valid")
}

fn run_laps(driver: &mut LapDriver, laps: u64, weather: Weather) -> Vec<LapSummary> {
    (1..=laps)
        .map(|lap| {
            driver
                .run_lap(LapId(lap), weather)
                .expect("laps complete without fatal errors")
        })
        .collect()
}

#[test]
fn identical_seeds_reproduce_identical_summaries() {
    let mut first = fresh_driver(42, 0.05);
    let mut second = fresh_driver(42, 0.05);

    let a = run_laps(&mut first, 3, Weather::Sunny);
    let b = run_laps(&mut second, 3, Weather::Sunny);

    assert_eq!(a, b, "same seed must reproduce bit-identical summaries");
}

#[test]
fn different_seeds_diverge() {
    let mut first = fresh_driver(42, 0.0);
    let mut second = fresh_driver(43, 0.0);

    let a = run_laps(&mut first, 1, Weather::Sunny);
    let b = run_laps(&mut second, 1, Weather::Sunny);

    assert_ne!(
        a[0].per_sector_telemetry[0].avg_speed_kmh,
        b[0].per_sector_telemetry[0].avg_speed_kmh,
        "different seeds should perturb telemetry differently"
    );
}

#[test]
fn anomaly_assignment_is_stable_across_reruns() {
    let flagged = |seed: u64| -> Vec<Option<(usize, String)>> {
        let mut driver = fresh_driver(seed, 1.0);
        run_laps(&mut driver, 10, Weather::Sunny)
            .iter()
            .map(|summary| {
                summary
                    .per_sector_telemetry
                    .iter()
                    .enumerate()
                    .find_map(|(index, sector)| {
                        sector.anomaly.map(|a| (index, a.to_string()))
                    })
            })
            .collect()
    };

    let first = flagged(42);
    let second = flagged(42);
    assert_eq!(first, second, "anomalous sectors must replay identically");
    // Probability 1.0: every lap carries exactly one anomalous sector.
    assert!(first.iter().all(|entry| entry.is_some()));
}

#[test]
fn all_fallback_laps_complete_and_are_accounted() {
    let mut driver = LapDriver::builder()
        .circuit(CircuitConfig::aspar())
        .embedding_dim(DIM)
        .seed(42)
        .frames_per_sector(12)
        .hint_dropout(1.0)
        .encoder_focus(0.99)
        .build()
        .expect("test driver config is valid");

    let summary = driver
        .run_lap(LapId(1), Weather::Sunny)
        .expect("an all-fallback lap still completes");

    let metrics = &summary.performance_metrics;
    // Without hints the fast path is unreachable.
    assert_eq!(metrics.fast_path_usage_pct, 0.0);
    assert_eq!(metrics.slow_path_usage_pct, 100.0);
    // Confident frames on the straights still want the fast path and
    // are recovered, so the fallback count is visible and distinct.
    assert!(
        metrics.fallback_count > 0,
        "high-confidence frames must be counted as fallbacks"
    );
    assert_eq!(driver.decision_stats().fallbacks, metrics.fallback_count);
    assert_eq!(driver.static_store_stats().hits, 0);
}

#[test]
fn lap_summaries_serialize_for_external_writers() {
    let mut driver = fresh_driver(42, 0.0);
    let summary = driver.run_lap(LapId(1), Weather::LightRain).unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["lap_id"], 1);
    assert_eq!(json["weather"], "LightRain");
    assert_eq!(
        json["per_sector_telemetry"]
            .as_array()
            .map(|sectors| sectors.len()),
        Some(8)
    );
    assert!(json["performance_metrics"]["total_lap_time_s"].is_number());
}
