//! Per-frame telemetry synthesis.

use apex_core::{
    ConfigError, Embedding, FrameId, SectorProfile, SuspensionTravel, TelemetryRecord, TireTemps,
};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::anomaly::AnomalyType;
use crate::weather::Weather;
use crate::{box_muller, sector_seed};

/// GPS origin of the reference circuit (Valencia).
const GPS_ORIGIN_LAT: f64 = 39.4899;
const GPS_ORIGIN_LON: f64 = -0.3763;

/// Deterministic per-frame telemetry generator.
///
/// Every random draw comes from a ChaCha8 RNG seeded from
/// `base_seed XOR sector XOR frame XOR weather`, so identical inputs
/// produce bit-identical records. The emitted embedding is a placeholder
/// zero vector of the configured dimension; the frame encoder stamps the
/// real embedding downstream.
#[derive(Debug)]
pub struct TelemetrySynthesizer {
    base_seed: u64,
    embedding_dim: usize,
    speed_noise_kmh: f64,
    tire_noise_c: f64,
    telemetry_hz: f64,
}

/// Builder for [`TelemetrySynthesizer`].
pub struct TelemetrySynthesizerBuilder {
    base_seed: u64,
    embedding_dim: usize,
    speed_noise_kmh: f64,
    tire_noise_c: f64,
    telemetry_hz: f64,
}

impl TelemetrySynthesizer {
    /// Create a new builder with study defaults: seed 42, dimension 512,
    /// speed noise 5 km/h, tire noise 5 degrees C, 100 Hz sampling.
    pub fn builder() -> TelemetrySynthesizerBuilder {
        TelemetrySynthesizerBuilder {
            base_seed: 42,
            embedding_dim: 512,
            speed_noise_kmh: 5.0,
            tire_noise_c: 5.0,
            telemetry_hz: 100.0,
        }
    }

    /// The configured embedding dimension.
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// The configured sampling rate, Hz.
    pub fn telemetry_hz(&self) -> f64 {
        self.telemetry_hz
    }

    /// Generate the telemetry record for one frame.
    ///
    /// Channels follow the sector's targets with seeded Gaussian
    /// perturbation and fixed weather penalties; `anomaly`, when present,
    /// shifts the affected channels with that class's documented
    /// signature. Deterministic: identical inputs yield bit-identical
    /// records.
    pub fn generate(
        &self,
        profile: &SectorProfile,
        frame: FrameId,
        weather: Weather,
        anomaly: Option<AnomalyType>,
    ) -> TelemetryRecord {
        let mut rng = ChaCha8Rng::seed_from_u64(
            self.base_seed ^ sector_seed(&profile.id) ^ frame.0 ^ weather.seed_tag(),
        );

        let timestamp_s = frame.0 as f64 / self.telemetry_hz;

        // Weather-scaled target speed with Gaussian perturbation.
        let target_kmh = profile.avg_speed_kmh * weather.speed_factor();
        let mut speed_kmh = (target_kmh + self.speed_noise_kmh * box_muller(&mut rng)).max(0.0);

        // Corners sit in the top fifth of the sector's lean range;
        // straights stay nearly upright.
        let lean_angle_deg = if profile.is_straight() {
            profile.max_lean_deg * rng.random::<f64>()
        } else {
            profile.max_lean_deg * (0.8 + 0.2 * rng.random::<f64>())
        };

        // Longitudinal acceleration: braking sectors decelerate hard.
        let accel_long_g = if profile.is_heavy_braking() {
            -1.5 + 0.3 * box_muller(&mut rng)
        } else {
            0.8 * box_muller(&mut rng)
        };
        // Lateral acceleration follows lean.
        let mut accel_lat_g = (lean_angle_deg / 60.0) * 1.8;

        // Throttle and brake per sector character.
        let (mut throttle, mut brake) = if profile.is_straight() {
            (rng.random_range(0.95..1.0), 0.0)
        } else if profile.is_heavy_braking() {
            (0.0, rng.random_range(0.8..1.0))
        } else {
            (rng.random_range(0.4..0.8), rng.random_range(0.0..0.3))
        };

        // Tire temperatures rise with speed; rain cools them.
        let base_tire_c = 80.0 + (speed_kmh / 260.0) * 40.0 + weather.tire_cooling_c();
        let mut tire_temps_c = TireTemps {
            fl: base_tire_c + self.tire_noise_c * box_muller(&mut rng),
            fr: base_tire_c + self.tire_noise_c * box_muller(&mut rng),
            rl: base_tire_c + self.tire_noise_c * box_muller(&mut rng),
            rr: base_tire_c + self.tire_noise_c * box_muller(&mut rng),
        };

        let mut suspension_mm = SuspensionTravel {
            fl: rng.random_range(20.0..80.0),
            fr: rng.random_range(20.0..80.0),
            rl: rng.random_range(20.0..80.0),
            rr: rng.random_range(20.0..80.0),
        };

        if let Some(anomaly) = anomaly {
            apply_anomaly(
                anomaly,
                timestamp_s,
                frame,
                &mut speed_kmh,
                &mut throttle,
                &mut brake,
                &mut accel_lat_g,
                &mut tire_temps_c,
                &mut suspension_mm,
            );
        }

        // Synthetic GPS drift along the circuit from the sector midpoint.
        let distance_m = profile.distance_start_m + 0.5 * profile.length_m();
        let gps_lat = GPS_ORIGIN_LAT + distance_m / 1_000_000.0;
        let gps_lon = GPS_ORIGIN_LON + distance_m / 1_000_000.0;

        // Plausibility confidence stamped at capture time.
        let confidence = rng.random_range(0.7..1.0);

        TelemetryRecord {
            timestamp_s,
            sector: profile.id.clone(),
            speed_kmh,
            speed_ms: speed_kmh / 3.6,
            lean_angle_deg,
            accel_long_g,
            accel_lat_g,
            throttle_pct: throttle * 100.0,
            brake_pct: brake * 100.0,
            tire_temps_c,
            suspension_mm,
            gps_lat,
            gps_lon,
            embedding: Embedding::zeros(self.embedding_dim)
                .expect("embedding dimension validated at build time"),
            confidence,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_anomaly(
    anomaly: AnomalyType,
    timestamp_s: f64,
    frame: FrameId,
    speed_kmh: &mut f64,
    throttle: &mut f64,
    brake: &mut f64,
    accel_lat_g: &mut f64,
    tire_temps_c: &mut TireTemps,
    suspension_mm: &mut SuspensionTravel,
) {
    match anomaly {
        AnomalyType::SuspensionChatter => {
            let front = (timestamp_s * 2.0 * std::f64::consts::PI * 17.0).sin() * 15.0;
            let rear = (timestamp_s * 2.0 * std::f64::consts::PI * 18.0).sin() * 15.0;
            suspension_mm.fl += front;
            suspension_mm.fr += front;
            suspension_mm.rl += rear;
            suspension_mm.rr += rear;
        }
        AnomalyType::TireBlistering => {
            tire_temps_c.rl += 25.0;
            tire_temps_c.rr += 25.0;
        }
        AnomalyType::BrakeFade => {
            *brake *= 0.6;
        }
        AnomalyType::OilDebris => {
            *speed_kmh = (*speed_kmh - 12.0).max(0.0);
            *accel_lat_g = (*accel_lat_g - 0.3).max(0.0);
        }
        AnomalyType::ElectricalGlitch => {
            if frame.0 % 7 == 0 {
                *throttle = 0.0;
            }
        }
    }
}

impl TelemetrySynthesizerBuilder {
    /// Set the base seed (default: 42).
    pub fn seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Set the placeholder embedding dimension (default: 512). Must be >= 1.
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Set the speed noise standard deviation, km/h (default: 5.0).
    /// Must be finite and >= 0.
    pub fn speed_noise_kmh(mut self, sigma: f64) -> Self {
        self.speed_noise_kmh = sigma;
        self
    }

    /// Set the tire temperature noise standard deviation, degrees C
    /// (default: 5.0). Must be finite and >= 0.
    pub fn tire_noise_c(mut self, sigma: f64) -> Self {
        self.tire_noise_c = sigma;
        self
    }

    /// Set the telemetry sampling rate, Hz (default: 100).
    /// Must be finite and positive.
    pub fn telemetry_hz(mut self, hz: f64) -> Self {
        self.telemetry_hz = hz;
        self
    }

    /// Build the synthesizer, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if the embedding
    /// dimension is zero, a noise standard deviation is negative or not
    /// finite, or the sampling rate is not finite and positive.
    pub fn build(self) -> Result<TelemetrySynthesizer, ConfigError> {
        if self.embedding_dim == 0 {
            return Err(ConfigError::InvalidParameter {
                reason: "synthesizer embedding_dim must be at least 1".to_string(),
            });
        }
        for (name, sigma) in [
            ("speed_noise_kmh", self.speed_noise_kmh),
            ("tire_noise_c", self.tire_noise_c),
        ] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    reason: format!("synthesizer {name} must be finite and >= 0, got {sigma}"),
                });
            }
        }
        if !self.telemetry_hz.is_finite() || self.telemetry_hz <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                reason: format!(
                    "synthesizer telemetry_hz must be finite and positive, got {}",
                    self.telemetry_hz
                ),
            });
        }
        Ok(TelemetrySynthesizer {
            base_seed: self.base_seed,
            embedding_dim: self.embedding_dim,
            speed_noise_kmh: self.speed_noise_kmh,
            tire_noise_c: self.tire_noise_c,
            telemetry_hz: self.telemetry_hz,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apex_test_utils::test_circuit;
    use proptest::prelude::*;

    fn synth() -> TelemetrySynthesizer {
        TelemetrySynthesizer::builder()
            .seed(42)
            .embedding_dim(8)
            .build()
            .unwrap()
    }

    // ---------------------------------------------------------------
    // Builder tests
    // ---------------------------------------------------------------

    #[test]
    fn builder_rejects_zero_dim() {
        assert!(TelemetrySynthesizer::builder()
            .embedding_dim(0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_negative_noise() {
        assert!(TelemetrySynthesizer::builder()
            .speed_noise_kmh(-1.0)
            .build()
            .is_err());
        assert!(TelemetrySynthesizer::builder()
            .tire_noise_c(f64::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_bad_sample_rate() {
        assert!(TelemetrySynthesizer::builder()
            .telemetry_hz(0.0)
            .build()
            .is_err());
        assert!(TelemetrySynthesizer::builder()
            .telemetry_hz(f64::INFINITY)
            .build()
            .is_err());
    }

    // ---------------------------------------------------------------
    // Determinism
    // ---------------------------------------------------------------

    #[test]
    fn identical_inputs_are_bit_identical() {
        let circuit = test_circuit();
        let synth = synth();
        let a = synth.generate(&circuit.sectors[0], FrameId(17), Weather::Sunny, None);
        let b = synth.generate(&circuit.sectors[0], FrameId(17), Weather::Sunny, None);
        assert_eq!(a, b);
    }

    #[test]
    fn different_frames_differ() {
        let circuit = test_circuit();
        let synth = synth();
        let a = synth.generate(&circuit.sectors[0], FrameId(1), Weather::Sunny, None);
        let b = synth.generate(&circuit.sectors[0], FrameId(2), Weather::Sunny, None);
        assert_ne!(a.speed_kmh, b.speed_kmh);
    }

    #[test]
    fn different_seeds_differ() {
        let circuit = test_circuit();
        let a = TelemetrySynthesizer::builder()
            .seed(1)
            .embedding_dim(8)
            .build()
            .unwrap()
            .generate(&circuit.sectors[0], FrameId(1), Weather::Sunny, None);
        let b = TelemetrySynthesizer::builder()
            .seed(2)
            .embedding_dim(8)
            .build()
            .unwrap()
            .generate(&circuit.sectors[0], FrameId(1), Weather::Sunny, None);
        assert_ne!(a.speed_kmh, b.speed_kmh);
    }

    #[test]
    fn different_sectors_draw_independent_noise() {
        let circuit = test_circuit();
        let synth = synth();
        let a = synth.generate(&circuit.sectors[0], FrameId(5), Weather::Sunny, None);
        let b = synth.generate(&circuit.sectors[2], FrameId(5), Weather::Sunny, None);
        assert_ne!(
            a.speed_kmh - circuit.sectors[0].avg_speed_kmh,
            b.speed_kmh - circuit.sectors[2].avg_speed_kmh,
            "same frame in different sectors should not reuse noise"
        );
    }

    // ---------------------------------------------------------------
    // Physical plausibility
    // ---------------------------------------------------------------

    #[test]
    fn straights_are_fast_and_upright() {
        let circuit = test_circuit();
        let synth = synth();
        let record = synth.generate(&circuit.sectors[0], FrameId(0), Weather::Sunny, None);

        assert!(record.speed_kmh > 200.0, "straight speed {}", record.speed_kmh);
        assert!(record.lean_angle_deg <= circuit.sectors[0].max_lean_deg);
        assert!(record.throttle_pct >= 95.0);
        assert_eq!(record.brake_pct, 0.0);
        assert_eq!(record.speed_ms, record.speed_kmh / 3.6);
    }

    #[test]
    fn braking_zones_brake_hard() {
        let circuit = test_circuit();
        let synth = synth();
        let record = synth.generate(&circuit.sectors[1], FrameId(0), Weather::Sunny, None);

        assert_eq!(record.throttle_pct, 0.0);
        assert!(record.brake_pct >= 80.0);
        assert!(record.accel_long_g < 0.0, "braking should decelerate");
        assert!(record.lean_angle_deg >= 0.8 * circuit.sectors[1].max_lean_deg);
    }

    #[test]
    fn rain_slows_and_cools() {
        let circuit = test_circuit();
        let synth = synth();
        // Average over frames so per-frame noise cannot mask the penalty.
        let mean = |weather: Weather| -> (f64, f64) {
            let mut speed = 0.0;
            let mut tire = 0.0;
            for frame in 0..50 {
                let r = synth.generate(&circuit.sectors[0], FrameId(frame), weather, None);
                speed += r.speed_kmh;
                tire += r.tire_temps_c.fl;
            }
            (speed / 50.0, tire / 50.0)
        };
        let (dry_speed, dry_tire) = mean(Weather::Sunny);
        let (wet_speed, wet_tire) = mean(Weather::HeavyRain);

        assert!(wet_speed < dry_speed, "rain must cost speed");
        assert!(wet_tire < dry_tire, "rain must cool tires");
    }

    #[test]
    fn timestamps_follow_the_sample_rate() {
        let circuit = test_circuit();
        let synth = TelemetrySynthesizer::builder()
            .embedding_dim(8)
            .telemetry_hz(50.0)
            .build()
            .unwrap();
        let record = synth.generate(&circuit.sectors[0], FrameId(25), Weather::Sunny, None);
        assert_eq!(record.timestamp_s, 0.5);
    }

    // ---------------------------------------------------------------
    // Anomaly signatures
    // ---------------------------------------------------------------

    #[test]
    fn suspension_chatter_shifts_suspension_only() {
        let circuit = test_circuit();
        let synth = synth();
        let frame = FrameId(3);
        let clean = synth.generate(&circuit.sectors[0], frame, Weather::Sunny, None);
        let chattering = synth.generate(
            &circuit.sectors[0],
            frame,
            Weather::Sunny,
            Some(AnomalyType::SuspensionChatter),
        );

        assert_ne!(clean.suspension_mm, chattering.suspension_mm);
        assert_eq!(clean.speed_kmh, chattering.speed_kmh);
        assert_eq!(clean.tire_temps_c, chattering.tire_temps_c);
    }

    #[test]
    fn tire_blistering_heats_the_rears() {
        let circuit = test_circuit();
        let synth = synth();
        let frame = FrameId(3);
        let clean = synth.generate(&circuit.sectors[0], frame, Weather::Sunny, None);
        let blistered = synth.generate(
            &circuit.sectors[0],
            frame,
            Weather::Sunny,
            Some(AnomalyType::TireBlistering),
        );

        assert_eq!(blistered.tire_temps_c.rl, clean.tire_temps_c.rl + 25.0);
        assert_eq!(blistered.tire_temps_c.rr, clean.tire_temps_c.rr + 25.0);
        assert_eq!(blistered.tire_temps_c.fl, clean.tire_temps_c.fl);
    }

    #[test]
    fn brake_fade_scales_brake_pressure() {
        let circuit = test_circuit();
        let synth = synth();
        let frame = FrameId(3);
        let clean = synth.generate(&circuit.sectors[1], frame, Weather::Sunny, None);
        let faded = synth.generate(
            &circuit.sectors[1],
            frame,
            Weather::Sunny,
            Some(AnomalyType::BrakeFade),
        );

        assert!((faded.brake_pct - clean.brake_pct * 0.6).abs() < 1e-9);
    }

    #[test]
    fn electrical_glitch_cuts_throttle_every_seventh_frame() {
        let circuit = test_circuit();
        let synth = synth();

        let glitched = synth.generate(
            &circuit.sectors[0],
            FrameId(14),
            Weather::Sunny,
            Some(AnomalyType::ElectricalGlitch),
        );
        assert_eq!(glitched.throttle_pct, 0.0);

        let unaffected = synth.generate(
            &circuit.sectors[0],
            FrameId(15),
            Weather::Sunny,
            Some(AnomalyType::ElectricalGlitch),
        );
        assert!(unaffected.throttle_pct > 0.0);
    }

    #[test]
    fn oil_debris_slows_the_frame() {
        let circuit = test_circuit();
        let synth = synth();
        let frame = FrameId(3);
        let clean = synth.generate(&circuit.sectors[2], frame, Weather::Sunny, None);
        let slick = synth.generate(
            &circuit.sectors[2],
            frame,
            Weather::Sunny,
            Some(AnomalyType::OilDebris),
        );

        assert_eq!(slick.speed_kmh, clean.speed_kmh - 12.0);
        assert!(slick.accel_lat_g < clean.accel_lat_g);
    }

    proptest! {
        #[test]
        fn any_inputs_replay_bit_identically(
            seed in 0u64..1_000,
            frame in 0u64..10_000,
            sector_index in 0usize..3,
            weather_index in 0usize..4,
        ) {
            let weather = Weather::DISTRIBUTION[weather_index].0;
            let circuit = test_circuit();
            let synth = TelemetrySynthesizer::builder()
                .seed(seed)
                .embedding_dim(8)
                .build()
                .unwrap();

            let a = synth.generate(
                &circuit.sectors[sector_index],
                FrameId(frame),
                weather,
                None,
            );
            let b = synth.generate(
                &circuit.sectors[sector_index],
                FrameId(frame),
                weather,
                None,
            );
            prop_assert_eq!(a, b);
        }
    }
}
