//! Weather conditions and their fixed telemetry penalties.
//!
//! Penalties are documented constants rather than hidden draws: weather
//! scales the sector's target speed, adds a lap-time penalty over the dry
//! baseline, and cools the tires in the rain.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

/// Track weather for a lap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Weather {
    /// Dry and warm. Baseline conditions.
    Sunny,
    /// Dry but cooler. Marginal grip loss.
    Cloudy,
    /// Damp track. Noticeably slower, tires run cold.
    LightRain,
    /// Standing water. Large speed and temperature penalties.
    HeavyRain,
}

impl Weather {
    /// All conditions with their occurrence probabilities (sums to 1.0).
    pub const DISTRIBUTION: [(Weather, f64); 4] = [
        (Weather::Sunny, 0.50),
        (Weather::Cloudy, 0.30),
        (Weather::LightRain, 0.15),
        (Weather::HeavyRain, 0.05),
    ];

    /// Multiplier applied to the sector's target speed.
    pub fn speed_factor(self) -> f64 {
        match self {
            Self::Sunny => 1.0,
            Self::Cloudy => 0.98,
            Self::LightRain => 0.90,
            Self::HeavyRain => 0.80,
        }
    }

    /// Additive lap-time penalty over the dry baseline, seconds.
    pub fn lap_time_penalty_s(self) -> f64 {
        match self {
            Self::Sunny => 0.0,
            Self::Cloudy => 1.5,
            Self::LightRain => 5.0,
            Self::HeavyRain => 12.0,
        }
    }

    /// Tire temperature offset from rain cooling, degrees Celsius.
    pub fn tire_cooling_c(self) -> f64 {
        match self {
            Self::Sunny | Self::Cloudy => 0.0,
            Self::LightRain => -8.0,
            Self::HeavyRain => -15.0,
        }
    }

    /// Stable tag mixed into per-frame RNG seeds so that different
    /// weather draws independent noise at the same frame index.
    pub fn seed_tag(self) -> u64 {
        match self {
            Self::Sunny => 0x5355_4e4e_5900_0001,
            Self::Cloudy => 0x434c_4f55_4400_0002,
            Self::LightRain => 0x4c52_4149_4e00_0003,
            Self::HeavyRain => 0x4852_4149_4e00_0004,
        }
    }

    /// Draw a weather condition from [`Weather::DISTRIBUTION`].
    pub fn sample(rng: &mut ChaCha8Rng) -> Weather {
        let draw: f64 = rng.random();
        let mut cumulative = 0.0;
        for (weather, probability) in Self::DISTRIBUTION {
            cumulative += probability;
            if draw < cumulative {
                return weather;
            }
        }
        // Floating-point shortfall in the cumulative sum lands here.
        Weather::HeavyRain
    }
}
