//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Shape of the fade-in / fade-out ramps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadeEasing {
    Linear,
    /// `0.5 - 0.5 * cos(pi * x)`; zero slope at both ends.
    #[default]
    Sine,
}

/// Configuration for fade defaults, idle scheduling and per-tick limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fade-in applied when neither the asset nor the request specifies one.
    pub default_fade_in_seconds: f64,
    /// Fade-out applied when neither the asset nor the request specifies one.
    pub default_fade_out_seconds: f64,
    pub fade_easing: FadeEasing,
    /// Priority the idle motion runs at.
    pub idle_priority: i32,
    /// Maximum events to retain per tick; extra events are dropped.
    pub max_events_per_tick: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_fade_in_seconds: 1.0,
            default_fade_out_seconds: 1.0,
            fade_easing: FadeEasing::Sine,
            idle_priority: 0,
            max_events_per_tick: 1024,
        }
    }
}

impl Config {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = Config::from_json(r#"{ "default_fade_in_seconds": 0.25, "fade_easing": "Linear" }"#)
            .expect("config json");
        assert_eq!(cfg.default_fade_in_seconds, 0.25);
        assert_eq!(cfg.default_fade_out_seconds, 1.0);
        assert_eq!(cfg.fade_easing, FadeEasing::Linear);
        assert_eq!(cfg.idle_priority, 0);
    }
}
