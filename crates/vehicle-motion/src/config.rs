use std::env;
use std::time::Duration;

/// Engine configuration derived from the host environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    /// How long a vehicle missing from the feed stays on the map.
    pub max_vehicle_age: Duration,
    pub history: HistoryConfig,
    pub animation: AnimationConfig,
}

impl Config {
    /// Read configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable. Intervals are at least one
    /// unit long.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_secs = env_u64("POLL_INTERVAL_SECS", defaults.poll_interval.as_secs()).max(1);
        let frame_millis = env_u64(
            "FRAME_INTERVAL_MS",
            u64::try_from(defaults.frame_interval.as_millis()).unwrap_or(16),
        )
        .max(1);
        let poll_interval = Duration::from_secs(poll_secs);
        let frame_interval = Duration::from_millis(frame_millis);
        let max_vehicle_age = Duration::from_secs(env_u64(
            "MAX_VEHICLE_AGE_SECS",
            defaults.max_vehicle_age.as_secs(),
        ));

        let history = HistoryConfig {
            max_points: usize::try_from(env_u64(
                "MAX_HISTORY_POINTS",
                defaults.history.max_points as u64,
            ))
            .unwrap_or(defaults.history.max_points),
            max_age: Duration::from_secs(env_u64(
                "MAX_HISTORY_AGE_SECS",
                defaults.history.max_age.as_secs(),
            )),
        };

        let animation = AnimationConfig {
            enabled: env_bool("ANIMATION_ENABLED", defaults.animation.enabled),
            max_duration: env_f64("ANIMATION_MAX_DURATION_SECS", defaults.animation.max_duration),
            ..defaults.animation
        };

        Self { poll_interval, frame_interval, max_vehicle_age, history, animation }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            frame_interval: Duration::from_millis(16),
            max_vehicle_age: Duration::from_secs(5 * 60),
            history: HistoryConfig::default(),
            animation: AnimationConfig::default(),
        }
    }
}

/// Bounds applied to each vehicle's trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub max_points: usize,
    pub max_age: Duration,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_points: 100, max_age: Duration::from_secs(60 * 60) }
    }
}

/// Tuning for marker transitions. All values are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub enabled: bool,
    /// Bounds on the time between two reports used to size a transition.
    pub min_delta: f64,
    pub max_delta: f64,
    /// Delta assumed when report timestamps are missing or not increasing.
    pub default_delta: f64,
    /// A transition lasts at least `delta + lead`.
    pub lead: f64,
    /// A transition lasts at least `delta * stretch`.
    pub stretch: f64,
    pub max_duration: f64,
    /// Smallest span used when computing progress.
    pub min_span: f64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_delta: 0.5,
            max_delta: 15.0,
            default_delta: 1.0,
            lead: 2.0,
            stretch: 2.2,
            max_duration: 30.0,
            min_span: 0.5,
        }
    }
}

impl AnimationConfig {
    /// Seconds between two consecutive reports for a vehicle, clamped.
    ///
    /// Missing, non-increasing and non-finite deltas fall back to
    /// `default_delta` before clamping.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn delta_secs(&self, previous: Option<i64>, current: i64) -> f64 {
        let raw = previous.map_or(f64::NAN, |prev| current.saturating_sub(prev) as f64);
        let delta = if raw.is_finite() && raw > 0.0 { raw } else { self.default_delta };
        delta.clamp(self.min_delta, self.max_delta)
    }

    /// Transition length for a given report delta.
    ///
    /// At least `lead` seconds longer than the delta, stretched by `stretch`
    /// and capped at `max_duration`.
    #[must_use]
    pub fn duration_secs(&self, delta: f64) -> f64 {
        let floor = delta + self.lead;
        let ceiling = self.max_duration.max(floor);
        (delta * self.stretch).max(floor).clamp(floor, ceiling)
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    let Ok(value) = env::var(key) else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key).ok().and_then(|value| value.parse::<f64>().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok()).unwrap_or(default)
}

/// Whole seconds in a duration as a signed timestamp offset.
pub(crate) fn secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_is_clamped() {
        let config = AnimationConfig::default();

        assert!((config.delta_secs(Some(100), 110) - 10.0).abs() < f64::EPSILON);
        assert!((config.delta_secs(Some(100), 160) - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bad_delta_falls_back() {
        let config = AnimationConfig::default();

        assert!((config.delta_secs(None, 110) - 1.0).abs() < f64::EPSILON);
        assert!((config.delta_secs(Some(110), 110) - 1.0).abs() < f64::EPSILON);
        assert!((config.delta_secs(Some(120), 110) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn duration_outlasts_delta() {
        let config = AnimationConfig::default();

        // short gaps get the fixed lead
        assert!((config.duration_secs(1.0) - 3.0).abs() < f64::EPSILON);
        // longer gaps get stretched
        assert!((config.duration_secs(10.0) - 22.0).abs() < 1e-9);
        // and are capped
        assert!((config.duration_secs(15.0) - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn defaults() {
        let config = Config::default();

        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.max_vehicle_age, Duration::from_secs(300));
        assert_eq!(config.history.max_points, 100);
        assert_eq!(config.history.max_age, Duration::from_secs(3600));
        assert!(config.animation.enabled);
    }

    #[test]
    fn reads_environment() {
        // SAFETY:
        // No other test in this crate reads these variables.
        unsafe {
            env::set_var("POLL_INTERVAL_SECS", "0");
            env::set_var("MAX_HISTORY_POINTS", "42");
            env::set_var("ANIMATION_ENABLED", "no");
        };

        let config = Config::from_env();

        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.history.max_points, 42);
        assert!(!config.animation.enabled);
        assert_eq!(config.max_vehicle_age, Duration::from_secs(300));
    }

    #[test]
    fn unknown_bool_keeps_default() {
        // SAFETY:
        // No other test in this crate reads these variables.
        unsafe {
            env::set_var("MOTION_TEST_FLAG_TYPO", "ture");
            env::set_var("MOTION_TEST_FLAG_OFF", "Off");
            env::set_var("MOTION_TEST_FLAG_ON", "on");
        };

        assert!(env_bool("MOTION_TEST_FLAG_TYPO", true));
        assert!(!env_bool("MOTION_TEST_FLAG_TYPO", false));
        assert!(!env_bool("MOTION_TEST_FLAG_OFF", true));
        assert!(env_bool("MOTION_TEST_FLAG_ON", false));
        assert!(env_bool("MOTION_TEST_FLAG_UNSET", true));
    }
}
