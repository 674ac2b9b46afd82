use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use realtime::Clock;

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self { started: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to. Used for tests.
///
/// Wall-clock time is the starting instant plus the whole seconds elapsed on
/// the monotonic reading.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Default)]
pub struct ManualClock {
    origin_unix: AtomicI64,
    monotonic_bits: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(unix_secs: i64) -> Self {
        Self {
            origin_unix: AtomicI64::new(unix_secs),
            monotonic_bits: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Move both readings forward by `secs`.
    pub fn advance(&self, secs: f64) {
        let monotonic = self.monotonic_secs() + secs;
        self.monotonic_bits.store(monotonic.to_bits(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> DateTime<Utc> {
        #[allow(clippy::cast_possible_truncation)]
        let elapsed = self.monotonic_secs().floor() as i64;
        let unix = self.origin_unix.load(Ordering::SeqCst).saturating_add(elapsed);
        DateTime::from_timestamp(unix, 0).unwrap_or_default()
    }

    fn monotonic_secs(&self) -> f64 {
        f64::from_bits(self.monotonic_bits.load(Ordering::SeqCst))
    }
}
