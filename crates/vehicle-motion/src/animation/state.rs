use realtime::Coordinate;
use serde::Serialize;

/// An in-flight marker transition. Times are monotonic seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationState {
    pub from: Coordinate,
    pub to: Coordinate,
    pub start_time: f64,
    pub end_time: f64,
}

/// Where a transition has the marker at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Moving(Coordinate),
    /// The destination, exactly. The transition is over.
    Arrived(Coordinate),
}

impl AnimationState {
    #[must_use]
    pub fn new(from: Coordinate, to: Coordinate, start_time: f64, duration: f64) -> Self {
        Self { from, to, start_time, end_time: start_time + duration }
    }

    /// Linear progress in `[0, ∞)`; the span is never shorter than `min_span`.
    /// NaN when `now` is not a number.
    #[must_use]
    pub fn progress(&self, now: f64, min_span: f64) -> f64 {
        let elapsed = now - self.start_time;
        if elapsed.is_nan() {
            return f64::NAN;
        }
        let span = (self.end_time - self.start_time).max(min_span);
        elapsed.max(0.0) / span
    }

    #[must_use]
    pub fn sample(&self, now: f64, min_span: f64) -> Sample {
        let t = self.progress(now, min_span);
        if t >= 1.0 || t.is_nan() {
            return Sample::Arrived(self.to);
        }
        Sample::Moving(lerp(self.from, self.to, ease_out_cubic(t)))
    }
}

/// Cubic ease-out: fast departure, gentle arrival.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[must_use]
pub fn lerp(from: Coordinate, to: Coordinate, t: f64) -> Coordinate {
    Coordinate::new(
        (to.latitude - from.latitude).mul_add(t, from.latitude),
        (to.longitude - from.longitude).mul_add(t, from.longitude),
    )
}
