//! # Animation
//!
//! Smooth marker motion between discrete feed polls.
//!
//! Polls arrive every 5 to 15 seconds, sometimes late and sometimes not at
//! all. Instead of jumping, a marker eases from wherever it is on screen
//! towards each newly reported position over a period somewhat longer than
//! the gap between reports, so it is usually still moving when the next poll
//! lands and never sits idle waiting for it.

mod animator;
mod state;

pub use self::animator::{MotionAnimator, Transition};
pub use self::state::{AnimationState, Sample, ease_out_cubic, lerp};
