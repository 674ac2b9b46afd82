//! # Vehicle Motion
//!
//! Turns discrete feed polls into a stable, smoothly animated vehicle map:
//! merging delays into position reports, reconciling each poll against the
//! vehicles already displayed, keeping a bounded trail per vehicle, and
//! interpolating marker positions between polls.

pub mod animation;
pub mod clock;
pub mod config;
pub mod display;
pub mod frame_loop;
pub mod history;
pub mod merge;
pub mod models;
pub mod poll;
pub mod reconcile;

pub use crate::animation::{AnimationState, MotionAnimator, Transition};
pub use crate::clock::{ManualClock, SystemClock};
pub use crate::config::{AnimationConfig, Config, HistoryConfig};
pub use crate::display::{LiveMap, PollOutcome, PollStatus, SharedMap};
pub use crate::history::{trail, update_history};
pub use crate::merge::merge;
pub use crate::models::*;
pub use crate::reconcile::{ReconcileSummary, reconcile, reconcile_with_summary};
