//! # Live Transit
//!
//! Service wiring for the live vehicle map: a recorded feed source, an
//! in-memory map layer and the HTTP snapshot routes.

pub mod replay;
pub mod server;
pub mod surface;

pub use crate::replay::{ReplayFeed, Snapshot};
pub use crate::surface::MarkerLayer;
