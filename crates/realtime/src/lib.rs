//! # Realtime Core
//!
//! Core modules for the live transit platform: the shared error type, the
//! typed feed records, and the provider traits implemented by external
//! collaborators.

mod error;
mod feed;
mod provider;

pub use crate::error::*;
pub use crate::feed::*;
pub use crate::provider::*;
