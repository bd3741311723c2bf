//! Domain layer - pure types with no external adapters.
//!
//! This layer contains the core concepts of time-windowed deduplication:
//! - Expiration windows and their boundary rule
//! - Key extraction from stream elements
//! - Admit/reject decisions
//!
//! All types in this layer are pure and easily testable.

pub mod decision;
pub mod key;
pub mod window;
