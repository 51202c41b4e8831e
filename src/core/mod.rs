//! Core deterministic primitives.
//!
//! Seeded randomness and state digests. Nothing in here knows about the
//! excavation grid; `game/` builds on top of it.

pub mod rng;
pub mod hash;

// Re-export core types
pub use rng::{DeterministicRng, RandomSource};
pub use hash::{compute_state_hash, StateHash, StateHasher};
