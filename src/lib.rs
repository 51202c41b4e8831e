//! # Excavation
//!
//! Deterministic wall-excavation minigame: a 12×8 rock wall hides up to
//! four items and two stones; the player chips away with a pickaxe or a
//! hammer before the wall collapses.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         EXCAVATION                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Xorshift128+ behind RandomSource          │
//! │  └── hash.rs     - SHA-256 state digests                     │
//! │                                                              │
//! │  game/           - Minigame logic (deterministic)            │
//! │  ├── grid.rs     - Cells, occupancy tags, quadrants          │
//! │  ├── catalog.rs  - Item/stone footprints, rarity tables      │
//! │  ├── state.rs    - Layer map, occupancy map, slots           │
//! │  ├── placement.rs- Terrain seeding, item & stone layout      │
//! │  ├── dig.rs      - Pickaxe/hammer, crack, reveal scan        │
//! │  ├── outcome.rs  - Win/loss, awards, report sequence         │
//! │  ├── shake.rs    - Tick-driven hit animation                 │
//! │  ├── render.rs   - Terrain tilemap                           │
//! │  ├── input.rs    - Button frames, input recording            │
//! │  ├── host.rs     - Host trait, headless host                 │
//! │  ├── session.rs  - Session startup and ownership             │
//! │  └── tick.rs     - Per-frame update, replay                  │
//! │                                                              │
//! │  config.rs       - Tunables (JSON)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! Per tick: input → dig (layer map, crack) → reveal scan (occupancy,
//! awards) → outcome check. Placement runs once at session start.
//!
//! ## Determinism Guarantee
//!
//! - No floating-point arithmetic in game logic
//! - No HashMap (BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from a seeded Xorshift128+
//!
//! Given the same seed and input stream a session produces the same host
//! calls and the same state digest.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod config;

// Re-export commonly used types
pub use core::rng::{DeterministicRng, RandomSource};
pub use config::{ConfigError, ExcavationConfig};
pub use game::host::{HeadlessHost, Host};
pub use game::input::{InputFrame, InputRecording};
pub use game::outcome::{Outcome, SessionPhase, SessionSummary};
pub use game::session::{ExcavationSession, SessionError};
pub use game::tick::{tick, replay_session, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Rate the host is expected to drive `tick` at (Hz)
pub const TICK_RATE: u32 = 60;
