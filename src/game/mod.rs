//! Game Logic Module
//!
//! The excavation minigame. Deterministic given a seed and an input stream.
//!
//! ## Module Structure
//!
//! - `grid`: Cell coordinates, occupancy tags, quadrants
//! - `catalog`: Item and stone footprints, rarity tables
//! - `state`: Session state and accessors
//! - `placement`: Terrain seeding, item and stone layout
//! - `dig`: Tool hits, crack counter, reveal scan
//! - `outcome`: Win/loss, awards, result messages
//! - `shake`: Tick-driven hit animation
//! - `render`: Terrain and crack tiles
//! - `input`: Button frames and input recording
//! - `events`: Game events for logging and replay comparison
//! - `host`: Collaborator trait and headless host
//! - `session`: Session startup and ownership
//! - `tick`: Per-frame update and replay

pub mod grid;
pub mod catalog;
pub mod state;
pub mod placement;
pub mod dig;
pub mod outcome;
pub mod shake;
pub mod render;
pub mod input;
pub mod events;
pub mod host;
pub mod session;
pub mod tick;

// Re-export key types
pub use grid::{CellPos, OccupancyTag, Quadrant};
pub use catalog::{ItemId, ItemKind, StoneKind};
pub use state::{SessionState, Tool};
pub use input::{InputFrame, InputRecording, PlayerAction};
pub use outcome::{Outcome, SessionPhase, SessionSummary};
pub use host::{HeadlessHost, Host};
pub use session::{ExcavationSession, SessionError};
pub use tick::{tick, replay_session, TickResult};
pub use events::GameEvent;
