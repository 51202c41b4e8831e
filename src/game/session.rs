//! Session Lifecycle
//!
//! [`ExcavationSession`] owns everything one minigame run needs: the state,
//! the terrain buffer, the visual handles and the caller's completion
//! continuation. The host starts it once, pumps
//! [`tick`](crate::game::tick::tick) at a fixed rate, and gets control back
//! through the continuation after the fade-out.
//!
//! Startup either completes fully or fails before the host sees anything:
//! configuration and buffer allocation are checked first, and on failure
//! the continuation runs immediately.

use std::collections::TryReserveError;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, ExcavationConfig};
use crate::core::hash::StateHash;
use crate::core::rng::{DeterministicRng, RandomSource};
use crate::game::grid::GRID_WIDTH;
use crate::game::host::{Fade, Host, VisualAsset, VisualHandle};
use crate::game::input::InputRecording;
use crate::game::outcome::{summarize, Outcome, SessionPhase, SessionSummary};
use crate::game::placement::generate_layout;
use crate::game::render::TerrainRenderer;
use crate::game::shake::ShakeAnimation;
use crate::game::state::{SessionState, Tool};

/// Runs once when the session hands control back.
pub type Continuation = Box<dyn FnOnce()>;

/// Why a session could not start.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Configuration failed validation
    #[error("invalid session config: {0}")]
    Config(#[from] ConfigError),

    /// Terrain tile buffer could not be allocated
    #[error("terrain tilemap allocation failed: {0}")]
    TilemapAllocation(#[from] TryReserveError),
}

/// Draw priority of buried objects (under the cursor and effects).
const BURIED_PRIORITY: u8 = 2;

/// Row of the hammer button in the column right of the grid.
const HAMMER_BUTTON_ROW: u8 = 1;

/// Row of the pickaxe button.
const PICKAXE_BUTTON_ROW: u8 = 5;

/// Handles of every visual the session owns.
#[derive(Clone, Debug)]
pub struct SessionVisuals {
    /// Selection cursor
    pub cursor: VisualHandle,
    /// Hammer selector
    pub hammer_button: VisualHandle,
    /// Pickaxe selector
    pub pickaxe_button: VisualHandle,
    /// Buried items, in slot order
    pub items: Vec<VisualHandle>,
    /// Buried stones
    pub stones: Vec<VisualHandle>,
}

impl SessionVisuals {
    fn place<H: Host>(host: &mut H, state: &SessionState) -> Self {
        let mut items = Vec::new();
        for slot in state.slots() {
            if let (Some(kind), Some(anchor)) = (slot.kind, slot.anchor) {
                items.push(host.place_visual(VisualAsset::Item(kind), anchor.col, anchor.row, BURIED_PRIORITY));
            }
        }
        let stones = state
            .stones
            .iter()
            .map(|s| host.place_visual(VisualAsset::Stone(s.kind), s.anchor.col, s.anchor.row, BURIED_PRIORITY))
            .collect();

        let hammer_button =
            host.place_visual(VisualAsset::ToolButton(Tool::Hammer), GRID_WIDTH, HAMMER_BUTTON_ROW, 0);
        let pickaxe_button =
            host.place_visual(VisualAsset::ToolButton(Tool::Pickaxe), GRID_WIDTH, PICKAXE_BUTTON_ROW, 0);
        let cursor = host.place_visual(VisualAsset::Cursor, state.cursor.col, state.cursor.row, 0);

        let visuals = Self { cursor, hammer_button, pickaxe_button, items, stones };
        visuals.show_tool(host, state.tool);
        visuals
    }

    /// Press the selected tool's button and release the other.
    pub(crate) fn show_tool<H: Host>(&self, host: &mut H, tool: Tool) {
        let (pressed, released) = match tool {
            Tool::Hammer => (self.hammer_button, self.pickaxe_button),
            Tool::Pickaxe => (self.pickaxe_button, self.hammer_button),
        };
        host.set_visual_frame(pressed, 1);
        host.set_visual_frame(released, 0);
    }

    /// Remove every visual.
    pub(crate) fn destroy_all<H: Host>(&mut self, host: &mut H) {
        for handle in self.items.drain(..).chain(self.stones.drain(..)) {
            host.destroy_visual(handle);
        }
        host.destroy_visual(self.hammer_button);
        host.destroy_visual(self.pickaxe_button);
        host.destroy_visual(self.cursor);
    }
}

/// One running excavation.
///
/// The random source is only consumed by layout at startup and is not kept.
pub struct ExcavationSession {
    pub(crate) state: SessionState,
    pub(crate) config: ExcavationConfig,
    pub(crate) renderer: TerrainRenderer,
    pub(crate) phase: SessionPhase,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) shake: Option<ShakeAnimation>,
    pub(crate) visuals: SessionVisuals,
    pub(crate) recording: InputRecording,
    pub(crate) on_complete: Option<Continuation>,
}

impl ExcavationSession {
    /// Start a session driven by a [`DeterministicRng`] seeded with `seed`.
    pub fn from_seed<H: Host>(
        config: ExcavationConfig,
        seed: u64,
        host: &mut H,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, SessionError> {
        Self::start(config, DeterministicRng::new(seed), seed, host, on_complete)
    }

    /// Start a session.
    ///
    /// Lays out the wall, draws it, places the visuals and begins the
    /// fade-in. `rng_seed` is only recorded for hashing and replay.
    ///
    /// # Errors
    ///
    /// Invalid configuration or a failed tilemap allocation. In both cases
    /// `on_complete` has already run and the host was not touched.
    pub fn start<R: RandomSource, H: Host>(
        config: ExcavationConfig,
        mut rng: R,
        rng_seed: u64,
        host: &mut H,
        on_complete: impl FnOnce() + 'static,
    ) -> Result<Self, SessionError> {
        let prepared = config
            .validate()
            .map_err(SessionError::from)
            .and_then(|()| TerrainRenderer::new().map_err(SessionError::from));
        let mut renderer = match prepared {
            Ok(renderer) => renderer,
            Err(e) => {
                warn!("Excavation session aborted before start: {}", e);
                on_complete();
                return Err(e);
            }
        };

        let mut state = SessionState::new(rng_seed);
        let layout = generate_layout(&mut state, &mut rng, &config);
        debug!(
            "Layout: {} items, {} stones, {} forced",
            layout.items.iter().flatten().count(),
            layout.stones.len(),
            layout.forced
        );

        renderer.draw_site(host, &state);
        let visuals = SessionVisuals::place(host, &state);
        host.begin_fade(Fade::In, config.fade_ticks);

        info!("Excavation session started (seed {}, {} items)", rng_seed, state.items_configured());

        Ok(Self {
            phase: SessionPhase::FadingIn { ticks_remaining: config.fade_ticks },
            state,
            config,
            renderer,
            outcome: None,
            shake: None,
            visuals,
            recording: InputRecording::new(rng_seed),
            on_complete: Some(Box::new(on_complete)),
        })
    }

    /// Session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// How play ended, once it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Configuration in use.
    pub fn config(&self) -> &ExcavationConfig {
        &self.config
    }

    /// Terrain tile buffer.
    pub fn renderer(&self) -> &TerrainRenderer {
        &self.renderer
    }

    /// Visual handles.
    pub fn visuals(&self) -> &SessionVisuals {
        &self.visuals
    }

    /// Inputs seen so far.
    pub fn recording(&self) -> &InputRecording {
        &self.recording
    }

    /// Whether a hit animation is playing.
    pub fn is_shaking(&self) -> bool {
        self.shake.is_some()
    }

    /// Whether the session has torn down.
    pub fn is_closed(&self) -> bool {
        self.phase == SessionPhase::Closed
    }

    /// Result so far.
    pub fn summary(&self) -> SessionSummary {
        summarize(&self.state, self.outcome)
    }

    /// State digest.
    pub fn compute_hash(&self) -> StateHash {
        self.state.compute_hash()
    }
}
