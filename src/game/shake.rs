//! Hit Feedback Animation
//!
//! After every tool activation the dig site shakes for eight short steps
//! while an impact flash and the swinging tool blink at the cursor. The
//! animation is a tick-driven state machine: it never blocks, and the
//! session keeps running the reveal scan while it plays. Player input is
//! ignored until it finishes.

use crate::config::ExcavationConfig;
use crate::game::grid::CellPos;
use crate::game::host::{Host, VisualAsset, VisualHandle};
use crate::game::state::Tool;

/// One held step of the shake.
#[derive(Clone, Copy, Debug)]
struct ShakeStep {
    offset: (i8, i8),
    effect_visible: bool,
    tool_visible: Option<bool>,
    tool_frame: Option<u8>,
}

const fn step(offset: (i8, i8), effect_visible: bool) -> ShakeStep {
    ShakeStep { offset, effect_visible, tool_visible: None, tool_frame: None }
}

const SHAKE_STEPS: [ShakeStep; 8] = [
    step((1, 0), true),
    ShakeStep { tool_visible: Some(false), ..step((1, 1), false) },
    ShakeStep { tool_visible: Some(true), ..step((-1, 1), true) },
    step((-1, -1), false),
    ShakeStep { tool_frame: Some(1), ..step((1, -1), true) },
    step((1, 1), false),
    ShakeStep { tool_visible: Some(false), ..step((-1, 1), true) },
    ShakeStep { tool_visible: Some(true), ..step((-1, -1), false) },
];

/// Where the animation is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShakePhase {
    /// Holding shake step `0..8`
    Step(u8),
    /// Layers back at rest, tool still showing
    Settling,
    /// All visuals removed
    Finished,
}

/// A running hit animation.
#[derive(Clone, Debug)]
pub struct ShakeAnimation {
    phase: ShakePhase,
    ticks_left: u16,
    step_ticks: u16,
    settle_ticks: u16,
    effect: Option<VisualHandle>,
    tool: VisualHandle,
    cursor: VisualHandle,
}

impl ShakeAnimation {
    /// Spawn the hit visuals at `at`, hide the cursor, and show step 0.
    pub fn start<H: Host>(
        host: &mut H,
        tool: Tool,
        at: CellPos,
        cursor: VisualHandle,
        config: &ExcavationConfig,
    ) -> Self {
        let effect = host.place_visual(VisualAsset::HitEffect(tool), at.col, at.row, 0);
        let tool_visual = host.place_visual(VisualAsset::HitTool(tool), at.col, at.row, 0);
        host.set_visual_visible(cursor, false);

        let mut animation = Self {
            phase: ShakePhase::Step(0),
            ticks_left: config.shake_step_ticks.max(1),
            step_ticks: config.shake_step_ticks.max(1),
            settle_ticks: config.shake_settle_ticks,
            effect: Some(effect),
            tool: tool_visual,
            cursor,
        };
        animation.apply_step(host, 0);
        animation
    }

    /// Current phase.
    pub fn phase(&self) -> ShakePhase {
        self.phase
    }

    /// Whether the animation has cleaned up.
    pub fn is_finished(&self) -> bool {
        self.phase == ShakePhase::Finished
    }

    /// Total ticks an animation lasts with `config`.
    pub fn duration(config: &ExcavationConfig) -> u32 {
        SHAKE_STEPS.len() as u32 * config.shake_step_ticks.max(1) as u32 + config.shake_settle_ticks as u32
    }

    fn apply_step<H: Host>(&mut self, host: &mut H, index: u8) {
        let s = SHAKE_STEPS[index as usize];
        host.set_layer_offset(s.offset.0, s.offset.1);
        if let Some(effect) = self.effect {
            host.set_visual_visible(effect, s.effect_visible);
        }
        if let Some(visible) = s.tool_visible {
            host.set_visual_visible(self.tool, visible);
        }
        if let Some(frame) = s.tool_frame {
            host.set_visual_frame(self.tool, frame);
        }
    }

    fn settle<H: Host>(&mut self, host: &mut H) {
        host.set_layer_offset(0, 0);
        host.set_visual_visible(self.cursor, true);
        if let Some(effect) = self.effect.take() {
            host.destroy_visual(effect);
        }
        self.phase = ShakePhase::Settling;
        self.ticks_left = self.settle_ticks;
        if self.ticks_left == 0 {
            self.finish(host);
        }
    }

    fn finish<H: Host>(&mut self, host: &mut H) {
        host.destroy_visual(self.tool);
        self.phase = ShakePhase::Finished;
    }

    /// Advance one tick. Returns `true` once the animation has finished.
    pub fn advance<H: Host>(&mut self, host: &mut H) -> bool {
        if self.phase == ShakePhase::Finished {
            return true;
        }

        self.ticks_left = self.ticks_left.saturating_sub(1);
        if self.ticks_left > 0 {
            return false;
        }

        match self.phase {
            ShakePhase::Step(i) if (i as usize) + 1 < SHAKE_STEPS.len() => {
                self.phase = ShakePhase::Step(i + 1);
                self.ticks_left = self.step_ticks;
                self.apply_step(host, i + 1);
            }
            ShakePhase::Step(_) => self.settle(host),
            ShakePhase::Settling => self.finish(host),
            ShakePhase::Finished => {}
        }
        self.is_finished()
    }
}
