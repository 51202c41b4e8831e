//! Session Tick
//!
//! The per-frame update the host drives at a fixed rate. Every tick runs,
//! in order:
//!
//! 1. the current phase's step (fade countdown, message confirm, or play:
//!    either the running shake animation or one player action),
//! 2. the reveal scan and item awards,
//! 3. the terminal-condition check, while playing with no shake running.
//!
//! The reveal scan runs every tick regardless of phase or animation, so a
//! dig is collected on the same tick it clears a cell.

use tracing::{debug, info};

use crate::config::ExcavationConfig;
use crate::core::hash::StateHash;
use crate::game::dig::{advance_crack, apply_tool, reveal_scan};
use crate::game::events::{GameEvent, GameEventData, EventPriority};
use crate::game::host::{Fade, HeadlessHost, Host, SoundCue};
use crate::game::input::{InputFrame, InputRecording, PlayerAction};
use crate::game::outcome::{
    award_item, check_outcome, intro_message, next_report, outcome_message, Outcome, SessionPhase,
};
use crate::game::session::{ExcavationSession, SessionError};
use crate::game::shake::ShakeAnimation;
use crate::game::state::Tool;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick, in priority order
    pub events: Vec<GameEvent>,
    /// Set on the tick play ended
    pub outcome: Option<Outcome>,
    /// The session has torn down and run its continuation
    pub session_closed: bool,
}

/// Run one tick.
pub fn tick<H: Host>(
    session: &mut ExcavationSession,
    input: InputFrame,
    host: &mut H,
) -> TickResult {
    let mut result = TickResult::default();
    if session.phase == SessionPhase::Closed {
        result.session_closed = true;
        return result;
    }

    session.recording.record(session.state.tick, input);

    // 1. Phase step
    match session.phase {
        SessionPhase::FadingIn { ticks_remaining } => {
            if ticks_remaining <= 1 {
                host.show_message(&intro_message(session.state.items_configured()));
                set_phase(session, SessionPhase::Intro, &mut result);
            } else {
                session.phase = SessionPhase::FadingIn { ticks_remaining: ticks_remaining - 1 };
            }
        }
        SessionPhase::Intro => {
            if input.confirm_pressed() {
                host.clear_message();
                set_phase(session, SessionPhase::Playing, &mut result);
            }
        }
        SessionPhase::Playing => play_step(session, input, host, &mut result),
        SessionPhase::Finished(_) => {
            if input.confirm_pressed() {
                host.clear_message();
                report_from(session, host, 0, &mut result);
            }
        }
        SessionPhase::Reporting { slot } => {
            if input.confirm_pressed() {
                host.clear_message();
                report_from(session, host, slot as usize + 1, &mut result);
            }
        }
        SessionPhase::Exiting { ticks_remaining } => {
            if ticks_remaining <= 1 {
                close(session, host, &mut result);
            } else {
                session.phase = SessionPhase::Exiting { ticks_remaining: ticks_remaining - 1 };
            }
        }
        SessionPhase::Closed => {}
    }

    // 2. Reveal scan
    if session.phase != SessionPhase::Closed {
        reveal(session, host, &mut result);
    }

    // 3. Terminal conditions
    if session.phase == SessionPhase::Playing && session.shake.is_none() {
        if let Some(outcome) = check_outcome(&session.state, session.config.crack_limit) {
            finish(session, host, outcome, &mut result);
        }
    }

    session.state.tick += 1;
    result.events.sort_by(GameEvent::processing_order);
    result
}

fn set_phase(session: &mut ExcavationSession, phase: SessionPhase, result: &mut TickResult) {
    let old = session.phase;
    session.phase = phase;
    debug!("Phase {} -> {}", old.name(), phase.name());
    result.events.push(GameEvent::phase_changed(session.state.tick, old.name(), phase.name()));
}

// =============================================================================
// PLAY
// =============================================================================

fn play_step<H: Host>(
    session: &mut ExcavationSession,
    input: InputFrame,
    host: &mut H,
    result: &mut TickResult,
) {
    if let Some(shake) = session.shake.as_mut() {
        if shake.advance(host) {
            session.shake = None;
        }
        return;
    }

    let Some(action) = input.action() else {
        return;
    };
    let now = session.state.tick;

    match action {
        PlayerAction::Dig => dig(session, host, result),
        PlayerAction::Move { dx, dy } => {
            // Off-grid moves are dropped, which clamps the cursor.
            if let Some(pos) = session.state.cursor.offset(dx, dy) {
                session.state.cursor = pos;
                host.move_visual(session.visuals.cursor, pos.col, pos.row);
                result.events.push(GameEvent::new(
                    now,
                    EventPriority::Other,
                    GameEventData::CursorMoved { col: pos.col, row: pos.row },
                ));
            }
        }
        PlayerAction::SelectTool(tool) => {
            if session.state.tool != tool {
                session.state.tool = tool;
                session.visuals.show_tool(host, tool);
                host.play_cue(SoundCue::Select);
                result.events.push(GameEvent::new(now, EventPriority::Other, GameEventData::ToolSelected { tool }));
            }
        }
        PlayerAction::Cancel => {
            info!("Excavation cancelled at tick {}", now);
            session.outcome = Some(Outcome::Cancelled);
            result.outcome = Some(Outcome::Cancelled);
            result.events.push(GameEvent::session_ended(
                now,
                Outcome::Cancelled,
                session.state.items_found() as u8,
            ));
            host.set_visual_visible(session.visuals.cursor, false);
            begin_exit(session, host, result);
        }
    }
}

fn dig<H: Host>(session: &mut ExcavationSession, host: &mut H, result: &mut TickResult) {
    let now = session.state.tick;
    let tool = session.state.tool;
    let at = session.state.cursor;

    let hit = apply_tool(&mut session.state);
    for &pos in &hit.touched {
        session.renderer.draw_cell(host, &session.state, pos);
    }

    let step = advance_crack(&mut session.state.crack, tool);
    session.renderer.draw_crack(host, step);

    host.play_cue(match tool {
        Tool::Hammer => SoundCue::HammerHit,
        Tool::Pickaxe => SoundCue::PickaxeHit,
    });
    session.shake = Some(ShakeAnimation::start(host, tool, at, session.visuals.cursor, &session.config));

    debug!(
        "{:?} at ({}, {}): {} cells{}",
        tool,
        at.col,
        at.row,
        hit.touched.len(),
        if hit.blocked { " (blocked)" } else { "" }
    );
    result.events.push(GameEvent::tool_used(now, tool, at.col, at.row, hit.touched.len() as u8, hit.blocked));

    if step.advanced {
        info!("Crack advanced to {}", session.state.crack.position);
        result.events.push(GameEvent::crack_advanced(now, session.state.crack.position));
    }
}

// =============================================================================
// REVEAL
// =============================================================================

fn reveal<H: Host>(session: &mut ExcavationSession, host: &mut H, result: &mut TickResult) {
    let report = reveal_scan(&mut session.state);
    if report.is_empty() {
        return;
    }
    let now = session.state.tick;

    for (slot, &count) in report.collected.iter().enumerate() {
        if count > 0 {
            result.events.push(GameEvent::new(
                now,
                EventPriority::Reveal,
                GameEventData::CellsRevealed { slot: slot as u8, count },
            ));
        }
    }

    for &slot in &report.completed {
        let stored = award_item(&mut session.state, host, slot);
        result.events.push(GameEvent::item_found(now, slot as u8, session.state.buried_item_id(slot), stored));
    }
}

// =============================================================================
// END OF PLAY
// =============================================================================

fn finish<H: Host>(
    session: &mut ExcavationSession,
    host: &mut H,
    outcome: Outcome,
    result: &mut TickResult,
) {
    let now = session.state.tick;
    let found = session.state.items_found() as u8;
    info!("Excavation over: {:?} ({} found, crack {})", outcome, found, session.state.crack_position());

    session.outcome = Some(outcome);
    result.outcome = Some(outcome);
    result.events.push(GameEvent::session_ended(now, outcome, found));

    host.set_visual_visible(session.visuals.cursor, false);
    match outcome_message(outcome) {
        Some(text) => {
            host.show_message(text);
            set_phase(session, SessionPhase::Finished(outcome), result);
        }
        None => begin_exit(session, host, result),
    }
}

/// Show the next slot report at or after `from`, or start the exit.
fn report_from<H: Host>(
    session: &mut ExcavationSession,
    host: &mut H,
    from: usize,
    result: &mut TickResult,
) {
    match next_report(&session.state, from) {
        Some((slot, text)) => {
            debug!("Reporting slot {}", slot);
            host.show_message(&text);
            set_phase(session, SessionPhase::Reporting { slot: slot as u8 }, result);
        }
        None => begin_exit(session, host, result),
    }
}

fn begin_exit<H: Host>(session: &mut ExcavationSession, host: &mut H, result: &mut TickResult) {
    let ticks = session.config.fade_ticks;
    host.play_cue(SoundCue::Exit);
    host.begin_fade(Fade::Out, ticks);
    set_phase(session, SessionPhase::Exiting { ticks_remaining: ticks }, result);
}

fn close<H: Host>(session: &mut ExcavationSession, host: &mut H, result: &mut TickResult) {
    session.visuals.destroy_all(host);
    set_phase(session, SessionPhase::Closed, result);
    result.session_closed = true;

    info!("Excavation session closed at tick {}", session.state.tick);
    if let Some(on_complete) = session.on_complete.take() {
        on_complete();
    }
}

// =============================================================================
// REPLAY
// =============================================================================

/// Replay a recorded session on a fresh headless host.
///
/// Returns the final state digest and every event.
pub fn replay_session(
    config: &ExcavationConfig,
    recording: &InputRecording,
) -> Result<(StateHash, Vec<GameEvent>), SessionError> {
    let mut host = HeadlessHost::new();
    let mut session = ExcavationSession::from_seed(config.clone(), recording.rng_seed, &mut host, || {})?;
    let mut all_events = Vec::new();

    for (_, frame) in recording.replay_iter() {
        let result = tick(&mut session, frame, &mut host);
        all_events.extend(result.events);
        if result.session_closed {
            break;
        }
    }

    Ok((session.compute_hash(), all_events))
}
