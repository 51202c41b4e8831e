//! Excavation Demo
//!
//! Runs one seeded session on a headless host with a scripted player,
//! then replays the recorded inputs and checks the state digest.
//!
//! Usage: `excavation-demo [seed] [config.json]`

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use excavation::{
    TICK_RATE, VERSION,
    ExcavationConfig, ExcavationSession, HeadlessHost, InputFrame, SessionPhase,
    game::{
        events::GameEventData,
        grid::{CellPos, OccupancyTag},
        tick::{tick, replay_session},
    },
};

/// Hard stop for the demo loop (two minutes of play).
const MAX_DEMO_TICKS: u32 = 120 * TICK_RATE;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(s) => s.parse::<u64>().with_context(|| format!("seed must be a number, got {s:?}"))?,
        None => 12345,
    };
    let config = match args.next() {
        Some(path) => ExcavationConfig::load(&path)?,
        None => ExcavationConfig::default(),
    };

    info!("Excavation v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    demo_session(&config, seed)
}

/// Next input for a player who knows where everything is buried.
///
/// Walks the cursor to the first uncollected item cell and digs it with the
/// pickaxe; confirms every message.
fn scripted_input(session: &ExcavationSession) -> InputFrame {
    match session.phase() {
        SessionPhase::Intro | SessionPhase::Finished(_) | SessionPhase::Reporting { .. } => {
            return InputFrame::confirm();
        }
        SessionPhase::Playing if !session.is_shaking() => {}
        _ => return InputFrame::new(),
    }

    let state = session.state();
    let Some(target) = CellPos::all().find(|&p| matches!(state.occupancy(p), OccupancyTag::Item(_))) else {
        return InputFrame::new();
    };

    let cursor = state.cursor;
    let flag = if cursor.col < target.col {
        InputFrame::FLAG_RIGHT
    } else if cursor.col > target.col {
        InputFrame::FLAG_LEFT
    } else if cursor.row < target.row {
        InputFrame::FLAG_DOWN
    } else if cursor.row > target.row {
        InputFrame::FLAG_UP
    } else {
        InputFrame::FLAG_CONFIRM
    };
    InputFrame::with(flag)
}

/// Run a session to completion and verify it replays.
fn demo_session(config: &ExcavationConfig, seed: u64) -> Result<()> {
    info!("=== Starting Demo Session ===");
    info!("RNG Seed: {}", seed);

    let mut host = HeadlessHost::new();
    let mut session = ExcavationSession::from_seed(config.clone(), seed, &mut host, || {
        info!("Control returned to caller");
    })?;

    for (slot, item) in session.state().slots().iter().enumerate() {
        if let (Some(kind), Some(anchor)) = (item.kind, item.anchor) {
            info!("Slot {}: {:?} at ({}, {})", slot, kind, anchor.col, anchor.row);
        }
    }

    let mut total_events = 0;
    for t in 0..MAX_DEMO_TICKS {
        let input = scripted_input(&session);
        let result = tick(&mut session, input, &mut host);
        total_events += result.events.len();

        for event in &result.events {
            match &event.data {
                GameEventData::ItemFound { slot, item, stored } => {
                    info!("Tick {}: slot {} dug up {} (stored: {})", t, slot, item.name(), stored);
                }
                GameEventData::CrackAdvanced { position } => {
                    info!("Tick {}: crack at {}", t, position);
                }
                GameEventData::SessionEnded { outcome, items_found } => {
                    info!("Tick {}: {:?} with {} items", t, outcome, items_found);
                }
                _ => {}
            }
        }

        if result.session_closed {
            break;
        }
    }

    if !session.is_closed() {
        warn!("Demo stopped after {} ticks without closing", MAX_DEMO_TICKS);
    }

    // Print final results
    info!("=== Session Results ===");
    for text in host.messages() {
        info!("Message: {:?}", text);
    }
    let summary = session.summary();
    info!("Summary: {}", serde_json::to_string(&summary)?);
    info!("Total events: {}", total_events);

    let hash = session.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    let recording = session.recording();
    let bytes = recording.to_bytes()?;
    info!("Recorded {} input changes ({} bytes)", recording.delta_count(), bytes.len());

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let (replay_hash, _) = replay_session(config, recording)?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    Ok(())
}
