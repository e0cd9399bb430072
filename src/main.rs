//! Arena Survival
//!
//! Headless runner: plays a scripted session against the automata and
//! verifies that a replay reaches the same state hash.
//!
//! Usage: `arena-survival [config.json|-] [seed|label] [ticks]`

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use arena_survival::{
    VERSION,
    core::rng::derive_seed,
    game::{
        config::GameConfig,
        events::GameEventData,
        round::{combatants, start_round},
        state::GameState,
        tick::{run_scripted, KeyEvent},
    },
};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_TICKS: u32 = 3000;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("Reading config {path}"))?;
            GameConfig::from_json_str(&json).with_context(|| format!("Parsing config {path}"))?
        }
        _ => GameConfig::default(),
    };
    let seed = match args.next() {
        // Non-numeric seeds are hashed, so "daily-7" works as well as 42.
        Some(raw) => raw.parse().unwrap_or_else(|_| derive_seed(raw.as_bytes())),
        None => DEFAULT_SEED,
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("Invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    info!("Arena Survival v{}", VERSION);
    info!(
        "Arena {}x{}, wrap: {}, snap: {:?}",
        config.arena.width, config.arena.height, config.arena.wrap, config.arena.snap_to_grid
    );

    let hash = demo_session(&config, seed, ticks)?;

    // Verify determinism by replaying
    info!("=== Verifying Determinism ===");
    let replay_hash = replay(&config, seed, ticks)?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("Determinism failure: {} != {}", hex::encode(hash), hex::encode(replay_hash));
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}

/// Player input: sweep the arena in a zig-zag.
fn patrol_script(ticks: u32) -> BTreeMap<u32, Vec<KeyEvent>> {
    const LEGS: [&str; 4] = ["ArrowRight", "ArrowDown", "ArrowLeft", "ArrowDown"];
    let mut script = BTreeMap::new();

    let mut previous: Option<&str> = None;
    let mut t = 1;
    let mut leg = 0;
    while t <= ticks {
        let code = LEGS[leg % LEGS.len()];
        let mut keys = Vec::new();
        if let Some(prev) = previous {
            keys.push(KeyEvent::up(prev));
        }
        keys.push(KeyEvent::down(code));
        script.insert(t, keys);

        previous = Some(code);
        leg += 1;
        t += if leg % 2 == 1 { 40 } else { 10 };
    }

    // Re-press the held key every tick so the player keeps walking.
    let presses: Vec<(u32, String)> = script
        .iter()
        .filter_map(|(&t, keys)| keys.last().map(|k| (t, k.code.clone())))
        .collect();
    for window in presses.windows(2) {
        let (start, code) = &window[0];
        let end = window[1].0;
        for repeat in (start + 1)..end {
            script.insert(repeat, vec![KeyEvent::down(code.clone())]);
        }
    }

    script
}

fn fresh_state(config: &GameConfig, seed: u64) -> Result<GameState> {
    let mut state = GameState::new(config.clone(), seed);
    start_round(&mut state).context("Populating the arena")?;
    Ok(state)
}

fn demo_session(config: &GameConfig, seed: u64, ticks: u32) -> Result<[u8; 32]> {
    info!("=== Starting Demo Session ===");
    let mut state = fresh_state(config, seed)?;
    info!("RNG Seed: {}", seed);
    info!("Entities: {}, combatants: {}", state.registry.len(), combatants(&state).len());

    let events = run_scripted(&mut state, &patrol_script(ticks), ticks);

    let mut last_message = None;
    for event in &events {
        match &event.data {
            GameEventData::RoundWon { winner_id, new_level, round } => {
                let title = state
                    .entity(*winner_id)
                    .map(|e| e.label.clone())
                    .unwrap_or_else(|| winner_id.to_string());
                info!("Tick {}: round {} won by {} (now level {})", event.tick, round, title, new_level);
            }
            GameEventData::Scoreboard(update) => last_message = Some(update.message.clone()),
            _ => {}
        }
    }

    if state.human.is_none() {
        warn!("Player was eliminated");
    }

    // Print final results
    info!("=== Session Results ===");
    info!("Ticks: {}, rounds: {}, events: {}", state.tick, state.round, events.len());
    if let Some(message) = last_message {
        info!("Last announcement: {}", message);
    }
    for line in state.combatant_stats() {
        info!("{}: health {}, speed +{}", line.title, line.health, line.bonus_speed);
    }

    let hash = state.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));
    Ok(hash)
}

fn replay(config: &GameConfig, seed: u64, ticks: u32) -> Result<[u8; 32]> {
    let mut state = fresh_state(config, seed)?;
    run_scripted(&mut state, &patrol_script(ticks), ticks);
    Ok(state.compute_hash())
}
