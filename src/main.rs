//! Cell Quest headless runner
//!
//! Plays a built-in level with a scripted autopilot and logs the events the
//! simulation emits. Usage: `cell-quest [level] [seed] [difficulty]`.

use cell_quest::consts::*;
use cell_quest::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use cell_quest::{Difficulty, LevelData, Tuning};

/// Two minutes of simulated play
const MAX_TICKS: u64 = 120 * TICKS_PER_SECOND as u64;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cell Quest (headless) starting...");

    let mut args = std::env::args().skip(1);
    let level_number = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);
    let difficulty = args
        .next()
        .and_then(|s| Difficulty::from_str(&s))
        .unwrap_or_default();

    let level = LevelData::builtin(level_number)
        .or_else(|| {
            log::warn!(
                "No built-in level {level_number} (expected 1..={}), using level 1",
                cell_quest::level::BUILTIN_LEVEL_COUNT
            );
            LevelData::builtin(1)
        })
        .unwrap_or_else(|| LevelData::empty(SCREEN_WIDTH));
    run(level, seed, difficulty);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No headless runner on the web; hosts drive `sim::tick` directly
}

fn run(level: LevelData, seed: u64, difficulty: Difficulty) {
    log::info!(
        "Level {} '{}', seed {seed}, difficulty {}",
        level.id,
        level.name,
        difficulty.as_str()
    );
    let mut state = GameState::new(level, Tuning::from_difficulty(difficulty), seed);

    let mut kills = 0;
    while state.phase == GamePhase::Playing && state.time_ticks < MAX_TICKS {
        let input = autopilot(&state);
        tick(&mut state, &input);
        for event in state.drain_events() {
            match event {
                GameEvent::Sound(_) => {}
                GameEvent::EnemyKilled { .. } => {
                    kills += 1;
                    log::info!("t={} {event:?}", state.time_ticks);
                }
                _ => log::debug!("t={} {event:?}", state.time_ticks),
            }
        }
    }

    println!(
        "{:?} after {:.1}s: score {}, health {:.0}/{:.0}, kills {kills}, enemies left {}, AI difficulty {:.2}, dodges {}",
        state.phase,
        state.time_ticks as f32 * SIM_DT,
        state.score,
        state.player.health,
        state.player.max_health,
        state.active_enemy_count(),
        state.session.difficulty,
        state.session.dodges,
    );
}

/// Run right, hop walls and gaps, swing at anything close and shoot on a beat
fn autopilot(state: &GameState) -> TickInput {
    let player = &state.player;
    let center = player.center();
    let enemy_close = state
        .enemies
        .iter()
        .any(|e| e.is_alive() && e.center().distance(center) <= state.tuning.attack_range);
    let blocked = player.timers.wall_right > 0;
    let jump = player.grounded && (blocked || state.time_ticks % 90 == 0);

    TickInput {
        move_right: true,
        jump_pressed: jump,
        jump_held: jump,
        attack: enemy_close,
        shoot: state.time_ticks % 30 == 0,
        ..Default::default()
    }
}
