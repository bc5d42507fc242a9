//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Within a tick the
//! player moves first, melee resolves before any projectile, and the AI reads
//! the player's already-updated pose.

use super::ai::{self, AiContext, AiOutput};
use super::combat;
use super::physics::{self, MoveIntent};
use super::state::{ActorState, DeathCause, GameEvent, GamePhase, GameState, SoundEffect};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Jump button state; only the press edge drives the simulation
    pub jump_held: bool,
    /// Jump pressed this tick (arms the jump buffer)
    pub jump_pressed: bool,
    /// Melee attack pressed
    pub attack: bool,
    /// Ranged attack pressed
    pub shoot: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.clear_events();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at tick {}", state.time_ticks);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    // Don't tick if paused or the level is over
    if state.phase != GamePhase::Playing {
        return;
    }
    state.time_ticks += 1;

    // Player physics
    let intent = MoveIntent {
        left: input.move_left,
        right: input.move_right,
        jump_pressed: input.jump_pressed,
    };
    let report = physics::step_player(&mut state.player, intent, &state.level, &state.tuning);
    if report.jumped {
        state.push_event(GameEvent::Sound(SoundEffect::Jump));
    }
    if report.hazard_damage > 0.0 {
        combat::on_hazard_damage(state, report.hazard_damage);
    }
    if report.fell_out {
        game_over(state, DeathCause::Fell);
        return;
    }

    // Player attacks
    if input.attack {
        combat::player_melee(state);
    }
    if input.shoot {
        combat::player_shoot(state);
    }

    // Enemy AI
    ai::update_session(&mut state.session, &state.enemies, &state.tuning);
    let roster = ai::snapshot_roster(&state.enemies);
    let mut ai_events = Vec::new();
    {
        let ctx = AiContext {
            player: &state.player,
            level: &state.level,
            tuning: &state.tuning,
            session: &state.session,
            roster: &roster,
        };
        let mut out = AiOutput {
            projectiles: &mut state.projectiles,
            events: &mut ai_events,
        };
        for (i, enemy) in state.enemies.iter_mut().enumerate() {
            ai::step_enemy(enemy, i, &ctx, &mut out);
        }
    }
    for event in ai_events {
        state.push_event(event);
    }

    combat::enemy_contact(state);

    // Projectiles
    let advance = state
        .projectiles
        .advance(&state.level, &mut state.particles);
    state.session.dodges += advance.enemy_shots_expired;
    let hits = state.projectiles.resolve_collisions(
        &mut state.player,
        &mut state.enemies,
        state.tuning.invincibility_frames,
    );
    combat::settle_projectile_hits(state, &hits);

    state.particles.advance();

    collect_pickups(state);

    if !state.player.is_alive() {
        game_over(state, DeathCause::Damage);
        return;
    }

    let reached_portal = state
        .level
        .portal
        .is_some_and(|portal| portal.overlaps(&state.player.bounds()));
    if reached_portal {
        complete_level(state);
        return;
    }

    state.player.timers.tick();
    state.player.combo.tick();
    update_player_state(state);
}

fn collect_pickups(state: &mut GameState) {
    let bounds = state.player.bounds();
    let mut collected = 0;
    for pickup in state.pickups.iter_mut().filter(|p| p.active) {
        if pickup.rect.overlaps(&bounds) {
            pickup.active = false;
            state.player.heal(state.tuning.glucose_heal);
            collected += 1;
        }
    }
    for _ in 0..collected {
        state.push_event(GameEvent::PickupCollected);
        state.push_event(GameEvent::Sound(SoundEffect::Collect));
    }
}

fn complete_level(state: &mut GameState) {
    state.score += state.tuning.score_level_complete;
    state.phase = GamePhase::LevelComplete;
    state.push_event(GameEvent::LevelComplete { score: state.score });
    log::info!(
        "Level {} complete at tick {} with score {}",
        state.level.id,
        state.time_ticks,
        state.score
    );
}

fn game_over(state: &mut GameState, cause: DeathCause) {
    if state.player.is_alive() {
        state.player.kill();
    }
    state.phase = GamePhase::GameOver;
    state.session.deaths += 1;
    state.push_event(GameEvent::PlayerDied { cause });
    state.push_event(GameEvent::Sound(SoundEffect::Death));
    log::info!(
        "Game over ({cause:?}) at tick {}, deaths this session: {}",
        state.time_ticks,
        state.session.deaths
    );
}

fn update_player_state(state: &mut GameState) {
    let player = &mut state.player;
    let keep = match player.state {
        ActorState::Attacking => player.timers.attack_cooldown > 0,
        ActorState::Damaged => player.timers.invincibility > 0,
        ActorState::Dead => true,
        _ => false,
    };
    if keep {
        return;
    }
    player.state = if !player.grounded {
        ActorState::Jumping
    } else if player.vel.x != 0.0 {
        ActorState::Moving
    } else {
        ActorState::Idle
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{EnemySpawn, LevelData, Platform};
    use crate::sim::geom::Aabb;
    use crate::sim::state::{Behavior, CellKind};
    use crate::tuning::Tuning;
    use glam::Vec2;

    const FLOOR_Y: f32 = 500.0;

    /// Flat floor, player standing at x=100
    fn floor_level() -> LevelData {
        let mut level = LevelData::empty(2000.0);
        level.platforms.push(Platform::solid(0.0, FLOOR_Y, 2000.0, 20.0));
        level.player_spawn = Vec2::new(100.0, FLOOR_Y - 30.0);
        level
    }

    fn no_crit() -> Tuning {
        Tuning {
            critical_chance: 0.0,
            ..Tuning::default()
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut state = GameState::new(floor_level(), Tuning::default(), 1);
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused ticks change nothing
        let before = state.player.pos;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.player.pos, before);

        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_falling_out_is_game_over() {
        let mut state = GameState::new(LevelData::empty(1000.0), Tuning::default(), 1);
        state.player.pos.y = state.level.height - 5.0;
        state.player.vel.y = 10.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.player.health, 0.0);
        assert_eq!(state.session.deaths, 1);
        assert!(state.events().contains(&GameEvent::PlayerDied {
            cause: DeathCause::Fell
        }));

        // Nothing advances after game over
        tick(&mut state, &TickInput::default());
        assert_eq!(state.time_ticks, 1);
    }

    #[test]
    fn test_lethal_contact_is_game_over() {
        let mut level = floor_level();
        level
            .enemies
            .push(EnemySpawn::new(110.0, FLOOR_Y - 40.0, CellKind::Macrophage, Behavior::None, 50.0));
        let mut state = GameState::new(level, Tuning::default(), 1);
        state.player.health = 5.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.events().contains(&GameEvent::PlayerDied {
            cause: DeathCause::Damage
        }));
    }

    #[test]
    fn test_jump_emits_sound() {
        let mut state = GameState::new(floor_level(), Tuning::default(), 1);
        tick(&mut state, &TickInput::default());
        assert!(state.player.grounded);
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        tick(&mut state, &jump);
        assert!(state.player.vel.y < 0.0);
        assert_eq!(state.player.state, ActorState::Jumping);
        assert!(state.events().contains(&GameEvent::Sound(SoundEffect::Jump)));
    }

    #[test]
    fn test_combo_resets_one_tick_after_window() {
        let mut level = floor_level();
        level
            .enemies
            .push(EnemySpawn::new(130.0, FLOOR_Y - 35.0, CellKind::TCell, Behavior::None, 1000.0));
        let tuning = no_crit();
        let window = tuning.combo_window;
        let mut state = GameState::new(level, tuning, 3);

        let attack = TickInput {
            attack: true,
            ..Default::default()
        };
        tick(&mut state, &attack);
        assert_eq!(state.enemies[0].health, 990.0);
        assert_eq!(state.player.combo.count, 1);

        for _ in 0..window - 1 {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.player.combo.count, 1);
        }
        assert_eq!(state.player.combo.timer, 0);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.combo.count, 0);
    }

    #[test]
    fn test_pickup_heals_once() {
        let mut level = floor_level();
        level.glucose.push(Vec2::new(105.0, FLOOR_Y - 25.0));
        let mut state = GameState::new(level, Tuning::default(), 1);
        state.player.health = 50.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.health, 75.0);
        assert!(!state.pickups[0].active);
        assert!(state.events().contains(&GameEvent::PickupCollected));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.player.health, 75.0);
    }

    #[test]
    fn test_portal_completes_level() {
        let mut level = floor_level();
        level.portal = Some(Aabb::new(110.0, FLOOR_Y - 80.0, 50.0, 80.0));
        let mut state = GameState::new(level, Tuning::default(), 1);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.score, 1000);
        assert!(state.events().contains(&GameEvent::LevelComplete { score: 1000 }));
    }

    #[test]
    fn test_expired_enemy_shot_counts_as_dodge() {
        let mut state = GameState::new(floor_level(), Tuning::default(), 1);
        state.tuning.projectile_lifetime = 1;
        state
            .projectiles
            .spawn(Vec2::new(900.0, 100.0), Vec2::ZERO, CellKind::BCell, 10.0, &state.tuning);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.session.dodges, 1);
        assert_eq!(state.projectiles.active_count(), 0);
    }

    #[test]
    fn test_player_shot_kills_enemy() {
        let mut level = floor_level();
        level
            .enemies
            .push(EnemySpawn::new(300.0, FLOOR_Y - 40.0, CellKind::BCell, Behavior::None, 20.0));
        let mut state = GameState::new(level, Tuning::default(), 1);
        let shoot = TickInput {
            shoot: true,
            ..Default::default()
        };
        tick(&mut state, &shoot);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
            if state.active_enemy_count() == 0 {
                break;
            }
        }
        assert_eq!(state.active_enemy_count(), 0);
        assert_eq!(state.score, 15 + 150);
        assert!(state.events().contains(&GameEvent::EnemyKilled {
            kind: CellKind::BCell,
            boss: false
        }));
    }

    #[test]
    fn test_reset_after_game_over() {
        let mut state = GameState::new(LevelData::builtin(1).unwrap(), Tuning::default(), 5);
        state.player.pos.y = 800.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        state.reset_level();
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.player.is_alive());
        assert_eq!(state.session.deaths, 1);
    }

    #[test]
    fn test_events_only_hold_the_latest_tick() {
        let mut state = GameState::new(LevelData::builtin(1).unwrap(), Tuning::default(), 8);
        let inputs = [
            TickInput {
                move_right: true,
                jump_pressed: true,
                shoot: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                attack: true,
                ..Default::default()
            },
        ];
        let mut seen = 0;
        for i in 0..600 {
            tick(&mut state, &inputs[i % inputs.len()]);
            seen += state.events().len();
            assert!(state.events().len() <= 32);
        }
        assert!(seen > 0);

        // A jump sound from one tick is gone after the next quiet tick
        let mut state = GameState::new(floor_level(), Tuning::default(), 1);
        tick(&mut state, &TickInput::default());
        tick(&mut state, &inputs[0]);
        assert!(state.events().contains(&GameEvent::Sound(SoundEffect::Jump)));
        tick(&mut state, &TickInput::default());
        assert!(!state.events().contains(&GameEvent::Sound(SoundEffect::Jump)));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let level = LevelData::builtin(1).unwrap();
        let mut state1 = GameState::new(level.clone(), Tuning::default(), 99999);
        let mut state2 = GameState::new(level, Tuning::default(), 99999);

        let inputs = [
            TickInput {
                move_right: true,
                ..Default::default()
            },
            TickInput {
                move_right: true,
                jump_pressed: true,
                attack: true,
                ..Default::default()
            },
            TickInput {
                shoot: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..400 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.events(), state2.events());
        for (a, b) in state1.enemies.iter().zip(&state2.enemies) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.health, b.health);
        }
    }
}
