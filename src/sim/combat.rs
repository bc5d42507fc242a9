//! Combat resolution
//!
//! Melee and ranged attacks from the player, enemy contact damage, and the
//! bookkeeping every hit or kill triggers (score, combo, session counters,
//! effects and events).

use glam::Vec2;
use rand::Rng;

use super::particle::Color;
use super::projectile::{HitTarget, ProjectileHit};
use super::state::{ActorState, Behavior, CellKind, GameEvent, GameState, SoundEffect};
use crate::tuning::Tuning;

const CONTACT_SHAKE: (f32, u32) = (2.0, 10);
const PROJECTILE_SHAKE: (f32, u32) = (3.0, 15);
const ENEMY_HIT_PARTICLES: usize = 6;
const PLAYER_HIT_PARTICLES: usize = 8;

/// Outcome of one melee swing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeleeReport {
    pub hits: u32,
    pub crits: u32,
    pub kills: u32,
}

/// `base x combo multiplier x critical multiplier`
pub fn melee_damage(base: f32, combo: u8, critical: bool, tuning: &Tuning) -> f32 {
    let crit = if critical { tuning.critical_multiplier } else { 1.0 };
    base * tuning.combo_multiplier(combo) * crit
}

/// Swing at every living enemy in range. Returns None while on cooldown.
///
/// The combo multiplier is fixed when the swing starts, so every enemy struck
/// by the same swing takes the same base damage.
pub fn player_melee(state: &mut GameState) -> Option<MeleeReport> {
    let player = &mut state.player;
    if !player.is_alive() || player.timers.attack_cooldown > 0 {
        return None;
    }
    let tuning = &state.tuning;
    let combo_live = player.combo.is_live();
    let combo = if combo_live { player.combo.count } else { 0 };
    player.timers.attack_cooldown = tuning.attack_cooldown_for(combo_live);
    player.state = ActorState::Attacking;

    let origin = player.center();
    let facing = Vec2::new(player.facing, 0.0);
    let mut struck = Vec::new();
    for (i, enemy) in state.enemies.iter_mut().enumerate() {
        if !enemy.is_alive() || enemy.center().distance(origin) > tuning.attack_range {
            continue;
        }
        let critical = state.rng.random_bool(tuning.critical_chance.clamp(0.0, 1.0));
        let damage = melee_damage(player.attack_power, combo, critical, tuning);
        let dir = (enemy.center() - origin).normalize_or(facing);
        enemy
            .knockback
            .start(dir * tuning.knockback_force, tuning.knockback_duration);
        let killed = enemy.apply_damage(damage);
        player.combo.register_hit(tuning.combo_window);
        struck.push((i, critical, killed));
    }

    let mut report = MeleeReport::default();
    for (i, critical, killed) in struck {
        report.hits += 1;
        report.crits += critical as u32;
        state.score += state.tuning.score_melee_hit;
        let at = state.enemies[i].center();
        state.particles.spawn_burst(at, Color::HIT_YELLOW, ENEMY_HIT_PARTICLES);
        state.push_event(GameEvent::Sound(SoundEffect::Hit));
        if killed {
            report.kills += 1;
            on_enemy_killed(state, i);
        }
    }
    Some(report)
}

/// Fire a horizontal shot in the facing direction. A denied spawn keeps the
/// cooldown ready for the next tick.
pub fn player_shoot(state: &mut GameState) -> bool {
    let player = &mut state.player;
    if !player.is_alive() || player.timers.shot_cooldown > 0 {
        return false;
    }
    let tuning = &state.tuning;
    let vel = Vec2::new(player.facing * tuning.player_shot_speed, 0.0);
    let spawned = state
        .projectiles
        .spawn(
            player.center(),
            vel,
            CellKind::Cancer,
            tuning.player_shot_damage,
            tuning,
        )
        .is_some();
    if spawned {
        player.timers.shot_cooldown = tuning.player_shot_cooldown;
        state.push_event(GameEvent::Sound(SoundEffect::Shoot));
    }
    spawned
}

/// Touching a living enemy hurts the player (invincibility-gated) and knocks
/// them away from it.
pub fn enemy_contact(state: &mut GameState) {
    let bounds = state.player.bounds();
    let Some(enemy) = state
        .enemies
        .iter()
        .find(|e| e.is_alive() && e.bounds().overlaps(&bounds))
    else {
        return;
    };
    let (power, enemy_x) = (enemy.attack_power, enemy.center().x);

    let tuning = &state.tuning;
    let player = &mut state.player;
    if player.take_hit(power, tuning.invincibility_frames).is_none() {
        return;
    }
    let away = if player.center().x < enemy_x { -1.0 } else { 1.0 };
    player.knockback.start(
        Vec2::new(away * tuning.contact_knockback, 0.0),
        tuning.knockback_duration,
    );
    on_player_damaged(state, power, CONTACT_SHAKE);
}

/// Score, effects and events for projectile impacts
pub fn settle_projectile_hits(state: &mut GameState, hits: &[ProjectileHit]) {
    for hit in hits {
        match hit.target {
            HitTarget::Enemy(i) => {
                state.score += state.tuning.score_projectile_hit;
                state
                    .particles
                    .spawn_burst(hit.pos, Color::HIT_YELLOW, ENEMY_HIT_PARTICLES);
                state.push_event(GameEvent::Sound(SoundEffect::Hit));
                if hit.killed {
                    on_enemy_killed(state, i);
                }
            }
            HitTarget::Player if hit.damage > 0.0 => {
                state
                    .particles
                    .spawn_burst(hit.pos, Color::HIT_RED, PLAYER_HIT_PARTICLES);
                on_player_damaged(state, hit.damage, PROJECTILE_SHAKE);
            }
            HitTarget::Player => {}
        }
    }
}

/// Common reaction to the player losing health
pub fn on_player_damaged(state: &mut GameState, amount: f32, (intensity, duration): (f32, u32)) {
    state.push_event(GameEvent::PlayerDamaged { amount });
    state.push_event(GameEvent::ScreenShake { intensity, duration });
    state.push_event(GameEvent::Sound(SoundEffect::Hit));
    state.session.kill_streak = 0;
    let health = state.player.health_fraction();
    state.session.adapt(health, &state.tuning);
}

/// Hazard contact reuses the contact shake
pub fn on_hazard_damage(state: &mut GameState, amount: f32) {
    on_player_damaged(state, amount, CONTACT_SHAKE);
}

fn on_enemy_killed(state: &mut GameState, index: usize) {
    let enemy = &state.enemies[index];
    let (kind, center) = (enemy.kind, enemy.center());
    let boss = enemy.behavior == Behavior::Boss;

    state.score += state.tuning.score_kill;
    state.push_event(GameEvent::EnemyKilled { kind, boss });
    state.push_event(GameEvent::Sound(SoundEffect::Death));
    state.particles.spawn_death_effect(center, kind);

    state.session.kill_streak += 1;
    let health = state.player.health_fraction();
    state.session.adapt(health, &state.tuning);
    log::debug!("Enemy {index} ({kind:?}) killed, streak {}", state.session.kill_streak);
}
