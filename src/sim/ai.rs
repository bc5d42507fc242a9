//! Enemy behavior state machine
//!
//! Each tick an enemy either drifts under knockback or runs the logic for its
//! behavior tag, which may request a transition. Transitions go through
//! `enter_behavior` so per-behavior timers are always initialized.
//!
//! Patrol, Chase, Shoot and Boss move at base speeds. The tactical behaviors
//! (Flank, Coordinate, Ambush, Retreat, Surround) scale their speed by the
//! session difficulty and the enemy's own aggression.

use std::f32::consts::TAU;

use glam::Vec2;

use super::projectile::ProjectilePool;
use super::state::{Actor, ActorState, Behavior, CellKind, GameEvent, SessionAi, SoundEffect};
use crate::level::LevelData;
use crate::seek;
use crate::tuning::Tuning;

/// Angle between neighbouring shots of a boss volley (radians)
const BOSS_VOLLEY_SPREAD: f32 = 0.25;
/// Rotation speed of flank targets (radians per tick)
const FLANK_ROTATION: f32 = 0.02;
/// Rotation speed of surround slots (radians per tick)
const SURROUND_ROTATION: f32 = 0.01;
/// Close enough to a movement target to count as arrived
const ARRIVE_DISTANCE: f32 = 20.0;
/// Surrounding enemies stop closing in at this distance
const SURROUND_HOLD_DISTANCE: f32 = 50.0;
/// Aggression bonus while an ambush is sprung
const AMBUSH_AGGRESSION: f32 = 0.3;

/// Read-only view of one enemy taken before the AI pass
#[derive(Debug, Clone, Copy)]
pub struct EnemySnapshot {
    pub center: Vec2,
    pub behavior: Behavior,
    pub coordination_id: u32,
    pub alive: bool,
}

pub fn snapshot_roster(enemies: &[Actor]) -> Vec<EnemySnapshot> {
    enemies
        .iter()
        .map(|e| EnemySnapshot {
            center: e.center(),
            behavior: e.behavior,
            coordination_id: e.ai.coordination_id,
            alive: e.is_alive(),
        })
        .collect()
}

/// Everything an enemy may read while deciding what to do
pub struct AiContext<'a> {
    /// Player pose after this tick's physics
    pub player: &'a Actor,
    pub level: &'a LevelData,
    pub tuning: &'a Tuning,
    pub session: &'a SessionAi,
    pub roster: &'a [EnemySnapshot],
}

impl AiContext<'_> {
    fn player_center(&self) -> Vec2 {
        self.player.center()
    }

    /// Player center extrapolated `ticks` ahead, clamped to the level
    fn predict_player(&self, ticks: f32) -> Vec2 {
        self.level
            .clamp_point(self.player.center() + self.player.vel * ticks)
    }

    fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        self.level.line_of_sight(from, to, self.tuning.line_of_sight_step)
    }

    /// Speed scale for tactical behaviors
    fn tactical_scale(&self, enemy: &Actor) -> f32 {
        self.session.difficulty * enemy.ai.aggression
    }
}

/// Side effects an enemy may produce
pub struct AiOutput<'a> {
    pub projectiles: &'a mut ProjectilePool,
    pub events: &'a mut Vec<GameEvent>,
}

/// Advance the session-wide coordination and adaptation timers
pub fn update_session(session: &mut SessionAi, enemies: &[Actor], tuning: &Tuning) {
    session.coordination_timer += 1;
    if session.coordination_timer >= tuning.coordination_update_ticks {
        session.coordination_timer = 0;
        session.active_coordinators = enemies
            .iter()
            .filter(|e| e.is_alive() && e.ai.coordination_id > 0)
            .count() as u32;
    }
    session.adaptation_timer = session.adaptation_timer.saturating_sub(1);
}

/// Switch behavior and initialize the timers the new behavior relies on
pub fn enter_behavior(enemy: &mut Actor, behavior: Behavior, tuning: &Tuning) {
    enemy.behavior = behavior;
    match behavior {
        Behavior::Patrol => {
            let dir = if enemy.vel.x > 0.0 { 1.0 } else { -1.0 };
            enemy.vel = Vec2::new(dir * tuning.patrol_speed, 0.0);
        }
        Behavior::Coordinate => enemy.ai.timer = tuning.coordinate_duration,
        Behavior::Flank | Behavior::Ambush => enemy.ai.timer = 0,
        _ => {}
    }
}

/// Run one AI tick for `enemy` (at roster position `index`).
/// Returns the behavior it transitioned into, if any.
pub fn step_enemy(
    enemy: &mut Actor,
    index: usize,
    ctx: &AiContext,
    out: &mut AiOutput,
) -> Option<Behavior> {
    if !enemy.is_alive() {
        return None;
    }

    let next = match enemy.knockback.step(ctx.tuning.knockback_decay) {
        Some(push) => {
            enemy.pos += push;
            None
        }
        None => match enemy.behavior {
            Behavior::None => None,
            Behavior::Patrol => patrol(enemy, ctx),
            Behavior::Chase => chase(enemy, ctx),
            Behavior::Shoot => shoot(enemy, ctx, out),
            Behavior::Boss => boss(enemy, ctx, out),
            Behavior::Flank => flank(enemy, ctx),
            Behavior::Coordinate => coordinate(enemy, index, ctx),
            Behavior::Ambush => ambush(enemy, ctx),
            Behavior::Retreat => retreat(enemy, ctx),
            Behavior::Surround => surround(enemy, index, ctx),
        },
    };

    clamp_to_level(enemy, ctx.level);
    enemy.timers.tick();
    enemy.ai.clock = enemy.ai.clock.wrapping_add(1);
    if !enemy.knockback.is_active() {
        enemy.state = if enemy.vel == Vec2::ZERO {
            ActorState::Idle
        } else {
            ActorState::Moving
        };
    }

    let next = next.filter(|&b| b != enemy.behavior)?;
    log::debug!("Enemy {index} {:?} -> {:?}", enemy.behavior, next);
    enter_behavior(enemy, next, ctx.tuning);
    Some(next)
}

/// Set velocity and move
fn drive(enemy: &mut Actor, vel: Vec2) {
    enemy.vel = vel;
    enemy.pos += vel;
    if vel.x != 0.0 {
        enemy.facing = vel.x.signum();
    }
}

fn clamp_to_level(enemy: &mut Actor, level: &LevelData) {
    let max = (Vec2::new(level.width, level.height) - enemy.size).max(Vec2::ZERO);
    enemy.pos = enemy.pos.clamp(Vec2::ZERO, max);
}

fn patrol(enemy: &mut Actor, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    if enemy.vel.x == 0.0 {
        enemy.vel.x = t.patrol_speed * enemy.facing;
    }
    enemy.vel.y = 0.0;
    enemy.pos.x += enemy.vel.x;

    let max_x = ctx.level.width - enemy.size.x;
    if (enemy.pos.x <= 0.0 && enemy.vel.x < 0.0) || (enemy.pos.x >= max_x && enemy.vel.x > 0.0) {
        enemy.vel.x = -enemy.vel.x;
    }
    enemy.facing = enemy.vel.x.signum();

    let distance = enemy.center().distance(ctx.player_center());
    (distance < t.patrol_detect_range).then_some(Behavior::Chase)
}

fn chase(enemy: &mut Actor, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    if enemy.kind != CellKind::NkCell && enemy.health_fraction() < t.retreat_health_threshold {
        return Some(Behavior::Retreat);
    }

    let target = ctx.player_center();
    let vel = seek(enemy.center(), target, t.chase_speed);
    drive(enemy, vel);

    (enemy.center().distance(target) > t.chase_break_range).then_some(Behavior::Patrol)
}

fn shoot(enemy: &mut Actor, ctx: &AiContext, out: &mut AiOutput) -> Option<Behavior> {
    let t = ctx.tuning;
    let center = enemy.center();
    let target = ctx.player_center();
    let to_player = target - center;

    if to_player.length() <= t.shoot_range && ctx.line_of_sight(center, target) {
        enemy.facing = if to_player.x < 0.0 { -1.0 } else { 1.0 };
        enemy.vel = Vec2::ZERO;
        if enemy.timers.attack_cooldown == 0
            && out.projectiles.spawn_aimed(center, target, enemy.kind, t).is_some()
        {
            enemy.timers.attack_cooldown = t.shoot_cooldown;
            out.events.push(GameEvent::Sound(SoundEffect::EnemyShoot));
        }
    } else {
        // Out of range or blocked: creep closer along the ground
        let dir = if to_player.x < 0.0 { -1.0 } else { 1.0 };
        drive(enemy, Vec2::new(dir * t.shooter_creep_speed, 0.0));
    }
    None
}

fn boss(enemy: &mut Actor, ctx: &AiContext, out: &mut AiOutput) -> Option<Behavior> {
    let t = ctx.tuning;
    let phase: u8 = if enemy.health_fraction() > t.boss_phase_health { 1 } else { 2 };
    if enemy.ai.reported_phase != phase {
        if enemy.ai.reported_phase != 0 {
            out.events.push(GameEvent::BossPhaseChanged { phase });
            log::debug!("Boss entered phase {phase}");
        }
        enemy.ai.reported_phase = phase;
    }

    let center = enemy.center();
    let target = ctx.player_center();
    let distance = center.distance(target);

    if phase == 1 {
        let cycle = t.boss_cycle_ticks.max(2);
        let t_in_cycle = enemy.ai.clock % cycle;
        if t_in_cycle < cycle / 2 {
            drive(enemy, seek(center, target, t.chase_speed + 1.0));
        } else {
            enemy.vel = Vec2::ZERO;
            if t_in_cycle == cycle / 2 && distance <= t.shoot_range {
                fire_volley(enemy, target, t, out);
            }
        }
        return None;
    }

    if distance > t.boss_close_range {
        let predicted = ctx.predict_player(t.boss_prediction_ticks);
        drive(enemy, seek(center, predicted, t.chase_speed + 2.0));
    } else {
        let angle = enemy.ai.clock as f32 * 0.1;
        drive(enemy, Vec2::new(angle.cos() * 3.0, angle.sin() * 2.0));
    }

    if enemy.timers.attack_cooldown == 0
        && distance <= t.shoot_range
        && out.projectiles.spawn_aimed(center, target, enemy.kind, t).is_some()
    {
        enemy.timers.attack_cooldown = t.shoot_cooldown / 2;
        out.events.push(GameEvent::Sound(SoundEffect::BossRapidFire));
        log::debug!("Boss rapid fire");
    }
    None
}

/// Fan of shots centered on the player
fn fire_volley(enemy: &Actor, target: Vec2, t: &Tuning, out: &mut AiOutput) {
    let center = enemy.center();
    let aim = (target - center).normalize_or(Vec2::X);
    let n = t.boss_volley_size.max(1);
    let mut fired = 0;
    for i in 0..n {
        let offset = (i as f32 - (n - 1) as f32 / 2.0) * BOSS_VOLLEY_SPREAD;
        let vel = Vec2::from_angle(offset).rotate(aim) * t.projectile_speed;
        if out
            .projectiles
            .spawn(center, vel, enemy.kind, t.projectile_damage, t)
            .is_some()
        {
            fired += 1;
        }
    }
    if fired > 0 {
        out.events.push(GameEvent::Sound(SoundEffect::EnemyShoot));
    }
}

fn flank(enemy: &mut Actor, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    let player = ctx.player_center();
    let center = enemy.center();

    let angle = t.flank_angle + enemy.ai.clock as f32 * FLANK_ROTATION;
    let side = if center.x < player.x { -1.0 } else { 1.0 };
    let offset = Vec2::new(angle.cos() * side, -angle.sin()) * t.flank_distance;
    let target = ctx.level.clamp_point(player + offset);

    if center.distance(target) <= t.flank_arrive_distance {
        enemy.vel = Vec2::ZERO;
        return Some(Behavior::Coordinate);
    }
    if enemy.ai.timer >= t.flank_give_up_ticks {
        return Some(Behavior::Chase);
    }
    enemy.ai.timer += 1;
    enemy.ai.target = target;
    let speed = t.chase_speed * ctx.tactical_scale(enemy);
    drive(enemy, seek(center, target, speed));
    None
}

fn coordinate(enemy: &mut Actor, index: usize, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    let center = enemy.center();
    let group = enemy.ai.coordination_id;

    let (sum, count) = ctx
        .roster
        .iter()
        .enumerate()
        .filter(|(i, e)| e.alive && (*i == index || (group > 0 && e.coordination_id == group)))
        .fold((Vec2::ZERO, 0u32), |(sum, n), (_, e)| (sum + e.center, n + 1));
    let centroid = if count > 0 { sum / count as f32 } else { center };

    // Converge on the predicted pose, keeping the group's spread
    let spread = (center - centroid) * 0.5;
    let target = ctx.level.clamp_point(ctx.predict_player(t.prediction_ticks) + spread);
    enemy.ai.target = target;
    let speed = t.chase_speed * ctx.tactical_scale(enemy) * t.coordinate_speed_mult;
    drive(enemy, seek(center, target, speed));

    if enemy.ai.timer == 0 {
        return Some(Behavior::Chase);
    }
    enemy.ai.timer -= 1;
    None
}

fn ambush(enemy: &mut Actor, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    let center = enemy.center();
    let player = ctx.player_center();

    if enemy.ai.timer == 0 {
        enemy.vel = Vec2::ZERO;
        let distance = center.distance(player);
        if distance > t.ambush_range || !ctx.line_of_sight(center, player) {
            return None;
        }
        enemy.facing = if player.x < center.x { -1.0 } else { 1.0 };
        if distance <= t.ambush_trigger_range {
            enemy.ai.timer = t.ambush_duration.max(1);
            enemy.ai.aggression += AMBUSH_AGGRESSION;
        }
        return None;
    }

    let target = ctx.predict_player(t.prediction_ticks * 0.5);
    enemy.ai.target = target;
    let speed = t.chase_speed * t.ambush_speed_mult * ctx.tactical_scale(enemy);
    drive(enemy, seek(center, target, speed));

    enemy.ai.timer -= 1;
    if enemy.ai.timer == 0 {
        enemy.ai.aggression -= AMBUSH_AGGRESSION;
        return Some(Behavior::Chase);
    }
    None
}

fn retreat(enemy: &mut Actor, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    let center = enemy.center();
    let player = ctx.player_center();
    let scale = ctx.tactical_scale(enemy);

    // Nearest platform that is far from the player and not yet reached
    let cover = ctx
        .level
        .platforms
        .iter()
        .map(|p| p.rect.center())
        .filter(|c| c.distance(player) > t.retreat_distance && c.distance(center) > ARRIVE_DISTANCE)
        .min_by(|a, b| a.distance(center).total_cmp(&b.distance(center)));

    let vel = match cover {
        Some(spot) => {
            enemy.ai.target = spot;
            seek(center, spot, t.chase_speed * scale)
        }
        None => seek(player, center, t.chase_speed * t.retreat_speed_mult * scale),
    };
    drive(enemy, vel);

    let far_enough = enemy.center().distance(player) > t.retreat_distance * 1.5;
    (far_enough || enemy.health_fraction() > t.retreat_recover_health).then_some(Behavior::Patrol)
}

fn surround(enemy: &mut Actor, index: usize, ctx: &AiContext) -> Option<Behavior> {
    let t = ctx.tuning;
    let group = enemy.ai.coordination_id;
    let members: Vec<usize> = ctx
        .roster
        .iter()
        .enumerate()
        .filter(|(i, e)| {
            e.alive
                && e.behavior == Behavior::Surround
                && (*i == index || e.coordination_id == group)
        })
        .map(|(i, _)| i)
        .collect();
    if members.len() < t.surround_min_group {
        return Some(Behavior::Chase);
    }

    let rank = members.iter().position(|&i| i == index).unwrap_or(0);
    let angle = rank as f32 * TAU / members.len() as f32 + enemy.ai.clock as f32 * SURROUND_ROTATION;
    let player = ctx.player_center();
    let slot = player + Vec2::from_angle(angle) * t.surround_distance;
    enemy.ai.target = slot;

    let center = enemy.center();
    let scale = ctx.tactical_scale(enemy);
    if center.distance(slot) > ARRIVE_DISTANCE {
        drive(enemy, seek(center, slot, t.chase_speed * scale));
    } else if center.distance(player) > SURROUND_HOLD_DISTANCE {
        drive(enemy, seek(center, player, t.chase_speed * 0.5 * scale));
    } else {
        enemy.vel = Vec2::ZERO;
    }
    None
}
