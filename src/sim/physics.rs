//! Player physics and platform collision resolution
//!
//! Order per tick: jump-assist timers, jump decision, horizontal intent,
//! integrate position, apply gravity, resolve overlaps, ground probe, bounds.
//!
//! An overlap is classified by the pre-step bounds. If the actor was already
//! inside the platform's horizontal span it is a vertical contact (landing or
//! ceiling); if it was beside the platform and vertically aligned with it, it
//! is a side contact (step-up or wall stop). Anything else is pushed out along
//! the shallower axis.

use glam::Vec2;

use super::geom::Aabb;
use super::state::Actor;
use crate::level::{LevelData, Platform};
use crate::tuning::Tuning;

/// Float slack for "exactly touching" comparisons
const CONTACT_EPSILON: f32 = 0.01;

/// Ticks the horizontal wall-jump push lasts (decays like knockback)
const WALL_JUMP_PUSH_TICKS: u32 = 8;

/// Movement intent for one tick
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    /// Edge-triggered; only arms the jump buffer
    pub jump_pressed: bool,
}

/// What happened during one physics step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsReport {
    pub jumped: bool,
    pub wall_jumped: bool,
    /// Airborne at tick start, grounded at tick end
    pub landed: bool,
    pub stepped_up: bool,
    /// Damage applied by deadly platforms this tick (0 when gated or none)
    pub hazard_damage: f32,
    pub hazard_fatal: bool,
    pub fell_out: bool,
}

/// Advance the player one tick against the level's static geometry
pub fn step_player(
    player: &mut Actor,
    intent: MoveIntent,
    level: &LevelData,
    tuning: &Tuning,
) -> PhysicsReport {
    let mut report = PhysicsReport::default();
    if !player.is_alive() {
        return report;
    }
    let was_grounded = player.grounded;

    if intent.jump_pressed {
        player.timers.jump_buffer = tuning.jump_buffer_frames;
    }
    if was_grounded {
        player.timers.coyote = tuning.coyote_frames;
    } else {
        player.timers.coyote = player.timers.coyote.saturating_sub(1);
    }
    try_jump(player, tuning, &mut report);

    player.vel.x = match player.knockback.step(tuning.knockback_decay) {
        Some(push) => push.x,
        None => {
            let axis = intent.right as i32 - intent.left as i32;
            axis as f32 * tuning.move_speed
        }
    };
    if player.vel.x != 0.0 {
        player.facing = player.vel.x.signum();
    }

    let prev = player.bounds();
    player.pos += player.vel;
    player.vel.y += tuning.gravity;
    player.grounded = false;

    for platform in &level.platforms {
        resolve_platform(player, platform, &prev, was_grounded, tuning, &mut report);
        if !player.is_alive() {
            return report;
        }
    }
    ground_probe(player, level, tuning, &mut report);
    if !player.is_alive() {
        return report;
    }

    let max_x = (level.width - player.size.x).max(0.0);
    player.pos.x = player.pos.x.clamp(0.0, max_x);
    if player.pos.y < 0.0 {
        player.pos.y = 0.0;
        player.vel.y = player.vel.y.max(0.0);
    }
    if player.pos.y > level.height {
        player.kill();
        report.fell_out = true;
        return report;
    }

    report.landed = !was_grounded && player.grounded;
    report
}

/// Consume a buffered jump if the ground, coyote time or a wall allows it
fn try_jump(player: &mut Actor, tuning: &Tuning, report: &mut PhysicsReport) {
    let timers = &mut player.timers;
    if timers.jump_buffer == 0 {
        return;
    }
    if player.grounded || timers.coyote > 0 {
        player.vel.y = tuning.jump_speed;
        player.grounded = false;
        timers.coyote = 0;
        timers.jump_buffer = 0;
        report.jumped = true;
        return;
    }

    // Push away from whichever wall is still registered
    let push = if timers.wall_right > 0 {
        timers.wall_right = 0;
        -1.0
    } else if timers.wall_left > 0 {
        timers.wall_left = 0;
        1.0
    } else {
        return;
    };
    timers.jump_buffer = 0;
    player.vel.y = tuning.wall_jump_vertical_speed;
    player.knockback.start(
        Vec2::new(push * tuning.wall_jump_horizontal_speed, 0.0),
        WALL_JUMP_PUSH_TICKS,
    );
    report.jumped = true;
    report.wall_jumped = true;
}

fn resolve_platform(
    player: &mut Actor,
    platform: &Platform,
    prev: &Aabb,
    was_grounded: bool,
    tuning: &Tuning,
    report: &mut PhysicsReport,
) {
    let rect = &platform.rect;
    let bounds = player.bounds();
    if !bounds.overlaps(rect) {
        return;
    }

    if platform.deadly {
        // Hazards are standable: hurt, then rest on top
        hurt_by_hazard(player, tuning, report);
        land_on(player, rect);
        return;
    }

    let moved = bounds.pos - prev.pos;
    let side_entry = !prev.spans_horizontally(rect) && prev.spans_vertically(rect);

    if !side_entry {
        if moved.y >= 0.0 && prev.bottom() <= rect.top() + tuning.landing_tolerance {
            land_on(player, rect);
            return;
        }
        if moved.y < 0.0 && prev.top() >= rect.bottom() - CONTACT_EPSILON {
            player.pos.y = rect.bottom();
            player.vel.y = 0.0;
            return;
        }
    } else if moved.x > 0.0 && prev.right() <= rect.left() + CONTACT_EPSILON {
        side_contact(player, rect, was_grounded, tuning, report, 1.0);
        return;
    } else if moved.x < 0.0 && prev.left() >= rect.right() - CONTACT_EPSILON {
        side_contact(player, rect, was_grounded, tuning, report, -1.0);
        return;
    }

    push_out(player, rect);
}

/// Step up onto a low ledge or stop against a wall. `dir` is +1 moving right.
fn side_contact(
    player: &mut Actor,
    rect: &Aabb,
    was_grounded: bool,
    tuning: &Tuning,
    report: &mut PhysicsReport,
    dir: f32,
) {
    let step_height = player.bounds().bottom() - rect.top();
    if was_grounded && step_height > 0.0 && step_height <= tuning.max_step_up_height {
        land_on(player, rect);
        report.stepped_up = true;
        return;
    }

    if dir > 0.0 {
        player.pos.x = rect.left() - player.size.x;
        player.timers.wall_right = tuning.wall_contact_frames;
    } else {
        player.pos.x = rect.right();
        player.timers.wall_left = tuning.wall_contact_frames;
    }
    player.vel.x = 0.0;
}

/// Minimal-translation separation for overlaps the swept rules can't explain
fn push_out(player: &mut Actor, rect: &Aabb) {
    let bounds = player.bounds();
    let depth = bounds.overlap_depth(rect);
    if depth.y <= depth.x {
        if bounds.center().y < rect.center().y {
            land_on(player, rect);
        } else {
            player.pos.y = rect.bottom();
            player.vel.y = player.vel.y.max(0.0);
        }
    } else {
        if bounds.center().x < rect.center().x {
            player.pos.x = rect.left() - player.size.x;
        } else {
            player.pos.x = rect.right();
        }
        player.vel.x = 0.0;
    }
}

fn land_on(player: &mut Actor, rect: &Aabb) {
    player.pos.y = rect.top() - player.size.y;
    player.vel.y = 0.0;
    player.grounded = true;
}

/// Hazards go through the same invincibility window as enemy hits, so resting
/// on spikes drains health once per window instead of every tick.
fn hurt_by_hazard(player: &mut Actor, tuning: &Tuning, report: &mut PhysicsReport) {
    if let Some(fatal) = player.take_hit(tuning.hazard_damage, tuning.invincibility_frames) {
        report.hazard_damage += tuning.hazard_damage;
        report.hazard_fatal |= fatal;
    }
}

/// Resting contact: feet exactly on a platform top never strictly overlap it,
/// so ground support is detected separately.
fn ground_probe(player: &mut Actor, level: &LevelData, tuning: &Tuning, report: &mut PhysicsReport) {
    if player.grounded || player.vel.y < 0.0 {
        return;
    }
    let bounds = player.bounds();
    let support = level.platforms.iter().find(|p| {
        (bounds.bottom() - p.rect.top()).abs() <= CONTACT_EPSILON && bounds.spans_horizontally(&p.rect)
    });
    if let Some(platform) = support {
        if platform.deadly {
            hurt_by_hazard(player, tuning, report);
        }
        land_on(player, &platform.rect);
    }
}
