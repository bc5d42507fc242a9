//! Fixed-capacity projectile pool
//!
//! A slot holds at most one projectile and becomes reusable once inactive.
//! Spawning into a full pool is a silent denial.

use glam::Vec2;

use super::geom::Aabb;
use super::particle::{Color, ParticlePool};
use super::state::{Actor, CellKind};
use crate::level::LevelData;
use crate::tuning::Tuning;

/// Offscreen margin before a projectile is discarded
const BOUNDS_MARGIN: f32 = 100.0;

/// A single ranged attack instance
#[derive(Debug, Clone, Default)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub active: bool,
    pub lifetime: u32,
    pub damage: f32,
    /// Kind of the actor that fired it; decides which side it can hit
    pub source: CellKind,
}

impl Projectile {
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn fired_by_player(&self) -> bool {
        self.source.is_player()
    }
}

/// Who a projectile struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Player,
    Enemy(usize),
}

/// A resolved projectile impact
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileHit {
    pub target: HitTarget,
    /// Impact point (projectile center)
    pub pos: Vec2,
    /// Damage actually applied (0 when absorbed by invincibility)
    pub damage: f32,
    pub killed: bool,
}

/// Summary of one `advance` pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Enemy shots that expired without hitting anything living
    pub enemy_shots_expired: u32,
}

/// Fixed-size projectile arena
#[derive(Debug, Clone)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
}

impl ProjectilePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Projectile::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Projectile> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn slots(&self) -> &[Projectile] {
        &self.slots
    }

    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.active = false;
        }
    }

    /// Claim the first free slot. Returns the slot index, or None if the pool is full.
    pub fn spawn(
        &mut self,
        origin: Vec2,
        vel: Vec2,
        source: CellKind,
        damage: f32,
        tuning: &Tuning,
    ) -> Option<usize> {
        let Some(idx) = self.slots.iter().position(|p| !p.active) else {
            log::debug!("Projectile pool full, spawn denied");
            return None;
        };
        let size = Vec2::splat(tuning.projectile_size);
        self.slots[idx] = Projectile {
            pos: origin - size * 0.5,
            vel,
            size,
            active: true,
            lifetime: tuning.projectile_lifetime,
            damage,
            source,
        };
        Some(idx)
    }

    /// Spawn an enemy-style shot aimed at `target` (straight right if the
    /// target coincides with the origin)
    pub fn spawn_aimed(
        &mut self,
        origin: Vec2,
        target: Vec2,
        source: CellKind,
        tuning: &Tuning,
    ) -> Option<usize> {
        let dir = (target - origin).normalize_or(Vec2::X);
        self.spawn(
            origin,
            dir * tuning.projectile_speed,
            source,
            tuning.projectile_damage,
            tuning,
        )
    }

    /// Move every active projectile, expiring on lifetime, level bounds or geometry
    pub fn advance(&mut self, level: &LevelData, particles: &mut ParticlePool) -> AdvanceReport {
        let mut report = AdvanceReport::default();
        for proj in self.slots.iter_mut().filter(|p| p.active) {
            proj.pos += proj.vel;
            particles.spawn_trail(proj.center(), proj.source);

            proj.lifetime = proj.lifetime.saturating_sub(1);
            let mut expire = proj.lifetime == 0;

            let out_of_bounds = proj.pos.x < -BOUNDS_MARGIN
                || proj.pos.x > level.width + BOUNDS_MARGIN
                || proj.pos.y < -BOUNDS_MARGIN
                || proj.pos.y > level.height + BOUNDS_MARGIN;
            expire |= out_of_bounds;

            let bounds = proj.bounds();
            if level.platforms.iter().any(|p| p.rect.overlaps(&bounds)) {
                particles.spawn_burst(proj.center(), Color::IMPACT_GREY, 5);
                expire = true;
            }

            if expire {
                proj.active = false;
                if !proj.fired_by_player() {
                    report.enemy_shots_expired += 1;
                }
            }
        }
        report
    }

    /// Test active projectiles against the opposite faction only, apply
    /// damage and deactivate on first hit.
    ///
    /// Player damage goes through the invincibility gate; a gated hit still
    /// consumes the projectile.
    pub fn resolve_collisions(
        &mut self,
        player: &mut Actor,
        enemies: &mut [Actor],
        invincibility_frames: u32,
    ) -> Vec<ProjectileHit> {
        let mut hits = Vec::new();
        for proj in self.slots.iter_mut().filter(|p| p.active) {
            let bounds = proj.bounds();
            if proj.fired_by_player() {
                let struck = enemies
                    .iter()
                    .position(|e| e.is_alive() && e.bounds().overlaps(&bounds));
                if let Some(idx) = struck {
                    let killed = enemies[idx].apply_damage(proj.damage);
                    proj.active = false;
                    hits.push(ProjectileHit {
                        target: HitTarget::Enemy(idx),
                        pos: proj.center(),
                        damage: proj.damage,
                        killed,
                    });
                }
            } else if player.is_alive() && player.bounds().overlaps(&bounds) {
                let outcome = player.take_hit(proj.damage, invincibility_frames);
                proj.active = false;
                hits.push(ProjectileHit {
                    target: HitTarget::Player,
                    pos: proj.center(),
                    damage: if outcome.is_some() { proj.damage } else { 0.0 },
                    killed: outcome.unwrap_or(false),
                });
            }
        }
        hits
    }
}
