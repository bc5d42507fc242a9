//! Cosmetic particle pool
//!
//! Particles never affect gameplay. The pool draws from its own RNG, seeded
//! from the game seed, so a full or empty pool never shifts the gameplay
//! random stream.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::CellKind;

const PARTICLE_GRAVITY: f32 = 0.1;
const LIFETIME_SHORT: u32 = 30;
const LIFETIME_MEDIUM: u32 = 60;
const LIFETIME_LONG: u32 = 120;
const DEATH_PARTICLES: usize = 15;
/// Mixed into the game seed for the cosmetic stream
const PARTICLE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// RGBA color; alpha fades with remaining lifetime
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const LIGHT_GREY: Color = Color::rgb(200, 200, 200);
    pub const IMPACT_GREY: Color = Color::rgb(128, 128, 128);
    pub const HIT_YELLOW: Color = Color::rgb(255, 255, 0);
    pub const HIT_RED: Color = Color::rgb(255, 0, 0);
    pub const PLAYER_TRAIL: Color = Color::rgba(0, 255, 255, 150.0 / 255.0);
    pub const ENEMY_TRAIL: Color = Color::rgba(255, 100, 100, 120.0 / 255.0);

    /// Primary and secondary death burst colors for a cell kind
    pub fn death_palette(kind: CellKind) -> (Color, Color) {
        match kind {
            CellKind::TCell => (Color::HIT_YELLOW, Color::rgb(255, 255, 150)),
            CellKind::Macrophage => (Color::rgb(200, 200, 0), Color::rgb(255, 255, 100)),
            CellKind::BCell => (Color::rgb(0, 200, 255), Color::rgb(150, 225, 255)),
            CellKind::NkCell => (Color::HIT_RED, Color::rgb(255, 150, 150)),
            CellKind::Cancer => (Color::WHITE, Color::LIGHT_GREY),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[derive(Debug, Clone, Default)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    pub lifetime: u32,
    pub max_lifetime: u32,
    pub active: bool,
}

/// Fixed-size particle arena
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    rng: Pcg32,
}

impl ParticlePool {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            rng: Pcg32::seed_from_u64(seed ^ PARTICLE_SEED_SALT),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> {
        self.slots.iter().filter(|p| p.active)
    }

    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.active = false;
        }
    }

    /// Fill the first free slot. Returns false when the pool is full.
    fn emit(&mut self, pos: Vec2, vel: Vec2, color: Color, lifetime: u32) -> bool {
        let Some(slot) = self.slots.iter_mut().find(|p| !p.active) else {
            return false;
        };
        *slot = Particle {
            pos,
            vel,
            color,
            lifetime,
            max_lifetime: lifetime,
            active: true,
        };
        true
    }

    /// Radial burst with a slight upward bias. Returns how many particles were placed.
    pub fn spawn_burst(&mut self, pos: Vec2, color: Color, count: usize) -> usize {
        let mut placed = 0;
        while placed < count {
            let angle = self.rng.random_range(0..360) as f32 * TAU / 360.0;
            let speed = self.rng.random_range(1..=3) as f32;
            let vel = Vec2::new(angle.cos() * speed, angle.sin() * speed - 1.0);
            let lifetime = LIFETIME_SHORT + self.rng.random_range(0..LIFETIME_SHORT);
            if !self.emit(pos, vel, color, lifetime) {
                log::debug!("Particle pool full, burst truncated at {placed}/{count}");
                break;
            }
            placed += 1;
        }
        placed
    }

    /// Larger, longer-lived two-tone explosion for an enemy death
    pub fn spawn_death_effect(&mut self, pos: Vec2, kind: CellKind) -> usize {
        let (primary, secondary) = Color::death_palette(kind);
        let mut placed = 0;
        while placed < DEATH_PARTICLES {
            let angle = self.rng.random_range(0..360) as f32 * TAU / 360.0;
            let speed = self.rng.random_range(2..=5) as f32;
            let vel = Vec2::new(angle.cos() * speed, angle.sin() * speed - 0.5);
            let color = if placed % 2 == 0 { primary } else { secondary };
            let lifetime = LIFETIME_LONG + self.rng.random_range(0..LIFETIME_MEDIUM);
            if !self.emit(pos, vel, color, lifetime) {
                break;
            }
            placed += 1;
        }
        placed
    }

    /// Occasional drifting trail particle behind a projectile (one in three calls)
    pub fn spawn_trail(&mut self, pos: Vec2, source: CellKind) -> bool {
        if self.rng.random_range(0..3) != 0 {
            return false;
        }
        let color = if source.is_player() {
            Color::PLAYER_TRAIL
        } else {
            Color::ENEMY_TRAIL
        };
        let jitter = Vec2::new(self.rng.random_range(-3.0..3.0), self.rng.random_range(-3.0..3.0));
        self.emit(pos + jitter, Vec2::new(0.0, 0.5), color, LIFETIME_SHORT)
    }

    /// Integrate, fade and expire every active particle
    pub fn advance(&mut self) {
        for p in self.slots.iter_mut().filter(|p| p.active) {
            p.pos += p.vel;
            p.vel.y += PARTICLE_GRAVITY;
            p.color.a = p.lifetime as f32 / p.max_lifetime.max(1) as f32;
            p.lifetime = p.lifetime.saturating_sub(1);
            if p.lifetime == 0 {
                p.active = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_respects_capacity() {
        let mut pool = ParticlePool::new(4, 11);
        assert_eq!(pool.spawn_burst(Vec2::ZERO, Color::HIT_YELLOW, 3), 3);
        assert_eq!(pool.spawn_burst(Vec2::ZERO, Color::HIT_YELLOW, 3), 1);
        assert_eq!(pool.active_count(), 4);
    }

    #[test]
    fn test_death_effect_alternates_colors() {
        let mut pool = ParticlePool::new(32, 5);
        assert_eq!(pool.spawn_death_effect(Vec2::ZERO, CellKind::BCell), 15);
        let (primary, secondary) = Color::death_palette(CellKind::BCell);
        let colors: Vec<Color> = pool.iter_active().map(|p| p.color).collect();
        assert_eq!(colors[0], primary);
        assert_eq!(colors[1], secondary);
        assert!(pool.iter_active().all(|p| p.lifetime >= 120 && p.lifetime < 180));
    }

    #[test]
    fn test_particles_fade_and_expire() {
        let mut pool = ParticlePool::new(8, 9);
        pool.spawn_burst(Vec2::ZERO, Color::IMPACT_GREY, 5);
        pool.advance();
        assert!(pool.iter_active().all(|p| p.color.a <= 1.0));
        for _ in 0..60 {
            pool.advance();
        }
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_same_seed_same_burst() {
        let mut a = ParticlePool::new(8, 3);
        let mut b = ParticlePool::new(8, 3);
        a.spawn_burst(Vec2::ZERO, Color::WHITE, 4);
        b.spawn_burst(Vec2::ZERO, Color::WHITE, 4);
        let va: Vec<Vec2> = a.iter_active().map(|p| p.vel).collect();
        let vb: Vec<Vec2> = b.iter_active().map(|p| p.vel).collect();
        assert_eq!(va, vb);
    }

    #[test]
    fn test_clear() {
        let mut pool = ParticlePool::new(8, 2);
        pool.spawn_burst(Vec2::ZERO, Color::WHITE, 8);
        pool.clear();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 8);
    }
}
