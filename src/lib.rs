//! Cell Quest - 2D side-scrolling cell platformer simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, AI, combat, projectiles, particles)
//! - `level`: Static level data (platforms, enemy roster, pickups, goal portal)
//! - `tuning`: Data-driven game balance

pub mod level;
pub mod sim;
pub mod tuning;

pub use level::LevelData;
pub use tuning::{Difficulty, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per second
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Visible screen dimensions
    pub const SCREEN_WIDTH: f32 = 1280.0;
    pub const SCREEN_HEIGHT: f32 = 720.0;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_ATTACK_POWER: f32 = 10.0;

    /// Enemy defaults
    pub const ENEMY_WIDTH: f32 = 40.0;
    pub const ENEMY_HEIGHT: f32 = 40.0;

    /// Goal portal size
    pub const PORTAL_WIDTH: f32 = 50.0;
    pub const PORTAL_HEIGHT: f32 = 80.0;

    /// Glucose pickup size
    pub const GLUCOSE_SIZE: f32 = 20.0;

    /// Pool capacities
    pub const MAX_PROJECTILES: usize = 50;
    pub const MAX_PARTICLES: usize = 100;

    /// Longest combo chain
    pub const MAX_COMBO: u8 = 5;
}

/// Unit vector from `from` toward `to`, or zero when the points coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Velocity of magnitude `speed` pointing from `from` toward `to`
#[inline]
pub fn seek(from: Vec2, to: Vec2, speed: f32) -> Vec2 {
    direction_to(from, to) * speed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seek_zero_distance() {
        let p = Vec2::new(3.0, 4.0);
        assert_eq!(seek(p, p, 5.0), Vec2::ZERO);
    }

    #[test]
    fn test_seek_speed() {
        let v = seek(Vec2::ZERO, Vec2::new(3.0, 4.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-4);
        assert!((v.x - 6.0).abs() < 1e-4);
    }
}
