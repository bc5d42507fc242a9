//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by roster index)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod combat;
pub mod geom;
pub mod particle;
pub mod physics;
pub mod projectile;
pub mod state;
pub mod tick;

pub use geom::Aabb;
pub use particle::{Color, Particle, ParticlePool};
pub use physics::{MoveIntent, PhysicsReport, step_player};
pub use projectile::{HitTarget, Projectile, ProjectileHit, ProjectilePool};
pub use state::{
    Actor, ActorState, Behavior, CellKind, DeathCause, GameEvent, GamePhase, GameState, Pickup,
    SessionAi, SoundEffect,
};
pub use tick::{TickInput, tick};
