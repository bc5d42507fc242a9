//! Game state and core simulation types
//!
//! Everything a tick reads or writes lives here; the orchestrator in `tick`
//! owns one `GameState` and passes pieces of it to each subsystem.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::enter_behavior;
use super::geom::Aabb;
use super::particle::ParticlePool;
use super::projectile::ProjectilePool;
use crate::consts::*;
use crate::level::{EnemySpawn, LevelData};
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Player reached the goal portal
    LevelComplete,
    /// Player died
    GameOver,
}

/// Biological cell archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellKind {
    /// The player
    #[default]
    Cancer,
    TCell,
    Macrophage,
    BCell,
    NkCell,
}

impl CellKind {
    /// Shots tagged with this kind were fired by the player
    pub fn is_player(&self) -> bool {
        *self == CellKind::Cancer
    }
}

/// Actor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActorState {
    #[default]
    Idle,
    Moving,
    Jumping,
    Attacking,
    Damaged,
    Dead,
}

/// AI behavior tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    /// Resting no-op (also used by the player)
    #[default]
    None,
    Patrol,
    Chase,
    Shoot,
    Boss,
    Flank,
    Coordinate,
    Ambush,
    Retreat,
    Surround,
}

/// Tick-decrementing counters; all saturate at zero
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    /// Melee cooldown (player) or shot cooldown (enemies)
    pub attack_cooldown: u32,
    /// Player ranged cooldown
    pub shot_cooldown: u32,
    /// Player damage immunity window
    pub invincibility: u32,
    pub jump_buffer: u32,
    /// Refreshed while grounded, so managed by the resolver rather than `tick`
    pub coyote: u32,
    pub wall_left: u32,
    pub wall_right: u32,
}

impl Timers {
    /// Decrement every counter except coyote time
    pub fn tick(&mut self) {
        for t in [
            &mut self.attack_cooldown,
            &mut self.shot_cooldown,
            &mut self.invincibility,
            &mut self.jump_buffer,
            &mut self.wall_left,
            &mut self.wall_right,
        ] {
            *t = t.saturating_sub(1);
        }
    }
}

/// Decaying displacement applied after a hit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Knockback {
    pub vel: Vec2,
    pub timer: u32,
}

impl Knockback {
    pub fn is_active(&self) -> bool {
        self.timer > 0
    }

    pub fn start(&mut self, vel: Vec2, duration: u32) {
        self.vel = vel;
        self.timer = duration;
    }

    /// Displacement for this tick, then decay. Returns None when inactive.
    pub fn step(&mut self, decay: f32) -> Option<Vec2> {
        if self.timer == 0 {
            return None;
        }
        let displacement = self.vel;
        self.timer -= 1;
        self.vel *= decay;
        if self.timer == 0 {
            self.vel = Vec2::ZERO;
        }
        Some(displacement)
    }
}

/// Consecutive-hit counter with a decaying window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Combo {
    pub count: u8,
    pub timer: u32,
}

impl Combo {
    /// A combo is live while hits have been landed and the window is open
    pub fn is_live(&self) -> bool {
        self.count > 0 && self.timer > 0
    }

    pub fn register_hit(&mut self, window: u32) {
        self.count = (self.count + 1).min(MAX_COMBO);
        self.timer = window;
    }

    /// The count drops to zero on the tick after the window closed
    pub fn tick(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
        } else if self.count > 0 {
            self.count = 0;
        }
    }
}

/// Per-enemy AI scratch state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiMemory {
    /// General purpose behavior timer (coordinate/ambush countdowns)
    pub timer: u32,
    /// Free-running counter (boss cycle, flank rotation, erratic movement)
    pub clock: u32,
    /// Aggression multiplier on top of the session difficulty
    pub aggression: f32,
    /// Group id (0 = not part of a group)
    pub coordination_id: u32,
    /// Last boss phase reported to the host (0 = none yet)
    pub reported_phase: u8,
    /// Last computed movement target; not read by the simulation, kept for
    /// host debug overlays
    pub target: Vec2,
}

/// A player or enemy simulation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub kind: CellKind,
    pub state: ActorState,
    pub behavior: Behavior,
    pub health: f32,
    pub max_health: f32,
    pub attack_power: f32,
    /// False once dead; inactive actors are skipped by every system
    pub active: bool,
    pub grounded: bool,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub timers: Timers,
    pub knockback: Knockback,
    pub combo: Combo,
    pub ai: AiMemory,
}

impl Actor {
    pub fn new_player(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            kind: CellKind::Cancer,
            state: ActorState::Idle,
            behavior: Behavior::None,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            attack_power: PLAYER_ATTACK_POWER,
            active: true,
            grounded: false,
            facing: 1.0,
            timers: Timers::default(),
            knockback: Knockback::default(),
            combo: Combo::default(),
            ai: AiMemory::default(),
        }
    }

    /// Build an enemy from its roster entry. A spawn without health starts dead.
    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        let max_health = spawn.health.max(0.0);
        let mut enemy = Self {
            pos: spawn.pos,
            vel: Vec2::new(spawn.initial_dx, 0.0),
            size: spawn.size,
            kind: spawn.kind,
            state: ActorState::Moving,
            behavior: spawn.behavior,
            health: max_health,
            max_health,
            attack_power: spawn.attack_power,
            active: true,
            grounded: false,
            facing: if spawn.initial_dx < 0.0 { -1.0 } else { 1.0 },
            timers: Timers::default(),
            knockback: Knockback::default(),
            combo: Combo::default(),
            ai: AiMemory {
                aggression: 1.0,
                coordination_id: spawn.coordination_id,
                ..Default::default()
            },
        };
        if enemy.health <= 0.0 {
            enemy.kill();
        }
        enemy
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_alive(&self) -> bool {
        self.active && self.state != ActorState::Dead
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    /// Subtract health (clamped at zero). Returns true if this killed the actor.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.health = (self.health - amount).clamp(0.0, self.max_health);
        if self.health <= 0.0 {
            self.kill();
            true
        } else {
            self.state = ActorState::Damaged;
            false
        }
    }

    /// Invincibility-gated damage. None when the hit was absorbed by
    /// invincibility, otherwise whether it was fatal.
    pub fn take_hit(&mut self, amount: f32, invincibility: u32) -> Option<bool> {
        if !self.is_alive() || self.timers.invincibility > 0 {
            return None;
        }
        self.timers.invincibility = invincibility;
        Some(self.apply_damage(amount))
    }

    /// Restore health, never above max
    pub fn heal(&mut self, amount: f32) {
        if self.is_alive() {
            self.health = (self.health + amount.max(0.0)).min(self.max_health);
        }
    }

    pub fn kill(&mut self) {
        self.health = 0.0;
        self.state = ActorState::Dead;
        self.active = false;
        self.vel = Vec2::ZERO;
    }
}

/// A collectible that restores health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub rect: Aabb,
    pub active: bool,
}

/// Named sound effects requested from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    Jump,
    Hit,
    Death,
    Collect,
    Shoot,
    EnemyShoot,
    BossRapidFire,
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Damage,
    Fell,
}

/// Fire-and-forget notifications for the host (audio, camera, progression)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEffect),
    ScreenShake { intensity: f32, duration: u32 },
    EnemyKilled { kind: CellKind, boss: bool },
    PlayerDamaged { amount: f32 },
    PlayerDied { cause: DeathCause },
    PickupCollected,
    LevelComplete { score: u64 },
    BossPhaseChanged { phase: u8 },
}

/// Session-wide coordination and difficulty adaptation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionAi {
    pub coordination_timer: u32,
    pub active_coordinators: u32,
    /// Speed/aggression scalar, kept within the tuning bounds
    pub difficulty: f32,
    pub deaths: u32,
    pub dodges: u32,
    pub kill_streak: u32,
    pub adaptation_timer: u32,
}

impl SessionAi {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            coordination_timer: 0,
            active_coordinators: 0,
            difficulty: tuning
                .difficulty
                .initial_ai_multiplier()
                .clamp(tuning.min_difficulty, tuning.max_difficulty),
            deaths: 0,
            dodges: 0,
            kill_streak: 0,
            adaptation_timer: 0,
        }
    }

    /// Nudge difficulty toward the player's performance (rate limited)
    pub fn adapt(&mut self, player_health_fraction: f32, tuning: &Tuning) {
        if self.adaptation_timer > 0 {
            return;
        }
        if self.kill_streak >= tuning.streak_for_increase {
            self.difficulty += tuning.difficulty_step;
        } else if player_health_fraction < 0.3 {
            self.difficulty -= tuning.difficulty_step;
        } else {
            return;
        }
        self.difficulty = self.difficulty.clamp(tuning.min_difficulty, tuning.max_difficulty);
        self.adaptation_timer = tuning.adaptation_interval;
        log::debug!("AI difficulty adapted to {:.2}", self.difficulty);
    }
}

/// Complete simulation state for one play session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Static level data (never mutated by the simulation)
    pub level: LevelData,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub player: Actor,
    /// Enemy roster (index order is stable for the lifetime of a level)
    pub enemies: Vec<Actor>,
    pub pickups: Vec<Pickup>,
    pub projectiles: ProjectilePool,
    /// Visual particles (not gameplay-affecting)
    pub particles: ParticlePool,
    pub session: SessionAi,
    pub score: u64,
    pub time_ticks: u64,
    pub seed: u64,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state for `level` with the given seed
    pub fn new(level: LevelData, tuning: Tuning, seed: u64) -> Self {
        let session = SessionAi::new(&tuning);
        let mut state = Self {
            player: Actor::new_player(level.player_spawn),
            enemies: Vec::new(),
            pickups: Vec::new(),
            projectiles: ProjectilePool::new(MAX_PROJECTILES),
            particles: ParticlePool::new(MAX_PARTICLES, seed),
            level,
            tuning,
            phase: GamePhase::Playing,
            session,
            score: 0,
            time_ticks: 0,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.reset_level();
        state
    }

    /// Restore the level's original roster, pickups, pools and timers.
    /// Session difficulty and performance counters carry over.
    pub fn reset_level(&mut self) {
        self.player = Actor::new_player(self.level.player_spawn);
        self.enemies = self.level.enemies.iter().map(Actor::from_spawn).collect();
        for enemy in &mut self.enemies {
            let behavior = enemy.behavior;
            enter_behavior(enemy, behavior, &self.tuning);
        }
        self.pickups = self
            .level
            .glucose
            .iter()
            .map(|&pos| Pickup {
                rect: Aabb::from_pos_size(pos, Vec2::splat(GLUCOSE_SIZE)),
                active: true,
            })
            .collect();
        self.projectiles.clear();
        self.particles.clear();
        self.session.coordination_timer = 0;
        self.session.active_coordinators = 0;
        self.session.kill_streak = 0;
        self.phase = GamePhase::Playing;
        self.time_ticks = 0;
        self.events.clear();
        log::info!(
            "Level {} '{}' reset: {} enemies, {} platforms",
            self.level.id,
            self.level.name,
            self.enemies.len(),
            self.level.platforms.len()
        );
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events emitted by the most recent tick. The queue is cleared when the
    /// next tick starts, so an undrained queue never outgrows one tick.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Hand this tick's events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }
}
