//! Static level data
//!
//! Levels are plain structured data consumed by the simulation and never
//! mutated by it. The three built-in levels ship with the crate; hosts can
//! supply their own as JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::geom::Aabb;
use crate::sim::state::{Behavior, CellKind};

/// A static platform rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Aabb,
    /// Spikes or other hazards (still standable)
    #[serde(default)]
    pub deadly: bool,
}

impl Platform {
    pub fn solid(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Aabb::new(x, y, w, h),
            deadly: false,
        }
    }

    pub fn hazard(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Aabb::new(x, y, w, h),
            deadly: true,
        }
    }
}

/// Initial roster entry for one enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub pos: Vec2,
    #[serde(default = "default_enemy_size")]
    pub size: Vec2,
    pub kind: CellKind,
    pub behavior: Behavior,
    pub health: f32,
    #[serde(default = "default_enemy_attack")]
    pub attack_power: f32,
    /// Starting horizontal velocity (patrol direction)
    #[serde(default)]
    pub initial_dx: f32,
    /// Group id for coordinated behaviors (0 = none)
    #[serde(default)]
    pub coordination_id: u32,
}

fn default_enemy_size() -> Vec2 {
    Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT)
}

fn default_enemy_attack() -> f32 {
    10.0
}

impl EnemySpawn {
    pub fn new(x: f32, y: f32, kind: CellKind, behavior: Behavior, health: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: default_enemy_size(),
            kind,
            behavior,
            health,
            attack_power: default_enemy_attack(),
            initial_dx: 0.0,
            coordination_id: 0,
        }
    }

    pub fn with_dx(mut self, dx: f32) -> Self {
        self.initial_dx = dx;
        self
    }

    pub fn with_group(mut self, coordination_id: u32) -> Self {
        self.coordination_id = coordination_id;
        self
    }
}

/// Everything the simulation needs to know about one level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelData {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub width: f32,
    #[serde(default = "default_level_height")]
    pub height: f32,
    pub player_spawn: Vec2,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    /// Top-left corners of glucose pickups
    #[serde(default)]
    pub glucose: Vec<Vec2>,
    /// Goal portal (level cannot be completed without one)
    #[serde(default)]
    pub portal: Option<Aabb>,
}

fn default_level_height() -> f32 {
    SCREEN_HEIGHT
}

/// Number of built-in levels
pub const BUILTIN_LEVEL_COUNT: u32 = 3;

impl LevelData {
    /// An empty level of the given width (free fall, no enemies)
    pub fn empty(width: f32) -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            width,
            height: SCREEN_HEIGHT,
            player_spawn: Vec2::new(SCREEN_WIDTH / 4.0, SCREEN_HEIGHT / 2.0),
            platforms: Vec::new(),
            enemies: Vec::new(),
            glucose: Vec::new(),
            portal: None,
        }
    }

    /// Parse a level from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let level: LevelData = serde_json::from_str(json)?;
        log::info!(
            "Loaded level {} '{}' ({} platforms, {} enemies)",
            level.id,
            level.name,
            level.platforms.len(),
            level.enemies.len()
        );
        Ok(level)
    }

    /// Built-in level by 1-based number
    pub fn builtin(number: u32) -> Option<Self> {
        match number {
            1 => Some(blood_stream()),
            2 => Some(lymph_node()),
            3 => Some(final_battle()),
            _ => None,
        }
    }

    /// Sample the segment `from -> to` every `step` units; false if any
    /// sample lands inside a platform.
    pub fn line_of_sight(&self, from: Vec2, to: Vec2, step: f32) -> bool {
        let distance = from.distance(to);
        if distance == 0.0 {
            return true;
        }
        let samples = ((distance / step.max(1.0)) as usize).max(2);
        (0..=samples).all(|i| {
            let p = from.lerp(to, i as f32 / samples as f32);
            !self.platforms.iter().any(|plat| plat.rect.contains_point(p))
        })
    }

    /// Clamp a point into the playable area
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    /// Portal rectangle placed at the right edge, resting on `floor_y`
    fn portal_at_end(width: f32, floor_y: f32) -> Aabb {
        Aabb::new(
            width - PORTAL_WIDTH - 20.0,
            floor_y - PORTAL_HEIGHT,
            PORTAL_WIDTH,
            PORTAL_HEIGHT,
        )
    }
}

/// Wavy floor and ceiling segments with two hazard pillars and patrolling T-cells
fn blood_stream() -> LevelData {
    let width = 1600.0;
    let floor_y = |i: usize| SCREEN_HEIGHT - 100.0 + (i as f32 * 0.5).sin() * 50.0;

    let mut platforms = Vec::with_capacity(18);
    for i in 0..8 {
        platforms.push(Platform::solid(i as f32 * 200.0, floor_y(i), 200.0, 20.0));
    }
    for i in 0..8 {
        let y = 100.0 + (i as f32 * 0.5).sin() * 50.0;
        platforms.push(Platform::solid(i as f32 * 200.0, y, 200.0, 20.0));
    }
    for k in 0..2 {
        platforms.push(Platform::hazard(
            300.0 + k as f32 * 600.0,
            SCREEN_HEIGHT / 2.0,
            30.0,
            100.0,
        ));
    }

    let enemies = (0..5)
        .map(|i| {
            EnemySpawn::new(
                400.0 + i as f32 * 300.0,
                SCREEN_HEIGHT / 2.0,
                CellKind::TCell,
                Behavior::Patrol,
                50.0,
            )
            .with_dx(2.0)
        })
        .collect();

    LevelData {
        id: 1,
        name: "The Blood Stream".into(),
        description: "Navigate through blood vessels while avoiding patrolling T-cells".into(),
        width,
        height: SCREEN_HEIGHT,
        player_spawn: Vec2::new(100.0, floor_y(0) - PLAYER_HEIGHT - 40.0),
        platforms,
        enemies,
        glucose: vec![
            Vec2::new(250.0, SCREEN_HEIGHT - 150.0),
            Vec2::new(750.0, 150.0),
            Vec2::new(1250.0, SCREEN_HEIGHT - 150.0),
        ],
        portal: Some(LevelData::portal_at_end(width, floor_y(7))),
    }
}

/// Flat fortress floor guarded by shooters, flankers and an ambush group
fn lymph_node() -> LevelData {
    let width = 2400.0;
    let floor_y = SCREEN_HEIGHT - 40.0;
    let air_y = SCREEN_HEIGHT / 2.0;

    LevelData {
        id: 2,
        name: "The Lymph Node".into(),
        description: "Survive the immune system's fortress".into(),
        width,
        height: SCREEN_HEIGHT,
        player_spawn: Vec2::new(80.0, floor_y - PLAYER_HEIGHT),
        platforms: vec![
            Platform::solid(0.0, floor_y, width, 40.0),
            Platform::solid(500.0, floor_y - 120.0, 160.0, 20.0),
            Platform::solid(1100.0, floor_y - 160.0, 160.0, 20.0),
            Platform::hazard(1500.0, floor_y - 20.0, 80.0, 20.0),
        ],
        enemies: vec![
            EnemySpawn::new(600.0, air_y, CellKind::BCell, Behavior::Shoot, 40.0),
            EnemySpawn::new(900.0, air_y, CellKind::TCell, Behavior::Flank, 50.0).with_group(1),
            EnemySpawn::new(1000.0, air_y, CellKind::TCell, Behavior::Coordinate, 50.0)
                .with_group(1),
            EnemySpawn::new(1400.0, floor_y - ENEMY_HEIGHT, CellKind::Macrophage, Behavior::Ambush, 80.0),
            EnemySpawn::new(1800.0, air_y, CellKind::BCell, Behavior::Shoot, 40.0),
            EnemySpawn::new(2000.0, air_y, CellKind::TCell, Behavior::Patrol, 50.0).with_dx(-2.0),
        ],
        glucose: vec![Vec2::new(560.0, floor_y - 160.0), Vec2::new(1160.0, floor_y - 200.0)],
        portal: Some(LevelData::portal_at_end(width, floor_y)),
    }
}

/// Arena with a surround squad and the NK-cell boss
fn final_battle() -> LevelData {
    let width = 3200.0;
    let floor_y = SCREEN_HEIGHT - 40.0;
    let air_y = SCREEN_HEIGHT / 2.0;

    LevelData {
        id: 3,
        name: "The Final Battle".into(),
        description: "Face off against specialized killer cells".into(),
        width,
        height: SCREEN_HEIGHT,
        player_spawn: Vec2::new(80.0, floor_y - PLAYER_HEIGHT),
        platforms: vec![
            Platform::solid(0.0, floor_y, width, 40.0),
            Platform::solid(800.0, floor_y - 140.0, 200.0, 20.0),
            Platform::solid(1600.0, floor_y - 140.0, 200.0, 20.0),
            Platform::solid(2400.0, floor_y - 140.0, 200.0, 20.0),
        ],
        enemies: vec![
            EnemySpawn::new(1000.0, air_y, CellKind::TCell, Behavior::Surround, 50.0).with_group(2),
            EnemySpawn::new(1100.0, air_y, CellKind::TCell, Behavior::Surround, 50.0).with_group(2),
            EnemySpawn::new(1200.0, air_y, CellKind::TCell, Behavior::Surround, 50.0).with_group(2),
            EnemySpawn::new(1700.0, air_y, CellKind::Macrophage, Behavior::Retreat, 30.0),
            EnemySpawn {
                size: Vec2::new(80.0, 80.0),
                attack_power: 20.0,
                ..EnemySpawn::new(2600.0, floor_y - 200.0, CellKind::NkCell, Behavior::Boss, 400.0)
            },
        ],
        glucose: vec![Vec2::new(880.0, floor_y - 180.0), Vec2::new(1680.0, floor_y - 180.0)],
        portal: Some(LevelData::portal_at_end(width, floor_y)),
    }
}
