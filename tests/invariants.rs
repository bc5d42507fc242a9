//! Property tests for simulation invariants

use cell_quest::consts::*;
use cell_quest::level::{LevelData, Platform};
use cell_quest::sim::state::{Actor, CellKind, Combo};
use cell_quest::sim::{MoveIntent, ProjectilePool, step_player};
use cell_quest::Tuning;
use glam::Vec2;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum HealthOp {
    Damage(f32),
    Heal(f32),
}

fn health_op() -> impl Strategy<Value = HealthOp> {
    prop_oneof![
        (0.0f32..200.0).prop_map(HealthOp::Damage),
        (0.0f32..200.0).prop_map(HealthOp::Heal),
    ]
}

/// Floor across the whole level plus a row of floating blocks
fn block_level(blocks: &[(f32, f32, f32)]) -> LevelData {
    let mut level = LevelData::empty(2000.0);
    level.platforms.push(Platform::solid(0.0, 500.0, 2000.0, 40.0));
    for (k, &(w, y, h)) in blocks.iter().enumerate() {
        level
            .platforms
            .push(Platform::solid(200.0 + k as f32 * 250.0, y, w, h));
    }
    level
}

fn intent() -> impl Strategy<Value = MoveIntent> {
    (any::<bool>(), any::<bool>(), prop::bool::weighted(0.1)).prop_map(|(left, right, jump)| {
        MoveIntent {
            left,
            right,
            jump_pressed: jump,
        }
    })
}

proptest! {
    #[test]
    fn prop_health_stays_clamped(ops in prop::collection::vec(health_op(), 0..50)) {
        let mut actor = Actor::new_player(Vec2::ZERO);
        for op in ops {
            match op {
                HealthOp::Damage(d) => { actor.apply_damage(d); }
                HealthOp::Heal(h) => actor.heal(h),
            }
            prop_assert!(actor.health >= 0.0 && actor.health <= actor.max_health);
            if actor.health <= 0.0 {
                prop_assert!(!actor.is_alive());
            }
        }
    }

    #[test]
    fn prop_pool_never_exceeds_capacity(capacity in 1usize..60, spawns in 0usize..200) {
        let tuning = Tuning::default();
        let mut pool = ProjectilePool::new(capacity);
        for _ in 0..spawns {
            let before = pool.active_count();
            let slot = pool.spawn(Vec2::ZERO, Vec2::X, CellKind::TCell, 1.0, &tuning);
            if before == capacity {
                prop_assert!(slot.is_none());
                prop_assert_eq!(pool.active_count(), before);
            } else {
                prop_assert!(slot.is_some());
            }
            prop_assert!(pool.active_count() <= capacity);
        }
    }

    #[test]
    fn prop_no_resting_penetration(
        start_x in 0.0f32..1900.0,
        start_y in 100.0f32..250.0,
        blocks in prop::collection::vec((100.0f32..150.0, 300.0f32..400.0, 30.0f32..60.0), 0..7),
        intents in prop::collection::vec(intent(), 1..240),
    ) {
        let level = block_level(&blocks);
        let tuning = Tuning::default();
        let mut player = Actor::new_player(Vec2::new(start_x, start_y));
        let area = player.size.x * player.size.y;

        for intent in intents {
            step_player(&mut player, intent, &level, &tuning);
            player.timers.tick();
            prop_assert!(player.is_alive());
            let bounds = player.bounds();
            for platform in level.platforms.iter().filter(|p| !p.deadly) {
                let depth = bounds.overlap_depth(&platform.rect);
                prop_assert!(depth.x * depth.y <= 0.5 * area, "penetration {:?} into {:?}", depth, platform.rect);
            }
        }
    }

    #[test]
    fn prop_combo_resets_one_tick_after_window(
        window in 1u32..90,
        hits in prop::collection::vec(prop::bool::weighted(0.05), 1..400),
    ) {
        let mut combo = Combo::default();
        for hit in hits {
            if hit {
                combo.register_hit(window);
            }
            let (count, timer) = (combo.count, combo.timer);
            combo.tick();
            if timer > 0 {
                prop_assert_eq!(combo.count, count);
            } else {
                prop_assert_eq!(combo.count, 0);
            }
            prop_assert!(combo.count <= MAX_COMBO);
        }
    }
}
