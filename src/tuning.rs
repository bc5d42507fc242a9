//! Data-driven game balance
//!
//! Every gameplay knob the simulation reads lives here so a host can load
//! alternative balance from JSON. Missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

/// Difficulty preset chosen by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Starting value of the session's AI difficulty multiplier
    pub fn initial_ai_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.2,
        }
    }
}

/// Gameplay balance values (per-tick units: pixels, pixels/tick, ticks)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub difficulty: Difficulty,

    // === Movement ===
    pub gravity: f32,
    /// Upward launch speed (negative is up)
    pub jump_speed: f32,
    pub move_speed: f32,
    /// Slack allowed when deciding the feet were above a platform top
    pub landing_tolerance: f32,
    pub max_step_up_height: f32,
    pub coyote_frames: u32,
    pub jump_buffer_frames: u32,
    pub wall_contact_frames: u32,
    pub wall_jump_horizontal_speed: f32,
    pub wall_jump_vertical_speed: f32,
    pub hazard_damage: f32,

    // === Player combat ===
    pub attack_range: f32,
    pub attack_cooldown: u32,
    /// Cooldown multiplier for attacks started inside a live combo
    pub combo_cooldown_factor: f32,
    pub invincibility_frames: u32,
    pub contact_knockback: f32,
    pub player_shot_speed: f32,
    pub player_shot_damage: f32,
    pub player_shot_cooldown: u32,

    // === Combo / criticals ===
    pub combo_window: u32,
    /// Extra damage fraction per combo hit already landed
    pub combo_damage_step: f32,
    pub combo_damage_cap: f32,
    pub critical_chance: f64,
    pub critical_multiplier: f32,

    // === Enemy knockback ===
    pub knockback_force: f32,
    pub knockback_duration: u32,
    pub knockback_decay: f32,

    // === Projectiles ===
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: u32,
    pub projectile_size: f32,

    // === Enemy AI ===
    pub patrol_speed: f32,
    pub patrol_detect_range: f32,
    pub chase_speed: f32,
    pub chase_break_range: f32,
    pub shoot_range: f32,
    pub shoot_cooldown: u32,
    pub shooter_creep_speed: f32,
    pub boss_phase_health: f32,
    pub boss_cycle_ticks: u32,
    pub boss_volley_size: u32,
    pub boss_close_range: f32,
    pub boss_prediction_ticks: f32,
    pub flank_distance: f32,
    pub flank_angle: f32,
    pub flank_arrive_distance: f32,
    pub flank_give_up_ticks: u32,
    pub coordinate_duration: u32,
    pub coordinate_speed_mult: f32,
    pub coordination_update_ticks: u32,
    pub prediction_ticks: f32,
    pub ambush_range: f32,
    pub ambush_trigger_range: f32,
    pub ambush_duration: u32,
    pub ambush_speed_mult: f32,
    pub retreat_health_threshold: f32,
    pub retreat_recover_health: f32,
    pub retreat_distance: f32,
    pub retreat_speed_mult: f32,
    pub surround_distance: f32,
    pub surround_min_group: usize,
    pub line_of_sight_step: f32,

    // === Adaptive difficulty ===
    pub min_difficulty: f32,
    pub max_difficulty: f32,
    pub difficulty_step: f32,
    pub adaptation_interval: u32,
    pub streak_for_increase: u32,

    // === Pickups / scoring ===
    pub glucose_heal: f32,
    pub score_melee_hit: u64,
    pub score_projectile_hit: u64,
    pub score_kill: u64,
    pub score_level_complete: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            gravity: 0.5,
            jump_speed: -10.0,
            move_speed: 5.0,
            landing_tolerance: 8.0,
            max_step_up_height: 8.0,
            coyote_frames: 8,
            jump_buffer_frames: 6,
            wall_contact_frames: 12,
            wall_jump_horizontal_speed: 7.0,
            wall_jump_vertical_speed: -8.0,
            hazard_damage: 10.0,

            attack_range: 50.0,
            attack_cooldown: 30,
            combo_cooldown_factor: 0.7,
            invincibility_frames: 30,
            contact_knockback: 10.0,
            player_shot_speed: 8.0,
            player_shot_damage: 20.0,
            player_shot_cooldown: 20,

            combo_window: 60,
            combo_damage_step: 0.1,
            combo_damage_cap: 1.5,
            critical_chance: 0.15,
            critical_multiplier: 2.0,

            knockback_force: 8.0,
            knockback_duration: 15,
            knockback_decay: 0.8,

            projectile_speed: 5.0,
            projectile_damage: 15.0,
            projectile_lifetime: 300,
            projectile_size: 8.0,

            patrol_speed: 2.0,
            patrol_detect_range: 200.0,
            chase_speed: 3.0,
            chase_break_range: 300.0,
            shoot_range: 250.0,
            shoot_cooldown: 90,
            shooter_creep_speed: 1.0,
            boss_phase_health: 0.5,
            boss_cycle_ticks: 120,
            boss_volley_size: 3,
            boss_close_range: 100.0,
            boss_prediction_ticks: 10.0,
            flank_distance: 150.0,
            flank_angle: std::f32::consts::FRAC_PI_4,
            flank_arrive_distance: 20.0,
            flank_give_up_ticks: 240,
            coordinate_duration: 180,
            coordinate_speed_mult: 1.2,
            coordination_update_ticks: 120,
            prediction_ticks: 45.0,
            ambush_range: 250.0,
            ambush_trigger_range: 100.0,
            ambush_duration: 90,
            ambush_speed_mult: 2.0,
            retreat_health_threshold: 0.25,
            retreat_recover_health: 0.6,
            retreat_distance: 200.0,
            retreat_speed_mult: 1.2,
            surround_distance: 120.0,
            surround_min_group: 2,
            line_of_sight_step: 10.0,

            min_difficulty: 0.5,
            max_difficulty: 2.0,
            difficulty_step: 0.1,
            adaptation_interval: 300,
            streak_for_increase: 3,

            glucose_heal: 25.0,
            score_melee_hit: 10,
            score_projectile_hit: 15,
            score_kill: 150,
            score_level_complete: 1000,
        }
    }
}

impl Tuning {
    /// Defaults with a difficulty preset applied
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        log::info!("Loaded tuning (difficulty {})", tuning.difficulty.as_str());
        Ok(tuning)
    }

    /// Damage multiplier for an attack that follows `combo` consecutive hits
    pub fn combo_multiplier(&self, combo: u8) -> f32 {
        (1.0 + self.combo_damage_step * combo as f32).min(self.combo_damage_cap)
    }

    /// Cooldown for an attack, shortened while a combo is live
    pub fn attack_cooldown_for(&self, combo_live: bool) -> u32 {
        if combo_live {
            (self.attack_cooldown as f32 * self.combo_cooldown_factor).round() as u32
        } else {
            self.attack_cooldown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::from_str("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_str("medium"), None);
        assert_eq!(Difficulty::Hard.initial_ai_multiplier(), 1.2);
    }

    #[test]
    fn test_combo_multiplier_capped() {
        let t = Tuning::default();
        assert_eq!(t.combo_multiplier(0), 1.0);
        assert!((t.combo_multiplier(2) - 1.2).abs() < 1e-6);
        assert_eq!(t.combo_multiplier(20), t.combo_damage_cap);
    }

    #[test]
    fn test_combo_cooldown() {
        let t = Tuning::default();
        assert_eq!(t.attack_cooldown_for(false), 30);
        assert_eq!(t.attack_cooldown_for(true), 21);
    }

    #[test]
    fn test_from_json_partial() {
        let t = Tuning::from_json(r#"{ "gravity": 0.25, "difficulty": "Hard" }"#).unwrap();
        assert_eq!(t.gravity, 0.25);
        assert_eq!(t.difficulty, Difficulty::Hard);
        assert_eq!(t.move_speed, 5.0);
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(Tuning::from_json("{ not json").is_err());
    }
}
