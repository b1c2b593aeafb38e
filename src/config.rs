//! Runtime tunables.
//!
//! Every field defaults to the matching value in [`crate::constants`]; a JSON
//! file only needs to name the fields it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena_half_extent: f64,
    pub max_frame_dt: f64,

    pub player_speed: f64,
    pub player_max_health: f64,
    /// `None` means unlimited respawns.
    pub lives: Option<u32>,

    pub enemy_speed: f64,
    pub enemy_max_health: f64,
    pub detection_radius: f64,
    pub standoff_distance: f64,
    pub pursuit_ease: f64,
    pub wander_jitter: f64,
    pub enemy_attack_range: f64,
    pub enemy_damage: f64,
    pub enemy_attack_cooldown: f64,
    pub corpse_linger: f64,

    pub melee_range: f64,
    pub melee_accuracy: f64,
    pub melee_damage: f64,
    pub melee_cooldown: f64,
    pub knockback_speed: f64,
    pub ragdoll_duration: f64,

    pub kill_score_base: u32,
    pub distance_bonus_per_unit: f64,

    pub initial_spawn_interval: f64,
    pub min_spawn_interval: f64,
    pub spawn_interval_damping: f64,
    pub difficulty_interval: f64,
    pub max_enemies: usize,
    pub batch_base: u32,
    pub batch_per_wave: u32,
    pub batch_stagger: f64,
    pub speed_multiplier_step: f64,
    pub health_multiplier_step: f64,
    pub max_speed_multiplier: f64,
    pub max_health_multiplier: f64,
    pub spawn_min_radius: f64,
    pub spawn_max_radius: f64,

    pub respawn_countdown: f64,
    pub manual_respawn_delay: f64,
    pub safe_spawn_distance: f64,
    pub spawn_attempts: u32,

    pub pickup_interval: f64,
    pub pickup_radius: f64,
    pub max_pickups: usize,

    pub peer_timeout: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            arena_half_extent: ARENA_HALF_EXTENT,
            max_frame_dt: MAX_FRAME_DT,
            player_speed: PLAYER_SPEED,
            player_max_health: PLAYER_MAX_HEALTH,
            lives: None,
            enemy_speed: ENEMY_SPEED,
            enemy_max_health: ENEMY_MAX_HEALTH,
            detection_radius: DETECTION_RADIUS,
            standoff_distance: STANDOFF_DISTANCE,
            pursuit_ease: PURSUIT_EASE,
            wander_jitter: WANDER_JITTER,
            enemy_attack_range: ENEMY_ATTACK_RANGE,
            enemy_damage: ENEMY_DAMAGE,
            enemy_attack_cooldown: ENEMY_ATTACK_COOLDOWN,
            corpse_linger: CORPSE_LINGER,
            melee_range: MELEE_RANGE,
            melee_accuracy: MELEE_ACCURACY,
            melee_damage: MELEE_DAMAGE,
            melee_cooldown: MELEE_COOLDOWN,
            knockback_speed: KNOCKBACK_SPEED,
            ragdoll_duration: RAGDOLL_DURATION,
            kill_score_base: KILL_SCORE_BASE,
            distance_bonus_per_unit: DISTANCE_BONUS_PER_UNIT,
            initial_spawn_interval: INITIAL_SPAWN_INTERVAL,
            min_spawn_interval: MIN_SPAWN_INTERVAL,
            spawn_interval_damping: SPAWN_INTERVAL_DAMPING,
            difficulty_interval: DIFFICULTY_INTERVAL,
            max_enemies: MAX_ENEMIES,
            batch_base: BATCH_BASE,
            batch_per_wave: BATCH_PER_WAVE,
            batch_stagger: BATCH_STAGGER,
            speed_multiplier_step: SPEED_MULTIPLIER_STEP,
            health_multiplier_step: HEALTH_MULTIPLIER_STEP,
            max_speed_multiplier: MAX_SPEED_MULTIPLIER,
            max_health_multiplier: MAX_HEALTH_MULTIPLIER,
            spawn_min_radius: SPAWN_MIN_RADIUS,
            spawn_max_radius: SPAWN_MAX_RADIUS,
            respawn_countdown: RESPAWN_COUNTDOWN,
            manual_respawn_delay: MANUAL_RESPAWN_DELAY,
            safe_spawn_distance: SAFE_SPAWN_DISTANCE,
            spawn_attempts: SPAWN_ATTEMPTS,
            pickup_interval: PICKUP_INTERVAL,
            pickup_radius: PICKUP_RADIUS,
            max_pickups: MAX_PICKUPS,
            peer_timeout: PEER_TIMEOUT,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        }

        if self.arena_half_extent <= 0.0 {
            return invalid("arena_half_extent", "must be positive");
        }
        if self.max_frame_dt <= 0.0 {
            return invalid("max_frame_dt", "must be positive");
        }
        if self.player_max_health <= 0.0 {
            return invalid("player_max_health", "must be positive");
        }
        if self.enemy_max_health <= 0.0 {
            return invalid("enemy_max_health", "must be positive");
        }
        if self.min_spawn_interval <= 0.0 {
            return invalid("min_spawn_interval", "must be positive");
        }
        if self.initial_spawn_interval < self.min_spawn_interval {
            return invalid("initial_spawn_interval", "must not be below min_spawn_interval");
        }
        if !(0.0..=1.0).contains(&self.spawn_interval_damping) || self.spawn_interval_damping == 0.0 {
            return invalid("spawn_interval_damping", "must be in (0, 1]");
        }
        if self.difficulty_interval <= 0.0 {
            return invalid("difficulty_interval", "must be positive");
        }
        if self.max_enemies == 0 {
            return invalid("max_enemies", "must be at least 1");
        }
        if self.speed_multiplier_step < 1.0 || self.health_multiplier_step < 1.0 {
            return invalid("multiplier_step", "must be at least 1");
        }
        if self.spawn_min_radius > self.spawn_max_radius {
            return invalid("spawn_min_radius", "must not exceed spawn_max_radius");
        }
        if !(-1.0..=1.0).contains(&self.melee_accuracy) {
            return invalid("melee_accuracy", "must be a cosine in [-1, 1]");
        }
        if self.ragdoll_duration <= 0.0 {
            return invalid("ragdoll_duration", "must be positive");
        }
        if self.standoff_distance < 0.0 {
            return invalid("standoff_distance", "must not be negative");
        }
        Ok(())
    }
}
