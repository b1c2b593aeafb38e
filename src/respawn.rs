//! Player life cycle: Alive -> Dead(countdown) -> Alive.

use log::{info, warn};
use rand::Rng;

use crate::config::GameConfig;
use crate::types::Vector2D;

/// Used when no random point is far enough from every enemy.
pub const FALLBACK_SPAWN: Vector2D = Vector2D::ZERO;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LifeState {
    Alive,
    Dead {
        /// Seconds left on the automatic respawn countdown.
        remaining: f64,
        since_death: f64,
    },
}

impl LifeState {
    pub fn is_alive(&self) -> bool {
        matches!(self, LifeState::Alive)
    }

    pub fn respawn_in(&self) -> Option<f64> {
        match self {
            LifeState::Alive => None,
            LifeState::Dead { remaining, .. } => Some(*remaining),
        }
    }

    pub fn die(&mut self, config: &GameConfig) {
        if self.is_alive() {
            info!("Player died; respawning in {:.1}s", config.respawn_countdown);
            *self = LifeState::Dead {
                remaining: config.respawn_countdown,
                since_death: 0.0,
            };
        }
    }

    /// Advance the countdown. Returns true when the player should respawn now,
    /// either because the countdown ran out or because a manual respawn was
    /// requested after the minimum delay.
    pub fn tick(&mut self, dt: f64, manual_request: bool, config: &GameConfig) -> bool {
        let LifeState::Dead { remaining, since_death } = *self else {
            return false;
        };
        let remaining = (remaining - dt).max(0.0);
        let since_death = since_death + dt;
        *self = LifeState::Dead { remaining, since_death };
        remaining <= 0.0 || (manual_request && since_death >= config.manual_respawn_delay)
    }

    pub fn revive(&mut self) {
        *self = LifeState::Alive;
    }
}

/// Pick a random arena point at least `safe_spawn_distance` from every living
/// enemy, giving up after `spawn_attempts` tries.
pub fn find_spawn_point(enemy_positions: &[Vector2D], config: &GameConfig, rng: &mut impl Rng) -> Vector2D {
    let extent = config.arena_half_extent;
    for _ in 0..config.spawn_attempts {
        let candidate = Vector2D::new(rng.gen_range(-extent..=extent), rng.gen_range(-extent..=extent));
        if is_safe(candidate, enemy_positions, config.safe_spawn_distance) {
            return candidate;
        }
    }
    warn!(
        "No safe spawn point after {} attempts, using fallback",
        config.spawn_attempts
    );
    FALLBACK_SPAWN
}

pub fn is_safe(point: Vector2D, enemy_positions: &[Vector2D], safe_distance: f64) -> bool {
    enemy_positions.iter().all(|enemy| enemy.distance(point) >= safe_distance)
}
