//! Per-enemy, per-frame movement: pursuit when the player is within the
//! detection radius, random wander otherwise, scripted motion while ragdolled.

use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Enemy, EnemyState};
use crate::types::Vector2D;

/// Which movement path an enemy took this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SteerMode {
    Pursue,
    /// In range but already at the stand-off distance.
    Hold,
    Wander,
    Ragdoll,
    /// Dead; corpses do not move.
    Inert,
}

/// Ease-out curve on `[0, 1]`: fast start, slow finish.
pub fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Pursuit speed grows linearly from `speed` at the edge of the radius to
/// `speed * (1 + ease)` at the player.
pub fn pursuit_speed(speed: f64, distance: f64, detection_radius: f64, ease: f64) -> f64 {
    if detection_radius <= 0.0 {
        return speed;
    }
    let closeness = (1.0 - distance / detection_radius).clamp(0.0, 1.0);
    speed * (1.0 + ease * closeness)
}

pub fn steer(
    enemy: &mut Enemy,
    player_position: Vector2D,
    config: &GameConfig,
    dt: f64,
    rng: &mut impl Rng,
) -> SteerMode {
    if !enemy.is_alive() {
        return SteerMode::Inert;
    }
    if enemy.is_ragdoll() {
        advance_ragdoll(enemy, dt, config.arena_half_extent);
        return SteerMode::Ragdoll;
    }

    let to_player = player_position.sub(enemy.position);
    let distance = to_player.length();
    if distance <= config.detection_radius {
        let Some(direction) = to_player.normalized() else {
            return SteerMode::Hold;
        };
        enemy.facing = direction;
        let room = distance - config.standoff_distance;
        if room <= 0.0 {
            return SteerMode::Hold;
        }
        let speed = pursuit_speed(enemy.speed, distance, config.detection_radius, config.pursuit_ease);
        let step = (speed * dt).min(room);
        enemy.position = enemy
            .position
            .add(direction.scale(step))
            .clamp_to_arena(config.arena_half_extent);
        SteerMode::Pursue
    } else {
        let jitter = config.wander_jitter * dt;
        if jitter > 0.0 {
            let offset = Vector2D::new(rng.gen_range(-jitter..=jitter), rng.gen_range(-jitter..=jitter));
            enemy.position = enemy.position.add(offset).clamp_to_arena(config.arena_half_extent);
        }
        SteerMode::Wander
    }
}

/// Move a ragdolled enemy along its knockback velocity. Over the full
/// duration the enemy travels exactly `velocity * duration`.
pub fn advance_ragdoll(enemy: &mut Enemy, dt: f64, arena_half_extent: f64) {
    let EnemyState::Ragdoll { velocity, elapsed, duration } = enemy.state else {
        return;
    };
    let next = (elapsed + dt).min(duration);
    let travelled = ease_out(next / duration) - ease_out(elapsed / duration);
    enemy.position = enemy
        .position
        .add(velocity.scale(duration * travelled))
        .clamp_to_arena(arena_half_extent);
    enemy.state = if next >= duration {
        EnemyState::Active
    } else {
        EnemyState::Ragdoll { velocity, elapsed: next, duration }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::EnemyId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn enemy_at(x: f64, z: f64) -> Enemy {
        Enemy::new(EnemyId(1), Vector2D::new(x, z), 4.0, 30.0)
    }

    #[test]
    fn pursues_inside_radius() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = enemy_at(0.0, 20.0);
        let mode = steer(&mut enemy, Vector2D::ZERO, &config, 0.1, &mut rng);
        assert_eq!(mode, SteerMode::Pursue);
        assert!(enemy.position.z < 20.0);
        assert!(enemy.position.x.abs() < 1e-12);
        assert_eq!(enemy.facing, Vector2D::new(0.0, -1.0));
    }

    #[test]
    fn closer_enemies_move_faster() {
        let near = pursuit_speed(4.0, 5.0, 40.0, 0.5);
        let far = pursuit_speed(4.0, 35.0, 40.0, 0.5);
        assert!(near > far);
        assert_eq!(pursuit_speed(4.0, 40.0, 40.0, 0.5), 4.0);
        assert_eq!(pursuit_speed(4.0, 0.0, 40.0, 0.5), 6.0);
    }

    #[test]
    fn stops_at_standoff_distance() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = enemy_at(2.0, 0.0);
        for _ in 0..100 {
            steer(&mut enemy, Vector2D::ZERO, &config, 0.1, &mut rng);
        }
        let distance = enemy.position.length();
        assert!((distance - config.standoff_distance).abs() < 1e-9);
        assert_eq!(steer(&mut enemy, Vector2D::ZERO, &config, 0.1, &mut rng), SteerMode::Hold);
    }

    #[test]
    fn zero_distance_does_not_produce_nan() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = enemy_at(0.0, 0.0);
        let mode = steer(&mut enemy, Vector2D::ZERO, &config, 0.1, &mut rng);
        assert_eq!(mode, SteerMode::Hold);
        assert_eq!(enemy.position, Vector2D::ZERO);
    }

    #[test]
    fn wanders_outside_radius_within_jitter_bound() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = enemy_at(50.0, 50.0);
        let before = enemy.position;
        let dt = 0.1;
        let mode = steer(&mut enemy, Vector2D::ZERO, &config, dt, &mut rng);
        assert_eq!(mode, SteerMode::Wander);
        let delta = enemy.position.sub(before);
        assert!(delta.x.abs() <= config.wander_jitter * dt);
        assert!(delta.z.abs() <= config.wander_jitter * dt);
    }

    #[test]
    fn ragdoll_travels_full_distance_then_recovers() {
        let mut enemy = enemy_at(0.0, 0.0);
        enemy.knock_back(Vector2D::new(8.0, 0.0), 0.5);
        let mut frames = 0;
        while enemy.is_ragdoll() {
            advance_ragdoll(&mut enemy, 0.016, 60.0);
            frames += 1;
            assert!(frames < 1000);
        }
        assert!((enemy.position.x - 4.0).abs() < 1e-9);
        assert_eq!(enemy.state, EnemyState::Active);
    }

    #[test]
    fn ragdoll_suspends_pursuit() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut enemy = enemy_at(0.0, 10.0);
        enemy.knock_back(Vector2D::new(0.0, 8.0), 0.5);
        let mode = steer(&mut enemy, Vector2D::ZERO, &config, 0.1, &mut rng);
        assert_eq!(mode, SteerMode::Ragdoll);
        assert!(enemy.position.z > 10.0);
    }

    #[test]
    fn ease_out_is_front_loaded() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
    }
}
