//! Hit resolution for the player's weapon and melee strike, and for enemies
//! reaching the player.
//!
//! Both player attacks use the same cone test: a target qualifies when it is
//! within range and the cosine between the player's facing and the direction
//! to the target is strictly greater than the accuracy threshold.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::entities::{DamageOutcome, Enemy, EnemyId, Player};
use crate::types::Vector2D;

/// Cumulative score, kills and time alive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub score: u32,
    pub kills: u32,
    pub survival_time: f64,
}

impl Stats {
    fn record_kill(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.kills = self.kills.saturating_add(1);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotOutcome {
    /// Dead, cooling down or reloading; nothing happened.
    NotReady,
    /// Trigger pulled on an empty magazine.
    DryFire,
    Miss,
    Hit { target: EnemyId, distance: f64 },
    Kill { target: EnemyId, distance: f64, points: u32 },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeleeReport {
    pub hits: Vec<EnemyId>,
    pub kills: Vec<(EnemyId, u32)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContactReport {
    pub damage_taken: f64,
    pub player_killed: bool,
}

/// Distance to `target` if it lies inside the cone, `None` otherwise.
pub fn cone_check(origin: Vector2D, facing: Vector2D, range: f64, accuracy: f64, target: Vector2D) -> Option<f64> {
    let displacement = target.sub(origin);
    let distance = displacement.length();
    if distance > range {
        return None;
    }
    let angle_cos = match (displacement.normalized(), facing.normalized()) {
        (Some(direction), Some(facing)) => facing.dot(direction),
        // Standing on top of the target: treat as dead ahead.
        (None, _) => 1.0,
        (Some(_), None) => return None,
    };
    (angle_cos > accuracy).then_some(distance)
}

/// Index and distance of the nearest living enemy inside the cone.
pub fn find_target(origin: Vector2D, facing: Vector2D, range: f64, accuracy: f64, enemies: &[Enemy]) -> Option<(usize, f64)> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_alive())
        .filter_map(|(index, enemy)| cone_check(origin, facing, range, accuracy, enemy.position).map(|d| (index, d)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn kill_score(config: &GameConfig, distance: f64) -> u32 {
    let bonus = (distance.max(0.0) * config.distance_bonus_per_unit).floor() as u32;
    config.kill_score_base.saturating_add(bonus)
}

/// Fire the player's weapon at the nearest enemy in its accuracy cone.
pub fn fire(player: &mut Player, enemies: &mut [Enemy], stats: &mut Stats, config: &GameConfig, now: f64) -> ShotOutcome {
    if !player.is_alive() || !player.weapon.is_ready() {
        return ShotOutcome::NotReady;
    }
    if !player.weapon.consume_round() {
        debug!("Dry fire with {}", player.weapon.kind.name());
        return ShotOutcome::DryFire;
    }

    let weapon = &player.weapon;
    let Some((index, distance)) = find_target(player.position, player.facing, weapon.range, weapon.accuracy, enemies) else {
        debug!("Shot missed ({} rounds left)", weapon.ammo);
        return ShotOutcome::Miss;
    };

    let enemy = &mut enemies[index];
    match enemy.take_damage(weapon.damage, now) {
        DamageOutcome::Killed => {
            let points = kill_score(config, distance);
            stats.record_kill(points);
            info!("Enemy {:?} killed at distance {:.1} for {} points", enemy.id, distance, points);
            ShotOutcome::Kill { target: enemy.id, distance, points }
        }
        _ => {
            debug!("Enemy {:?} hit at distance {:.1}, {:.0} hp left", enemy.id, distance, enemy.health.current());
            ShotOutcome::Hit { target: enemy.id, distance }
        }
    }
}

/// Strike every enemy inside the short melee cone. Returns `None` while the
/// melee cooldown is running.
pub fn melee(player: &mut Player, enemies: &mut [Enemy], stats: &mut Stats, config: &GameConfig, now: f64) -> Option<MeleeReport> {
    if !player.is_alive() || player.melee_cooldown > 0.0 {
        return None;
    }
    player.melee_cooldown = config.melee_cooldown;

    let mut report = MeleeReport::default();
    for enemy in enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
        let Some(distance) = cone_check(player.position, player.facing, config.melee_range, config.melee_accuracy, enemy.position) else {
            continue;
        };
        report.hits.push(enemy.id);
        match enemy.take_damage(config.melee_damage, now) {
            DamageOutcome::Killed => {
                let points = kill_score(config, distance);
                stats.record_kill(points);
                report.kills.push((enemy.id, points));
            }
            _ => {
                let push = enemy.position.sub(player.position).normalized().unwrap_or(player.facing);
                enemy.knock_back(push.scale(config.knockback_speed), config.ragdoll_duration);
            }
        }
    }
    debug!("Melee hit {} enemies, killed {}", report.hits.len(), report.kills.len());
    Some(report)
}

/// Let enemies in contact range strike the player, each gated by its own cooldown.
pub fn enemy_attacks(enemies: &mut [Enemy], player: &mut Player, config: &GameConfig, dt: f64) -> ContactReport {
    let mut report = ContactReport::default();
    for enemy in enemies.iter_mut() {
        enemy.attack_cooldown = (enemy.attack_cooldown - dt).max(0.0);
        if !enemy.is_alive() || enemy.is_ragdoll() || !player.is_alive() || enemy.attack_cooldown > 0.0 {
            continue;
        }
        if enemy.position.distance(player.position) > config.enemy_attack_range {
            continue;
        }
        enemy.attack_cooldown = config.enemy_attack_cooldown;
        match player.health.apply_damage(config.enemy_damage) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Wounded => report.damage_taken += config.enemy_damage,
            DamageOutcome::Killed => {
                report.damage_taken += config.enemy_damage;
                report.player_killed = true;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Weapon, WeaponKind};

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn player() -> Player {
        let mut player = Player::new(Vector2D::ZERO, 10.0, 100.0);
        let mut weapon = Weapon::new(WeaponKind::Pistol);
        weapon.range = 50.0;
        weapon.accuracy = 0.9;
        weapon.damage = 12.0;
        player.weapon = weapon;
        player
    }

    fn enemy(id: u64, x: f64, z: f64, hp: f64) -> Enemy {
        Enemy::new(EnemyId(id), Vector2D::new(x, z), 4.0, hp)
    }

    #[test]
    fn enemy_straight_ahead_takes_exact_damage() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 10.0, 30.0)];
        let mut stats = Stats::default();
        let outcome = fire(&mut player, &mut enemies, &mut stats, &config(), 0.0);
        assert_eq!(outcome, ShotOutcome::Hit { target: EnemyId(1), distance: 10.0 });
        assert_eq!(enemies[0].health.current(), 18.0);
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn out_of_range_enemy_is_never_selected() {
        let mut player = player();
        player.facing = Vector2D::new(1.0, 1.0).normalized().unwrap();
        let mut enemies = vec![enemy(1, 100.0, 100.0, 30.0)];
        let mut stats = Stats::default();
        let outcome = fire(&mut player, &mut enemies, &mut stats, &config(), 0.0);
        assert_eq!(outcome, ShotOutcome::Miss);
        assert_eq!(enemies[0].health.current(), 30.0);
    }

    #[test]
    fn nearest_enemy_in_cone_is_hit() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 8.0, 30.0), enemy(2, 0.0, 5.0, 30.0)];
        let mut stats = Stats::default();
        let outcome = fire(&mut player, &mut enemies, &mut stats, &config(), 0.0);
        assert_eq!(outcome, ShotOutcome::Hit { target: EnemyId(2), distance: 5.0 });
        assert_eq!(enemies[0].health.current(), 30.0);
        assert_eq!(enemies[1].health.current(), 18.0);
    }

    #[test]
    fn enemy_outside_cone_is_ignored() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 5.0, 0.0, 30.0), enemy(2, 0.0, -5.0, 30.0)];
        let mut stats = Stats::default();
        assert_eq!(fire(&mut player, &mut enemies, &mut stats, &config(), 0.0), ShotOutcome::Miss);
    }

    #[test]
    fn dead_enemies_are_not_targets() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 3.0, 30.0), enemy(2, 0.0, 9.0, 30.0)];
        enemies[0].take_damage(100.0, 0.0);
        let mut stats = Stats::default();
        let outcome = fire(&mut player, &mut enemies, &mut stats, &config(), 1.0);
        assert_eq!(outcome, ShotOutcome::Hit { target: EnemyId(2), distance: 9.0 });
    }

    #[test]
    fn kill_awards_base_plus_distance_bonus() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 10.0, 10.0)];
        let mut stats = Stats::default();
        let outcome = fire(&mut player, &mut enemies, &mut stats, &config(), 4.0);
        let points = kill_score(&config(), 10.0);
        assert_eq!(points, 120);
        assert_eq!(outcome, ShotOutcome::Kill { target: EnemyId(1), distance: 10.0, points });
        assert_eq!(stats.score, points);
        assert_eq!(stats.kills, 1);
        assert_eq!(enemies[0].died_at, Some(4.0));
        assert!(!enemies[0].is_alive());
    }

    #[test]
    fn cooldown_and_ammo_gate_firing() {
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 10.0, 1000.0)];
        let mut stats = Stats::default();
        let config = config();
        assert!(matches!(fire(&mut player, &mut enemies, &mut stats, &config, 0.0), ShotOutcome::Hit { .. }));
        assert_eq!(fire(&mut player, &mut enemies, &mut stats, &config, 0.0), ShotOutcome::NotReady);

        player.weapon.ammo = 0;
        player.weapon.tick(1.0);
        assert_eq!(fire(&mut player, &mut enemies, &mut stats, &config, 1.0), ShotOutcome::DryFire);
    }

    #[test]
    fn melee_hits_every_enemy_in_cone_and_knocks_back() {
        let config = config();
        let mut player = player();
        let mut enemies = vec![
            enemy(1, 0.0, 2.0, 30.0),
            enemy(2, 0.5, 2.5, 30.0),
            enemy(3, 0.0, -2.0, 30.0),
            enemy(4, 0.0, 10.0, 30.0),
        ];
        let mut stats = Stats::default();
        let report = melee(&mut player, &mut enemies, &mut stats, &config, 0.0).unwrap();
        assert_eq!(report.hits, vec![EnemyId(1), EnemyId(2)]);
        assert!(report.kills.is_empty());
        assert!(enemies[0].is_ragdoll() && enemies[1].is_ragdoll());
        assert!(!enemies[2].is_ragdoll() && !enemies[3].is_ragdoll());
        assert_eq!(enemies[0].health.current(), 30.0 - config.melee_damage);
        assert_eq!(enemies[2].health.current(), 30.0);

        assert!(melee(&mut player, &mut enemies, &mut stats, &config, 0.1).is_none());
    }

    #[test]
    fn melee_kills_score_without_knockback() {
        let config = config();
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 2.0, 5.0)];
        let mut stats = Stats::default();
        let report = melee(&mut player, &mut enemies, &mut stats, &config, 0.0).unwrap();
        assert_eq!(report.kills, vec![(EnemyId(1), kill_score(&config, 2.0))]);
        assert!(!enemies[0].is_ragdoll());
        assert_eq!(stats.kills, 1);
    }

    #[test]
    fn contact_attacks_respect_cooldown() {
        let config = config();
        let mut player = player();
        let mut enemies = vec![enemy(1, 0.0, 1.5, 30.0), enemy(2, 0.0, 10.0, 30.0)];
        let report = enemy_attacks(&mut enemies, &mut player, &config, 0.016);
        assert_eq!(report.damage_taken, config.enemy_damage);
        let report = enemy_attacks(&mut enemies, &mut player, &config, 0.016);
        assert_eq!(report.damage_taken, 0.0);
        assert_eq!(player.health.current(), 100.0 - config.enemy_damage);
    }

    #[test]
    fn contact_attack_can_kill_player() {
        let config = config();
        let mut player = player();
        player.health.apply_damage(95.0);
        let mut enemies = vec![enemy(1, 1.0, 0.0, 30.0)];
        let report = enemy_attacks(&mut enemies, &mut player, &config, 0.016);
        assert!(report.player_killed);
        assert!(!player.is_alive());
    }
}
