use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::Vector2D;

// --- Health ---

/// Result of applying damage to a [`Health`] pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was already dead or the amount was not positive.
    Ignored,
    Wounded,
    Killed,
}

/// Hit points clamped to `[0, max]`. An actor is alive iff `current > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health {
    current: f64,
    max: f64,
}

impl Health {
    pub fn new(max: f64) -> Self {
        let max = max.max(0.0);
        Health { current: max, max }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn apply_damage(&mut self, amount: f64) -> DamageOutcome {
        if !self.is_alive() || !(amount > 0.0) {
            return DamageOutcome::Ignored;
        }
        self.current = (self.current - amount).max(0.0);
        if self.current > 0.0 {
            DamageOutcome::Wounded
        } else {
            DamageOutcome::Killed
        }
    }

    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Change the maximum while keeping the current/max ratio. Dead pools stay dead.
    pub fn rescale_max(&mut self, new_max: f64) {
        let new_max = new_max.max(0.0);
        if self.max > 0.0 {
            self.current = (self.current / self.max * new_max).clamp(0.0, new_max);
        }
        self.max = new_max;
    }
}

// --- Weapons ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Rifle,
    Shotgun,
}

impl WeaponKind {
    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::Pistol => "Pistol",
            WeaponKind::Rifle => "Rifle",
            WeaponKind::Shotgun => "Shotgun",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub damage: f64,
    pub range: f64,
    /// Minimum cosine between facing and the direction to a target.
    pub accuracy: f64,
    pub fire_cooldown: f64,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reload_time: f64,
    cooldown_remaining: f64,
    reload_remaining: Option<f64>,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        let (damage, range, accuracy, fire_cooldown, max_ammo, reload_time) = match kind {
            WeaponKind::Pistol => (15.0, 50.0, 0.9, 0.35, 12, 1.2),
            WeaponKind::Rifle => (25.0, 70.0, 0.95, 0.15, 30, 2.0),
            WeaponKind::Shotgun => (45.0, 20.0, 0.8, 0.8, 6, 2.5),
        };
        Weapon {
            kind,
            damage,
            range,
            accuracy,
            fire_cooldown,
            ammo: max_ammo,
            max_ammo,
            reload_time,
            cooldown_remaining: 0.0,
            reload_remaining: None,
        }
    }

    pub fn is_reloading(&self) -> bool {
        self.reload_remaining.is_some()
    }

    /// True when the trigger would do anything this frame (cooldown over, not reloading).
    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0 && !self.is_reloading()
    }

    /// Spend one round and restart the cooldown. Returns false on an empty magazine.
    pub fn consume_round(&mut self) -> bool {
        if self.ammo == 0 {
            return false;
        }
        self.ammo -= 1;
        self.cooldown_remaining = self.fire_cooldown;
        true
    }

    pub fn start_reload(&mut self) -> bool {
        if self.is_reloading() || self.ammo == self.max_ammo {
            return false;
        }
        debug!("Reloading {} ({}s)", self.kind.name(), self.reload_time);
        self.reload_remaining = Some(self.reload_time);
        true
    }

    pub fn refill(&mut self) {
        self.ammo = self.max_ammo;
        self.reload_remaining = None;
    }

    /// Advance cooldown and reload timers. Returns true when a reload finished this tick.
    pub fn tick(&mut self, dt: f64) -> bool {
        self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        match self.reload_remaining {
            Some(remaining) if remaining - dt <= 0.0 => {
                self.refill();
                true
            }
            Some(remaining) => {
                self.reload_remaining = Some(remaining - dt);
                false
            }
            None => false,
        }
    }
}

// --- Player ---

pub struct Player {
    pub position: Vector2D,
    pub facing: Vector2D,
    pub speed: f64,
    pub health: Health,
    pub weapon: Weapon,
    pub melee_cooldown: f64,
}

impl Player {
    pub fn new(position: Vector2D, speed: f64, max_health: f64) -> Self {
        Player {
            position,
            facing: Vector2D::FORWARD,
            speed,
            health: Health::new(max_health),
            weapon: Weapon::new(WeaponKind::Pistol),
            melee_cooldown: 0.0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Integrate movement and turn to face the direction of travel.
    pub fn update(&mut self, movement: Vector2D, dt: f64, arena_half_extent: f64) {
        if let Some(direction) = movement.normalized() {
            let magnitude = movement.length().min(1.0);
            self.position = self
                .position
                .add(direction.scale(self.speed * magnitude * dt))
                .clamp_to_arena(arena_half_extent);
            self.facing = direction;
        }
        self.melee_cooldown = (self.melee_cooldown - dt).max(0.0);
    }

    /// Put the player back in the world with full health and a fresh sidearm.
    pub fn revive(&mut self, position: Vector2D) {
        self.position = position;
        self.facing = Vector2D::FORWARD;
        self.health.reset();
        self.weapon = Weapon::new(WeaponKind::Pistol);
        self.melee_cooldown = 0.0;
    }
}

// --- Enemies ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u64);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyState {
    Active,
    /// Scripted knockback; normal steering is suspended until it expires.
    Ragdoll {
        velocity: Vector2D,
        elapsed: f64,
        duration: f64,
    },
}

pub struct Enemy {
    pub id: EnemyId,
    pub position: Vector2D,
    pub facing: Vector2D,
    pub base_speed: f64,
    pub speed: f64,
    pub base_max_health: f64,
    pub health: Health,
    pub state: EnemyState,
    pub attack_cooldown: f64,
    /// World clock time of death, used for corpse cleanup.
    pub died_at: Option<f64>,
}

impl Enemy {
    pub fn new(id: EnemyId, position: Vector2D, base_speed: f64, base_max_health: f64) -> Self {
        Enemy {
            id,
            position,
            facing: Vector2D::FORWARD,
            base_speed,
            speed: base_speed,
            base_max_health,
            health: Health::new(base_max_health),
            state: EnemyState::Active,
            attack_cooldown: 0.0,
            died_at: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn is_ragdoll(&self) -> bool {
        matches!(self.state, EnemyState::Ragdoll { .. })
    }

    /// Apply damage at world time `now`, stamping the death time on a kill.
    pub fn take_damage(&mut self, amount: f64, now: f64) -> DamageOutcome {
        let outcome = self.health.apply_damage(amount);
        if outcome == DamageOutcome::Killed {
            self.died_at = Some(now);
            self.state = EnemyState::Active;
        }
        outcome
    }

    pub fn knock_back(&mut self, velocity: Vector2D, duration: f64) {
        if !self.is_alive() {
            return;
        }
        self.state = EnemyState::Ragdoll {
            velocity,
            elapsed: 0.0,
            duration,
        };
    }

    /// Apply wave multipliers to the spawn-time stats.
    pub fn apply_multipliers(&mut self, speed_multiplier: f64, health_multiplier: f64) {
        self.speed = self.base_speed * speed_multiplier;
        if self.is_alive() {
            self.health.rescale_max(self.base_max_health * health_multiplier);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overkill_clamps_to_zero_and_second_hit_is_noop() {
        let mut health = Health::new(10.0);
        assert_eq!(health.apply_damage(25.0), DamageOutcome::Killed);
        assert_eq!(health.current(), 0.0);
        assert!(!health.is_alive());
        assert_eq!(health.apply_damage(25.0), DamageOutcome::Ignored);
        assert_eq!(health.current(), 0.0);
    }

    #[test]
    fn non_positive_damage_is_ignored() {
        let mut health = Health::new(10.0);
        assert_eq!(health.apply_damage(0.0), DamageOutcome::Ignored);
        assert_eq!(health.apply_damage(-5.0), DamageOutcome::Ignored);
        assert_eq!(health.apply_damage(f64::NAN), DamageOutcome::Ignored);
        assert_eq!(health.current(), 10.0);
    }

    #[test]
    fn rescale_keeps_ratio() {
        let mut health = Health::new(20.0);
        health.apply_damage(10.0);
        health.rescale_max(40.0);
        assert_eq!(health.max(), 40.0);
        assert_eq!(health.current(), 20.0);
    }

    #[test]
    fn enemy_kill_records_death_time() {
        let mut enemy = Enemy::new(EnemyId(1), Vector2D::ZERO, 4.0, 10.0);
        assert_eq!(enemy.take_damage(4.0, 1.0), DamageOutcome::Wounded);
        assert!(enemy.died_at.is_none());
        assert_eq!(enemy.take_damage(10.0, 2.5), DamageOutcome::Killed);
        assert_eq!(enemy.died_at, Some(2.5));
        assert_eq!(enemy.take_damage(10.0, 3.0), DamageOutcome::Ignored);
        assert_eq!(enemy.died_at, Some(2.5));
    }

    #[test]
    fn dead_enemy_cannot_be_knocked_back() {
        let mut enemy = Enemy::new(EnemyId(1), Vector2D::ZERO, 4.0, 10.0);
        enemy.take_damage(50.0, 0.0);
        enemy.knock_back(Vector2D::new(1.0, 0.0), 0.5);
        assert!(!enemy.is_ragdoll());
    }

    #[test]
    fn weapon_empties_and_reloads() {
        let mut weapon = Weapon::new(WeaponKind::Shotgun);
        for _ in 0..weapon.max_ammo {
            assert!(weapon.consume_round());
            weapon.tick(weapon.fire_cooldown);
        }
        assert!(!weapon.consume_round());
        assert!(weapon.start_reload());
        assert!(!weapon.is_ready());
        assert!(!weapon.tick(1.0));
        assert!(weapon.tick(2.0));
        assert_eq!(weapon.ammo, weapon.max_ammo);
        assert!(weapon.is_ready());
    }

    #[test]
    fn full_magazine_does_not_reload() {
        let mut weapon = Weapon::new(WeaponKind::Pistol);
        assert!(!weapon.start_reload());
    }

    #[test]
    fn player_faces_direction_of_travel() {
        let mut player = Player::new(Vector2D::ZERO, 10.0, 100.0);
        player.update(Vector2D::new(1.0, 0.0), 0.5, 60.0);
        assert_eq!(player.position, Vector2D::new(5.0, 0.0));
        assert_eq!(player.facing, Vector2D::new(1.0, 0.0));
        player.update(Vector2D::ZERO, 0.5, 60.0);
        assert_eq!(player.facing, Vector2D::new(1.0, 0.0));
    }
}
