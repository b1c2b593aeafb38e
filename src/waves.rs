//! Wave and difficulty control: the spawn timer, the escalation timer, staggered
//! batch spawns and the enemy cap.

use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Enemy, EnemyId};
use crate::types::Vector2D;

#[derive(Clone, Debug, PartialEq)]
pub struct WaveState {
    pub wave: u32,
    pub spawn_interval: f64,
    pub spawn_timer: f64,
    pub difficulty_timer: f64,
    pub speed_multiplier: f64,
    pub health_multiplier: f64,
    /// Seconds until each queued batch spawn fires.
    pending: Vec<f64>,
}

/// What the controller asks the world to do after one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaveTick {
    pub spawns: u32,
    /// Set when a new wave started this tick; existing enemies need rescaling.
    pub escalated: bool,
}

impl WaveState {
    pub fn new(config: &GameConfig) -> Self {
        WaveState {
            wave: 1,
            spawn_interval: config.initial_spawn_interval,
            spawn_timer: 0.0,
            difficulty_timer: 0.0,
            speed_multiplier: 1.0,
            health_multiplier: 1.0,
            pending: Vec::new(),
        }
    }

    pub fn reset(&mut self, config: &GameConfig) {
        *self = WaveState::new(config);
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending.len()
    }

    pub fn tick(&mut self, dt: f64, config: &GameConfig) -> WaveTick {
        let mut result = WaveTick::default();

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_timer = 0.0;
            result.spawns += 1;
        }

        for delay in self.pending.iter_mut() {
            *delay -= dt;
        }

        self.difficulty_timer += dt;
        if self.difficulty_timer >= config.difficulty_interval {
            self.difficulty_timer = 0.0;
            self.escalate(config);
            result.escalated = true;
        }

        let due = self.pending.iter().filter(|delay| **delay <= 0.0).count();
        self.pending.retain(|delay| *delay > 0.0);
        result.spawns += due as u32;

        result
    }

    fn escalate(&mut self, config: &GameConfig) {
        self.wave += 1;
        self.spawn_interval = (self.spawn_interval * config.spawn_interval_damping).max(config.min_spawn_interval);
        self.speed_multiplier = (self.speed_multiplier * config.speed_multiplier_step).min(config.max_speed_multiplier);
        self.health_multiplier = (self.health_multiplier * config.health_multiplier_step).min(config.max_health_multiplier);

        let batch = config.batch_base + config.batch_per_wave * (self.wave - 1);
        self.pending.extend((0..batch).map(|i| f64::from(i) * config.batch_stagger));

        info!(
            "Wave {} started: spawn interval {:.2}s, batch of {}, speed x{:.2}, health x{:.2}",
            self.wave, self.spawn_interval, batch, self.speed_multiplier, self.health_multiplier
        );
    }
}

/// Random point on a ring around the player, clamped to the arena.
pub fn spawn_position(player_position: Vector2D, config: &GameConfig, rng: &mut impl Rng) -> Vector2D {
    let angle = rng.gen_range(0.0..2.0 * std::f64::consts::PI);
    let radius = if config.spawn_max_radius > config.spawn_min_radius {
        rng.gen_range(config.spawn_min_radius..config.spawn_max_radius)
    } else {
        config.spawn_min_radius
    };
    player_position
        .add(Vector2D::from_angle(angle).scale(radius))
        .clamp_to_arena(config.arena_half_extent)
}

/// Make room for one more enemy when the living count has reached `cap`,
/// removing the living enemies furthest from the player. Corpses do not count
/// against the cap; they leave through normal cleanup.
pub fn evict_for_spawn(enemies: &mut Vec<Enemy>, player_position: Vector2D, cap: usize) -> Vec<EnemyId> {
    let mut evicted = Vec::new();
    while cap > 0 && enemies.iter().filter(|enemy| enemy.is_alive()).count() >= cap {
        let furthest = enemies
            .iter()
            .enumerate()
            .filter(|(_, enemy)| enemy.is_alive())
            .max_by(|a, b| {
                let da = a.1.position.distance(player_position);
                let db = b.1.position.distance(player_position);
                da.total_cmp(&db)
            })
            .map(|(index, _)| index);
        let Some(index) = furthest else {
            break;
        };
        evicted.push(enemies.remove(index).id);
    }
    evicted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn enemy(id: u64, x: f64, z: f64) -> Enemy {
        Enemy::new(EnemyId(id), Vector2D::new(x, z), 4.0, 30.0)
    }

    #[test]
    fn spawn_timer_fires_on_interval() {
        let config = GameConfig::default();
        let mut waves = WaveState::new(&config);
        let mut spawns = 0;
        for _ in 0..35 {
            spawns += waves.tick(0.1, &config).spawns;
        }
        assert_eq!(spawns, 1);
        assert!(waves.spawn_timer < config.initial_spawn_interval);
    }

    #[test]
    fn escalation_queues_staggered_batch() {
        let config = GameConfig { difficulty_interval: 10.0, initial_spawn_interval: 100.0, ..GameConfig::default() };
        let mut waves = WaveState::new(&config);
        let tick = waves.tick(10.0, &config);
        assert!(tick.escalated);
        assert_eq!(waves.wave, 2);
        // First of the batch has zero delay and fires immediately.
        assert_eq!(tick.spawns, 1);
        let batch = config.batch_base + config.batch_per_wave;
        assert_eq!(waves.pending_spawns(), batch as usize - 1);

        let mut later = 0;
        for _ in 0..20 {
            later += waves.tick(config.batch_stagger / 4.0, &config).spawns;
        }
        assert_eq!(later, batch - 1);
        assert_eq!(waves.pending_spawns(), 0);
    }

    #[test]
    fn multipliers_are_bounded() {
        let config = GameConfig { difficulty_interval: 1.0, ..GameConfig::default() };
        let mut waves = WaveState::new(&config);
        for _ in 0..200 {
            waves.tick(1.0, &config);
        }
        assert!(waves.speed_multiplier <= config.max_speed_multiplier);
        assert!(waves.health_multiplier <= config.max_health_multiplier);
        assert_eq!(waves.spawn_interval, config.min_spawn_interval);
    }

    #[test]
    fn reset_returns_to_first_wave() {
        let config = GameConfig { difficulty_interval: 1.0, ..GameConfig::default() };
        let mut waves = WaveState::new(&config);
        waves.tick(1.0, &config);
        waves.reset(&config);
        assert_eq!(waves, WaveState::new(&config));
    }

    #[test]
    fn eviction_removes_furthest_living_enemy() {
        let mut enemies = vec![enemy(1, 5.0, 0.0), enemy(2, 30.0, 0.0), enemy(3, 10.0, 0.0)];
        let evicted = evict_for_spawn(&mut enemies, Vector2D::ZERO, 3);
        assert_eq!(evicted, vec![EnemyId(2)]);
        assert_eq!(enemies.len(), 2);
    }

    #[test]
    fn corpses_do_not_count_against_cap() {
        let mut enemies = vec![enemy(1, 5.0, 0.0), enemy(2, 50.0, 0.0)];
        enemies[1].take_damage(100.0, 0.0);
        assert!(evict_for_spawn(&mut enemies, Vector2D::ZERO, 2).is_empty());

        let evicted = evict_for_spawn(&mut enemies, Vector2D::ZERO, 1);
        assert_eq!(evicted, vec![EnemyId(1)]);
        assert_eq!(enemies.len(), 1);
        assert_eq!(enemies[0].id, EnemyId(2));
    }

    #[test]
    fn no_eviction_below_cap() {
        let mut enemies = vec![enemy(1, 5.0, 0.0)];
        assert!(evict_for_spawn(&mut enemies, Vector2D::ZERO, 3).is_empty());
    }

    #[test]
    fn spawn_position_is_on_ring_inside_arena() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let p = spawn_position(Vector2D::ZERO, &config, &mut rng);
            assert!(p.x.abs() <= config.arena_half_extent && p.z.abs() <= config.arena_half_extent);
            assert!(p.length() <= config.spawn_max_radius + 1e-9);
        }
    }

    proptest! {
        #[test]
        fn spawn_interval_never_increases_or_drops_below_floor(
            steps in prop::collection::vec(0.0f64..20.0, 1..200),
        ) {
            let config = GameConfig { difficulty_interval: 5.0, ..GameConfig::default() };
            let mut waves = WaveState::new(&config);
            let mut previous = waves.spawn_interval;
            for dt in steps {
                waves.tick(dt, &config);
                prop_assert!(waves.spawn_interval <= previous);
                prop_assert!(waves.spawn_interval >= config.min_spawn_interval);
                previous = waves.spawn_interval;
            }
        }
    }
}
