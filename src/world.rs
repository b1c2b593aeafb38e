//! The simulation: one `World` owns every actor and advances them in a fixed
//! phase order each frame.
//!
//! Phase order inside [`World::step`]:
//! 1. life state (dead countdown, manual respawn)
//! 2. player (movement, reload, pickups)
//! 3. enemies (steering, ragdoll)
//! 4. combat (player attacks, enemy contact attacks)
//! 5. waves (spawns, evictions, escalation)
//! 6. corpse cleanup
//!
//! Later phases read positions written by earlier ones, so the order matters.
//! While the player is dead only phases 1 and 6 run.

use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::combat::{self, MeleeReport, ShotOutcome, Stats};
use crate::config::GameConfig;
use crate::entities::{Enemy, EnemyId, Player};
use crate::hud::HudState;
use crate::input::InputSnapshot;
use crate::pickups::{PickupField, PickupKind};
use crate::respawn::{self, LifeState};
use crate::steering;
use crate::types::Vector2D;
use crate::waves::{self, WaveState};

#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    EnemySpawned(EnemyId),
    /// The enemy has left the active collection; drop its presentation object.
    EnemyDespawned(EnemyId),
    Shot(ShotOutcome),
    Melee(MeleeReport),
    PlayerHit { damage: f64 },
    PlayerDied,
    PlayerRespawned(Vector2D),
    WaveStarted(u32),
    ReloadStarted,
    ReloadFinished,
    PickupCollected(PickupKind),
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy(EnemyId),
}

/// What the presentation layer needs to draw one actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorView {
    pub kind: ActorKind,
    pub position: Vector2D,
    pub facing: Vector2D,
    pub alive: bool,
    pub ragdoll: bool,
}

pub struct World {
    pub config: GameConfig,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub waves: WaveState,
    pub stats: Stats,
    pub life: LifeState,
    pub pickups: PickupField,
    lives_left: Option<u32>,
    game_over: bool,
    clock: f64,
    next_enemy_id: u64,
    rng: StdRng,
}

impl World {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        let player = Player::new(respawn::FALLBACK_SPAWN, config.player_speed, config.player_max_health);
        World {
            player,
            enemies: Vec::new(),
            waves: WaveState::new(&config),
            stats: Stats::default(),
            life: LifeState::Alive,
            pickups: PickupField::default(),
            lives_left: config.lives,
            game_over: false,
            clock: 0.0,
            next_enemy_id: 1,
            rng,
            config,
        }
    }

    /// Seconds of simulated time since the world was created.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn living_enemies(&self) -> usize {
        self.enemies.iter().filter(|enemy| enemy.is_alive()).count()
    }

    /// Add an enemy at `position`, evicting the furthest one first if the cap is reached.
    pub fn spawn_enemy_at(&mut self, position: Vector2D, events: &mut Vec<FrameEvent>) -> EnemyId {
        for evicted in waves::evict_for_spawn(&mut self.enemies, self.player.position, self.config.max_enemies) {
            events.push(FrameEvent::EnemyDespawned(evicted));
        }
        let id = EnemyId(self.next_enemy_id);
        self.next_enemy_id += 1;
        let mut enemy = Enemy::new(id, position, self.config.enemy_speed, self.config.enemy_max_health);
        enemy.apply_multipliers(self.waves.speed_multiplier, self.waves.health_multiplier);
        self.enemies.push(enemy);
        events.push(FrameEvent::EnemySpawned(id));
        id
    }

    pub fn step(&mut self, input: &InputSnapshot, dt: f64) -> Vec<FrameEvent> {
        let mut events = Vec::new();
        if self.game_over || !(dt > 0.0) {
            return events;
        }
        let dt = dt.min(self.config.max_frame_dt);
        self.clock += dt;

        self.step_life(input, dt, &mut events);
        if self.life.is_alive() {
            self.step_player(input, dt, &mut events);
            self.step_enemies(dt);
            self.step_combat(input, dt, &mut events);
        }
        if self.life.is_alive() {
            self.step_waves(dt, &mut events);
        }
        self.cleanup_corpses(&mut events);
        events
    }

    fn step_life(&mut self, input: &InputSnapshot, dt: f64, events: &mut Vec<FrameEvent>) {
        if self.life.tick(dt, input.respawn, &self.config) {
            self.respawn_player(events);
        }
    }

    fn step_player(&mut self, input: &InputSnapshot, dt: f64, events: &mut Vec<FrameEvent>) {
        self.player.update(input.clamped_movement(), dt, self.config.arena_half_extent);
        self.stats.survival_time += dt;

        if input.reload && self.player.weapon.start_reload() {
            events.push(FrameEvent::ReloadStarted);
        }
        if self.player.weapon.tick(dt) {
            events.push(FrameEvent::ReloadFinished);
        }

        self.pickups.tick(dt, &self.config, &mut self.rng);
        for kind in self.pickups.collect(&mut self.player, self.config.pickup_radius) {
            events.push(FrameEvent::PickupCollected(kind));
        }
    }

    fn step_enemies(&mut self, dt: f64) {
        let target = self.player.position;
        for enemy in self.enemies.iter_mut() {
            steering::steer(enemy, target, &self.config, dt, &mut self.rng);
        }
    }

    fn step_combat(&mut self, input: &InputSnapshot, dt: f64, events: &mut Vec<FrameEvent>) {
        if input.fire {
            let outcome = combat::fire(&mut self.player, &mut self.enemies, &mut self.stats, &self.config, self.clock);
            if outcome != ShotOutcome::NotReady {
                events.push(FrameEvent::Shot(outcome));
            }
        }
        if input.melee {
            if let Some(report) = combat::melee(&mut self.player, &mut self.enemies, &mut self.stats, &self.config, self.clock) {
                events.push(FrameEvent::Melee(report));
            }
        }

        let contact = combat::enemy_attacks(&mut self.enemies, &mut self.player, &self.config, dt);
        if contact.damage_taken > 0.0 {
            events.push(FrameEvent::PlayerHit { damage: contact.damage_taken });
        }
        if contact.player_killed || !self.player.is_alive() {
            self.on_player_death(events);
        }
    }

    fn step_waves(&mut self, dt: f64, events: &mut Vec<FrameEvent>) {
        let tick = self.waves.tick(dt, &self.config);
        if tick.escalated {
            let (speed, health) = (self.waves.speed_multiplier, self.waves.health_multiplier);
            for enemy in self.enemies.iter_mut().filter(|enemy| enemy.is_alive()) {
                enemy.apply_multipliers(speed, health);
            }
            events.push(FrameEvent::WaveStarted(self.waves.wave));
        }
        for _ in 0..tick.spawns {
            let position = waves::spawn_position(self.player.position, &self.config, &mut self.rng);
            self.spawn_enemy_at(position, events);
        }
    }

    fn cleanup_corpses(&mut self, events: &mut Vec<FrameEvent>) {
        let expiry = self.clock - self.config.corpse_linger;
        self.enemies.retain(|enemy| match enemy.died_at {
            Some(died_at) if died_at <= expiry => {
                events.push(FrameEvent::EnemyDespawned(enemy.id));
                false
            }
            _ => true,
        });
    }

    fn on_player_death(&mut self, events: &mut Vec<FrameEvent>) {
        self.life.die(&self.config);
        events.push(FrameEvent::PlayerDied);
        if let Some(lives) = self.lives_left.as_mut() {
            *lives = lives.saturating_sub(1);
            if *lives == 0 {
                info!("Out of lives. Final score {} with {} kills", self.stats.score, self.stats.kills);
                self.game_over = true;
                events.push(FrameEvent::GameOver);
            }
        }
    }

    /// Bring the player back at a safe spot. Wave progress and survival time
    /// start over; enemies, score and kills carry across.
    fn respawn_player(&mut self, events: &mut Vec<FrameEvent>) {
        let enemy_positions: Vec<Vector2D> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| enemy.position)
            .collect();
        let spawn = respawn::find_spawn_point(&enemy_positions, &self.config, &mut self.rng);
        self.player.revive(spawn);
        self.life.revive();
        self.waves.reset(&self.config);
        self.stats.survival_time = 0.0;
        info!("Player respawned at ({:.1}, {:.1})", spawn.x, spawn.z);
        events.push(FrameEvent::PlayerRespawned(spawn));
    }

    pub fn hud(&self) -> HudState {
        let weapon = &self.player.weapon;
        HudState {
            score: self.stats.score,
            kills: self.stats.kills,
            health: self.player.health.current(),
            max_health: self.player.health.max(),
            wave: self.waves.wave,
            ammo: weapon.ammo,
            max_ammo: weapon.max_ammo,
            reloading: weapon.is_reloading(),
            weapon: weapon.kind.name().to_string(),
            survival_time: self.stats.survival_time,
            enemies_alive: self.living_enemies(),
            respawn_in: self.life.respawn_in(),
            lives_left: self.lives_left,
            game_over: self.game_over,
        }
    }

    pub fn actors(&self) -> Vec<ActorView> {
        let player = ActorView {
            kind: ActorKind::Player,
            position: self.player.position,
            facing: self.player.facing,
            alive: self.life.is_alive(),
            ragdoll: false,
        };
        std::iter::once(player)
            .chain(self.enemies.iter().map(|enemy| ActorView {
                kind: ActorKind::Enemy(enemy.id),
                position: enemy.position,
                facing: enemy.facing,
                alive: enemy.is_alive(),
                ragdoll: enemy.is_ragdoll(),
            }))
            .collect()
    }
}
