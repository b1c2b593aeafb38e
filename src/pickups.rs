use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{Player, Weapon, WeaponKind};
use crate::types::Vector2D;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupKind {
    WeaponCrate(WeaponKind),
    AmmoCrate,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pickup {
    pub position: Vector2D,
    pub kind: PickupKind,
}

impl Pickup {
    pub fn new(position: Vector2D, kind: PickupKind) -> Self {
        Pickup { position, kind }
    }

    pub fn random(rng: &mut impl Rng, config: &GameConfig) -> Self {
        let extent = config.arena_half_extent;
        let position = Vector2D::new(rng.gen_range(-extent..=extent), rng.gen_range(-extent..=extent));
        let kind = match rng.gen_range(0..4) {
            0 => PickupKind::WeaponCrate(WeaponKind::Rifle),
            1 => PickupKind::WeaponCrate(WeaponKind::Shotgun),
            2 => PickupKind::WeaponCrate(WeaponKind::Pistol),
            _ => PickupKind::AmmoCrate,
        };
        Pickup::new(position, kind)
    }

    /// Hand the crate's contents to the player.
    pub fn apply(&self, player: &mut Player) {
        match self.kind {
            PickupKind::WeaponCrate(kind) => {
                player.weapon = Weapon::new(kind);
                info!("Picked up {}", kind.name());
            }
            PickupKind::AmmoCrate => {
                player.weapon.refill();
                info!("Picked up ammo for {}", player.weapon.kind.name());
            }
        }
    }
}

/// Crates on the ground and the timer that drops new ones.
#[derive(Clone, Debug, Default)]
pub struct PickupField {
    pub pickups: Vec<Pickup>,
    timer: f64,
}

impl PickupField {
    pub fn tick(&mut self, dt: f64, config: &GameConfig, rng: &mut impl Rng) {
        self.timer += dt;
        if self.timer >= config.pickup_interval {
            self.timer = 0.0;
            if self.pickups.len() < config.max_pickups {
                self.pickups.push(Pickup::random(rng, config));
            }
        }
    }

    /// Collect every crate within reach of the player.
    pub fn collect(&mut self, player: &mut Player, radius: f64) -> Vec<PickupKind> {
        let mut collected = Vec::new();
        self.pickups.retain(|pickup| {
            if pickup.position.distance(player.position) <= radius {
                pickup.apply(player);
                collected.push(pickup.kind);
                false
            } else {
                true
            }
        });
        collected
    }
}
