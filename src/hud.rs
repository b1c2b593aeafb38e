use serde::{Deserialize, Serialize};

/// Everything the UI shows, handed over as a value each frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HudState {
    pub score: u32,
    pub kills: u32,
    pub health: f64,
    pub max_health: f64,
    pub wave: u32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub reloading: bool,
    pub weapon: String,
    pub survival_time: f64,
    pub enemies_alive: usize,
    /// Seconds until automatic respawn while dead.
    pub respawn_in: Option<f64>,
    pub lives_left: Option<u32>,
    pub game_over: bool,
}

impl HudState {
    pub fn status_line(&self) -> String {
        let ammo = if self.reloading {
            "reloading".to_string()
        } else {
            format!("{}/{}", self.ammo, self.max_ammo)
        };
        let mut line = format!(
            "Score: {}  Kills: {}  Health: {:.0}/{:.0}  Wave: {}  {}: {}  Time: {:.0}s",
            self.score, self.kills, self.health, self.max_health, self.wave, self.weapon, ammo, self.survival_time
        );
        if let Some(lives) = self.lives_left {
            line.push_str(&format!("  Lives: {}", lives));
        }
        line
    }

    /// Banner text while dead, if any.
    pub fn banner(&self) -> Option<String> {
        if self.game_over {
            Some("GAME OVER".to_string())
        } else {
            self.respawn_in
                .map(|seconds| format!("YOU DIED - respawning in {:.0}s (R to respawn)", seconds.ceil()))
        }
    }
}
