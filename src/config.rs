//! Gameplay tuning
//!
//! Every balance constant lives here so a JSON file can override it. Sizes and
//! speeds ending in `_r` are ratios of the playfield height.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating tuning
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: &'static str },

    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Firing ===
    /// Maximum shots per second per player
    pub rate_of_fire: f32,
    /// Maximum simultaneous live bullets per player
    pub max_bullets: usize,
    /// Muzzle speed relative to the firing ship
    pub bullet_vel_r: f32,

    // === Movement ===
    /// Turn rate in revolutions per second
    pub omega: f32,
    /// Reverse thrust as a fraction of forward thrust
    pub brake: f32,
    /// Top speed per second
    pub max_speed_r: f32,
    /// Drag time constant, also the time to reach top speed
    pub drag_time: f32,

    // === Collisions ===
    /// Invulnerable seconds at the start of a round
    pub init_cooldown: f32,
    /// Invulnerable seconds after taking a hit
    pub cooldown: f32,
    /// Projectile mass / ship mass
    pub mass_ratio: f32,
    /// Velocity kept after each collision
    pub loss: f32,

    // === Effects ===
    pub explosion_time: f32,
    pub explosion_frames: u32,
    pub impact_size_r: f32,
    pub explosion_r: f32,
    pub flame_frames: u32,
    /// Flame animation cycles per second
    pub flame_rate: f32,
    /// Seconds of smoke after the engine cuts out
    pub smoke_time: f32,
    pub smoke_r: f32,

    // === Sizes ===
    pub ship_size_r: f32,
    /// Ship sprite length / height
    pub ship_aspect: f32,
    pub bullet_size_r: f32,
    pub flame_size_r: f32,
    /// Shield sprite size relative to the bare ship
    pub shield_img_r: f32,

    // === Spawning ===
    /// Horizontal inset margin for spawn positions
    pub game_w_r: f32,
    /// Vertical inset margin for spawn positions
    pub game_h_r: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        let ship_size_r = 0.07;
        Self {
            rate_of_fire: 5.0,
            max_bullets: 10,
            bullet_vel_r: 0.6,

            omega: 0.7,
            brake: 0.8,
            max_speed_r: 0.4,
            drag_time: 1.0,

            init_cooldown: 3.0,
            cooldown: 1.0,
            mass_ratio: 1e-2,
            loss: 0.9,

            explosion_time: 1.0,
            explosion_frames: 24,
            impact_size_r: 0.5,
            explosion_r: 3.0,
            flame_frames: 2,
            flame_rate: 10.0,
            smoke_time: 0.5,
            smoke_r: 0.5,

            ship_size_r,
            ship_aspect: 1.0,
            bullet_size_r: ship_size_r / 5.0,
            flame_size_r: 0.12,
            shield_img_r: 1.5,

            game_w_r: 0.3,
            game_h_r: 0.3,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a JSON tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: "must be a positive number" })
            }
        }
        fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason: "must be zero or positive" })
            }
        }

        positive("rate_of_fire", self.rate_of_fire)?;
        positive("bullet_vel_r", self.bullet_vel_r)?;
        non_negative("omega", self.omega)?;
        non_negative("brake", self.brake)?;
        positive("max_speed_r", self.max_speed_r)?;
        positive("drag_time", self.drag_time)?;
        non_negative("init_cooldown", self.init_cooldown)?;
        non_negative("cooldown", self.cooldown)?;
        positive("mass_ratio", self.mass_ratio)?;
        positive("explosion_time", self.explosion_time)?;
        positive("flame_rate", self.flame_rate)?;
        non_negative("smoke_time", self.smoke_time)?;
        positive("ship_size_r", self.ship_size_r)?;
        positive("ship_aspect", self.ship_aspect)?;
        positive("bullet_size_r", self.bullet_size_r)?;
        positive("shield_img_r", self.shield_img_r)?;
        non_negative("impact_size_r", self.impact_size_r)?;
        non_negative("explosion_r", self.explosion_r)?;
        non_negative("flame_size_r", self.flame_size_r)?;
        non_negative("smoke_r", self.smoke_r)?;

        if !(self.loss.is_finite() && self.loss > 0.0 && self.loss <= 1.0) {
            return Err(ConfigError::Invalid { field: "loss", reason: "must be in (0, 1]" });
        }
        if self.max_bullets == 0 {
            return Err(ConfigError::Invalid { field: "max_bullets", reason: "must be at least 1" });
        }
        if self.explosion_frames < 2 {
            return Err(ConfigError::Invalid {
                field: "explosion_frames",
                reason: "must be at least 2",
            });
        }
        if self.flame_frames == 0 {
            return Err(ConfigError::Invalid { field: "flame_frames", reason: "must be at least 1" });
        }
        for (field, value) in [("game_w_r", self.game_w_r), ("game_h_r", self.game_h_r)] {
            if !(value.is_finite() && (0.0..0.5).contains(&value)) {
                return Err(ConfigError::Invalid { field, reason: "must be in [0, 0.5)" });
            }
        }
        Ok(())
    }

    /// Top speed for a playfield of the given height
    #[inline]
    pub fn max_speed(&self, height: f32) -> f32 {
        height * self.max_speed_r
    }

    /// Forward thrust acceleration; drag balances it exactly at top speed
    #[inline]
    pub fn thrust_accel(&self, height: f32) -> f32 {
        self.max_speed(height) / self.drag_time
    }

    #[inline]
    pub fn bullet_speed(&self, height: f32) -> f32 {
        height * self.bullet_vel_r
    }

    /// Minimum seconds between shots
    #[inline]
    pub fn fire_interval(&self) -> f32 {
        1.0 / self.rate_of_fire
    }

    /// Seconds each explosion frame stays on screen
    #[inline]
    pub fn explosion_frame_time(&self) -> f32 {
        self.explosion_time / self.explosion_frames as f32
    }

    /// Seconds each flame frame stays on screen
    #[inline]
    pub fn flame_frame_time(&self) -> f32 {
        1.0 / (self.flame_frames as f32 * self.flame_rate)
    }

    pub fn projectile_mass(&self, ship_mass: f32) -> f32 {
        ship_mass * self.mass_ratio
    }
}
