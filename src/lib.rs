//! Space Out - two-player combat on a wrap-around playfield
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ship physics, collisions, combat, rounds)
//! - `config`: Data-driven game tuning with validation
//! - `input`: Raw key state to ship intents

pub mod config;
pub mod input;
pub mod sim;

pub use config::{ConfigError, Tuning};
pub use input::{Controls, Key};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of ships in a round
    pub const MAX_PLAYERS: usize = 2;

    /// Ship mass (projectile mass is derived through the tuning's mass ratio)
    pub const SHIP_MASS: f32 = 1.0;
    /// Hit points every ship starts a round with
    pub const START_HP: u8 = 3;
    /// Score before the first round; the first spawn brings it to 0
    pub const BASELINE_SCORE: i32 = -1;

    /// Default playfield when the host has not reported one
    pub const DEFAULT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_HEIGHT: f32 = 720.0;
}

/// L1 norm (sum of absolute components).
///
/// Speed limiting and the speed readout both use this norm, so the cap is
/// slightly stricter along diagonals than a euclidean one would be.
#[inline]
pub fn norm(v: Vec2) -> f32 {
    v.x.abs() + v.y.abs()
}

/// Vector scaled to unit L1 norm, or zero for the zero vector
#[inline]
pub fn unit(v: Vec2) -> Vec2 {
    let n = norm(v);
    if n == 0.0 { Vec2::ZERO } else { v / n }
}

/// Direction a ship at `angle` faces, in screen space (y grows downward)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), -angle.sin())
}

/// Wrap a position onto the torus `[0, width] x [0, height]`.
///
/// Each axis repeats with period `dimension + 1`, so a body leaving one edge
/// re-enters on the opposite pixel column/row.
#[inline]
pub fn wrap(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_axis(pos.x, width), wrap_axis(pos.y, height))
}

#[inline]
fn wrap_axis(value: f32, dimension: f32) -> f32 {
    // rem_euclid may round up to the modulus itself
    value.rem_euclid(dimension + 1.0).min(dimension)
}
