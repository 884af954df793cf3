//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by player index, then projectile ID)
//! - No rendering, audio or platform dependencies; side effects leave
//!   through an [`EffectSink`]

pub mod collision;
pub mod combat;
pub mod effects;
pub mod shape;
pub mod state;
pub mod tick;

pub use collision::{elastic_collision, kinetic_energy};
pub use effects::{
    Effect, EffectCause, EffectSink, Emitter, EmitterState, GameEvent, SoundKind, spawn_effect,
};
pub use shape::{Shape, ShapeProvider, SpriteShapes};
pub use state::{BodyId, Playfield, Projectile, RoundState, Ship, ShipIntent};
pub use tick::{TickInput, tick, tick_with_shapes};
