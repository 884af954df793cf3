//! Effect notifications and the animations the core has to track
//!
//! Sounds and sprites are the host's business; the simulation only says what
//! happened. Explosion frames are counted here because a finished death
//! explosion is what ends a round.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::Tuning;

/// Sounds the host should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// A ship fired
    Shot,
    /// Ship-ship bump or projectile strike
    Hit,
    /// A ship blew up
    Explosion,
    /// Engine loop, started and stopped with thrust
    Engine,
}

/// What produced an explosion or impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectCause {
    ShipDeath,
    ProjectileImpact,
    ShipShipImpact,
}

/// One notification for the host, emitted during the tick that caused it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlaySound(SoundKind),
    /// Fade out a looping sound
    StopSound(SoundKind),
    SpawnExplosion { pos: Vec2, scale: f32, cause: EffectCause },
    SpawnImpact { pos: Vec2, scale: f32 },
    ShipDestroyed(usize),
    RoundRestarted,
}

/// Receiver for game events
pub trait EffectSink {
    fn emit(&mut self, event: GameEvent);
}

impl EffectSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

/// An explosion or impact animation in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub pos: Vec2,
    /// Size as a ratio of playfield height
    pub scale: f32,
    pub cause: EffectCause,
    pub frame: u32,
    /// Seconds shown on the current frame
    pub elapsed: f32,
}

impl Effect {
    /// Advance the animation; returns true once the last frame is reached
    pub fn advance(&mut self, dt: f32, tuning: &Tuning) -> bool {
        self.elapsed += dt;
        if self.elapsed >= tuning.explosion_frame_time() {
            self.frame += 1;
            self.elapsed = 0.0;
        }
        self.is_finished(tuning)
    }

    pub fn is_finished(&self, tuning: &Tuning) -> bool {
        self.frame + 1 >= tuning.explosion_frames
    }
}

/// Start an effect animation and tell the host about it
pub fn spawn_effect<S: EffectSink + ?Sized>(
    effects: &mut Vec<Effect>,
    sink: &mut S,
    pos: Vec2,
    scale: f32,
    cause: EffectCause,
) {
    match cause {
        EffectCause::ShipShipImpact => {
            sink.emit(GameEvent::SpawnImpact { pos, scale });
            sink.emit(GameEvent::PlaySound(SoundKind::Hit));
        }
        EffectCause::ProjectileImpact => {
            sink.emit(GameEvent::SpawnExplosion { pos, scale, cause });
            sink.emit(GameEvent::PlaySound(SoundKind::Hit));
        }
        EffectCause::ShipDeath => {
            sink.emit(GameEvent::SpawnExplosion { pos, scale, cause });
            sink.emit(GameEvent::PlaySound(SoundKind::Explosion));
        }
    }
    effects.push(Effect {
        pos,
        scale,
        cause,
        frame: 0,
        elapsed: 0.0,
    });
}

/// Visibility of an engine flame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmitterState {
    /// Flame shown while thrusting
    Visible,
    /// Trailing smoke after the engine cuts out
    Smoke,
    #[default]
    Hidden,
}

/// Engine flame/smoke attached to the back of a ship
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Emitter {
    pub state: EmitterState,
    pub pos: Vec2,
    pub angle: f32,
    /// Current animation frame, wraps at the tuning's flame frame count
    pub frame: u32,
    frame_elapsed: f32,
    smoke_elapsed: f32,
}

impl Emitter {
    /// Step the flame state machine.
    ///
    /// `anchor` is where the flame sits (behind the ship) and `angle` is the
    /// ship heading.
    pub fn update<S: EffectSink + ?Sized>(
        &mut self,
        thrusting: bool,
        anchor: Vec2,
        angle: f32,
        dt: f32,
        tuning: &Tuning,
        sink: &mut S,
    ) {
        match (thrusting, self.state) {
            (true, EmitterState::Visible) | (false, EmitterState::Hidden) => {}
            (true, _) => {
                self.state = EmitterState::Visible;
                sink.emit(GameEvent::PlaySound(SoundKind::Engine));
            }
            (false, EmitterState::Visible) => {
                self.state = EmitterState::Smoke;
                self.smoke_elapsed = 0.0;
                sink.emit(GameEvent::StopSound(SoundKind::Engine));
            }
            (false, EmitterState::Smoke) => {
                self.smoke_elapsed += dt;
                if self.smoke_elapsed > tuning.smoke_time {
                    self.state = EmitterState::Hidden;
                }
            }
        }

        if self.state != EmitterState::Hidden {
            self.frame_elapsed += dt;
            if self.frame_elapsed >= tuning.flame_frame_time() {
                self.frame = (self.frame + 1) % tuning.flame_frames;
                self.frame_elapsed = 0.0;
            }
            self.pos = anchor;
            self.angle = angle;
        }
    }

    /// Sprite scale for the renderer, `None` when nothing is drawn
    pub fn scale(&self, tuning: &Tuning) -> Option<f32> {
        match self.state {
            EmitterState::Visible => Some(tuning.flame_size_r),
            EmitterState::Smoke => Some(tuning.flame_size_r * tuning.smoke_r),
            EmitterState::Hidden => None,
        }
    }
}
