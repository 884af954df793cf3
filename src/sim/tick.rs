//! Fixed timestep simulation tick
//!
//! Core game loop that advances a round deterministically. Order matters:
//! collisions resolve on last tick's positions first, so an impulse shows up
//! in the same tick's integration.

use super::collision::{clear_stale_partners, resolve_projectile_hits, resolve_ship_collisions};
use super::effects::{EffectCause, EffectSink, GameEvent, SoundKind};
use super::shape::{ShapeProvider, SpriteShapes};
use super::state::{RoundState, ShipIntent};
use crate::consts::MAX_PLAYERS;
use crate::heading;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Intent per ship, indexed by player
    pub intents: [ShipIntent; MAX_PLAYERS],
}

/// Advance the round by one timestep using the default sprite shapes
pub fn tick<S: EffectSink + ?Sized>(state: &mut RoundState, input: &TickInput, dt: f32, sink: &mut S) {
    let shapes = SpriteShapes::new(&state.tuning, state.playfield.height);
    tick_with_shapes(state, input, dt, &shapes, sink);
}

/// Advance the round by one timestep with host-provided collision shapes
pub fn tick_with_shapes<P, S>(
    state: &mut RoundState,
    input: &TickInput,
    dt: f32,
    shapes: &P,
    sink: &mut S,
) where
    P: ShapeProvider + ?Sized,
    S: EffectSink + ?Sized,
{
    if !(dt.is_finite() && dt > 0.0) {
        log::warn!("Ignoring tick with invalid dt {}", dt);
        return;
    }

    state.time += dt;
    state.ticks += 1;

    resolve_ship_collisions(state, shapes, sink);
    resolve_projectile_hits(state, shapes, sink);

    update_ships(state, input, dt, sink);
    update_projectiles(state, dt);
    clear_stale_partners(state, shapes);

    if advance_effects(state, dt) {
        state.restart(sink);
    }
}

/// Movement, firing, engine flame, vulnerability and death for every ship
fn update_ships<S: EffectSink + ?Sized>(state: &mut RoundState, input: &TickInput, dt: f32, sink: &mut S) {
    let now = state.time;
    let playfield = state.playfield;
    let flame_offset = SpriteShapes::new(&state.tuning, playfield.height).ship_length();

    for player in 0..state.ships.len() {
        let owned = state.bullets_owned(player);
        let id = state.peek_projectile_id();
        let tuning = &state.tuning;
        let ship = &mut state.ships[player];

        if ship.alive {
            ship.intent = input.intents.get(player).copied().unwrap_or_default();
        }
        ship.integrate(dt, tuning, playfield);

        // Fires with the vulnerability from before this tick's refresh
        let fired = ship.try_fire(now, owned, id, tuning, playfield.height);

        let anchor = ship.pos - heading(ship.angle) * flame_offset;
        let thrusting = ship.thrusting();
        ship.emitter.update(thrusting, anchor, ship.angle, dt, tuning, sink);

        ship.refresh_invulnerability(now, state.round_start, tuning);
        ship.check_death(tuning, &mut state.effects, sink);

        if let Some(projectile) = fired {
            sink.emit(GameEvent::PlaySound(SoundKind::Shot));
            state.projectiles.push(projectile);
            state.next_projectile_id();
        }
    }
}

/// Move bullets and drop the ones that left the playfield
fn update_projectiles(state: &mut RoundState, dt: f32) {
    let playfield = state.playfield;
    for projectile in &mut state.projectiles {
        projectile.integrate(dt);
    }
    state.projectiles.retain(|p| playfield.contains(p.pos));
}

/// Step effect animations; returns true when a death explosion finished
fn advance_effects(state: &mut RoundState, dt: f32) -> bool {
    let tuning = &state.tuning;
    let mut round_over = false;
    state.effects.retain_mut(|effect| {
        let finished = effect.advance(dt, tuning);
        if finished && effect.cause == EffectCause::ShipDeath {
            round_over = true;
        }
        !finished
    });
    round_over
}
