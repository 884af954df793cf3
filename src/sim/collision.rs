//! Collision detection and response between bodies
//!
//! Two passes run every tick on the positions left by the previous tick:
//! ship against ship, then ship against projectile. A body remembers the last
//! thing it bounced off and will not bounce off it again until the pair has
//! separated, which stops a standing overlap from re-triggering every tick.

use glam::Vec2;

use super::effects::{EffectCause, EffectSink, spawn_effect};
use super::shape::{Shape, ShapeProvider};
use super::state::{BodyId, RoundState};

/// Elastic collision response scaled by `loss`.
///
/// Returns the new velocities of both bodies, or `None` when their centers
/// coincide and the line of impact is undefined.
pub fn elastic_collision(
    (x1, v1, m1): (Vec2, Vec2, f32),
    (x2, v2, m2): (Vec2, Vec2, f32),
    loss: f32,
) -> Option<(Vec2, Vec2)> {
    let dx = x1 - x2;
    let dist_sq = dx.length_squared();
    if dist_sq <= 0.0 || !dist_sq.is_finite() {
        return None;
    }

    let total = m1 + m2;
    let u1 = v1 - (2.0 * m2 / total) * ((v1 - v2).dot(dx) / dist_sq) * dx;
    let u2 = v2 - (2.0 * m1 / total) * ((v2 - v1).dot(-dx) / dist_sq) * -dx;

    Some((u1 * loss, u2 * loss))
}

/// Total kinetic energy of a set of (velocity, mass) bodies
pub fn kinetic_energy(bodies: &[(Vec2, f32)]) -> f32 {
    bodies.iter().map(|(v, m)| 0.5 * m * v.length_squared()).sum()
}

/// Apply the elastic response in place; logs and leaves velocities alone on
/// coincident centers
fn bounce(a: (Vec2, &mut Vec2, f32), b: (Vec2, &mut Vec2, f32), loss: f32, what: BodyPair) {
    match elastic_collision((a.0, *a.1, a.2), (b.0, *b.1, b.2), loss) {
        Some((va, vb)) => {
            *a.1 = va;
            *b.1 = vb;
        }
        None => log::warn!("Skipping {:?} collision response: coincident centers at {}", what, a.0),
    }
}

#[derive(Debug, Clone, Copy)]
enum BodyPair {
    ShipShip,
    ShipProjectile,
}

/// Resolve every overlapping pair of ships
pub fn resolve_ship_collisions<P, S>(state: &mut RoundState, shapes: &P, sink: &mut S)
where
    P: ShapeProvider + ?Sized,
    S: EffectSink + ?Sized,
{
    let now = state.time;
    let loss = state.tuning.loss;
    // Mean of both ship sizes, scaled down for a bump
    let impact_scale = state.tuning.ship_size_r * state.tuning.impact_size_r;

    let count = state.ships.len();
    for i in 0..count {
        for j in (i + 1)..count {
            let (head, tail) = state.ships.split_at_mut(j);
            let (a, b) = (&mut head[i], &mut tail[0]);

            if a.last_partner == Some(BodyId::Ship(j)) || b.last_partner == Some(BodyId::Ship(i)) {
                continue;
            }
            if !shapes.ship_shape(a).overlaps(&shapes.ship_shape(b)) {
                continue;
            }

            bounce(
                (a.pos, &mut a.vel, a.mass),
                (b.pos, &mut b.vel, b.mass),
                loss,
                BodyPair::ShipShip,
            );
            a.last_partner = Some(BodyId::Ship(j));
            b.last_partner = Some(BodyId::Ship(i));

            let midpoint = (a.pos + b.pos) * 0.5;
            spawn_effect(&mut state.effects, sink, midpoint, impact_scale, EffectCause::ShipShipImpact);

            for ship in [a, b] {
                if ship.apply_hit(now) {
                    log::debug!("Player {} rammed, hp {}", ship.player + 1, ship.hp);
                }
            }
        }
    }
}

/// Resolve projectiles striking ships other than their owner.
///
/// A vulnerable ship takes damage and the projectile is destroyed. A shielded
/// ship takes the projectile over as one of its own bullets instead.
pub fn resolve_projectile_hits<P, S>(state: &mut RoundState, shapes: &P, sink: &mut S)
where
    P: ShapeProvider + ?Sized,
    S: EffectSink + ?Sized,
{
    let now = state.time;
    let loss = state.tuning.loss;
    let explosion_scale = state.tuning.bullet_size_r * state.tuning.explosion_r;

    for ship_idx in 0..state.ships.len() {
        let ship = &mut state.ships[ship_idx];
        let ship_shape = shapes.ship_shape(ship);
        let mut destroyed = Vec::new();

        for projectile in state.projectiles.iter_mut() {
            if projectile.owner == ship_idx
                || ship.last_partner == Some(BodyId::Projectile(projectile.id))
            {
                continue;
            }
            if !ship_shape.overlaps(&shapes.projectile_shape(projectile)) {
                continue;
            }

            bounce(
                (ship.pos, &mut ship.vel, ship.mass),
                (projectile.pos, &mut projectile.vel, projectile.mass),
                loss,
                BodyPair::ShipProjectile,
            );
            ship.last_partner = Some(BodyId::Projectile(projectile.id));
            projectile.last_partner = Some(BodyId::Ship(ship_idx));

            if ship.apply_hit(now) {
                log::debug!(
                    "Player {} hit by projectile {}, hp {}",
                    ship.player + 1,
                    projectile.id,
                    ship.hp
                );
                spawn_effect(
                    &mut state.effects,
                    sink,
                    projectile.pos,
                    explosion_scale,
                    EffectCause::ProjectileImpact,
                );
                destroyed.push(projectile.id);
            } else {
                log::debug!(
                    "Projectile {} deflected by shield, now owned by player {}",
                    projectile.id,
                    ship.player + 1
                );
                projectile.owner = ship_idx;
            }
        }

        if !destroyed.is_empty() {
            state.projectiles.retain(|p| !destroyed.contains(&p.id));
        }
    }
}

/// Forget collision partners that no longer overlap (or no longer exist)
pub fn clear_stale_partners<P>(state: &mut RoundState, shapes: &P)
where
    P: ShapeProvider + ?Sized,
{
    let ship_shapes: Vec<Shape> = state.ships.iter().map(|s| shapes.ship_shape(s)).collect();
    let projectile_shapes: Vec<(u32, Shape)> = state
        .projectiles
        .iter()
        .map(|p| (p.id, shapes.projectile_shape(p)))
        .collect();

    let shape_of = |id: BodyId| -> Option<Shape> {
        match id {
            BodyId::Ship(i) => ship_shapes.get(i).copied(),
            BodyId::Projectile(pid) => projectile_shapes
                .iter()
                .find(|(id, _)| *id == pid)
                .map(|(_, shape)| *shape),
        }
    };
    let still_touching = |partner: BodyId, own: &Shape| {
        shape_of(partner).is_some_and(|shape| shape.overlaps(own))
    };

    for (ship, own) in state.ships.iter_mut().zip(&ship_shapes) {
        if let Some(partner) = ship.last_partner {
            if !still_touching(partner, own) {
                ship.last_partner = None;
            }
        }
    }
    for (projectile, (_, own)) in state.projectiles.iter_mut().zip(&projectile_shapes) {
        if let Some(partner) = projectile.last_partner {
            if !still_touching(partner, own) {
                projectile.last_partner = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_head_on_equal_masses_swap() {
        let (u1, u2) = elastic_collision(
            (Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 1.0),
            (Vec2::new(5.0, 0.0), Vec2::new(-10.0, 0.0), 1.0),
            1.0,
        )
        .unwrap();
        assert!((u1 - Vec2::new(-10.0, 0.0)).length() < 1e-4);
        assert!((u2 - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_glancing_keeps_tangential_velocity() {
        // Line of centers is vertical; horizontal motion is untouched
        let (u1, _) = elastic_collision(
            (Vec2::new(0.0, 0.0), Vec2::new(7.0, 3.0), 1.0),
            (Vec2::new(0.0, 10.0), Vec2::ZERO, 1.0),
            1.0,
        )
        .unwrap();
        assert!((u1.x - 7.0).abs() < 1e-4);
        assert!(u1.y.abs() < 1e-4);
    }

    #[test]
    fn test_light_projectile_barely_moves_ship() {
        let (ship_v, bullet_v) = elastic_collision(
            (Vec2::new(100.0, 100.0), Vec2::ZERO, 1.0),
            (Vec2::new(90.0, 100.0), Vec2::new(500.0, 0.0), 0.01),
            0.9,
        )
        .unwrap();
        assert!(ship_v.x > 0.0 && ship_v.x < 10.0);
        assert!(ship_v.y.abs() < 1e-4);
        // The bullet rebounds
        assert!(bullet_v.x < 0.0);
    }

    #[test]
    fn test_coincident_centers_skipped() {
        let p = Vec2::new(3.0, 3.0);
        assert!(elastic_collision((p, Vec2::X, 1.0), (p, -Vec2::X, 1.0), 0.9).is_none());
    }

    proptest! {
        #[test]
        fn prop_response_never_adds_energy(
            x1 in prop::array::uniform2(-500.0f32..500.0),
            x2 in prop::array::uniform2(-500.0f32..500.0),
            v1 in prop::array::uniform2(-800.0f32..800.0),
            v2 in prop::array::uniform2(-800.0f32..800.0),
            m1 in 0.001f32..10.0,
            m2 in 0.001f32..10.0,
            loss in 0.1f32..0.99,
        ) {
            let (x1, x2) = (Vec2::from(x1), Vec2::from(x2));
            let (v1, v2) = (Vec2::from(v1), Vec2::from(v2));
            prop_assume!(x1.distance(x2) > 1e-2);

            let before = kinetic_energy(&[(v1, m1), (v2, m2)]);
            let (u1, u2) = elastic_collision((x1, v1, m1), (x2, v2, m2), loss).unwrap();
            let after = kinetic_energy(&[(u1, m1), (u2, m2)]);
            prop_assert!(after <= before * (1.0 + 1e-4) + 1e-3, "{} > {}", after, before);
        }
    }
}
