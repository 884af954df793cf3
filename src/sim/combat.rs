//! Hit points, invulnerability, firing and death
//!
//! The per-ship combat rules. All timers compare against the round clock,
//! never the wall clock.

use super::effects::{Effect, EffectCause, EffectSink, GameEvent, spawn_effect};
use super::state::{Projectile, Ship};
use crate::config::Tuning;
use crate::heading;

impl Ship {
    /// Take one point of damage if vulnerable.
    ///
    /// Returns whether damage was applied. `collide` is left alone until the
    /// next refresh, so every hit landing in the same tick counts.
    pub fn apply_hit(&mut self, now: f32) -> bool {
        if !self.collide {
            return false;
        }
        self.hp = self.hp.saturating_sub(1);
        self.last_hit = now;
        true
    }

    /// Recompute vulnerability from the round and hit timers
    pub fn refresh_invulnerability(&mut self, now: f32, round_start: f32, tuning: &Tuning) {
        self.collide =
            now - round_start > tuning.init_cooldown && now - self.last_hit > tuning.cooldown;
    }

    /// Fire if the intent asks for it and policy allows.
    ///
    /// `owned` is the number of live bullets this ship already owns; the cap is
    /// strict, so at most `max_bullets` are ever alive per ship. The
    /// returned projectile inherits the ship's velocity plus muzzle velocity;
    /// the ship recoils by the projectile's momentum.
    pub fn try_fire(
        &mut self,
        now: f32,
        owned: usize,
        id: u32,
        tuning: &Tuning,
        height: f32,
    ) -> Option<Projectile> {
        if !self.intent.fire || !self.alive || !self.collide {
            return None;
        }
        if now - self.last_fire < tuning.fire_interval() || owned >= tuning.max_bullets {
            return None;
        }

        let vel = self.vel + heading(self.angle) * tuning.bullet_speed(height);
        self.vel -= tuning.mass_ratio * vel;
        self.last_fire = now;

        Some(Projectile {
            id,
            owner: self.player,
            pos: self.pos,
            vel,
            angle: self.angle,
            mass: tuning.projectile_mass(self.mass),
            last_partner: None,
            created_at: now,
        })
    }

    /// Blow up once hit points run out; returns true on the tick of death
    pub fn check_death<S: EffectSink + ?Sized>(
        &mut self,
        tuning: &Tuning,
        effects: &mut Vec<Effect>,
        sink: &mut S,
    ) -> bool {
        if self.hp > 0 || !self.alive {
            return false;
        }
        self.alive = false;
        self.score -= 1;
        self.intent = Default::default();

        let scale = tuning.ship_size_r * tuning.explosion_r;
        spawn_effect(effects, sink, self.pos, scale, EffectCause::ShipDeath);
        sink.emit(GameEvent::ShipDestroyed(self.player));
        log::info!("Player {} destroyed", self.player + 1);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn armed_ship() -> Ship {
        let mut ship = Ship::new(0);
        ship.pos = Vec2::new(50.0, 50.0);
        ship.collide = true;
        ship.intent.fire = true;
        ship
    }

    #[test]
    fn test_hit_only_when_vulnerable() {
        let mut ship = Ship::new(0);
        assert!(!ship.apply_hit(1.0));
        assert_eq!(ship.hp, 3);

        ship.collide = true;
        assert!(ship.apply_hit(1.0));
        assert_eq!(ship.hp, 2);
        assert_eq!(ship.last_hit, 1.0);
        // Same-tick hits all land until the next refresh
        assert!(ship.apply_hit(1.0));
        assert_eq!(ship.hp, 1);

        ship.refresh_invulnerability(1.0, 0.0, &Tuning::default());
        assert!(!ship.collide);
        assert!(!ship.apply_hit(1.0));
        assert_eq!(ship.hp, 1);
    }

    #[test]
    fn test_hp_never_underflows() {
        let mut ship = Ship::new(0);
        ship.hp = 0;
        ship.collide = true;
        ship.apply_hit(5.0);
        assert_eq!(ship.hp, 0);
    }

    #[test]
    fn test_invulnerability_windows() {
        let tuning = Tuning::default();
        let mut ship = Ship::new(0);
        ship.last_hit = 0.0;

        ship.refresh_invulnerability(2.9, 0.0, &tuning);
        assert!(!ship.collide, "still inside the round start window");
        ship.refresh_invulnerability(3.1, 0.0, &tuning);
        assert!(ship.collide);

        ship.last_hit = 3.1;
        ship.refresh_invulnerability(3.9, 0.0, &tuning);
        assert!(!ship.collide, "still inside the post-hit window");
        ship.refresh_invulnerability(4.2, 0.0, &tuning);
        assert!(ship.collide);
    }

    #[test]
    fn test_fire_spawns_projectile_with_recoil() {
        let tuning = Tuning::default();
        let mut ship = armed_ship();
        ship.angle = 0.0;

        let projectile = ship.try_fire(10.0, 0, 7, &tuning, 1000.0).unwrap();
        assert_eq!(projectile.id, 7);
        assert_eq!(projectile.owner, 0);
        assert_eq!(projectile.pos, ship.pos);
        assert!((projectile.vel - Vec2::new(600.0, 0.0)).length() < 1e-3);
        assert!((projectile.mass - 0.01).abs() < 1e-6);
        assert!((ship.vel - Vec2::new(-6.0, 0.0)).length() < 1e-3);
        assert_eq!(ship.last_fire, 10.0);
    }

    #[test]
    fn test_fire_policy_rejections() {
        let tuning = Tuning::default();

        let mut ship = armed_ship();
        ship.collide = false;
        assert!(ship.try_fire(10.0, 0, 1, &tuning, 1000.0).is_none(), "shielded");

        let mut ship = armed_ship();
        assert!(ship.try_fire(10.0, tuning.max_bullets, 1, &tuning, 1000.0).is_none(), "cap");

        let mut ship = armed_ship();
        assert!(ship.try_fire(10.0, 0, 1, &tuning, 1000.0).is_some());
        assert!(ship.try_fire(10.1, 1, 2, &tuning, 1000.0).is_none(), "rate limited");
        assert!(ship.try_fire(10.25, 1, 3, &tuning, 1000.0).is_some());

        let mut ship = armed_ship();
        ship.intent.fire = false;
        assert!(ship.try_fire(10.0, 0, 1, &tuning, 1000.0).is_none());
        assert_eq!(ship.vel, Vec2::ZERO);
    }

    #[test]
    fn test_death_happens_once() {
        let tuning = Tuning::default();
        let mut ship = Ship::new(1);
        ship.score = 2;
        ship.hp = 0;
        let mut effects = Vec::new();
        let mut events: Vec<GameEvent> = Vec::new();

        assert!(ship.check_death(&tuning, &mut effects, &mut events));
        assert!(!ship.check_death(&tuning, &mut effects, &mut events));

        assert!(!ship.alive);
        assert_eq!(ship.score, 1);
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].cause, EffectCause::ShipDeath);
        assert_eq!(
            events.iter().filter(|e| **e == GameEvent::ShipDestroyed(1)).count(),
            1
        );
    }
}
