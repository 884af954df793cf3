//! Round state and body types
//!
//! Everything the simulation mutates lives in [`RoundState`]; it is plain data
//! so a round can be snapshotted and replayed from the same seed and inputs.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::effects::{Effect, Emitter, EffectSink, GameEvent};
use crate::config::{ConfigError, Tuning};
use crate::consts::*;
use crate::{heading, norm, unit, wrap};

/// Non-owning handle to a body, used for collision partner bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyId {
    Ship(usize),
    Projectile(u32),
}

/// Playfield dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether a point lies on the playfield (edges included)
    pub fn contains(&self, pos: Vec2) -> bool {
        (0.0..=self.width).contains(&pos.x) && (0.0..=self.height).contains(&pos.y)
    }
}

/// Movement/fire intent for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipIntent {
    /// +1 turns left (counter-clockwise), -1 turns right
    pub rotate: i8,
    /// +1 thrusts forward, -1 brakes/reverses
    pub thrust: i8,
    pub fire: bool,
}

/// A player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub player: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    /// Heading in radians
    pub angle: f32,
    pub intent: ShipIntent,
    pub mass: f32,
    pub hp: u8,
    /// False while invulnerable
    pub collide: bool,
    /// Body this ship last bounced off; cleared once they stop overlapping
    pub last_partner: Option<BodyId>,
    /// Round clock time of the last damaging hit
    pub last_hit: f32,
    /// Round clock time of the last shot
    pub last_fire: f32,
    pub alive: bool,
    pub score: i32,
    pub emitter: Emitter,
}

impl Ship {
    pub fn new(player: usize) -> Self {
        Self {
            player,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            angle: 0.0,
            intent: ShipIntent::default(),
            mass: SHIP_MASS,
            hp: START_HP,
            collide: false,
            last_partner: None,
            last_hit: 0.0,
            last_fire: 0.0,
            alive: true,
            score: BASELINE_SCORE,
            emitter: Emitter::default(),
        }
    }

    /// Start a new life at `pos`, facing `angle`
    pub fn respawn(&mut self, pos: Vec2, angle: f32, now: f32) {
        self.score += 1;
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.accel = Vec2::ZERO;
        self.angle = angle;
        self.intent = ShipIntent::default();
        self.hp = START_HP;
        self.collide = false;
        self.last_partner = None;
        self.last_hit = now;
        self.last_fire = now;
        self.alive = true;
        self.emitter = Emitter::default();
    }

    /// Advance heading, velocity and position by one tick of the current intent
    pub fn integrate(&mut self, dt: f32, tuning: &Tuning, playfield: Playfield) {
        let max_speed = tuning.max_speed(playfield.height);
        let thrust = match self.intent.thrust {
            1 => tuning.thrust_accel(playfield.height),
            -1 => -tuning.brake * tuning.thrust_accel(playfield.height),
            _ => 0.0,
        };

        self.angle += dt * f32::from(self.intent.rotate) * tuning.omega * std::f32::consts::TAU;
        self.accel = heading(self.angle) * thrust;

        // Linear drag pulls velocity toward zero with time constant drag_time
        self.vel += dt * (self.accel - self.vel / tuning.drag_time);
        if norm(self.vel) > max_speed {
            self.vel = unit(self.vel) * max_speed;
        }

        self.pos = wrap(self.pos + dt * self.vel, playfield.width, playfield.height);
    }

    /// Whether the engine is pushing forward this tick
    pub fn thrusting(&self) -> bool {
        self.intent.thrust > 0
    }

    /// Speed as a percentage of top speed, for the HUD
    pub fn speed_percent(&self, max_speed: f32) -> f32 {
        if max_speed > 0.0 {
            norm(self.vel) * 100.0 / max_speed
        } else {
            0.0
        }
    }
}

/// A bullet in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Player whose bullet set this belongs to (changes on ownership transfer)
    pub owner: usize,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading at fire time, for sprite orientation
    pub angle: f32,
    pub mass: f32,
    pub last_partner: Option<BodyId>,
    pub created_at: f32,
}

impl Projectile {
    /// Move in a straight line; no drag and no wrapping
    pub fn integrate(&mut self, dt: f32) {
        self.pos += dt * self.vel;
    }
}

/// Complete round state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub tuning: Tuning,
    pub playfield: Playfield,
    /// Seconds of simulated time since the state was created
    pub time: f32,
    /// Value of `time` when the current round began
    pub round_start: f32,
    /// Rounds played, starting at 1
    pub round: u32,
    /// Simulation tick counter
    pub ticks: u64,
    /// One ship per player, indexed by player number
    pub ships: Vec<Ship>,
    /// Live bullets from every player, in firing order
    pub projectiles: Vec<Projectile>,
    /// Explosion/impact animations still playing
    pub effects: Vec<Effect>,
    rng: Pcg32,
    next_id: u32,
}

impl RoundState {
    /// Create the first round; fails if the tuning does not validate
    pub fn new(seed: u64, tuning: Tuning, playfield: Playfield) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let mut state = Self {
            seed,
            tuning,
            playfield,
            time: 0.0,
            round_start: 0.0,
            round: 1,
            ticks: 0,
            ships: (0..MAX_PLAYERS).map(Ship::new).collect(),
            projectiles: Vec::new(),
            effects: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        state.spawn_ships();

        log::info!("Round 1 started (seed {})", seed);
        Ok(state)
    }

    /// ID the next projectile will receive
    pub fn peek_projectile_id(&self) -> u32 {
        self.next_id
    }

    /// Allocate a new projectile ID
    pub fn next_projectile_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Seconds since the current round began
    pub fn round_time(&self) -> f32 {
        self.time - self.round_start
    }

    /// Top speed on the current playfield
    pub fn max_speed(&self) -> f32 {
        self.tuning.max_speed(self.playfield.height)
    }

    /// Bullets currently owned by `player`
    pub fn bullets_owned(&self, player: usize) -> usize {
        self.projectiles.iter().filter(|p| p.owner == player).count()
    }

    /// Adopt new playfield dimensions, re-wrapping ships onto it
    pub fn resize(&mut self, playfield: Playfield) {
        self.playfield = playfield;
        for ship in &mut self.ships {
            ship.pos = wrap(ship.pos, playfield.width, playfield.height);
        }
    }

    /// Replace the round: fresh ships, no bullets, no lingering effects
    pub fn restart<S: EffectSink + ?Sized>(&mut self, sink: &mut S) {
        self.round_start = self.time;
        self.round += 1;
        self.projectiles.clear();
        self.effects.clear();
        self.spawn_ships();

        let scores: Vec<i32> = self.ships.iter().map(|s| s.score).collect();
        log::info!("Round {} started, scores {:?}", self.round, scores);
        sink.emit(GameEvent::RoundRestarted);
    }

    /// Place every ship at a random spot inside the spawn margin
    fn spawn_ships(&mut self) {
        let Playfield { width, height } = self.playfield;
        let (mx, my) = (self.tuning.game_w_r, self.tuning.game_h_r);
        let now = self.time;

        for ship in &mut self.ships {
            let x = self.rng.random::<f32>() * width * (1.0 - 2.0 * mx) + mx * width;
            let y = self.rng.random::<f32>() * height * (1.0 - 2.0 * my) + my * height;
            let angle = self.rng.random::<f32>() * std::f32::consts::TAU;
            ship.respawn(wrap(Vec2::new(x, y), width, height), angle, now);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(seed: u64) -> RoundState {
        RoundState::new(seed, Tuning::default(), Playfield::default()).unwrap()
    }

    #[test]
    fn test_new_round_spawns_inside_margin() {
        let state = state(7);
        assert_eq!(state.ships.len(), MAX_PLAYERS);
        let pf = state.playfield;
        for ship in &state.ships {
            assert_eq!(ship.hp, START_HP);
            assert_eq!(ship.score, 0);
            assert!(!ship.collide);
            assert!(ship.pos.x >= 0.3 * pf.width && ship.pos.x <= 0.7 * pf.width);
            assert!(ship.pos.y >= 0.3 * pf.height && ship.pos.y <= 0.7 * pf.height);
        }
    }

    #[test]
    fn test_invalid_tuning_refused() {
        let tuning = Tuning { mass_ratio: -1.0, ..Default::default() };
        assert!(RoundState::new(1, tuning, Playfield::default()).is_err());
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let a = state(42);
        let b = state(42);
        for (sa, sb) in a.ships.iter().zip(&b.ships) {
            assert_eq!(sa.pos, sb.pos);
            assert_eq!(sa.angle, sb.angle);
        }
    }

    #[test]
    fn test_thrust_approaches_but_respects_top_speed() {
        let tuning = Tuning::default();
        let pf = Playfield::default();
        let mut ship = Ship::new(0);
        ship.pos = Vec2::new(100.0, 100.0);
        ship.intent.thrust = 1;
        for _ in 0..600 {
            ship.integrate(1.0 / 60.0, &tuning, pf);
            assert!(norm(ship.vel) <= tuning.max_speed(pf.height) + 1e-3);
        }
        assert!(ship.speed_percent(tuning.max_speed(pf.height)) > 90.0);
    }

    #[test]
    fn test_drag_slows_coasting_ship() {
        let tuning = Tuning::default();
        let mut ship = Ship::new(0);
        ship.vel = Vec2::new(100.0, 0.0);
        ship.integrate(0.1, &tuning, Playfield::default());
        assert!((ship.vel.x - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_rotation_rate() {
        let tuning = Tuning::default();
        let mut ship = Ship::new(0);
        ship.intent.rotate = -1;
        ship.integrate(1.0, &tuning, Playfield::default());
        assert!((ship.angle + 0.7 * std::f32::consts::TAU).abs() < 1e-4);
    }

    #[test]
    fn test_resize_rewraps_ships() {
        let mut state = state(5);
        state.ships[0].pos = Vec2::new(1000.0, 600.0);
        state.resize(Playfield::new(800.0, 500.0));
        let pos = state.ships[0].pos;
        assert!(pos.x >= 0.0 && pos.x <= 800.0);
        assert!(pos.y >= 0.0 && pos.y <= 500.0);
        assert_eq!(state.max_speed(), 500.0 * state.tuning.max_speed_r);
    }

    #[test]
    fn test_restart_resets_round() {
        let mut state = state(3);
        state.time = 12.0;
        state.ships[0].hp = 0;
        state.ships[0].alive = false;
        state.ships[0].score -= 1;
        let id = state.next_projectile_id();
        state.projectiles.push(Projectile {
            id,
            owner: 1,
            pos: Vec2::new(10.0, 10.0),
            vel: Vec2::ZERO,
            angle: 0.0,
            mass: 0.01,
            last_partner: None,
            created_at: 11.0,
        });

        let mut events: Vec<GameEvent> = Vec::new();
        state.restart(&mut events);

        assert_eq!(events, vec![GameEvent::RoundRestarted]);
        assert_eq!(state.round, 2);
        assert_eq!(state.round_start, 12.0);
        assert!(state.projectiles.is_empty());
        assert!(state.ships.iter().all(|s| s.hp == START_HP && s.alive));
        assert_eq!(state.ships[0].score, 0);
        assert_eq!(state.ships[1].score, 1);
    }
}
