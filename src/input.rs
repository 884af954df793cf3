//! Keyboard state to ship intents
//!
//! The host reports which keys are held; this turns them into the per-tick
//! movement/fire intent the simulation consumes.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;
use crate::sim::ShipIntent;

/// Keys the game binds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    A,
    D,
    W,
    S,
    Num1,
}

/// Key bindings for one ship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left: Key,
    pub right: Key,
    pub thrust: Key,
    pub reverse: Key,
    pub fire: Key,
}

/// Default bindings, one entry per ship
const BINDINGS: [Controls; MAX_PLAYERS] = [
    Controls {
        left: Key::Left,
        right: Key::Right,
        thrust: Key::Up,
        reverse: Key::Down,
        fire: Key::Space,
    },
    Controls {
        left: Key::A,
        right: Key::D,
        thrust: Key::W,
        reverse: Key::S,
        fire: Key::Num1,
    },
];

impl Controls {
    /// Default bindings for a player, `None` past the bound players
    pub fn for_player(player: usize) -> Option<Self> {
        BINDINGS.get(player).copied()
    }

    /// Bindings for every ship in a round
    pub fn all() -> [Self; MAX_PLAYERS] {
        BINDINGS
    }

    /// Resolve held keys into an intent; opposing keys cancel out
    pub fn intent(&self, pressed: impl Fn(Key) -> bool) -> ShipIntent {
        ShipIntent {
            rotate: axis(pressed(self.left), pressed(self.right)),
            thrust: axis(pressed(self.thrust), pressed(self.reverse)),
            fire: pressed(self.fire),
        }
    }
}

fn axis(positive: bool, negative: bool) -> i8 {
    match (positive, negative) {
        (true, false) => 1,
        (false, true) => -1,
        _ => 0,
    }
}
