//! Space Out headless runner
//!
//! Drives the simulation at a fixed timestep with two scripted pilots standing
//! in for the keyboard, and logs what happens. Rendering and audio hosts
//! consume the same event stream.

use std::collections::HashSet;
use std::env;
use std::f32::consts::{PI, TAU};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use space_out::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_SUBSTEPS, SIM_DT};
use space_out::sim::{GameEvent, Playfield, RoundState, Ship, TickInput, tick};
use space_out::{Controls, Key, Tuning};

// Runtime settings (not gameplay tuning).

fn config_path() -> Option<String> {
    env::var("SPACE_OUT_CONFIG").ok().filter(|v| !v.is_empty())
}

fn seed() -> u64 {
    env::var("SPACE_OUT_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0x5eed)
}

fn max_ticks() -> u64 {
    env::var("SPACE_OUT_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60 * 60)
}

fn playfield() -> Playfield {
    let width = env::var("SPACE_OUT_WIDTH")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_WIDTH);
    let height = env::var("SPACE_OUT_HEIGHT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_HEIGHT);
    Playfield::new(width, height)
}

fn realtime() -> bool {
    env::var("SPACE_OUT_REALTIME").is_ok_and(|v| v == "1" || v == "true")
}

/// Keys a pilot would hold to chase and shoot at `target`
fn pilot_keys(ship: &Ship, target: &Ship, controls: &Controls, held: &mut HashSet<Key>) {
    held.clear();
    if !ship.alive {
        return;
    }

    let offset = target.pos - ship.pos;
    // Screen y grows downward, angles turn counter-clockwise
    let bearing = (-offset.y).atan2(offset.x);
    let error = (bearing - ship.angle + PI).rem_euclid(TAU) - PI;

    if error > 0.1 {
        held.insert(controls.left);
    } else if error < -0.1 {
        held.insert(controls.right);
    }
    if offset.length() > 250.0 {
        held.insert(controls.thrust);
    }
    if error.abs() < 0.3 && target.alive {
        held.insert(controls.fire);
    }
}

/// Time left to simulate after a frame; a frame that hit the substep cap fell
/// behind and its backlog is dropped
fn drop_backlog(accumulator: f32, substeps: u32) -> f32 {
    if substeps >= MAX_SUBSTEPS { 0.0 } else { accumulator }
}

fn log_event(event: &GameEvent, state: &RoundState) {
    match event {
        GameEvent::ShipDestroyed(player) => {
            log::info!("[{:7.2}s] player {} destroyed", state.time, player + 1)
        }
        GameEvent::RoundRestarted => {
            let scores: Vec<i32> = state.ships.iter().map(|s| s.score).collect();
            log::info!("[{:7.2}s] round {} begins, scores {:?}", state.time, state.round, scores)
        }
        other => log::trace!("[{:7.2}s] {:?}", state.time, other),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Space Out (headless) starting...");

    let tuning = match config_path() {
        Some(path) => match Tuning::load(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("Failed to load tuning from {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => Tuning::default(),
    };

    let mut state = match RoundState::new(seed(), tuning, playfield()) {
        Ok(state) => state,
        Err(e) => {
            log::error!("Invalid tuning: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controls = Controls::all();
    let realtime = realtime();
    let limit = max_ticks();
    let mut held: Vec<HashSet<Key>> = vec![HashSet::new(); controls.len()];
    let mut events: Vec<GameEvent> = Vec::new();
    let mut accumulator = 0.0f32;
    let mut last_frame = Instant::now();

    while state.ticks < limit {
        let frame_start = Instant::now();
        let dt = if realtime {
            let now = Instant::now();
            let dt = now.duration_since(last_frame).as_secs_f32().min(0.1);
            last_frame = now;
            dt
        } else {
            SIM_DT
        };
        accumulator += dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let mut input = TickInput::default();
            for (player, keys) in held.iter_mut().enumerate() {
                let target = (player + 1) % state.ships.len();
                pilot_keys(&state.ships[player], &state.ships[target], &controls[player], keys);
                input.intents[player] = controls[player].intent(|key| keys.contains(&key));
            }

            tick(&mut state, &input, SIM_DT, &mut events);
            for event in events.drain(..) {
                log_event(&event, &state);
            }
            accumulator -= SIM_DT;
            substeps += 1;
        }
        accumulator = drop_backlog(accumulator, substeps);

        if realtime {
            if let Some(rest) = Duration::from_secs_f32(SIM_DT).checked_sub(frame_start.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }

    for ship in &state.ships {
        log::info!(
            "Player {}: score {}, hp {}, speed {:.0}%",
            ship.player + 1,
            ship.score,
            ship.hp,
            ship.speed_percent(state.max_speed())
        );
    }
    log::info!(
        "Finished after {} ticks ({:.1}s simulated, round {}, {:.1}s into it)",
        state.ticks,
        state.time,
        state.round,
        state.round_time()
    );
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backlog_dropped_at_substep_cap() {
        assert_eq!(drop_backlog(5.0 * SIM_DT, MAX_SUBSTEPS), 0.0);
        assert_eq!(drop_backlog(0.5 * SIM_DT, 1), 0.5 * SIM_DT);
    }
}
