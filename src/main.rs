//! Vector Rocks entry point
//!
//! Headless runner: drives the simulation with a scripted pilot, logs game
//! events and prints the final frame snapshot as JSON.
//!
//! Usage: `vector-rocks [config.json] [seed] [frames]`

use std::process::ExitCode;

use vector_rocks::GameConfig;
use vector_rocks::consts::MAX_SUBSTEPS;
use vector_rocks::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

const DEFAULT_SEED: u64 = 0x5eed;
const DEFAULT_FRAMES: u32 = 3600;
/// Simulated display refresh interval (seconds); not a multiple of the timestep
const FRAME_DT: f32 = 1.0 / 50.0;

struct Runner {
    state: GameState,
    accumulator: f32,
    fire_held: bool,
}

impl Runner {
    fn new(state: GameState) -> Self {
        Self {
            state,
            accumulator: 0.0,
            fire_held: false,
        }
    }

    /// Advance one display frame, running as many fixed ticks as fit
    fn frame(&mut self, dt: f32) {
        let step = self.state.config.timestep;
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= step && substeps < MAX_SUBSTEPS {
            let input = self.pilot();
            tick(&mut self.state, &input);
            self.report_events();
            self.accumulator -= step;
            substeps += 1;
        }

        if substeps == MAX_SUBSTEPS {
            log::debug!("Substep cap reached, dropping {:.4}s", self.accumulator);
            self.accumulator = 0.0;
        }
    }

    /// Scripted input: sweep the turret, fire in bursts, nudge forward now and then
    fn pilot(&mut self) -> TickInput {
        let t = self.state.time_ticks;
        let want_fire = (t / 8) % 3 == 0;
        // Fire is edge-triggered, so release between shots
        let fire = want_fire && !self.fire_held;
        self.fire_held = fire;

        TickInput {
            thrust: (t / 90) % 4 == 1,
            turn_left: (t / 240) % 2 == 0,
            turn_right: (t / 240) % 2 == 1 && t % 3 == 0,
            fire,
            ..Default::default()
        }
    }

    fn report_events(&self) {
        for event in &self.state.events {
            match event {
                GameEvent::Collision(hit) => {
                    log::trace!("Collision {} <-> {}", hit.first, hit.second)
                }
                GameEvent::BulletFired { .. } | GameEvent::BulletExpired { .. } => {}
                GameEvent::AsteroidDestroyed { id, tier, points, .. } => {
                    log::debug!("Asteroid {id} (tier {tier}) destroyed, +{points}")
                }
                GameEvent::AsteroidSplit { parent, children } => {
                    log::debug!("Asteroid {parent} split into {children:?}")
                }
                GameEvent::ShipHit { id, hull_left } => {
                    log::info!("Ship {id} hit, hull {hull_left}")
                }
                GameEvent::ShipDestroyed { id, lives_left } => {
                    log::info!("Ship {id} destroyed, {lives_left} lives left")
                }
                GameEvent::ShipRespawned { id } => log::info!("Ship respawned as {id}"),
                GameEvent::LevelStarted { level, asteroids } => {
                    log::info!("Level {level} started with {asteroids} asteroids")
                }
                GameEvent::GameOver { score } => log::info!("Game over, final score {score}"),
            }
        }
    }
}

fn parse_arg<T: std::str::FromStr>(arg: Option<&String>, name: &str, default: T) -> Result<T, String> {
    match arg {
        Some(raw) => raw.parse().map_err(|_| format!("invalid {name}: {raw}")),
        None => Ok(default),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = match args.first().map(String::as_str) {
        Some(path) if path != "-" => GameConfig::load(path)?,
        _ => GameConfig::default(),
    };
    let seed = parse_arg(args.get(1), "seed", DEFAULT_SEED)?;
    let frames = parse_arg(args.get(2), "frame count", DEFAULT_FRAMES)?;

    log::info!(
        "Vector Rocks (headless) starting: {} difficulty, seed {seed:#x}, {frames} frames",
        config.difficulty.as_str()
    );

    let mut runner = Runner::new(GameState::new(config, seed)?);
    for _ in 0..frames {
        runner.frame(FRAME_DT);
        if runner.state.phase == GamePhase::GameOver {
            break;
        }
    }

    let state = &runner.state;
    log::info!(
        "Stopped after {} ticks: level {}, score {}, lives {}",
        state.time_ticks,
        state.level,
        state.score,
        state.lives
    );
    println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
