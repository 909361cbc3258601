//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::collision::{CollisionEvent, CollisionRules, detect_collisions};
use super::entity::{EntityKind, KindTag, Pose, random_direction};
use super::state::{GameEvent, GamePhase, GameState};
use super::wrap::World;
use crate::normalize_angle;

/// Distance of asteroid spawn points from the world edges
const SPAWN_BORDER: f32 = 55.0;
/// Maximum deviation of a new asteroid's course from the world center (radians)
const SPAWN_AIM_SPREAD: f32 = 35.0 * std::f32::consts::PI / 180.0;
/// Distance a new bullet starts ahead of the ship's nose
const MUZZLE_OFFSET: f32 = 1.0;
/// Debris fragments per destroyed ship
const SHIP_DEBRIS: usize = 20;
/// Debris fragments per bullet impact
const BULLET_DEBRIS: usize = 5;

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Fire one bullet this tick
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Frame-rate display toggle (forwarded to the HUD through the snapshot)
    pub toggle_fps: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if input.toggle_fps {
        state.show_fps = !state.show_fps;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Running => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at tick {}", state.time_ticks);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Running;
                log::info!("Resumed at tick {}", state.time_ticks);
            }
            GamePhase::GameOver => {}
        }
    }

    if state.phase == GamePhase::Paused {
        return;
    }

    let dt = state.config.timestep;
    state.time_ticks += 1;

    if state.count(KindTag::Asteroid) == 0 {
        start_next_level(state);
    }

    update_respawn(state);

    if state.phase == GamePhase::Running {
        apply_ship_input(state, input, dt);
    }

    // Integrate poses and refresh world-space shapes
    let world = state.world;
    for entity in &mut state.entities {
        entity.integrate(dt, &world);
    }
    update_debris(state, dt);

    // Lifetimes
    let mut expired = Vec::new();
    for entity in &mut state.entities {
        if entity.tick_lifetime() {
            expired.push(entity.id);
        }
    }
    state
        .events
        .extend(expired.into_iter().map(|id| GameEvent::BulletExpired { id }));

    let rules = CollisionRules {
        asteroid_asteroid: state.config.asteroid_asteroid_collisions,
        ..Default::default()
    };
    let hits = detect_collisions(
        &state.entities,
        &state.world,
        &rules,
        state.config.narrow_phase,
    );
    apply_collisions(state, &hits);

    state.entities.retain(|e| e.alive);

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Turn, thrust and fire for the live ship
fn apply_ship_input(state: &mut GameState, input: &TickInput, dt: f32) {
    let turn_rate = state.config.ship_turn_rate;
    let thrust = state.config.ship_thrust;
    let max_speed = state.config.ship_max_speed;

    let Some(ship) = state.ship_mut() else {
        return;
    };

    let mut turn = 0.0;
    if input.turn_left {
        turn -= 1.0;
    }
    if input.turn_right {
        turn += 1.0;
    }
    ship.pose.heading = normalize_angle(ship.pose.heading + turn * turn_rate * dt);

    if input.thrust {
        let accel = ship.pose.forward() * thrust * dt;
        ship.pose.velocity = (ship.pose.velocity + accel).clamp_length_max(max_speed);
    }

    if !input.fire {
        return;
    }
    let forward = ship.pose.forward();
    let heading = ship.pose.heading;
    let muzzle = ship.nose_position() + forward * MUZZLE_OFFSET;

    if state.count(KindTag::Bullet) >= state.config.shot_limit {
        log::debug!("Shot limit reached");
        return;
    }
    let velocity = forward * state.config.bullet_speed;
    let lifetime = state.config.bullet_lifetime_ticks;
    match state.spawn_bullet(muzzle, heading, velocity, lifetime) {
        Ok(id) => state.events.push(GameEvent::BulletFired { id }),
        Err(err) => log::warn!("Failed to spawn bullet: {err}"),
    }
}

fn update_respawn(state: &mut GameState) {
    let Some(ticks) = state.respawn_ticks else {
        return;
    };
    if ticks > 1 {
        state.respawn_ticks = Some(ticks - 1);
        return;
    }
    state.respawn_ticks = None;
    match state.spawn_ship() {
        Ok(id) => {
            log::info!("Ship respawned ({} lives left)", state.lives);
            state.events.push(GameEvent::ShipRespawned { id });
        }
        Err(err) => log::warn!("Failed to respawn ship: {err}"),
    }
}

fn update_debris(state: &mut GameState, dt: f32) {
    let world = state.world;
    for debris in &mut state.debris {
        debris.pos = world.wrap(debris.pos + debris.vel * dt);
        debris.life -= dt;
    }
    state.debris.retain(|d| d.life > 0.0);
}

/// Apply hit outcomes. Each entity reacts to at most one event per tick;
/// events are taken in order and later events touching an entity that
/// already reacted are dropped.
fn apply_collisions(state: &mut GameState, hits: &[CollisionEvent]) {
    let mut reacted: HashSet<u32> = HashSet::new();

    for hit in hits {
        if reacted.contains(&hit.first) || reacted.contains(&hit.second) {
            log::debug!(
                "Dropping collision {} <-> {}: already resolved this tick",
                hit.first,
                hit.second
            );
            continue;
        }
        let (Some(first), Some(second)) = (state.index_of(hit.first), state.index_of(hit.second))
        else {
            continue;
        };
        if !state.entities[first].alive || !state.entities[second].alive {
            continue;
        }
        reacted.insert(hit.first);
        reacted.insert(hit.second);
        state.events.push(GameEvent::Collision(*hit));

        let first_kind = state.entities[first].kind;
        let second_kind = state.entities[second].kind;
        match (first_kind, second_kind) {
            (EntityKind::Bullet { .. }, EntityKind::Asteroid { .. }) => {
                bullet_hits_asteroid(state, first, second);
            }
            (EntityKind::Asteroid { .. }, EntityKind::Bullet { .. }) => {
                bullet_hits_asteroid(state, second, first);
            }
            (EntityKind::Ship { .. }, EntityKind::Asteroid { .. }) => {
                ship_hits_asteroid(state, first, second);
            }
            (EntityKind::Asteroid { .. }, EntityKind::Ship { .. }) => {
                ship_hits_asteroid(state, second, first);
            }
            (EntityKind::Asteroid { .. }, EntityKind::Asteroid { .. }) => {
                // Both families of fragments share one brood
                let first_vel = state.entities[first].pose.velocity;
                let second_vel = state.entities[second].pose.velocity;
                let brood = hit.first;
                destroy_asteroid(state, first, second_vel, false, brood);
                destroy_asteroid(state, second, first_vel, false, brood);
            }
            _ => {}
        }
    }
}

fn bullet_hits_asteroid(state: &mut GameState, bullet: usize, asteroid: usize) {
    let impact = state.entities[bullet].pose.velocity * 0.5;
    let pos = state.entities[bullet].pose.position;
    state.entities[bullet].alive = false;
    state.spawn_debris(pos, 5.0, BULLET_DEBRIS, 30.0);
    // No score once the game is over, even for shots still in flight
    let award = state.phase != GamePhase::GameOver;
    let brood = state.entities[asteroid].id;
    destroy_asteroid(state, asteroid, impact, award, brood);
}

fn ship_hits_asteroid(state: &mut GameState, ship: usize, asteroid: usize) {
    let impact = state.entities[ship].pose.velocity;
    let brood = state.entities[asteroid].id;
    destroy_asteroid(state, asteroid, impact, false, brood);

    let entity = &mut state.entities[ship];
    let EntityKind::Ship { hull } = &mut entity.kind else {
        return;
    };
    *hull = hull.saturating_sub(1);
    let (id, hull_left, pos) = (entity.id, *hull, entity.pose.position);
    state.events.push(GameEvent::ShipHit { id, hull_left });
    if hull_left > 0 {
        log::debug!("Ship {id} hit, hull {hull_left}");
        return;
    }

    state.entities[ship].alive = false;
    state.lives = state.lives.saturating_sub(1);
    state.spawn_debris(pos, 20.0, SHIP_DEBRIS, 40.0);
    state.events.push(GameEvent::ShipDestroyed {
        id,
        lives_left: state.lives,
    });

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.respawn_ticks = None;
        log::info!("Game over: score {} at level {}", state.score, state.level);
        state.events.push(GameEvent::GameOver { score: state.score });
    } else {
        state.respawn_ticks = Some(state.config.respawn_delay_ticks);
        log::info!("Ship destroyed, {} lives left", state.lives);
    }
}

/// Destroy an asteroid and, above the smallest tier, split it into children
/// at the parent's position. Children join `brood`.
fn destroy_asteroid(state: &mut GameState, index: usize, impact: Vec2, award: bool, brood: u32) {
    let entity = &mut state.entities[index];
    let EntityKind::Asteroid { tier } = entity.kind else {
        return;
    };
    entity.alive = false;
    let (id, pose) = (entity.id, entity.pose);

    let (radius, tier_points) = state
        .config
        .asteroid_tiers
        .get(tier)
        .map(|t| (t.radius, t.points))
        .unwrap_or((0.0, 0));
    let points = if award { tier_points } else { 0 };
    state.add_score(points);
    state.events.push(GameEvent::AsteroidDestroyed {
        id,
        tier,
        position: pose.position,
        points,
    });

    let parent_speed = pose.velocity.length();
    let impact_speed = impact.length();
    state.spawn_debris(
        pose.position,
        radius,
        radius as usize,
        (parent_speed + impact_speed) / 3.0,
    );

    if tier == 0 {
        return;
    }
    let max_spin = state.config.asteroid_max_spin;
    let min_speed = state.config.asteroid_min_speed;
    let mut children = Vec::with_capacity(state.config.children_per_split);
    for _ in 0..state.config.children_per_split {
        let rng = state.rng_mut();
        let dir = random_direction(rng);
        let speed = ((parent_speed + impact_speed) / rng.random_range(2.0f32..=3.0)).max(min_speed);
        let child = Pose {
            position: pose.position,
            heading: rng.random_range(-std::f32::consts::PI..std::f32::consts::PI),
            velocity: dir * speed,
            angular_velocity: rng.random_range(-max_spin..=max_spin),
        };
        match state.spawn_fragment(tier - 1, child, brood) {
            Ok(child_id) => children.push(child_id),
            Err(err) => log::warn!("Failed to split asteroid {id}: {err}"),
        }
    }
    log::debug!("Asteroid {id} split into {children:?}");
    state.events.push(GameEvent::AsteroidSplit {
        parent: id,
        children,
    });
}

/// Candidate spawn points inset from the world edges
pub fn spawn_points(world: &World) -> Vec<Vec2> {
    let (w, h, b) = (world.width, world.height, SPAWN_BORDER);
    vec![
        Vec2::new(b, b),
        Vec2::new(w / 3.0, b),
        Vec2::new(w / 3.0 * 2.0, b),
        Vec2::new(w - b, b),
        Vec2::new(b, h - b),
        Vec2::new(w / 3.0, h - b),
        Vec2::new(w / 3.0 * 2.0, h - b),
        Vec2::new(w - b, h - b),
        Vec2::new(b, h / 3.0),
        Vec2::new(b, h / 3.0 * 2.0),
        Vec2::new(w - b, h / 3.0),
        Vec2::new(w - b, h / 3.0 * 2.0),
    ]
}

/// Point farthest from everything already occupied (first wins ties)
fn farthest_point(candidates: &[Vec2], occupied: &[Vec2]) -> Vec2 {
    let clearance = |p: Vec2| {
        occupied
            .iter()
            .map(|o| o.distance_squared(p))
            .fold(f32::INFINITY, f32::min)
    };
    candidates
        .iter()
        .fold((Vec2::ZERO, f32::NEG_INFINITY), |(best, best_dist), &p| {
            let dist = clearance(p);
            if dist > best_dist { (p, dist) } else { (best, best_dist) }
        })
        .0
}

/// Advance the level counter and spawn that many large asteroids
pub fn start_next_level(state: &mut GameState) {
    state.level = (state.level + 1).min(state.config.max_level);
    let level = state.level;
    let tier = state.config.top_tier();
    let center = state.world.center();

    let mut candidates = spawn_points(&state.world);
    candidates.shuffle(state.rng_mut());

    let mut occupied: Vec<Vec2> = state.ship().map(|s| s.pose.position).into_iter().collect();
    let mut spawned = 0;
    for _ in 0..level {
        let pos = farthest_point(&candidates, &occupied);
        occupied.push(pos);

        let min_speed = state.config.asteroid_min_speed;
        let max_speed = state.config.asteroid_max_speed;
        let per_level = state.config.asteroid_speed_per_level;
        let max_spin = state.config.asteroid_max_spin;
        let rng = state.rng_mut();
        let aim = Vec2::from_angle(rng.random_range(-SPAWN_AIM_SPREAD..=SPAWN_AIM_SPREAD));
        let dir = aim.rotate((center - pos).normalize_or(Vec2::X));
        let speed = rng.random_range(min_speed..=max_speed) + level as f32 * per_level;
        let pose = Pose {
            position: pos,
            heading: rng.random_range(-std::f32::consts::PI..std::f32::consts::PI),
            velocity: dir * speed,
            angular_velocity: rng.random_range(-max_spin..=max_spin),
        };
        match state.spawn_asteroid(tier, pose) {
            Ok(_) => spawned += 1,
            Err(err) => log::warn!("Failed to spawn asteroid: {err}"),
        }
    }

    log::info!("Level {level}: {spawned} asteroids");
    state.events.push(GameEvent::LevelStarted {
        level,
        asteroids: spawned,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::sim::polygon::Polygon;

    fn quiet_config() -> GameConfig {
        GameConfig {
            timestep: 1.0 / 16.0,
            ..GameConfig::default()
        }
    }

    /// Session with a parked asteroid far from everything, so no level spawns
    fn parked_state(config: GameConfig) -> (GameState, u32) {
        let mut state = GameState::new(config, 12345).unwrap();
        let rock = state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 100.0)))
            .unwrap();
        (state, rock)
    }

    fn collisions(state: &GameState) -> Vec<CollisionEvent> {
        state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Collision(hit) => Some(*hit),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_tick_starts_level_one() {
        let mut state = GameState::new(GameConfig::default(), 99).unwrap();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.level, 1);
        assert_eq!(state.count(KindTag::Asteroid), 1);
        assert!(state.events.contains(&GameEvent::LevelStarted {
            level: 1,
            asteroids: 1
        }));
        let rock = state
            .entities
            .iter()
            .find(|e| e.tag() == KindTag::Asteroid)
            .unwrap();
        assert_eq!(rock.kind, EntityKind::Asteroid { tier: 2 });
    }

    #[test]
    fn test_level_spawns_away_from_ship() {
        let mut state = GameState::new(GameConfig::default(), 3).unwrap();
        state.level = 4;
        start_next_level(&mut state);
        assert_eq!(state.level, 5);
        let ship = state.ship().unwrap().pose.position;
        let rocks: Vec<_> = state
            .entities
            .iter()
            .filter(|e| e.tag() == KindTag::Asteroid)
            .collect();
        assert_eq!(rocks.len(), 5);
        for rock in rocks {
            assert!(rock.pose.position.distance(ship) > 150.0);
        }
    }

    #[test]
    fn test_level_is_capped() {
        let mut state = GameState::new(GameConfig::default(), 3).unwrap();
        state.level = 9;
        start_next_level(&mut state);
        assert_eq!(state.level, 9);
    }

    #[test]
    fn test_pause_suspends_updates() {
        let (mut state, rock) = parked_state(quiet_config());
        state.entities.iter_mut().for_each(|e| {
            if e.id == rock {
                e.pose.velocity = Vec2::new(16.0, 0.0);
            }
        });
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);
        let frozen = state.entity(rock).unwrap().pose.position;

        tick(&mut state, &TickInput::default());
        assert_eq!(state.entity(rock).unwrap().pose.position, frozen);
        assert_eq!(state.time_ticks, 0);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.time_ticks, 1);
        assert_eq!(
            state.entity(rock).unwrap().pose.position,
            frozen + Vec2::new(1.0, 0.0)
        );
    }

    #[test]
    fn test_toggle_fps_works_while_paused() {
        let (mut state, _) = parked_state(quiet_config());
        state.phase = GamePhase::Paused;
        tick(
            &mut state,
            &TickInput {
                toggle_fps: true,
                ..Default::default()
            },
        );
        assert!(state.show_fps);
        assert_eq!(state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_ship_turn_and_thrust() {
        let (mut state, _) = parked_state(quiet_config());
        let input = TickInput {
            turn_right: true,
            thrust: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        let ship = state.ship().unwrap();
        let expected_heading = std::f32::consts::FRAC_PI_2 / 16.0;
        assert!((ship.pose.heading - expected_heading).abs() < 1e-6);
        // Thrust along the nose: mostly "up" the screen
        assert!(ship.pose.velocity.y < 0.0);
        assert!((ship.pose.velocity.length() - 360.0 / 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_ship_speed_is_capped() {
        let (mut state, _) = parked_state(quiet_config());
        state.config.ship_max_speed = 50.0;
        let input = TickInput {
            thrust: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input);
        }
        let speed = state.ship().unwrap().pose.velocity.length();
        assert!(speed <= 50.0 + 1e-3);
    }

    #[test]
    fn test_fire_spawns_bullet_at_nose() {
        let (mut state, _) = parked_state(quiet_config());
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire);
        assert_eq!(state.count(KindTag::Bullet), 1);
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::BulletFired { .. }))
        );
        let bullet = state
            .entities
            .iter()
            .find(|e| e.tag() == KindTag::Bullet)
            .unwrap();
        // Spawned 21 px above the ship center, then integrated one tick
        let expected = Vec2::new(512.0, 384.0 - 21.0 - 360.0 / 16.0);
        assert!((bullet.pose.position - expected).length() < 1e-3);
    }

    #[test]
    fn test_shot_limit() {
        let (mut state, _) = parked_state(quiet_config());
        state.config.shot_limit = 3;
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        for _ in 0..5 {
            tick(&mut state, &fire);
        }
        assert_eq!(state.count(KindTag::Bullet), 3);
    }

    #[test]
    fn test_bullet_expires_exactly_after_lifetime() {
        let lifetime = 10;
        let (mut state, _) = parked_state(GameConfig::default());
        let bullet = state
            .spawn_bullet(Vec2::new(100.0, 600.0), 0.0, Vec2::new(0.0, -360.0), lifetime)
            .unwrap();

        for _ in 0..lifetime - 1 {
            tick(&mut state, &TickInput::default());
        }
        assert!(state.entity(bullet).is_some(), "bullet gone before tick L");

        tick(&mut state, &TickInput::default());
        assert!(state.entity(bullet).is_none(), "bullet still alive after tick L");
        assert!(state.events.contains(&GameEvent::BulletExpired { id: bullet }));
    }

    #[test]
    fn test_ship_meets_hexagon_exactly_when_extents_overlap() {
        let radius = 40.0;
        let nose = 20.0;
        let mut state = GameState::new(quiet_config(), 1).unwrap();

        // Point the ship's nose along +x
        let ship_id = state.ship().unwrap().id;
        let ship = state.ship_mut().unwrap();
        ship.pose.heading = std::f32::consts::FRAC_PI_2;
        ship.sync_shape();
        let ship_pos = ship.pose.position;

        // Hexagon with a vertex pointing at the ship, closing at 1 px per tick
        let start = ship_pos + Vec2::new(radius + nose + 5.5, 0.0);
        let hexagon = Polygon::regular(radius, 6, std::f32::consts::PI).unwrap();
        let rock = state.spawn_entity(
            EntityKind::Asteroid { tier: 0 },
            Pose {
                position: start,
                velocity: Vec2::new(-16.0, 0.0),
                ..Default::default()
            },
            hexagon,
        );

        for step in 1..=5 {
            tick(&mut state, &TickInput::default());
            assert!(
                collisions(&state).is_empty(),
                "unexpected collision at tick {step}"
            );
        }
        let gap = state.entity(rock).unwrap().pose.position.x - ship_pos.x;
        assert!(gap > radius + nose);

        tick(&mut state, &TickInput::default());
        let hits = collisions(&state);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].first, hits[0].second), (ship_id, rock));
    }

    #[test]
    fn test_bullet_splits_large_asteroid() {
        let config = GameConfig::default();
        let children_per_split = config.children_per_split;
        let mut state = GameState::new(config, 5).unwrap();
        let parent_pos = Vec2::new(150.0, 150.0);
        let parent = state.spawn_asteroid(2, Pose::at(parent_pos)).unwrap();
        let bullet = state.spawn_bullet(parent_pos, 0.0, Vec2::ZERO, 50).unwrap();

        tick(&mut state, &TickInput::default());

        assert!(state.entity(parent).is_none());
        assert!(state.entity(bullet).is_none());
        assert_eq!(state.score, 20);

        let children: Vec<_> = state
            .entities
            .iter()
            .filter(|e| e.tag() == KindTag::Asteroid)
            .collect();
        assert_eq!(children.len(), children_per_split);
        for child in &children {
            assert_eq!(child.kind, EntityKind::Asteroid { tier: 1 });
            assert_eq!(child.pose.position, parent_pos);
        }
        assert_ne!(children[0].pose.heading, children[1].pose.heading);
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::AsteroidSplit { parent: p, children } if *p == parent && children.len() == children_per_split
        )));
    }

    #[test]
    fn test_smallest_tier_disappears() {
        let mut state = GameState::new(GameConfig::default(), 5).unwrap();
        let pos = Vec2::new(150.0, 150.0);
        state.spawn_asteroid(0, Pose::at(pos)).unwrap();
        // Keep a parked rock so the level does not advance
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();
        state.spawn_bullet(pos, 0.0, Vec2::ZERO, 50).unwrap();

        tick(&mut state, &TickInput::default());
        assert_eq!(state.count(KindTag::Asteroid), 1);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_asteroid_reacts_to_one_bullet_per_tick() {
        let mut state = GameState::new(GameConfig::default(), 5).unwrap();
        let pos = Vec2::new(150.0, 150.0);
        let rock = state.spawn_asteroid(0, Pose::at(pos)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();
        let first = state.spawn_bullet(pos, 0.0, Vec2::ZERO, 50).unwrap();
        let second = state.spawn_bullet(pos, 0.0, Vec2::ZERO, 50).unwrap();

        tick(&mut state, &TickInput::default());
        let hits = collisions(&state);
        assert_eq!(hits.len(), 1);
        assert_eq!((hits[0].first, hits[0].second), (rock, first));
        assert!(state.entity(first).is_none());
        assert!(state.entity(second).is_some());
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_dead_entities_never_collide_again() {
        let mut state = GameState::new(GameConfig::default(), 5).unwrap();
        let pos = Vec2::new(150.0, 150.0);
        let rock = state.spawn_asteroid(0, Pose::at(pos)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();
        let bullet = state.spawn_bullet(pos, 0.0, Vec2::ZERO, 50).unwrap();

        tick(&mut state, &TickInput::default());
        assert_eq!(collisions(&state).len(), 1);

        tick(&mut state, &TickInput::default());
        assert!(
            collisions(&state)
                .iter()
                .all(|hit| !hit.involves(rock) && !hit.involves(bullet))
        );
    }

    #[test]
    fn test_ship_destroyed_and_respawned() {
        let mut config = quiet_config();
        config.respawn_delay_ticks = 3;
        let mut state = GameState::new(config, 8).unwrap();
        let center = state.world.center();
        let rock = state.spawn_asteroid(0, Pose::at(center)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();

        tick(&mut state, &TickInput::default());
        assert!(state.ship().is_none());
        assert!(state.entity(rock).is_none());
        assert_eq!(state.lives, 2);
        assert_eq!(state.score, 0);
        assert_eq!(state.respawn_ticks, Some(3));

        for _ in 0..2 {
            tick(&mut state, &TickInput::default());
            assert!(state.ship().is_none());
        }
        tick(&mut state, &TickInput::default());
        assert!(state.ship().is_some());
        assert!(
            state
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::ShipRespawned { .. }))
        );
    }

    #[test]
    fn test_casual_ship_absorbs_hits() {
        let config = GameConfig {
            difficulty: crate::config::Difficulty::Casual,
            ..quiet_config()
        };
        let mut state = GameState::new(config, 8).unwrap();
        let center = state.world.center();
        state.spawn_asteroid(0, Pose::at(center)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();

        tick(&mut state, &TickInput::default());
        let ship = state.ship().unwrap();
        assert_eq!(ship.kind, EntityKind::Ship { hull: 2 });
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut config = quiet_config();
        config.starting_lives = 1;
        let mut state = GameState::new(config, 8).unwrap();
        let center = state.world.center();
        state.spawn_asteroid(0, Pose::at(center)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();

        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.respawn_ticks, None);
        assert!(state.events.contains(&GameEvent::GameOver { score: 0 }));

        // Fire is ignored without a ship, but the world keeps moving
        let ticks = state.time_ticks;
        tick(
            &mut state,
            &TickInput {
                fire: true,
                pause: true,
                ..Default::default()
            },
        );
        assert_eq!(state.time_ticks, ticks + 1);
        assert_eq!(state.count(KindTag::Bullet), 0);
    }

    #[test]
    fn test_asteroid_asteroid_collisions_when_enabled() {
        let config = GameConfig {
            asteroid_asteroid_collisions: true,
            ..GameConfig::default()
        };
        let mut state = GameState::new(config, 8).unwrap();
        let a = state.spawn_asteroid(1, Pose::at(Vec2::new(150.0, 150.0))).unwrap();
        let b = state.spawn_asteroid(1, Pose::at(Vec2::new(160.0, 150.0))).unwrap();

        tick(&mut state, &TickInput::default());
        assert!(state.entity(a).is_none());
        assert!(state.entity(b).is_none());
        assert_eq!(state.score, 0);
        assert_eq!(state.count(KindTag::Asteroid), 4);
    }

    #[test]
    fn test_asteroid_collision_fragments_survive() {
        let config = GameConfig {
            asteroid_asteroid_collisions: true,
            ..GameConfig::default()
        };
        let children_per_split = config.children_per_split;
        let mut state = GameState::new(config, 8).unwrap();
        state.spawn_asteroid(2, Pose::at(Vec2::new(150.0, 150.0))).unwrap();
        state.spawn_asteroid(2, Pose::at(Vec2::new(170.0, 150.0))).unwrap();

        tick(&mut state, &TickInput::default());
        assert_eq!(state.count(KindTag::Asteroid), 2 * children_per_split);

        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
            assert!(
                !state
                    .events
                    .iter()
                    .any(|e| matches!(e, GameEvent::AsteroidDestroyed { .. }))
            );
        }
        assert_eq!(state.count(KindTag::Asteroid), 2 * children_per_split);
        assert_eq!(state.level, 0);
    }

    #[test]
    fn test_no_score_after_game_over() {
        let mut state = GameState::new(GameConfig::default(), 5).unwrap();
        let pos = Vec2::new(150.0, 150.0);
        let rock = state.spawn_asteroid(0, Pose::at(pos)).unwrap();
        state
            .spawn_asteroid(0, Pose::at(Vec2::new(900.0, 700.0)))
            .unwrap();
        state.spawn_bullet(pos, 0.0, Vec2::ZERO, 50).unwrap();
        state.phase = GamePhase::GameOver;

        tick(&mut state, &TickInput::default());
        assert!(state.entity(rock).is_none());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_determinism() {
        let inputs = [
            TickInput {
                thrust: true,
                ..Default::default()
            },
            TickInput {
                fire: true,
                turn_left: true,
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                fire: true,
                ..Default::default()
            },
        ];
        let mut state1 = GameState::new(GameConfig::default(), 99999).unwrap();
        let mut state2 = GameState::new(GameConfig::default(), 99999).unwrap();

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input);
                tick(&mut state2, input);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.entities.len(), state2.entities.len());
        for (a, b) in state1.entities.iter().zip(&state2.entities) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pose, b.pose);
        }
    }
}
