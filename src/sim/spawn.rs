//! Procedural spawning of obstacles and pickups
//!
//! Two independent per-step Bernoulli processes. Both rolls are drawn every
//! step whether or not they can fire, so the RNG stream only depends on the
//! step count and never on gating state.

use glam::Vec2;
use rand::Rng;

use super::skills::secs_to_ticks;
use super::state::{EntityKind, GameState, ObstacleKind, PickupKind, VisualKind};
use crate::consts::*;
use crate::tuning::SpawnTuning;

/// Probabilities in effect for the current step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRates {
    pub obstacle_chance: f32,
    pub pickup_chance: f32,
    pub diamond_chance: f32,
    pub obstacles_suspended: bool,
}

impl SpawnRates {
    pub fn for_state(state: &GameState) -> Self {
        let spawn = &state.tuning.spawn;
        let progression = &state.progression;
        Self {
            obstacle_chance: (spawn.obstacle_chance * (1.0 + progression.obstacle_rate_bonus()))
                .clamp(0.0, 1.0),
            pickup_chance: (spawn.pickup_chance * (1.0 + progression.pickup_rate_bonus()))
                .clamp(0.0, 1.0),
            diamond_chance: progression.diamond_chance(),
            obstacles_suspended: state.skills.obstacles_suspended(),
        }
    }
}

fn in_band<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

/// Pick an obstacle type and its altitude
pub fn roll_obstacle<R: Rng>(rng: &mut R, tuning: &SpawnTuning) -> (ObstacleKind, f32) {
    if rng.random::<f32>() < tuning.bird_chance {
        let band = if rng.random_bool(0.5) {
            tuning.low_bird_band
        } else {
            tuning.high_bird_band
        };
        (ObstacleKind::Bird, in_band(rng, band))
    } else {
        (ObstacleKind::Cactus, GROUND_Y)
    }
}

/// Pick a pickup type, its value and its altitude
pub fn roll_pickup<R: Rng>(
    rng: &mut R,
    tuning: &SpawnTuning,
    diamond_chance: f32,
) -> (PickupKind, u64, f32) {
    let y = in_band(rng, tuning.pickup_band);
    if rng.random::<f32>() < diamond_chance {
        (PickupKind::Diamond, tuning.diamond_value, y)
    } else {
        (PickupKind::Coin, tuning.gold_value, y)
    }
}

/// Whether the newest obstacle is far enough from the spawn column
pub fn obstacle_gap_clear(state: &GameState) -> bool {
    let min_gap = state.tuning.spawn.min_obstacle_gap;
    state
        .entities
        .iter()
        .filter(|e| e.is_obstacle())
        .all(|e| SPAWN_X - e.pos.x >= min_gap)
}

pub fn obstacle_size(kind: ObstacleKind) -> Vec2 {
    match kind {
        ObstacleKind::Cactus => Vec2::from(CACTUS_SIZE),
        ObstacleKind::Bird => Vec2::from(BIRD_SIZE),
    }
}

/// Run both spawn processes for one step
pub fn spawn_tick(state: &mut GameState) {
    let rates = SpawnRates::for_state(state);
    let obstacle_roll: f32 = state.rng.random();
    let pickup_roll: f32 = state.rng.random();

    if obstacle_roll < rates.obstacle_chance
        && !rates.obstacles_suspended
        && obstacle_gap_clear(state)
    {
        let (kind, y) = roll_obstacle(&mut state.rng, &state.tuning.spawn);
        let id = state.spawn(
            EntityKind::Obstacle(kind),
            Vec2::new(SPAWN_X, y),
            obstacle_size(kind),
        );
        log::trace!("spawned {:?} #{} at y={:.0}", kind, id, y);
    }

    if pickup_roll < rates.pickup_chance {
        let (kind, value, y) = roll_pickup(&mut state.rng, &state.tuning.spawn, rates.diamond_chance);
        state.spawn(
            EntityKind::Pickup { kind, value },
            Vec2::new(SPAWN_X, y),
            Vec2::from(PICKUP_SIZE),
        );
    }
}

/// Drop the cosmetic meteor for the meteor-call skill
pub fn spawn_meteor(state: &mut GameState) -> u32 {
    let lifetime = secs_to_ticks(state.tuning.skills.meteor_lifetime);
    let (vx, vy) = state.tuning.skills.meteor_velocity;
    // Start so the fall ends roughly over the player
    let start = Vec2::new(
        PLAYER_X - vx * lifetime as f32,
        GROUND_Y - vy * lifetime as f32,
    );
    state.spawn(
        EntityKind::VisualOnly {
            kind: VisualKind::Meteor,
            vel: Vec2::new(vx, vy),
            ttl_ticks: lifetime,
        },
        start,
        Vec2::from(METEOR_SIZE),
    )
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use super::*;
    use crate::sim::progression::MAX_DIAMOND_CHANCE;
    use crate::sim::skills::SkillKind;
    use crate::tuning::Tuning;

    fn always_spawn() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.spawn.obstacle_chance = 1.0;
        tuning.spawn.pickup_chance = 1.0;
        tuning
    }

    #[test]
    fn test_rates_follow_progression() {
        let mut state = GameState::new(5, Tuning::default());
        state.progression.risk_level = 2;
        state.progression.luck_level = 20;
        let rates = SpawnRates::for_state(&state);
        assert!((rates.obstacle_chance - 0.015 * 1.1).abs() < 1e-6);
        assert!((rates.pickup_chance - 0.01 * 1.2).abs() < 1e-6);
        assert_eq!(rates.diamond_chance, MAX_DIAMOND_CHANCE);
        assert!(!rates.obstacles_suspended);
    }

    #[test]
    fn test_spawns_at_right_edge() {
        let mut state = GameState::new(5, always_spawn());
        spawn_tick(&mut state);
        assert_eq!(state.entities.len(), 2);
        assert!(state.entities.iter().all(|e| e.pos.x == SPAWN_X));
        assert!(state.entities[0].is_obstacle());
        assert!(state.entities[1].is_pickup());
    }

    #[test]
    fn test_minimum_gap_enforced() {
        let mut state = GameState::new(5, always_spawn());
        spawn_tick(&mut state);
        // The first obstacle still sits on the spawn column
        spawn_tick(&mut state);
        assert_eq!(state.entities.iter().filter(|e| e.is_obstacle()).count(), 1);

        // Scroll it just short of the gap, then past it
        for e in state.entities.iter_mut().filter(|e| e.is_obstacle()) {
            e.pos.x = SPAWN_X - 399.0;
        }
        spawn_tick(&mut state);
        assert_eq!(state.entities.iter().filter(|e| e.is_obstacle()).count(), 1);
        for e in state.entities.iter_mut().filter(|e| e.is_obstacle()) {
            e.pos.x = SPAWN_X - 400.0;
        }
        spawn_tick(&mut state);
        assert_eq!(state.entities.iter().filter(|e| e.is_obstacle()).count(), 2);
    }

    #[test]
    fn test_meteor_suspends_obstacles_not_pickups() {
        let mut state = GameState::new(5, always_spawn());
        let meteor = state.skills.get_mut(SkillKind::Meteor);
        meteor.unlocked = true;
        meteor.level = 1;
        meteor.active_ticks = 100;
        spawn_tick(&mut state);
        assert!(state.entities.iter().all(|e| e.is_pickup()));
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_bird_bands_are_disjoint() {
        let tuning = SpawnTuning {
            bird_chance: 1.0,
            ..SpawnTuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        let (mut low, mut high) = (0, 0);
        for _ in 0..500 {
            let (kind, y) = roll_obstacle(&mut rng, &tuning);
            assert_eq!(kind, ObstacleKind::Bird);
            if y < tuning.low_bird_band.1 {
                assert!(y >= tuning.low_bird_band.0);
                low += 1;
            } else {
                assert!((tuning.high_bird_band.0..tuning.high_bird_band.1).contains(&y));
                high += 1;
            }
        }
        assert!(low > 0 && high > 0);
    }

    #[test]
    fn test_cactus_on_ground() {
        let tuning = SpawnTuning {
            bird_chance: 0.0,
            ..SpawnTuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..50 {
            assert_eq!(roll_obstacle(&mut rng, &tuning), (ObstacleKind::Cactus, GROUND_Y));
        }
    }

    #[test]
    fn test_diamond_odds() {
        let tuning = SpawnTuning::default();
        let mut rng = Pcg32::seed_from_u64(99);
        let diamonds = (0..10_000)
            .filter(|_| roll_pickup(&mut rng, &tuning, 0.25).0 == PickupKind::Diamond)
            .count();
        assert!((2_000..3_000).contains(&diamonds), "got {diamonds}");
    }

    #[test]
    fn test_meteor_is_visual_only() {
        let mut state = GameState::new(5, Tuning::default());
        spawn_meteor(&mut state);
        assert_eq!(state.entities.len(), 1);
        assert!(!state.entities[0].is_obstacle());
        assert!(!state.entities[0].is_pickup());
    }
}
