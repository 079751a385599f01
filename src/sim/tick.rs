//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. One call is one
//! logical step of `SIM_DT` seconds; all per-step quantities (gravity, scroll
//! speed, countdowns) are expressed in steps.

use serde::Serialize;

use super::collision::resolve_collisions;
use super::physics::physics_tick;
use super::skills::{ActivationResult, SkillKind, secs_to_ticks};
use super::spawn::{spawn_meteor, spawn_tick};
use super::state::{EntityKind, GameEvent, GameState, ObstacleKind, SessionPhase};
use crate::consts::*;

/// How far ahead (in steps of travel) autopilot starts a jump
const AUTOPILOT_JUMP_LEAD: f32 = 10.0;
/// How far ahead (in steps of travel) autopilot starts ducking
const AUTOPILOT_DUCK_LEAD: f32 = 20.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Jump (space/tap); ignored while airborne
    pub jump: bool,
    /// New duck state, if it changed
    pub ducking: Option<bool>,
    /// Skills to trigger this step
    pub activate: Vec<SkillKind>,
    /// Idle/demo mode - AI dodges obstacles
    pub autopilot: bool,
}

/// What the step did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickOutcome {
    Continue,
    ShopOpened,
    GameOver,
    /// Session was not running; nothing advanced
    Halted,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) -> TickOutcome {
    if state.phase != SessionPhase::Running {
        return TickOutcome::Halted;
    }

    // Survival time and distance
    state.time_ticks += 1;
    state.distance += f64::from(state.scroll_speed()) / 10.0;

    let ramp_ticks = u64::from(secs_to_ticks(state.tuning.physics.speed_ramp_interval).max(1));
    if state.time_ticks % ramp_ticks == 0 {
        state.speed_multiplier *= state.tuning.physics.speed_ramp_factor;
        let multiplier = state.speed_multiplier;
        log::info!("Speed up: x{:.3} at {:.0}s", multiplier, state.elapsed_secs());
        state.emit(GameEvent::SpeedUp { multiplier });
    }

    // Periodic shop, on survival time only
    let shop_ticks = u64::from(secs_to_ticks(state.tuning.shop_interval).max(1));
    if state.time_ticks % shop_ticks == 0 {
        state.phase = SessionPhase::Shop;
        state.shop_visits += 1;
        let visit = state.shop_visits;
        log::info!("Shop opens (visit {}) with ${}", visit, state.money);
        state.emit(GameEvent::ShopOpened { visit });
        return TickOutcome::ShopOpened;
    }

    for kind in state.skills.tick() {
        log::debug!("{} wore off", kind.as_str());
        state.emit(GameEvent::SkillExpired(kind));
    }

    if input.autopilot {
        let input = autopilot_input(state, input);
        apply_input(state, &input);
    } else {
        apply_input(state, input);
    }

    physics_tick(state);
    spawn_tick(state);
    let collisions = resolve_collisions(state);

    // Ensure deterministic ordering
    state.normalize_order();

    if collisions.fatal {
        TickOutcome::GameOver
    } else {
        TickOutcome::Continue
    }
}

/// Validate and apply player intents against the current state
fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(ducking) = input.ducking {
        state.player.ducking = ducking;
    }

    if input.jump && state.player.jump(state.tuning.physics.jump_velocity) {
        state.emit(GameEvent::Jumped);
    }

    for &kind in &input.activate {
        let reduction = state.progression.cooldown_reduction();
        match state.skills.activate(kind, reduction, &state.tuning.skills) {
            ActivationResult::Activated { .. } => {
                log::info!("{} activated at {:.1}s", kind.as_str(), state.elapsed_secs());
                if kind == SkillKind::Meteor {
                    spawn_meteor(state);
                }
                state.emit(GameEvent::SkillActivated(kind));
            }
            refused => log::debug!("{} not activated: {:?}", kind.as_str(), refused),
        }
    }
}

/// Demo-mode input: jump ground threats, duck high birds
pub fn autopilot_input(state: &GameState, base: &TickInput) -> TickInput {
    let mut input = TickInput {
        activate: base.activate.clone(),
        ducking: Some(false),
        ..Default::default()
    };

    let front = PLAYER_X + PLAYER_HITBOX_INSET + PLAYER_WIDTH;
    let back = PLAYER_X + PLAYER_HITBOX_INSET;
    let speed = state.obstacle_speed().max(0.1);

    // Closest obstacle that has not fully passed the player
    let threat = state
        .entities
        .iter()
        .filter(|e| e.is_obstacle() && e.pos.x + e.size.x >= back)
        .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));

    if let Some(obstacle) = threat {
        let distance = obstacle.pos.x - front;
        let duckable = matches!(obstacle.kind, EntityKind::Obstacle(ObstacleKind::Bird))
            && obstacle.pos.y > PLAYER_DUCK_HEIGHT;
        if duckable {
            input.ducking = Some(distance <= speed * AUTOPILOT_DUCK_LEAD);
        } else if distance <= speed * AUTOPILOT_JUMP_LEAD && distance > 0.0 {
            input.jump = true;
        }
    }
    input
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::state::PickupKind;
    use crate::tuning::Tuning;

    /// Tuning with no random spawns, for hand-built scenarios
    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.spawn.obstacle_chance = 0.0;
        tuning.spawn.pickup_chance = 0.0;
        tuning
    }

    fn running(tuning: Tuning) -> GameState {
        let mut state = GameState::new(12345, tuning);
        state.phase = SessionPhase::Running;
        state
    }

    #[test]
    fn test_idle_does_not_advance() {
        let mut state = GameState::new(12345, Tuning::default());
        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Halted);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_tick_advances_time_and_distance() {
        let mut state = running(quiet_tuning());
        for _ in 0..10 {
            assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Continue);
        }
        assert_eq!(state.time_ticks, 10);
        assert!((state.distance - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_distance_precise_on_long_runs() {
        let mut state = running(quiet_tuning());
        // Past the point where a 0.6 step would vanish in single precision
        state.distance = 16_777_216.0;
        tick(&mut state, &TickInput::default());
        assert!((state.distance - 16_777_216.6).abs() < 1e-6);
        assert_eq!(state.score(), 16_777_216);
    }

    #[test]
    fn test_jump_and_land_through_tick() {
        let mut state = running(quiet_tuning());
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump);
        assert!(!state.player.on_ground);
        assert!(state.events.contains(&GameEvent::Jumped));

        // Jumping again mid-air does nothing
        let vy = state.player.vy;
        tick(&mut state, &jump);
        assert!(state.player.vy < vy);

        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.player.y, 0.0);
        assert_eq!(state.player.vy, 0.0);
        assert!(state.events.contains(&GameEvent::Landed));
    }

    #[test]
    fn test_shop_opens_once_per_interval() {
        let mut state = running(quiet_tuning());
        let mut opened_at = None;
        for _ in 0..3600 {
            if tick(&mut state, &TickInput::default()) == TickOutcome::ShopOpened {
                opened_at = Some(state.time_ticks);
                break;
            }
        }
        assert_eq!(opened_at, Some(3600));
        assert_eq!(state.phase, SessionPhase::Shop);
        assert_eq!(state.shop_visits, 1);

        // Halted while in the shop
        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Halted);
        assert_eq!(state.time_ticks, 3600);

        state.phase = SessionPhase::Running;
        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Continue);
        assert_eq!(state.shop_visits, 1);
    }

    #[test]
    fn test_speed_multiplier_ramps() {
        let mut tuning = quiet_tuning();
        tuning.shop_interval = 1000.0;
        let mut state = running(tuning);
        for _ in 0..3599 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.speed_multiplier, 1.0);
        tick(&mut state, &TickInput::default());
        assert!((state.speed_multiplier - 1.07).abs() < 1e-6);
    }

    #[test]
    fn test_time_slow_exact_duration() {
        let mut state = running(quiet_tuning());
        {
            let slow = state.skills.get_mut(SkillKind::TimeSlow);
            slow.level = 2;
        }
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Cactus),
            Vec2::new(500.0, 0.0),
            Vec2::from(CACTUS_SIZE),
        );
        let full = state.scroll_speed();

        let activate = TickInput {
            activate: vec![SkillKind::TimeSlow],
            ..Default::default()
        };
        let idle = TickInput::default();
        let mut slowed = 0;
        for step in 0..400 {
            // Pin the obstacle so it never reaches the player or leaves the screen
            state.entities[0].pos.x = 500.0;
            tick(&mut state, if step == 0 { &activate } else { &idle });
            let moved = 500.0 - state.entities[0].pos.x;
            if (moved - 0.8 * full).abs() < 1e-3 {
                slowed += 1;
            } else {
                assert!((moved - full).abs() < 1e-3, "step {step} moved {moved}");
            }
        }
        assert!(state.events.contains(&GameEvent::SkillExpired(SkillKind::TimeSlow)));
        // 5 seconds at 60 Hz
        assert_eq!(slowed, 300);
    }

    #[test]
    fn test_meteor_activation_spawns_visual() {
        let mut state = running(quiet_tuning());
        {
            let meteor = state.skills.get_mut(SkillKind::Meteor);
            meteor.unlocked = true;
            meteor.level = 1;
        }
        tick(
            &mut state,
            &TickInput {
                activate: vec![SkillKind::Meteor],
                ..Default::default()
            },
        );
        assert!(state.events.contains(&GameEvent::SkillActivated(SkillKind::Meteor)));
        assert_eq!(state.entities.len(), 1);
        assert!(matches!(state.entities[0].kind, EntityKind::VisualOnly { .. }));
    }

    #[test]
    fn test_meteor_boost_restores_speed() {
        let mut state = running(quiet_tuning());
        {
            let meteor = state.skills.get_mut(SkillKind::Meteor);
            meteor.unlocked = true;
            meteor.level = 1;
        }
        let before = state.scroll_speed();
        tick(
            &mut state,
            &TickInput {
                activate: vec![SkillKind::Meteor],
                ..Default::default()
            },
        );
        // 1 + 0.5 + 0.1 * level
        assert!((state.scroll_speed() - before * 1.6).abs() < 1e-4);
        assert_eq!(state.speed_multiplier, 1.0);

        let distance = state.distance;
        tick(&mut state, &TickInput::default());
        assert!((state.distance - distance - f64::from(before) * 0.16).abs() < 1e-4);

        while !state.events.contains(&GameEvent::SkillExpired(SkillKind::Meteor)) {
            assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Continue);
        }
        assert_eq!(state.scroll_speed(), before);
    }

    #[test]
    fn test_game_over_freezes_run() {
        let mut state = running(quiet_tuning());
        state.money = 9;
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Cactus),
            Vec2::new(104.0, 0.0),
            Vec2::from(CACTUS_SIZE),
        );
        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::GameOver);
        let score = state.score();
        assert_eq!(tick(&mut state, &TickInput::default()), TickOutcome::Halted);
        assert_eq!(state.score(), score);
        assert_eq!(state.money, 9);
    }

    #[test]
    fn test_pickup_collected_in_tick() {
        let mut state = running(quiet_tuning());
        state.spawn(
            EntityKind::Pickup {
                kind: PickupKind::Diamond,
                value: 20,
            },
            Vec2::new(105.0, 10.0),
            Vec2::from(PICKUP_SIZE),
        );
        tick(&mut state, &TickInput::default());
        assert_eq!(state.money, 20);
    }

    #[test]
    fn test_autopilot_jumps_cactus() {
        let mut state = running(quiet_tuning());
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Cactus),
            Vec2::new(400.0, 0.0),
            Vec2::from(CACTUS_SIZE),
        );
        let auto = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..150 {
            assert_ne!(tick(&mut state, &auto), TickOutcome::GameOver);
        }
        assert!(state.events.contains(&GameEvent::Jumped));
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_autopilot_ducks_high_bird() {
        let mut state = running(quiet_tuning());
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Bird),
            Vec2::new(400.0, 50.0),
            Vec2::from(BIRD_SIZE),
        );
        let auto = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut ducked = false;
        for _ in 0..150 {
            assert_ne!(tick(&mut state, &auto), TickOutcome::GameOver);
            ducked |= state.player.ducking;
        }
        assert!(ducked);
        assert!(!state.events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999, Tuning::default());
        let mut state2 = GameState::new(99999, Tuning::default());
        state1.phase = SessionPhase::Running;
        state2.phase = SessionPhase::Running;

        let inputs: Vec<TickInput> = (0..2000)
            .map(|i| TickInput {
                jump: i % 45 == 0,
                ducking: (i % 90 == 30).then_some(i % 180 == 30),
                activate: if i == 500 { vec![SkillKind::TimeSlow] } else { Vec::new() },
                autopilot: false,
            })
            .collect();

        for input in &inputs {
            let a = tick(&mut state1, input);
            let b = tick(&mut state2, input);
            assert_eq!(a, b);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.entities, state2.entities);
        assert_eq!(state1.money, state2.money);
        assert_eq!(state1.events, state2.events);
    }
}
