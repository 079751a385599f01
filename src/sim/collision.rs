//! Collision detection and response
//!
//! Everything is an axis-aligned box with y pointing up from the ground.
//! Edges that touch count as overlapping.

use serde::Serialize;

use super::state::{EntityKind, GameEvent, GameState, SessionPhase};

/// Axis-aligned bounding box, bottom-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.h
    }

    /// Overlap on both axes, inclusive of shared edges
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(other.x > self.right()
            || other.right() < self.x
            || other.y > self.top()
            || other.top() < self.y)
    }
}

/// Result of resolving one step's contacts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// An obstacle ended the run
    pub fatal: bool,
    /// Obstacles destroyed by invincibility
    pub destroyed: u32,
    /// Money gained this step
    pub collected: u64,
}

/// Resolve player contacts against every live entity, after movement.
///
/// Obstacles are checked first: a fatal hit leaves money and pickups exactly
/// as they were before the contact.
pub fn resolve_collisions(state: &mut GameState) -> CollisionResult {
    let mut result = CollisionResult::default();
    let hitbox = state.player.hitbox();
    let invincible = state.skills.invincible();

    let obstacle_hits: Vec<usize> = state
        .entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_obstacle() && hitbox.overlaps(&e.bounds()))
        .map(|(idx, _)| idx)
        .collect();

    if !obstacle_hits.is_empty() {
        if !invincible {
            result.fatal = true;
            state.phase = SessionPhase::GameOver;
            let (score, money) = (state.score(), state.money);
            log::info!(
                "Game over at {:.1}s: score {}, money {}",
                state.elapsed_secs(),
                score,
                money
            );
            state.emit(GameEvent::GameOver { score, money });
            return result;
        }

        for idx in obstacle_hits.into_iter().rev() {
            let entity = state.entities.remove(idx);
            if let EntityKind::Obstacle(kind) = entity.kind {
                result.destroyed += 1;
                state.emit(GameEvent::ObstacleDestroyed { id: entity.id, kind });
            }
        }
    }

    let mut collected = Vec::new();
    state.entities.retain(|e| match e.kind {
        EntityKind::Pickup { kind, value } if hitbox.overlaps(&e.bounds()) => {
            collected.push((kind, value));
            false
        }
        _ => true,
    });
    for (kind, value) in collected {
        state.money = state.money.saturating_add(value);
        result.collected += value;
        state.emit(GameEvent::PickupCollected { kind, value });
    }

    result
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::consts::*;
    use crate::sim::skills::SkillKind;
    use crate::sim::state::{ObstacleKind, PickupKind};
    use crate::tuning::Tuning;

    fn running_state() -> GameState {
        let mut state = GameState::new(1, Tuning::default());
        state.phase = SessionPhase::Running;
        state
    }

    fn cactus_at(state: &mut GameState, x: f32) -> u32 {
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Cactus),
            Vec2::new(x, 0.0),
            Vec2::from(CACTUS_SIZE),
        )
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Aabb::new(5.0, 5.0, 10.0, 10.0)));
        // Shared edge counts
        assert!(a.overlaps(&Aabb::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Aabb::new(10.5, 0.0, 5.0, 5.0)));
        // Overlap on one axis only
        assert!(!a.overlaps(&Aabb::new(2.0, 20.0, 5.0, 5.0)));
    }

    #[test]
    fn test_obstacle_hit_ends_run() {
        let mut state = running_state();
        state.money = 42;
        state.distance = 120.5;
        cactus_at(&mut state, 70.0);
        state.spawn(
            EntityKind::Pickup { kind: PickupKind::Coin, value: 1 },
            Vec2::new(70.0, 20.0),
            Vec2::from(PICKUP_SIZE),
        );

        let result = resolve_collisions(&mut state);
        assert!(result.fatal);
        assert_eq!(state.phase, SessionPhase::GameOver);
        assert_eq!(state.money, 42);
        assert_eq!(state.score(), 120);
        assert_eq!(state.entities.len(), 2);
        assert!(state.events.contains(&GameEvent::GameOver { score: 120, money: 42 }));
    }

    #[test]
    fn test_shield_destroys_obstacle() {
        let mut state = running_state();
        state.money = 5;
        let shield = state.skills.get_mut(SkillKind::Shield);
        shield.unlocked = true;
        shield.level = 1;
        shield.active_ticks = 60;
        let id = cactus_at(&mut state, 70.0);

        let result = resolve_collisions(&mut state);
        assert!(!result.fatal);
        assert_eq!(result.destroyed, 1);
        assert_eq!(state.phase, SessionPhase::Running);
        assert_eq!(state.money, 5);
        assert!(state.entities.is_empty());
        assert_eq!(
            state.events,
            vec![GameEvent::ObstacleDestroyed { id, kind: ObstacleKind::Cactus }]
        );
    }

    #[test]
    fn test_pickup_credits_money() {
        let mut state = running_state();
        state.spawn(
            EntityKind::Pickup { kind: PickupKind::Diamond, value: 20 },
            Vec2::new(80.0, 40.0),
            Vec2::from(PICKUP_SIZE),
        );
        state.spawn(
            EntityKind::Pickup { kind: PickupKind::Coin, value: 1 },
            Vec2::new(400.0, 40.0),
            Vec2::from(PICKUP_SIZE),
        );
        let result = resolve_collisions(&mut state);
        assert_eq!(result.collected, 20);
        assert_eq!(state.money, 20);
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_duck_under_high_bird() {
        let mut state = running_state();
        state.spawn(
            EntityKind::Obstacle(ObstacleKind::Bird),
            Vec2::new(70.0, 50.0),
            Vec2::from(BIRD_SIZE),
        );
        state.player.ducking = true;
        assert!(!resolve_collisions(&mut state).fatal);

        state.player.ducking = false;
        assert!(resolve_collisions(&mut state).fatal);
    }

    #[test]
    fn test_meteor_never_collides() {
        let mut state = running_state();
        state.spawn(
            EntityKind::VisualOnly {
                kind: crate::sim::state::VisualKind::Meteor,
                vel: Vec2::ZERO,
                ttl_ticks: 10,
            },
            Vec2::new(60.0, 0.0),
            Vec2::from(METEOR_SIZE),
        );
        let result = resolve_collisions(&mut state);
        assert_eq!(result, CollisionResult::default());
        assert_eq!(state.entities.len(), 1);
    }
}
