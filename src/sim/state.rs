//! Game state and core simulation types
//!
//! Everything a single run owns lives in [`GameState`]. A restart throws the
//! whole value away and builds a new one, so nothing leaks between runs.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::progression::{Progression, UpgradeKind};
use super::skills::{SkillKind, Skills};
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for the start signal
    Idle,
    /// Active gameplay
    Running,
    /// Paused in the periodic shop
    Shop,
    /// Run ended by an obstacle
    GameOver,
}

/// The runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    /// Height above ground (x is fixed at `PLAYER_X`)
    pub y: f32,
    /// Vertical velocity, pixels per step (positive is up)
    pub vy: f32,
    pub on_ground: bool,
    pub ducking: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            y: GROUND_Y,
            vy: 0.0,
            on_ground: true,
            ducking: false,
        }
    }
}

impl Player {
    /// Start a jump if standing on the ground
    pub fn jump(&mut self, jump_velocity: f32) -> bool {
        if !self.on_ground {
            return false;
        }
        self.vy = jump_velocity;
        self.on_ground = false;
        true
    }

    pub fn hitbox_height(&self) -> f32 {
        if self.ducking {
            PLAYER_DUCK_HEIGHT
        } else {
            PLAYER_STAND_HEIGHT
        }
    }

    /// Collision box, inset from the sprite edge
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(
            PLAYER_X + PLAYER_HITBOX_INSET,
            self.y,
            PLAYER_WIDTH,
            self.hitbox_height(),
        )
    }

    /// Vertical sprite scale for the renderer
    pub fn visual_scale(&self) -> f32 {
        if self.ducking { PLAYER_DUCK_SCALE } else { 1.0 }
    }
}

/// Things to avoid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Cactus,
    Bird,
}

/// Things to collect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    Diamond,
}

/// Decorations that never collide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Meteor,
}

/// What an entity is, plus the data only that kind carries
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Pickup { kind: PickupKind, value: u64 },
    VisualOnly {
        kind: VisualKind,
        /// Own motion per step, independent of scroll speed
        vel: Vec2,
        ttl_ticks: u32,
    },
}

/// A scrolling entity. `pos` is the bottom-left corner, y measured up from ground.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
}

impl Entity {
    pub fn is_obstacle(&self) -> bool {
        matches!(self.kind, EntityKind::Obstacle(_))
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self.kind, EntityKind::Pickup { .. })
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Scrolled past the removal line or out of lifetime
    pub fn is_gone(&self) -> bool {
        if self.pos.x < REMOVAL_X {
            return true;
        }
        matches!(self.kind, EntityKind::VisualOnly { ttl_ticks: 0, .. })
    }
}

/// Fire-and-forget notifications for audio/visual hooks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    RunStarted { seed: u64 },
    Jumped,
    Landed,
    PickupCollected { kind: PickupKind, value: u64 },
    ObstacleDestroyed { id: u32, kind: ObstacleKind },
    SkillActivated(SkillKind),
    SkillExpired(SkillKind),
    ShopOpened { visit: u32 },
    ShopClosed,
    UpgradePurchased { kind: UpgradeKind, level: u32 },
    SkillPurchased { kind: SkillKind, level: u32 },
    SpeedUp { multiplier: f32 },
    GameOver { score: u64, money: u64 },
}

/// Complete state of one run (deterministic given seed and inputs)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: SessionPhase,
    /// Simulation steps survived
    pub time_ticks: u64,
    /// Distance run, in score units
    pub distance: f64,
    pub money: u64,
    /// Scroll speed before the ramp multiplier
    pub base_speed: f32,
    /// Grows with survival time, never shrinks
    pub speed_multiplier: f32,
    /// Shop visits so far
    pub shop_visits: u32,
    pub player: Player,
    /// Live entities (sorted by id for determinism)
    pub entities: Vec<Entity>,
    pub progression: Progression,
    pub skills: Skills,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh, idle run with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            base_speed: tuning.physics.base_speed,
            skills: Skills::new(&tuning.skills),
            tuning,
            phase: SessionPhase::Idle,
            time_ticks: 0,
            distance: 0.0,
            money: 0,
            speed_multiplier: 1.0,
            shop_visits: 0,
            player: Player::default(),
            entities: Vec::new(),
            progression: Progression::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an entity, assigning its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, size: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.entities.push(Entity { id, kind, pos, size });
        id
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    pub fn score(&self) -> u64 {
        self.distance.max(0.0).floor() as u64
    }

    /// Run speed, pixels per step: pickups move at this rate and distance
    /// grows with it. Includes the meteor boost while it lasts.
    pub fn scroll_speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier * self.skills.speed_boost()
    }

    /// Obstacle scroll speed, including time-slow and the risk speed bonus
    pub fn obstacle_speed(&self) -> f32 {
        self.scroll_speed()
            * self.skills.time_slow_factor()
            * self.progression.obstacle_speed_scale()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.entities.sort_by_key(|e| e.id);
    }

    /// Queue a notification for the presentation layer
    pub fn emit(&mut self, event: GameEvent) {
        log::trace!("event {:?}", event);
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
