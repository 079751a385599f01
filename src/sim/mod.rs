//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod physics;
pub mod progression;
pub mod skills;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::Clock;
pub use collision::{Aabb, CollisionResult, resolve_collisions};
pub use progression::{CostCurve, Progression, PurchaseResult, UpgradeKind};
pub use skills::{ActivationResult, SkillKind, SkillState, SkillStatus, Skills};
pub use state::{
    Entity, EntityKind, GameEvent, GameState, ObstacleKind, PickupKind, Player, SessionPhase,
    VisualKind,
};
pub use tick::{TickInput, TickOutcome, autopilot_input, tick};
