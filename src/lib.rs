//! Dino Dash - endless-runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (clock, physics, spawning, collisions, skills, shop)
//! - `session`: Orchestrator that turns external ticks and intents into fixed steps
//! - `tuning`: Data-driven game balance

pub mod session;
pub mod sim;
pub mod tuning;

pub use session::{FrameReport, GameSession, Intent, IntentResult, Snapshot};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one logical step per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 5;
    /// Largest frame delta accepted from the clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Play area
    pub const SCREEN_WIDTH: f32 = 800.0;
    /// Entities appear just past the right edge
    pub const SPAWN_X: f32 = 900.0;
    /// Entities left of this are gone for good
    pub const REMOVAL_X: f32 = -100.0;
    pub const GROUND_Y: f32 = 0.0;

    /// Player placement and hitbox
    pub const PLAYER_X: f32 = 50.0;
    pub const PLAYER_HITBOX_INSET: f32 = 10.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_STAND_HEIGHT: f32 = 60.0;
    pub const PLAYER_DUCK_HEIGHT: f32 = 30.0;
    /// Sprite scale while ducking (visual only)
    pub const PLAYER_DUCK_SCALE: f32 = 0.5;

    /// Entity sizes (width, height)
    pub const CACTUS_SIZE: (f32, f32) = (30.0, 50.0);
    pub const BIRD_SIZE: (f32, f32) = (40.0, 30.0);
    pub const PICKUP_SIZE: (f32, f32) = (30.0, 30.0);
    pub const METEOR_SIZE: (f32, f32) = (40.0, 40.0);
}
