//! Game balance tuning
//!
//! Every number a designer might want to tweak without touching the
//! simulation lives here. Defaults are the shipped balance; a JSON file can
//! override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BIRD_SIZE, CACTUS_SIZE, PLAYER_DUCK_HEIGHT};
use crate::sim::progression::CostCurve;

/// Failure to load or accept a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Player physics, in pixels per step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Downward acceleration magnitude applied each airborne step
    pub gravity: f32,
    /// Upward velocity given by a jump
    pub jump_velocity: f32,
    /// Scroll speed at the start of a run
    pub base_speed: f32,
    /// Seconds of survival between speed-ups
    pub speed_ramp_interval: f32,
    /// Multiplier applied at each speed-up
    pub speed_ramp_factor: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 0.8,
            jump_velocity: 15.0,
            base_speed: 6.0,
            speed_ramp_interval: 60.0,
            speed_ramp_factor: 1.07,
        }
    }
}

/// Spawn probabilities and placement bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Per-step obstacle spawn probability before risk bonus
    pub obstacle_chance: f32,
    /// Per-step pickup spawn probability before risk bonus
    pub pickup_chance: f32,
    /// Probability that an obstacle is a bird
    pub bird_chance: f32,
    /// Minimum horizontal distance between the spawn column and the newest obstacle
    pub min_obstacle_gap: f32,
    /// Birds in this band must be jumped over
    pub low_bird_band: (f32, f32),
    /// Birds in this band must be ducked under
    pub high_bird_band: (f32, f32),
    /// Vertical band for pickups
    pub pickup_band: (f32, f32),
    pub gold_value: u64,
    pub diamond_value: u64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            obstacle_chance: 0.015,
            pickup_chance: 0.01,
            bird_chance: 0.30,
            min_obstacle_gap: 400.0,
            low_bird_band: (5.0, 15.0),
            high_bird_band: (45.0, 55.0),
            pickup_band: (40.0, 140.0),
            gold_value: 1,
            diamond_value: 20,
        }
    }
}

/// Balance for one skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillTuning {
    /// Cooldown before any reduction (seconds)
    pub base_cooldown: f32,
    /// Whether a fresh run owns this skill at level 1
    pub starts_unlocked: bool,
    pub unlock_cost: u64,
    /// Cost of the next level, by current level
    pub level_cost: CostCurve,
}

/// Any subset of one skill's fields; the rest come from that slot's default
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SkillTuningPatch {
    base_cooldown: Option<f32>,
    starts_unlocked: Option<bool>,
    unlock_cost: Option<u64>,
    level_cost: Option<CostCurve>,
}

impl SkillTuningPatch {
    fn apply(self, base: SkillTuning) -> SkillTuning {
        SkillTuning {
            base_cooldown: self.base_cooldown.unwrap_or(base.base_cooldown),
            starts_unlocked: self.starts_unlocked.unwrap_or(base.starts_unlocked),
            unlock_cost: self.unlock_cost.unwrap_or(base.unlock_cost),
            level_cost: self.level_cost.unwrap_or(base.level_cost),
        }
    }
}

/// On-disk shape of [`SkillsTuning`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct SkillsTuningFile {
    time_slow: SkillTuningPatch,
    shield: SkillTuningPatch,
    meteor: SkillTuningPatch,
    time_slow_duration: f32,
    time_slow_per_level: f32,
    time_slow_floor: f32,
    meteor_speed_boost: f32,
    meteor_boost_per_level: f32,
    meteor_lifetime: f32,
    meteor_velocity: (f32, f32),
}

impl Default for SkillsTuningFile {
    fn default() -> Self {
        let d = SkillsTuning::default();
        Self {
            time_slow: SkillTuningPatch::default(),
            shield: SkillTuningPatch::default(),
            meteor: SkillTuningPatch::default(),
            time_slow_duration: d.time_slow_duration,
            time_slow_per_level: d.time_slow_per_level,
            time_slow_floor: d.time_slow_floor,
            meteor_speed_boost: d.meteor_speed_boost,
            meteor_boost_per_level: d.meteor_boost_per_level,
            meteor_lifetime: d.meteor_lifetime,
            meteor_velocity: d.meteor_velocity,
        }
    }
}

impl From<SkillsTuningFile> for SkillsTuning {
    fn from(file: SkillsTuningFile) -> Self {
        let d = SkillsTuning::default();
        Self {
            time_slow: file.time_slow.apply(d.time_slow),
            shield: file.shield.apply(d.shield),
            meteor: file.meteor.apply(d.meteor),
            time_slow_duration: file.time_slow_duration,
            time_slow_per_level: file.time_slow_per_level,
            time_slow_floor: file.time_slow_floor,
            meteor_speed_boost: file.meteor_speed_boost,
            meteor_boost_per_level: file.meteor_boost_per_level,
            meteor_lifetime: file.meteor_lifetime,
            meteor_velocity: file.meteor_velocity,
        }
    }
}

/// Skill balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SkillsTuningFile")]
pub struct SkillsTuning {
    pub time_slow: SkillTuning,
    pub shield: SkillTuning,
    pub meteor: SkillTuning,
    /// Time-slow lasts this long regardless of level
    pub time_slow_duration: f32,
    /// Slow amount gained per time-slow level
    pub time_slow_per_level: f32,
    /// Slowest scroll factor time-slow may reach
    pub time_slow_floor: f32,
    /// Extra run speed while the meteor is active (0.5 = 50% faster)
    pub meteor_speed_boost: f32,
    /// Extra run speed per meteor level
    pub meteor_boost_per_level: f32,
    /// Meteor sprite lifetime (seconds)
    pub meteor_lifetime: f32,
    /// Meteor sprite velocity per step (x, y)
    pub meteor_velocity: (f32, f32),
}

impl Default for SkillsTuning {
    fn default() -> Self {
        Self {
            time_slow: SkillTuning {
                base_cooldown: 15.0,
                starts_unlocked: true,
                unlock_cost: 50,
                level_cost: CostCurve::Linear { base: 50, step: 0 },
            },
            shield: SkillTuning {
                base_cooldown: 20.0,
                starts_unlocked: false,
                unlock_cost: 200,
                level_cost: CostCurve::Linear { base: 100, step: 0 },
            },
            meteor: SkillTuning {
                base_cooldown: 30.0,
                starts_unlocked: false,
                unlock_cost: 300,
                level_cost: CostCurve::Linear { base: 200, step: 0 },
            },
            time_slow_duration: 5.0,
            time_slow_per_level: 0.10,
            time_slow_floor: 0.5,
            meteor_speed_boost: 0.5,
            meteor_boost_per_level: 0.1,
            meteor_lifetime: 1.5,
            meteor_velocity: (-3.0, -4.0),
        }
    }
}

/// Cost laws for the three stat upgrades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradesTuning {
    pub risk_cost: CostCurve,
    pub cooldown_cost: CostCurve,
    pub luck_cost: CostCurve,
}

impl Default for UpgradesTuning {
    fn default() -> Self {
        Self {
            risk_cost: CostCurve::Linear { base: 100, step: 10 },
            cooldown_cost: CostCurve::Linear { base: 150, step: 20 },
            luck_cost: CostCurve::Linear { base: 200, step: 10 },
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub physics: PhysicsTuning,
    pub spawn: SpawnTuning,
    pub skills: SkillsTuning,
    pub upgrades: UpgradesTuning,
    /// Seconds of survival between shop visits
    pub shop_interval: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            physics: PhysicsTuning::default(),
            spawn: SpawnTuning::default(),
            skills: SkillsTuning::default(),
            upgrades: UpgradesTuning::default(),
            shop_interval: 60.0,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Serialize for inspection or hand editing
    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }
        fn probability(field: &'static str, p: f32) -> Result<(), TuningError> {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(invalid(field, format!("{p} is not a probability")))
            }
        }
        fn band(field: &'static str, (lo, hi): (f32, f32)) -> Result<(), TuningError> {
            if lo >= 0.0 && lo <= hi {
                Ok(())
            } else {
                Err(invalid(field, format!("({lo}, {hi}) is not an ordered band above ground")))
            }
        }

        // Written as negated range checks so NaN is rejected too
        let p = &self.physics;
        if !(p.gravity > 0.0) {
            return Err(invalid("physics.gravity", "must be positive"));
        }
        if !(p.jump_velocity > 0.0) {
            return Err(invalid("physics.jump_velocity", "must be positive"));
        }
        if !(p.base_speed >= 0.0) || !p.base_speed.is_finite() {
            return Err(invalid("physics.base_speed", "must be finite and not negative"));
        }
        if !(p.speed_ramp_interval > 0.0) {
            return Err(invalid("physics.speed_ramp_interval", "must be positive"));
        }
        if !(p.speed_ramp_factor >= 1.0) || !p.speed_ramp_factor.is_finite() {
            return Err(invalid("physics.speed_ramp_factor", "speed must never decrease"));
        }

        let s = &self.spawn;
        probability("spawn.obstacle_chance", s.obstacle_chance)?;
        probability("spawn.pickup_chance", s.pickup_chance)?;
        probability("spawn.bird_chance", s.bird_chance)?;
        let widest = CACTUS_SIZE.0.max(BIRD_SIZE.0);
        if !(s.min_obstacle_gap >= widest) {
            return Err(invalid(
                "spawn.min_obstacle_gap",
                format!("must be at least the widest obstacle ({widest})"),
            ));
        }
        band("spawn.low_bird_band", s.low_bird_band)?;
        band("spawn.high_bird_band", s.high_bird_band)?;
        band("spawn.pickup_band", s.pickup_band)?;
        if !(s.low_bird_band.1 < s.high_bird_band.0) {
            return Err(invalid("spawn.high_bird_band", "bird bands must not overlap"));
        }
        if !(s.high_bird_band.0 > PLAYER_DUCK_HEIGHT) {
            return Err(invalid(
                "spawn.high_bird_band",
                format!("must start above the ducking height ({PLAYER_DUCK_HEIGHT})"),
            ));
        }

        let k = &self.skills;
        for (field, skill) in [
            ("skills.time_slow.base_cooldown", &k.time_slow),
            ("skills.shield.base_cooldown", &k.shield),
            ("skills.meteor.base_cooldown", &k.meteor),
        ] {
            if !(skill.base_cooldown >= 0.0) {
                return Err(invalid(field, "must not be negative"));
            }
        }
        probability("skills.time_slow_floor", k.time_slow_floor)?;
        if !(k.time_slow_per_level >= 0.0) {
            return Err(invalid("skills.time_slow_per_level", "must not be negative"));
        }
        if !(k.time_slow_duration > 0.0) {
            return Err(invalid("skills.time_slow_duration", "must be positive"));
        }
        if !(k.meteor_speed_boost >= 0.0) || !k.meteor_speed_boost.is_finite() {
            return Err(invalid("skills.meteor_speed_boost", "must be finite and not negative"));
        }
        if !(k.meteor_boost_per_level >= 0.0) || !k.meteor_boost_per_level.is_finite() {
            return Err(invalid("skills.meteor_boost_per_level", "must be finite and not negative"));
        }
        if !(k.meteor_lifetime > 0.0) {
            return Err(invalid("skills.meteor_lifetime", "must be positive"));
        }
        if !(k.meteor_velocity.0.is_finite() && k.meteor_velocity.1.is_finite()) {
            return Err(invalid("skills.meteor_velocity", "must be finite"));
        }

        if !(self.shop_interval > 0.0) {
            return Err(invalid("shop_interval", "must be positive"));
        }
        Ok(())
    }
}
