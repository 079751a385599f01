//! Activated skills: time-slow, shield and meteor-call
//!
//! Each skill is a small state machine driven purely by two countdowns held
//! in whole simulation steps. Nothing here uses wall-clock timers, so pausing
//! for the shop freezes skills exactly where they were.

use serde::{Deserialize, Serialize};

use crate::consts::SIM_DT;
use crate::tuning::{SkillTuning, SkillsTuning};

/// The three skills, bound to slots 1-3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillKind {
    TimeSlow,
    Shield,
    Meteor,
}

impl SkillKind {
    pub const ALL: [SkillKind; 3] = [SkillKind::TimeSlow, SkillKind::Shield, SkillKind::Meteor];

    pub fn index(&self) -> usize {
        match self {
            SkillKind::TimeSlow => 0,
            SkillKind::Shield => 1,
            SkillKind::Meteor => 2,
        }
    }

    /// Map a 1-based hotbar slot to a skill
    pub fn from_slot(slot: u8) -> Option<Self> {
        match slot {
            1 => Some(SkillKind::TimeSlow),
            2 => Some(SkillKind::Shield),
            3 => Some(SkillKind::Meteor),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillKind::TimeSlow => "Time Slow",
            SkillKind::Shield => "Shield",
            SkillKind::Meteor => "Meteor",
        }
    }

    pub fn tuning<'a>(&self, skills: &'a SkillsTuning) -> &'a SkillTuning {
        match self {
            SkillKind::TimeSlow => &skills.time_slow,
            SkillKind::Shield => &skills.shield,
            SkillKind::Meteor => &skills.meteor,
        }
    }
}

/// Convert seconds to whole simulation steps
pub fn secs_to_ticks(secs: f32) -> u32 {
    (secs.max(0.0) / SIM_DT).round() as u32
}

/// Effect duration in seconds for a skill at `level`
pub fn duration_secs(kind: SkillKind, level: u32, tuning: &SkillsTuning) -> f32 {
    match kind {
        SkillKind::TimeSlow => tuning.time_slow_duration,
        SkillKind::Shield => 1.0 + 0.5 * level as f32,
        SkillKind::Meteor => 5.0 + level as f32,
    }
}

/// Cooldown in seconds after `reduction` (0.0-0.75) is applied
pub fn cooldown_secs(kind: SkillKind, reduction: f32, tuning: &SkillsTuning) -> f32 {
    kind.tuning(tuning).base_cooldown * (1.0 - reduction)
}

/// Scroll factor for obstacles while time-slow is running at `level`
pub fn time_slow_factor(level: u32, tuning: &SkillsTuning) -> f32 {
    (1.0 - tuning.time_slow_per_level * level as f32).max(tuning.time_slow_floor)
}

/// Run speed factor while the meteor is active at `level`
pub fn meteor_speed_factor(level: u32, tuning: &SkillsTuning) -> f32 {
    1.0 + tuning.meteor_speed_boost + tuning.meteor_boost_per_level * level as f32
}

/// Scale an activation locks in for its whole duration
pub fn effect_scale(kind: SkillKind, level: u32, tuning: &SkillsTuning) -> f32 {
    match kind {
        SkillKind::TimeSlow => time_slow_factor(level, tuning),
        SkillKind::Shield => 1.0,
        SkillKind::Meteor => meteor_speed_factor(level, tuning),
    }
}

/// Where a skill sits in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillStatus {
    Locked,
    Ready,
    /// Effect running (cooldown runs alongside)
    Active,
    Cooldown,
}

/// Why an activation did not happen
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ActivationResult {
    Activated { cooldown_ticks: u32, duration_ticks: u32 },
    Locked,
    AlreadyActive,
    CoolingDown { remaining_ticks: u32 },
}

/// Per-skill state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillState {
    pub unlocked: bool,
    /// 0 iff locked
    pub level: u32,
    pub cooldown_ticks: u32,
    /// Cooldown length set at the last activation (for HUD fractions)
    pub cooldown_total_ticks: u32,
    pub active_ticks: u32,
    /// Effect scale fixed at activation; shop level-ups only apply to the next one
    pub effect: f32,
}

impl SkillState {
    pub fn locked() -> Self {
        Self {
            unlocked: false,
            level: 0,
            cooldown_ticks: 0,
            cooldown_total_ticks: 0,
            active_ticks: 0,
            effect: 1.0,
        }
    }

    /// Fresh-run state for a skill
    pub fn starting(tuning: &SkillTuning) -> Self {
        if tuning.starts_unlocked {
            Self {
                unlocked: true,
                level: 1,
                ..Self::locked()
            }
        } else {
            Self::locked()
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_ticks > 0
    }

    pub fn status(&self) -> SkillStatus {
        if !self.unlocked {
            SkillStatus::Locked
        } else if self.active_ticks > 0 {
            SkillStatus::Active
        } else if self.cooldown_ticks > 0 {
            SkillStatus::Cooldown
        } else {
            SkillStatus::Ready
        }
    }

    pub fn cooldown_remaining_secs(&self) -> f32 {
        self.cooldown_ticks as f32 * SIM_DT
    }

    pub fn active_remaining_secs(&self) -> f32 {
        self.active_ticks as f32 * SIM_DT
    }

    /// Remaining cooldown as a fraction of the full cooldown (1.0 = just used)
    pub fn cooldown_fraction(&self) -> f32 {
        if self.cooldown_total_ticks == 0 {
            0.0
        } else {
            self.cooldown_ticks as f32 / self.cooldown_total_ticks as f32
        }
    }
}

/// All three skills
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skills {
    states: [SkillState; 3],
}

impl Skills {
    pub fn new(tuning: &SkillsTuning) -> Self {
        Self {
            states: SkillKind::ALL.map(|kind| SkillState::starting(kind.tuning(tuning))),
        }
    }

    pub fn get(&self, kind: SkillKind) -> &SkillState {
        &self.states[kind.index()]
    }

    pub fn get_mut(&mut self, kind: SkillKind) -> &mut SkillState {
        &mut self.states[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillKind, &SkillState)> {
        SkillKind::ALL.into_iter().zip(self.states.iter())
    }

    /// Try to start a skill; no state changes unless it returns `Activated`
    pub fn activate(
        &mut self,
        kind: SkillKind,
        cooldown_reduction: f32,
        tuning: &SkillsTuning,
    ) -> ActivationResult {
        let skill = &mut self.states[kind.index()];
        if !skill.unlocked {
            return ActivationResult::Locked;
        }
        if skill.active_ticks > 0 {
            return ActivationResult::AlreadyActive;
        }
        if skill.cooldown_ticks > 0 {
            return ActivationResult::CoolingDown {
                remaining_ticks: skill.cooldown_ticks,
            };
        }

        let cooldown_ticks = secs_to_ticks(cooldown_secs(kind, cooldown_reduction, tuning));
        let duration_ticks = secs_to_ticks(duration_secs(kind, skill.level, tuning));
        skill.cooldown_ticks = cooldown_ticks;
        skill.cooldown_total_ticks = cooldown_ticks;
        skill.active_ticks = duration_ticks;
        skill.effect = effect_scale(kind, skill.level, tuning);
        log::debug!(
            "{} activated (level {}, {} ticks active, {} ticks cooldown)",
            kind.as_str(),
            skill.level,
            duration_ticks,
            cooldown_ticks
        );
        ActivationResult::Activated {
            cooldown_ticks,
            duration_ticks,
        }
    }

    /// Advance every countdown by one step; returns skills whose effect just ended
    pub fn tick(&mut self) -> Vec<SkillKind> {
        let mut expired = Vec::new();
        for (kind, skill) in SkillKind::ALL.into_iter().zip(self.states.iter_mut()) {
            skill.cooldown_ticks = skill.cooldown_ticks.saturating_sub(1);
            if skill.active_ticks > 0 {
                skill.active_ticks -= 1;
                if skill.active_ticks == 0 {
                    expired.push(kind);
                }
            }
        }
        expired
    }

    fn active_effect(&self, kind: SkillKind) -> f32 {
        let skill = self.get(kind);
        if skill.is_active() { skill.effect } else { 1.0 }
    }

    /// Obstacle scroll factor from time-slow (1.0 when inactive)
    pub fn time_slow_factor(&self) -> f32 {
        self.active_effect(SkillKind::TimeSlow)
    }

    /// Run speed factor from the meteor (1.0 when inactive)
    pub fn speed_boost(&self) -> f32 {
        self.active_effect(SkillKind::Meteor)
    }

    /// Obstacles are destroyed on contact instead of ending the run
    pub fn invincible(&self) -> bool {
        self.get(SkillKind::Shield).is_active() || self.get(SkillKind::Meteor).is_active()
    }

    /// No new obstacles while the meteor is falling
    pub fn obstacles_suspended(&self) -> bool {
        self.get(SkillKind::Meteor).is_active()
    }
}
