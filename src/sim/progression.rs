//! Shop progression: stat upgrades and skill unlocks
//!
//! Pure state, no timing. Every purchase either fully succeeds (money debited,
//! level incremented) or leaves everything untouched.

use serde::{Deserialize, Serialize};

use super::skills::SkillState;
use crate::tuning::{SkillTuning, UpgradesTuning};

/// Cooldown-reduction stops paying off at 75%
pub const MAX_COOLDOWN_REDUCTION: f32 = 0.75;
pub const COOLDOWN_REDUCTION_PER_LEVEL: f32 = 0.05;
/// Diamond chance before any luck
pub const BASE_DIAMOND_CHANCE: f32 = 0.10;
pub const DIAMOND_CHANCE_PER_LEVEL: f32 = 0.01;
pub const MAX_DIAMOND_CHANCE: f32 = 0.25;
/// Risk-reward bonuses per level (uncapped)
pub const RISK_OBSTACLE_RATE_PER_LEVEL: f32 = 0.05;
pub const RISK_PICKUP_RATE_PER_LEVEL: f32 = 0.10;
pub const RISK_OBSTACLE_SPEED_PER_LEVEL: f32 = 0.05;

/// Highest purchasable cooldown-reduction level (effect saturates here)
pub const MAX_COOLDOWN_LEVEL: u32 = 15;
/// Highest purchasable luck level (effect saturates here)
pub const MAX_LUCK_LEVEL: u32 = 15;

/// How the price of the next level grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum CostCurve {
    /// `base + step * level`
    Linear { base: u64, step: u64 },
    /// `base * mult ^ level`, rounded to the nearest coin
    Geometric { base: u64, mult: f64 },
}

impl CostCurve {
    pub fn cost(&self, level: u32) -> u64 {
        match *self {
            CostCurve::Linear { base, step } => {
                base.saturating_add(step.saturating_mul(level as u64))
            }
            CostCurve::Geometric { base, mult } => {
                // `as` saturates on overflow and maps NaN to 0
                (base as f64 * mult.powi(level as i32)).round() as u64
            }
        }
    }
}

/// Purchasable stat upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// More obstacles and more pickups
    RiskReward,
    CooldownReduction,
    /// Diamond chance
    Luck,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 3] = [
        UpgradeKind::RiskReward,
        UpgradeKind::CooldownReduction,
        UpgradeKind::Luck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpgradeKind::RiskReward => "Risk & Reward",
            UpgradeKind::CooldownReduction => "Cooldown",
            UpgradeKind::Luck => "Luck",
        }
    }

    /// Level at which buying stops, if any
    pub fn max_level(&self) -> Option<u32> {
        match self {
            UpgradeKind::RiskReward => None,
            UpgradeKind::CooldownReduction => Some(MAX_COOLDOWN_LEVEL),
            UpgradeKind::Luck => Some(MAX_LUCK_LEVEL),
        }
    }
}

/// Outcome of a shop purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PurchaseResult {
    /// Level bought; `level` is the new level
    Purchased { cost: u64, level: u32 },
    /// Skill unlocked at level 1
    Unlocked { cost: u64 },
    /// Not enough money, nothing changed
    InsufficientFunds { cost: u64 },
    /// Already at the level cap, nothing changed
    MaxLevel,
}

impl PurchaseResult {
    pub fn succeeded(&self) -> bool {
        matches!(
            self,
            PurchaseResult::Purchased { .. } | PurchaseResult::Unlocked { .. }
        )
    }
}

pub fn cooldown_reduction(level: u32) -> f32 {
    (level as f32 * COOLDOWN_REDUCTION_PER_LEVEL).min(MAX_COOLDOWN_REDUCTION)
}

pub fn diamond_chance(level: u32) -> f32 {
    (BASE_DIAMOND_CHANCE + level as f32 * DIAMOND_CHANCE_PER_LEVEL).min(MAX_DIAMOND_CHANCE)
}

pub fn obstacle_rate_bonus(level: u32) -> f32 {
    level as f32 * RISK_OBSTACLE_RATE_PER_LEVEL
}

pub fn pickup_rate_bonus(level: u32) -> f32 {
    level as f32 * RISK_PICKUP_RATE_PER_LEVEL
}

/// Extra scroll speed for obstacles, as a multiplier
pub fn obstacle_speed_scale(level: u32) -> f32 {
    1.0 + level as f32 * RISK_OBSTACLE_SPEED_PER_LEVEL
}

/// Upgrade levels bought during the current run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Progression {
    pub risk_level: u32,
    pub cooldown_level: u32,
    pub luck_level: u32,
}

impl Progression {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::RiskReward => self.risk_level,
            UpgradeKind::CooldownReduction => self.cooldown_level,
            UpgradeKind::Luck => self.luck_level,
        }
    }

    fn level_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::RiskReward => &mut self.risk_level,
            UpgradeKind::CooldownReduction => &mut self.cooldown_level,
            UpgradeKind::Luck => &mut self.luck_level,
        }
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        kind.max_level()
            .is_some_and(|max| self.level(kind) >= max)
    }

    /// Price of the next level
    pub fn cost(&self, kind: UpgradeKind, tuning: &UpgradesTuning) -> u64 {
        let curve = match kind {
            UpgradeKind::RiskReward => &tuning.risk_cost,
            UpgradeKind::CooldownReduction => &tuning.cooldown_cost,
            UpgradeKind::Luck => &tuning.luck_cost,
        };
        curve.cost(self.level(kind))
    }

    /// Buy one level of `kind` if affordable and not capped
    pub fn purchase_upgrade(
        &mut self,
        kind: UpgradeKind,
        money: &mut u64,
        tuning: &UpgradesTuning,
    ) -> PurchaseResult {
        if self.is_maxed(kind) {
            return PurchaseResult::MaxLevel;
        }
        let cost = self.cost(kind, tuning);
        if *money < cost {
            return PurchaseResult::InsufficientFunds { cost };
        }
        *money -= cost;
        let level = self.level_mut(kind);
        *level += 1;
        log::info!("Bought {} level {} for ${}", kind.as_str(), *level, cost);
        PurchaseResult::Purchased {
            cost,
            level: *level,
        }
    }

    pub fn cooldown_reduction(&self) -> f32 {
        cooldown_reduction(self.cooldown_level)
    }

    pub fn diamond_chance(&self) -> f32 {
        diamond_chance(self.luck_level)
    }

    pub fn obstacle_rate_bonus(&self) -> f32 {
        obstacle_rate_bonus(self.risk_level)
    }

    pub fn pickup_rate_bonus(&self) -> f32 {
        pickup_rate_bonus(self.risk_level)
    }

    pub fn obstacle_speed_scale(&self) -> f32 {
        obstacle_speed_scale(self.risk_level)
    }
}

/// Price of the next skill purchase (unlock or level-up)
pub fn skill_cost(skill: &SkillState, tuning: &SkillTuning) -> u64 {
    if skill.unlocked {
        tuning.level_cost.cost(skill.level)
    } else {
        tuning.unlock_cost
    }
}

/// Unlock a locked skill, or level up an unlocked one
pub fn purchase_skill(skill: &mut SkillState, money: &mut u64, tuning: &SkillTuning) -> PurchaseResult {
    let cost = skill_cost(skill, tuning);
    if *money < cost {
        return PurchaseResult::InsufficientFunds { cost };
    }
    *money -= cost;
    if skill.unlocked {
        skill.level += 1;
        PurchaseResult::Purchased {
            cost,
            level: skill.level,
        }
    } else {
        skill.unlocked = true;
        skill.level = 1;
        PurchaseResult::Unlocked { cost }
    }
}
