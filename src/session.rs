//! Game session orchestrator
//!
//! Owns one [`GameState`] plus the frame clock, turns external timestamps into
//! fixed simulation steps and validates player intents against the current
//! phase. Renderers read [`Snapshot`]s; audio and effects read the event list
//! returned with every frame.

use serde::Serialize;

use crate::consts::*;
use crate::sim::collision::Aabb;
use crate::sim::progression::{PurchaseResult, UpgradeKind, purchase_skill, skill_cost};
use crate::sim::skills::{SkillKind, SkillStatus};
use crate::sim::state::{Entity, GameEvent, GameState, SessionPhase};
use crate::sim::tick::{TickInput, TickOutcome, tick};
use crate::sim::Clock;
use crate::tuning::Tuning;

/// Everything the player (or a UI) can ask for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Jump,
    SetDucking(bool),
    ActivateSkill(SkillKind),
    PurchaseUpgrade(UpgradeKind),
    PurchaseSkill(SkillKind),
    StartGame,
    /// Throw the run away and start over; pass the old seed to replay it
    RestartGame { seed: u64 },
    ResumeFromShop,
}

/// What an intent did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntentResult {
    /// Gameplay input latched for the next step
    Queued,
    Started,
    Restarted,
    Resumed,
    /// Shop purchase attempted
    Purchase(PurchaseResult),
    /// Not valid in the current phase; nothing changed
    Ignored(SessionPhase),
}

/// Result of feeding one external timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Fixed steps run this frame
    pub steps: u32,
    /// Outcome of the last step (or `Halted` if none ran)
    pub outcome: TickOutcome,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub ducking: bool,
    pub on_ground: bool,
    pub hitbox: Aabb,
    /// Vertical sprite scale
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillView {
    pub kind: SkillKind,
    pub status: SkillStatus,
    pub level: u32,
    /// 1.0 right after activation, 0.0 when ready
    pub cooldown_fraction: f32,
    pub active_remaining_secs: f32,
}

/// Something for sale in the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShopItemKind {
    Upgrade(UpgradeKind),
    Skill(SkillKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopItem {
    pub item: ShopItemKind,
    pub label: &'static str,
    /// Current level (0 = locked skill)
    pub level: u32,
    /// Price of the next level, `None` once maxed
    pub cost: Option<u64>,
    pub affordable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopView {
    pub visit: u32,
    pub items: Vec<ShopItem>,
}

/// Read-only view of the session for rendering and HUD
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: SessionPhase,
    pub player: PlayerView,
    pub entities: Vec<Entity>,
    pub money: u64,
    pub score: u64,
    pub elapsed_secs: f32,
    pub speed_multiplier: f32,
    pub skills: Vec<SkillView>,
    /// Present only while the shop is open
    pub shop: Option<ShopView>,
}

/// One player's game, from title screen through restarts
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    clock: Clock,
    accumulator: f32,
    /// Input gathered since the last step
    pending: TickInput,
    autopilot: bool,
}

impl GameSession {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, tuning),
            clock: Clock::default(),
            accumulator: 0.0,
            pending: TickInput::default(),
            autopilot: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Let the built-in AI play (demo/attract mode)
    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    /// Validate an intent against the current phase and apply or latch it
    pub fn apply(&mut self, intent: Intent) -> IntentResult {
        let phase = self.state.phase;
        match intent {
            Intent::Jump | Intent::SetDucking(_) | Intent::ActivateSkill(_)
                if phase != SessionPhase::Running =>
            {
                IntentResult::Ignored(phase)
            }
            Intent::Jump => {
                self.pending.jump = true;
                IntentResult::Queued
            }
            Intent::SetDucking(ducking) => {
                self.pending.ducking = Some(ducking);
                IntentResult::Queued
            }
            Intent::ActivateSkill(kind) => {
                if !self.pending.activate.contains(&kind) {
                    self.pending.activate.push(kind);
                }
                IntentResult::Queued
            }

            Intent::PurchaseUpgrade(_) | Intent::PurchaseSkill(_) if phase != SessionPhase::Shop => {
                IntentResult::Ignored(phase)
            }
            Intent::PurchaseUpgrade(kind) => {
                let state = &mut self.state;
                let result =
                    state
                        .progression
                        .purchase_upgrade(kind, &mut state.money, &state.tuning.upgrades);
                if let PurchaseResult::Purchased { level, .. } = result {
                    state.emit(GameEvent::UpgradePurchased { kind, level });
                }
                IntentResult::Purchase(result)
            }
            Intent::PurchaseSkill(kind) => {
                let state = &mut self.state;
                let result = purchase_skill(
                    state.skills.get_mut(kind),
                    &mut state.money,
                    kind.tuning(&state.tuning.skills),
                );
                if result.succeeded() {
                    let level = state.skills.get(kind).level;
                    log::info!("Bought {} level {}", kind.as_str(), level);
                    state.emit(GameEvent::SkillPurchased { kind, level });
                }
                IntentResult::Purchase(result)
            }

            Intent::StartGame => {
                if phase != SessionPhase::Idle {
                    return IntentResult::Ignored(phase);
                }
                self.enter_running();
                log::info!("Run started (seed {})", self.state.seed);
                IntentResult::Started
            }
            Intent::RestartGame { seed } => {
                let tuning = self.state.tuning.clone();
                self.state = GameState::new(seed, tuning);
                self.enter_running();
                log::info!("Run restarted (seed {})", seed);
                IntentResult::Restarted
            }
            Intent::ResumeFromShop => {
                if phase != SessionPhase::Shop {
                    return IntentResult::Ignored(phase);
                }
                self.state.phase = SessionPhase::Running;
                // Time spent browsing must not reach the simulation
                self.clock.reset();
                self.accumulator = 0.0;
                self.state.emit(GameEvent::ShopClosed);
                log::info!("Shop closed, ${} left", self.state.money);
                IntentResult::Resumed
            }
        }
    }

    fn enter_running(&mut self) {
        self.state.phase = SessionPhase::Running;
        self.clock.reset();
        self.accumulator = 0.0;
        self.pending = TickInput::default();
        let seed = self.state.seed;
        self.state.emit(GameEvent::RunStarted { seed });
    }

    /// Run exactly one fixed step with the latched input
    pub fn step(&mut self) -> TickOutcome {
        let mut input = std::mem::take(&mut self.pending);
        input.autopilot = self.autopilot;
        tick(&mut self.state, &input)
    }

    /// Feed one external timestamp (milliseconds) and run the steps it covers.
    ///
    /// At most `MAX_SUBSTEPS` steps run per frame; time beyond that is dropped.
    /// Stops early when a step leaves the running phase.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameReport {
        if self.state.phase != SessionPhase::Running {
            self.clock.resync(timestamp_ms);
            return FrameReport {
                steps: 0,
                outcome: TickOutcome::Halted,
                events: self.state.drain_events(),
            };
        }

        self.accumulator += self.clock.advance(timestamp_ms);

        let mut steps = 0;
        let mut outcome = TickOutcome::Halted;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            outcome = self.step();
            self.accumulator -= SIM_DT;
            steps += 1;
            if outcome != TickOutcome::Continue {
                self.accumulator = 0.0;
                break;
            }
        }
        if self.accumulator >= SIM_DT {
            log::debug!("Dropping {:.1}ms of backlog", self.accumulator * 1000.0);
            self.accumulator %= SIM_DT;
        }

        FrameReport {
            steps,
            outcome,
            events: self.state.drain_events(),
        }
    }

    /// Events not yet handed out by `frame`
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = &self.state;
        let player = &state.player;
        Snapshot {
            phase: state.phase,
            player: PlayerView {
                x: PLAYER_X,
                y: player.y,
                ducking: player.ducking,
                on_ground: player.on_ground,
                hitbox: player.hitbox(),
                scale: player.visual_scale(),
            },
            entities: state.entities.clone(),
            money: state.money,
            score: state.score(),
            elapsed_secs: state.elapsed_secs(),
            speed_multiplier: state.speed_multiplier,
            skills: state
                .skills
                .iter()
                .map(|(kind, skill)| SkillView {
                    kind,
                    status: skill.status(),
                    level: skill.level,
                    cooldown_fraction: skill.cooldown_fraction(),
                    active_remaining_secs: skill.active_remaining_secs(),
                })
                .collect(),
            shop: (state.phase == SessionPhase::Shop).then(|| self.shop_view()),
        }
    }

    /// Prices and levels for everything on sale
    pub fn shop_view(&self) -> ShopView {
        let state = &self.state;
        let upgrades = UpgradeKind::ALL.into_iter().map(|kind| {
            let cost = (!state.progression.is_maxed(kind))
                .then(|| state.progression.cost(kind, &state.tuning.upgrades));
            ShopItem {
                item: ShopItemKind::Upgrade(kind),
                label: kind.as_str(),
                level: state.progression.level(kind),
                cost,
                affordable: cost.is_some_and(|c| c <= state.money),
            }
        });
        let skills = state.skills.iter().map(|(kind, skill)| {
            let cost = skill_cost(skill, kind.tuning(&state.tuning.skills));
            ShopItem {
                item: ShopItemKind::Skill(kind),
                label: kind.as_str(),
                level: skill.level,
                cost: Some(cost),
                affordable: cost <= state.money,
            }
        });
        ShopView {
            visit: state.shop_visits,
            items: upgrades.chain(skills).collect(),
        }
    }
}
