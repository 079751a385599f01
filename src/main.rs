//! Dino Dash entry point
//!
//! Headless runner: plays an autopilot run against a synthetic 60 Hz clock,
//! spends money at every shop visit and prints the final snapshot as JSON.
//!
//! Usage: `dino-dash [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
use dino_dash::session::ShopItemKind;
#[cfg(not(target_arch = "wasm32"))]
use dino_dash::sim::{GameEvent, SessionPhase, SkillKind, SkillStatus, TickOutcome};
#[cfg(not(target_arch = "wasm32"))]
use dino_dash::{GameSession, Intent, IntentResult, Tuning};

/// Give up after this much simulated play
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_SECS: f64 = 600.0;
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_SEED: u64 = 42;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Dino Dash (headless) starting...");

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser front end drives `GameSession` directly
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path)?,
        None => Tuning::default(),
    };
    tuning.validate()?;
    let seed = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(DEFAULT_SEED);

    let mut session = GameSession::new(seed, tuning);
    session.set_autopilot(true);
    session.apply(Intent::StartGame);

    let frame_ms = 1000.0 / 60.0;
    let frames = (MAX_RUN_SECS * 60.0) as u64;
    for frame in 0..frames {
        use_ready_skills(&mut session);

        let report = session.frame(frame as f64 * frame_ms);
        for event in &report.events {
            log_event(event);
        }
        match report.outcome {
            TickOutcome::ShopOpened => {
                go_shopping(&mut session);
                session.apply(Intent::ResumeFromShop);
            }
            TickOutcome::GameOver => break,
            TickOutcome::Continue | TickOutcome::Halted => {}
        }
    }
    for event in session.take_events() {
        log_event(&event);
    }

    let snapshot = session.snapshot();
    if snapshot.phase != SessionPhase::GameOver {
        log::info!("Still alive after {:.0}s", snapshot.elapsed_secs);
    }
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// Fire every skill that is off cooldown
#[cfg(not(target_arch = "wasm32"))]
fn use_ready_skills(session: &mut GameSession) {
    let ready: Vec<SkillKind> = session
        .state()
        .skills
        .iter()
        .filter(|(_, skill)| skill.status() == SkillStatus::Ready)
        .map(|(kind, _)| kind)
        .collect();
    for kind in ready {
        session.apply(Intent::ActivateSkill(kind));
    }
}

/// Keep buying the cheapest affordable item until nothing fits the budget
#[cfg(not(target_arch = "wasm32"))]
fn go_shopping(session: &mut GameSession) {
    loop {
        let shop = session.shop_view();
        let Some(item) = shop
            .items
            .iter()
            .filter(|i| i.affordable)
            .min_by_key(|i| i.cost)
        else {
            break;
        };
        let intent = match item.item {
            ShopItemKind::Upgrade(kind) => Intent::PurchaseUpgrade(kind),
            ShopItemKind::Skill(kind) => Intent::PurchaseSkill(kind),
        };
        match session.apply(intent) {
            IntentResult::Purchase(result) if result.succeeded() => {}
            other => {
                log::warn!("Shop refused {:?}: {:?}", intent, other);
                break;
            }
        }
    }
    for event in session.take_events() {
        log_event(&event);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ShopOpened { visit } => log::info!("Shop visit {}", visit),
        GameEvent::GameOver { score, money } => {
            log::info!("Final score {}, ${} unspent", score, money);
        }
        other => log::debug!("{:?}", other),
    }
}
