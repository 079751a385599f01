//! Player jump arc and entity scrolling
//!
//! All motion is per fixed step. Time-slow only touches obstacle scroll
//! speed; the jump arc, pickups and the meteor always run at full rate.

use super::state::{EntityKind, GameEvent, GameState, Player};
use crate::consts::GROUND_Y;

/// Integrate one step of vertical motion. Returns true on the landing step.
pub fn integrate_player(player: &mut Player, gravity: f32) -> bool {
    let was_airborne = !player.on_ground;
    if was_airborne {
        player.vy -= gravity;
    }
    player.y += player.vy;

    if player.y <= GROUND_Y {
        player.y = GROUND_Y;
        player.vy = 0.0;
        player.on_ground = true;
        return was_airborne;
    }
    false
}

/// Per-step horizontal displacement by entity family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSpeeds {
    pub obstacle: f32,
    pub pickup: f32,
}

impl ScrollSpeeds {
    pub fn for_state(state: &GameState) -> Self {
        Self {
            obstacle: state.obstacle_speed(),
            pickup: state.scroll_speed(),
        }
    }
}

/// Move every entity one step and drop the ones that left or expired.
/// Returns how many were removed.
pub fn scroll_entities(state: &mut GameState, speeds: ScrollSpeeds) -> usize {
    for entity in state.entities.iter_mut() {
        match &mut entity.kind {
            EntityKind::Obstacle(_) => entity.pos.x -= speeds.obstacle,
            EntityKind::Pickup { .. } => entity.pos.x -= speeds.pickup,
            EntityKind::VisualOnly { vel, ttl_ticks, .. } => {
                entity.pos += *vel;
                *ttl_ticks = ttl_ticks.saturating_sub(1);
            }
        }
    }
    let before = state.entities.len();
    state.entities.retain(|e| !e.is_gone());
    before - state.entities.len()
}

/// Player and entity motion for one step
pub fn physics_tick(state: &mut GameState) {
    if integrate_player(&mut state.player, state.tuning.physics.gravity) {
        state.emit(GameEvent::Landed);
    }
    let speeds = ScrollSpeeds::for_state(state);
    let removed = scroll_entities(state, speeds);
    if removed > 0 {
        log::trace!("{} entities left the screen", removed);
    }
}
