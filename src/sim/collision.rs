//! Collision resolver
//!
//! Tests each active world object against the player's current envelope once
//! per frame and resolves by kind: pickups collect regardless of vertical
//! state (intentionally forgiving), ground obstacles require enough jump
//! height, elevated barriers require an active slide.

use super::state::{GameEvent, GameState};
use crate::consts::*;

/// Is this object inside the player's hit window on the lane and forward axes?
///
/// The X test uses the player's logical lane center, not the smoothed visual
/// position, so collision never desynchronizes from input.
fn in_hit_window(obj_x: f32, obj_z: f32, player_x: f32) -> bool {
    obj_z.abs() < COLLISION_TOLERANCE && (obj_x - player_x).abs() < COLLISION_TOLERANCE
}

/// Resolve all active objects against the player for this frame.
/// At most one resolution per object; consumed objects are deactivated and
/// left for the next removal sweep.
pub fn resolve_collisions(state: &mut GameState) {
    let player_x = state.player.lane_x();
    let player_height = state.player.height;
    let sliding = state.player.sliding;

    let mut hits: Vec<GameEvent> = Vec::new();
    let mut took_hit = false;
    let mut collected: Vec<GameEvent> = Vec::new();

    for obj in &mut state.objects {
        if !obj.active || !in_hit_window(obj.pos.x, obj.pos.z, player_x) {
            continue;
        }

        match obj.kind {
            super::ObjectKind::Pickup => {
                obj.active = false;
                collected.push(GameEvent::Collected {
                    pos: obj.pos,
                    color: obj.color,
                });
            }
            super::ObjectKind::GroundObstacle => {
                if player_height < GROUND_OBSTACLE_TOP {
                    obj.active = false;
                    took_hit = true;
                    hits.push(GameEvent::Hit { pos: obj.pos });
                }
            }
            super::ObjectKind::ElevatedBarrier => {
                if !sliding {
                    obj.active = false;
                    took_hit = true;
                    hits.push(GameEvent::Hit { pos: obj.pos });
                }
            }
        }
    }

    for event in collected {
        if state.collect_vaccine() {
            state.push_event(event);
        }
    }
    if took_hit && state.take_damage() {
        // One damage resolution per frame is enough to end the run; signal
        // every impact for the particle layer anyway
        for event in hits {
            state.push_event(event);
        }
    }
}
