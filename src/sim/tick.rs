//! Per-frame simulation tick
//!
//! One synchronous pass per displayed frame, in a fixed write order: input
//! intents, resume countdown, session clock, scheduler, resolver, kinematics.
//! Collision consequences land before the next frame reads `status`.

use super::collision::resolve_collisions;
use super::spawn::advance_world;
use super::state::{GameState, GameStatus};

/// Discrete input intents for a single frame. One-shot flags; the shell
/// clears them after each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub jump: bool,
    pub slide: bool,
    /// -1 left, +1 right, 0 none
    pub move_lane: i8,
    pub pause: bool,
    /// Dismiss the milestone popup
    pub dismiss: bool,
    /// Activate the immortality special
    pub special: bool,
}

/// Advance the whole simulation by one frame.
///
/// `dt` is the frame delta in seconds; the shell clamps it to
/// `consts::MAX_FRAME_DELTA` before calling so a stalled tab cannot teleport
/// the world.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.pause {
        state.toggle_pause();
    }
    if input.dismiss {
        state.dismiss_milestone();
    }
    if input.special {
        state.activate_special();
    }

    // The resume countdown runs on this tick even while gameplay is frozen
    state.advance_countdown(dt);

    if state.status != GameStatus::Playing {
        return;
    }

    if input.jump {
        let has_double_jump = state.has_double_jump;
        state.player.jump(has_double_jump);
    }
    if input.slide {
        state.player.slide();
    }
    if input.move_lane != 0 {
        state.player.move_lane(input.move_lane.signum());
    }

    if !state.gameplay_suppressed() {
        state.advance_time(dt);
        // The clock may have just ended the session
        if state.status == GameStatus::Playing {
            advance_world(state, dt);
            resolve_collisions(state);
        }
    }

    if state.status == GameStatus::Playing {
        state.player.integrate(dt);
    }
}
