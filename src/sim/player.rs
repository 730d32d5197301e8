//! Player kinematic controller
//!
//! Translates discrete input events (jump / slide / lane change) into
//! continuous per-frame motion. The logical lane index switches immediately on
//! input; only the rendered X position glides toward the lane center, so the
//! collision resolver never lags behind the player's intent.

use crate::consts::*;
use crate::{exp_smooth, lane_offset_x};

/// Per-session player motion state
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Logical lane index in `[0, lane_count)`
    pub lane: usize,
    pub lane_count: usize,
    /// Height above the track
    pub height: f32,
    pub vertical_velocity: f32,
    pub airborne: bool,
    /// Launches applied since the last landing (double-jump bookkeeping)
    jumps_since_landing: u32,
    pub sliding: bool,
    slide_timer: f32,
    /// Smoothed world X, used for rendering only
    pub visual_x: f32,
}

impl PlayerState {
    pub fn new(lane_count: usize) -> Self {
        let lane = lane_count / 2;
        Self {
            lane,
            lane_count,
            height: 0.0,
            vertical_velocity: 0.0,
            airborne: false,
            jumps_since_landing: 0,
            sliding: false,
            slide_timer: 0.0,
            visual_x: lane_offset_x(lane, lane_count),
        }
    }

    /// World X of the lane the player logically occupies
    pub fn lane_x(&self) -> f32 {
        lane_offset_x(self.lane, self.lane_count)
    }

    /// Height of the top of the hit envelope above `height`
    pub fn envelope_height(&self) -> f32 {
        if self.sliding {
            PLAYER_HEIGHT_SLIDING
        } else {
            PLAYER_HEIGHT_STANDING
        }
    }

    /// Jump input. Grounded: launch. Airborne with double jump remaining:
    /// one extra launch per landing cycle. Cancels an active slide.
    pub fn jump(&mut self, has_double_jump: bool) {
        if self.sliding {
            self.sliding = false;
            self.slide_timer = 0.0;
        }

        let max_jumps = if has_double_jump { 2 } else { 1 };
        if !self.airborne {
            self.airborne = true;
            self.jumps_since_landing = 1;
            self.vertical_velocity = JUMP_VELOCITY;
        } else if self.jumps_since_landing < max_jumps {
            self.jumps_since_landing += 1;
            self.vertical_velocity = JUMP_VELOCITY;
        }
    }

    /// Slide input. Airborne: fast-fall so landing is immediate (airborne and
    /// sliding are mutually exclusive). Grounded: start the slide timer.
    pub fn slide(&mut self) {
        if self.airborne {
            if self.vertical_velocity > FAST_FALL_VELOCITY {
                self.vertical_velocity = FAST_FALL_VELOCITY;
            }
        } else {
            self.sliding = true;
            self.slide_timer = SLIDE_DURATION;
        }
    }

    /// Move one lane left (-1) or right (+1), clamped to the track
    pub fn move_lane(&mut self, dir: i8) {
        let next = (self.lane as i64 + dir as i64).clamp(0, self.lane_count as i64 - 1);
        self.lane = next as usize;
    }

    /// Integrate vertical motion, the slide timer, and the visual X glide
    pub fn integrate(&mut self, dt: f32) {
        if self.airborne {
            self.height += self.vertical_velocity * dt;
            self.vertical_velocity -= GRAVITY * dt;
            if self.height <= 0.0 {
                self.height = 0.0;
                self.vertical_velocity = 0.0;
                self.airborne = false;
                self.jumps_since_landing = 0;
            }
        }

        if self.sliding {
            self.slide_timer -= dt;
            if self.slide_timer <= 0.0 {
                self.sliding = false;
                self.slide_timer = 0.0;
            }
        }

        self.visual_x = exp_smooth(self.visual_x, self.lane_x(), LANE_SMOOTHING_RATE, dt);
    }
}
