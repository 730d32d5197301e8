//! Vax Runner - a 3-lane neon endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state store, spawner, collisions, kinematics)
//! - `stats`: Persistent lifetime stats ledger (LocalStorage on web)

pub mod sim;
pub mod stats;

pub use stats::PersistentStats;

/// Game configuration constants
pub mod consts {
    /// Maximum frame delta fed to the simulation (guards against stalled
    /// frames after tab backgrounding or GC pauses)
    pub const MAX_FRAME_DELTA: f32 = 0.05;

    /// Session clock
    pub const INITIAL_TIME: f32 = 50.0;

    /// Run economy
    pub const MAX_VACCINES: u32 = 20;
    pub const MILESTONE_VACCINE_COUNT: u32 = 15;
    pub const POINTS_PER_VACCINE: u64 = 500;
    pub const TIME_BONUS_PER_SECOND: f32 = 100.0;

    /// Forward speed curve
    pub const BASE_SPEED: f32 = 21.0;
    pub const SPEED_SCALE_NORMAL: f32 = 1.05;
    pub const SPEED_SCALE_POST_MILESTONE: f32 = 1.03;
    pub const MILESTONE_SPEED_SPIKE: f32 = 1.13;

    /// Track geometry
    pub const LANE_WIDTH: f32 = 5.5;
    pub const DEFAULT_LANE_COUNT: usize = 3;
    /// Objects appear this far down the forward axis (negative z)
    pub const SPAWN_DISTANCE: f32 = 110.0;
    /// The first obstacle of a session appears much closer
    pub const FIRST_OBSTACLE_DISTANCE: f32 = 45.0;
    /// Objects past this z (behind the player) are dropped
    pub const REMOVE_DISTANCE: f32 = 15.0;

    /// Spawn cadence
    pub const OBSTACLE_GAP_BASE: f32 = 12.0;
    pub const REACTION_SECS_BASE: f32 = 0.55;
    pub const REACTION_SECS_MIN: f32 = 0.30;
    pub const REACTION_SHRINK_PER_SEC: f32 = 0.003;
    pub const REACTION_POST_MILESTONE_SCALE: f32 = 0.85;
    pub const PICKUP_INTERVAL: f32 = 28.0;
    pub const MIN_OBSTACLES_BETWEEN_PICKUPS: u32 = 2;
    pub const DOUBLE_LANE_BASE_CHANCE: f64 = 0.15;
    pub const DOUBLE_LANE_CHANCE_PER_LEVEL: f64 = 0.05;
    pub const DOUBLE_LANE_MAX_CHANCE: f64 = 0.40;

    /// Player kinematics
    pub const GRAVITY: f32 = 55.0;
    pub const JUMP_VELOCITY: f32 = 18.0;
    pub const FAST_FALL_VELOCITY: f32 = -40.0;
    pub const SLIDE_DURATION: f32 = 0.6;
    /// Exponential smoothing rate for the visual lane-change glide
    pub const LANE_SMOOTHING_RATE: f32 = 20.0;

    /// Collision envelopes
    pub const PLAYER_HEIGHT_STANDING: f32 = 1.6;
    pub const PLAYER_HEIGHT_SLIDING: f32 = 0.5;
    pub const GROUND_OBSTACLE_TOP: f32 = 1.3;
    pub const BARRIER_BOTTOM: f32 = 1.1;
    pub const BARRIER_TOP: f32 = 2.4;
    /// Half-width of the hit window on the lane (X) and forward (Z) axes
    pub const COLLISION_TOLERANCE: f32 = 1.0;

    /// Pause/milestone resume countdown
    pub const COUNTDOWN_STEPS: u32 = 3;
    pub const COUNTDOWN_STEP_SECS: f32 = 0.8;

    /// Immortality special duration
    pub const IMMORTALITY_SECS: f32 = 5.0;

    /// Signal colors forwarded with collect events (0xRRGGBB)
    pub const COLOR_PICKUP: u32 = 0x00CCFF;
    pub const COLOR_FINAL_PICKUP: u32 = 0xFFCC00;
    pub const COLOR_GROUND: u32 = 0x00FF41;
    pub const COLOR_BARRIER: u32 = 0xFF00FF;
}

/// World-space X offset of a lane's center line
#[inline]
pub fn lane_offset_x(lane: usize, lane_count: usize) -> f32 {
    (lane as f32 - (lane_count / 2) as f32) * consts::LANE_WIDTH
}

/// Frame-rate independent exponential smoothing toward a target
#[inline]
pub fn exp_smooth(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    current + (target - current) * (rate * dt).min(1.0)
}
