//! Game state store
//!
//! The single source of truth for one play-through plus the persistent stats
//! ledger it folds into at session end. All status/score/speed/clock writes
//! happen through the operations here; everything else in the sim reads this
//! struct and reports back through the same operations.
//!
//! There is no error taxonomy: an operation called in the wrong status is a
//! silent no-op. A dropped frame's redundant event must never end a session
//! twice or crash it.

use glam::Vec3;

use super::player::PlayerState;
use super::spawn::{ObjectKind, Spawner, WorldObject};
use crate::consts::*;
use crate::stats::PersistentStats;

/// Current screen/phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Menu,
    Playing,
    Paused,
    GameOver,
    Victory,
    /// Lifetime stats screen
    Stats,
}

impl GameStatus {
    /// Terminal per-session states; only menu/restart actions leave them
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStatus::GameOver | GameStatus::Victory)
    }
}

/// Fire-and-forget signals for the presentation layer (particles, audio).
/// Queued on the store and drained once per frame by the shell; simulation
/// correctness never depends on anyone listening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Hit { pos: Vec3 },
    Collected { pos: Vec3, color: u32 },
}

/// Complete session + ledger state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Session seed (drives the spawner RNG)
    pub seed: u64,
    pub status: GameStatus,
    pub score: u64,
    /// Forward travel rate; zeroed on game over
    pub speed: f32,
    pub vaccine_count: u32,
    /// Countdown clock, clamped to [0, INITIAL_TIME]
    pub time_left: f32,
    /// Victory bonus, kept separate so the HUD can show it
    pub time_bonus: u64,
    pub level: u32,
    pub lane_count: usize,

    /// Milestone popup is up; gates the scheduler and resolver
    pub show_level_up_popup: bool,
    /// Resume countdown is running
    pub milestone_paused: bool,
    /// Steps remaining on the resume countdown (3..=1, 0 = idle)
    pub countdown_value: u32,
    countdown_timer: f32,

    pub has_double_jump: bool,
    pub has_immortality: bool,
    immortality_timer: f32,

    /// Accumulated unsuppressed play time this session
    pub session_elapsed: f32,

    pub player: PlayerState,
    pub spawner: Spawner,
    pub objects: Vec<WorldObject>,

    pub stats: PersistentStats,
    stats_dirty: bool,

    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh store in the menu, carrying previously loaded lifetime stats
    pub fn new(seed: u64, stats: PersistentStats) -> Self {
        Self {
            seed,
            status: GameStatus::Menu,
            score: 0,
            speed: 0.0,
            vaccine_count: 0,
            time_left: INITIAL_TIME,
            time_bonus: 0,
            level: 1,
            lane_count: DEFAULT_LANE_COUNT,
            show_level_up_popup: false,
            milestone_paused: false,
            countdown_value: 0,
            countdown_timer: 0.0,
            has_double_jump: false,
            has_immortality: false,
            immortality_timer: 0.0,
            session_elapsed: 0.0,
            player: PlayerState::new(DEFAULT_LANE_COUNT),
            spawner: Spawner::new(seed, DEFAULT_LANE_COUNT),
            objects: Vec::new(),
            stats,
            stats_dirty: false,
            events: Vec::new(),
        }
    }

    /// Reset every session field and enter PLAYING. Calling this while
    /// already PLAYING is a destructive reset (single-player, by contract).
    pub fn start_game(&mut self, seed: u64) {
        self.seed = seed;
        self.status = GameStatus::Playing;
        self.score = 0;
        self.speed = BASE_SPEED;
        self.vaccine_count = 0;
        self.time_left = INITIAL_TIME;
        self.time_bonus = 0;
        self.level = 1;
        self.show_level_up_popup = false;
        self.milestone_paused = false;
        self.countdown_value = 0;
        self.countdown_timer = 0.0;
        self.has_double_jump = true;
        self.immortality_timer = 0.0;
        self.session_elapsed = 0.0;
        self.player = PlayerState::new(self.lane_count);
        self.spawner = Spawner::new(seed, self.lane_count);
        self.objects.clear();
        self.events.clear();
        log::info!("session started (seed {seed})");
    }

    pub fn restart_game(&mut self, seed: u64) {
        self.start_game(seed);
    }

    /// Popup/countdown sub-states suppress gameplay advancement while the
    /// frame callback keeps rendering
    pub fn gameplay_suppressed(&self) -> bool {
        self.show_level_up_popup || self.milestone_paused
    }

    pub fn is_immortal(&self) -> bool {
        self.immortality_timer > 0.0
    }

    /// Advance the session clock. Depleting it forces exactly one GAME_OVER.
    pub fn advance_time(&mut self, dt: f32) {
        if self.status != GameStatus::Playing || self.gameplay_suppressed() {
            return;
        }
        self.session_elapsed += dt;
        if self.immortality_timer > 0.0 {
            self.immortality_timer = (self.immortality_timer - dt).max(0.0);
        }

        let next = (self.time_left - dt).max(0.0);
        self.time_left = next;
        if next <= 0.0 && dt > 0.0 {
            log::info!("time depleted at score {}", self.score);
            self.end_session(GameStatus::GameOver);
        }
    }

    /// Collect one pickup: score bonus, speed scale, level recompute, and the
    /// milestone/victory transitions.
    pub fn collect_vaccine(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }

        let next = self.vaccine_count + 1;
        let scale = if next > MILESTONE_VACCINE_COUNT {
            SPEED_SCALE_POST_MILESTONE
        } else {
            SPEED_SCALE_NORMAL
        };
        // The first pickup never scales, so the milestone lands on
        // BASE_SPEED * NORMAL^(MILESTONE-1) * SPIKE
        if next > 1 {
            self.speed *= scale;
        }
        if next == MILESTONE_VACCINE_COUNT {
            self.speed *= MILESTONE_SPEED_SPIKE;
            self.show_level_up_popup = true;
            log::info!("milestone reached at {next} vaccines");
        }

        self.vaccine_count = next;
        self.score += POINTS_PER_VACCINE;
        self.level = next / 3 + 1;

        if next >= MAX_VACCINES {
            let bonus = (self.time_left * TIME_BONUS_PER_SECOND).floor() as u64;
            self.time_bonus = bonus;
            self.score += bonus;
            self.end_session(GameStatus::Victory);
        }
        true
    }

    /// One hit ends the run, unless the immortality window or a pause/popup
    /// sub-state is active. Returns whether damage was applied.
    pub fn take_damage(&mut self) -> bool {
        if self.is_immortal() || self.status != GameStatus::Playing || self.gameplay_suppressed() {
            return false;
        }
        self.end_session(GameStatus::GameOver);
        true
    }

    fn end_session(&mut self, terminal: GameStatus) {
        debug_assert!(terminal.is_terminal());
        self.status = terminal;
        if terminal == GameStatus::GameOver {
            self.speed = 0.0;
        }
        self.stats.fold_session(
            self.score,
            self.level,
            self.vaccine_count,
            self.session_elapsed.floor() as u64,
        );
        self.stats_dirty = true;
        log::info!(
            "session ended: {terminal:?}, score {}, {} vaccines",
            self.score,
            self.vaccine_count
        );
    }

    /// PLAYING -> PAUSED immediately; PAUSED -> PLAYING via the countdown
    pub fn toggle_pause(&mut self) {
        match self.status {
            GameStatus::Playing if !self.gameplay_suppressed() => {
                self.status = GameStatus::Paused;
            }
            GameStatus::Paused if !self.milestone_paused => {
                self.begin_countdown();
            }
            _ => {}
        }
    }

    /// Close the milestone popup and run the resume countdown
    pub fn dismiss_milestone(&mut self) {
        if self.show_level_up_popup {
            self.show_level_up_popup = false;
            self.begin_countdown();
        }
    }

    fn begin_countdown(&mut self) {
        self.milestone_paused = true;
        self.countdown_value = COUNTDOWN_STEPS;
        self.countdown_timer = COUNTDOWN_STEP_SECS;
    }

    /// Advance the resume countdown on the simulation tick (no wall-clock
    /// timers, so resets can never leak one)
    pub fn advance_countdown(&mut self, dt: f32) {
        if self.countdown_value == 0 {
            return;
        }
        self.countdown_timer -= dt;
        while self.countdown_value > 0 && self.countdown_timer <= 0.0 {
            self.countdown_value -= 1;
            self.countdown_timer += COUNTDOWN_STEP_SECS;
        }
        if self.countdown_value == 0 {
            self.milestone_paused = false;
            self.countdown_timer = 0.0;
            if self.status == GameStatus::Paused {
                self.status = GameStatus::Playing;
            }
        }
    }

    /// Open the 5-second invulnerability window, if the ability is owned
    pub fn activate_special(&mut self) {
        if self.has_immortality && !self.is_immortal() && self.status == GameStatus::Playing {
            self.immortality_timer = IMMORTALITY_SECS;
            log::info!("immortality window opened");
        }
    }

    /// Record the first-ever encounter with an obstacle kind.
    /// Returns true exactly once per kind across all sessions.
    pub fn mark_obstacle_seen(&mut self, kind: ObjectKind) -> bool {
        if kind == ObjectKind::Pickup {
            return false;
        }
        let first = self.stats.mark_seen(kind);
        if first {
            self.stats_dirty = true;
        }
        first
    }

    /// Zero the lifetime ledger (explicit user reset)
    pub fn reset_persistent_stats(&mut self) {
        self.stats.reset();
        self.stats_dirty = true;
        log::info!("persistent stats reset");
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the queued presentation signals to the shell, once per frame
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True once after each stats mutation; the shell persists on it
    pub fn take_stats_dirty(&mut self) -> bool {
        std::mem::take(&mut self.stats_dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing_state() -> GameState {
        let mut state = GameState::new(1, PersistentStats::default());
        state.start_game(1);
        state
    }

    #[test]
    fn test_start_resets_session_fields() {
        let mut state = playing_state();
        state.score = 900;
        state.vaccine_count = 5;
        state.time_left = 3.0;
        state.restart_game(2);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.vaccine_count, 0);
        assert_eq!(state.speed, BASE_SPEED);
        assert_eq!(state.time_left, INITIAL_TIME);
        assert_eq!(state.level, 1);
        assert!(state.has_double_jump);
    }

    #[test]
    fn test_full_collection_run_reaches_victory() {
        let mut state = playing_state();
        for _ in 0..MAX_VACCINES {
            state.collect_vaccine();
        }
        assert_eq!(state.status, GameStatus::Victory);
        assert_eq!(state.vaccine_count, MAX_VACCINES);
        let expected_bonus = (state.time_left * TIME_BONUS_PER_SECOND).floor() as u64;
        assert_eq!(
            state.score,
            MAX_VACCINES as u64 * POINTS_PER_VACCINE + expected_bonus
        );
        assert_eq!(state.time_bonus, expected_bonus);

        // Further collects are no-ops in a terminal state
        assert!(!state.collect_vaccine());
        assert_eq!(state.vaccine_count, MAX_VACCINES);
    }

    #[test]
    fn test_milestone_speed_curve() {
        let mut state = playing_state();
        for _ in 0..MILESTONE_VACCINE_COUNT {
            state.collect_vaccine();
        }
        let expected = BASE_SPEED
            * SPEED_SCALE_NORMAL.powi(MILESTONE_VACCINE_COUNT as i32 - 1)
            * MILESTONE_SPEED_SPIKE;
        assert!((state.speed - expected).abs() < 1e-3);
        assert!(state.show_level_up_popup);
        assert!(state.gameplay_suppressed());
    }

    #[test]
    fn test_time_depletion_forces_game_over() {
        let mut state = playing_state();
        state.advance_time(INITIAL_TIME + 1.0);
        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.time_left, 0.0);
        assert_eq!(state.speed, 0.0);
    }

    #[test]
    fn test_zero_tick_is_idempotent() {
        let mut state = playing_state();
        state.time_left = 0.5;
        let before = (state.status, state.score, state.time_left, state.speed);
        state.advance_time(0.0);
        assert_eq!(
            before,
            (state.status, state.score, state.time_left, state.speed)
        );
    }

    #[test]
    fn test_double_damage_is_single_game_over() {
        let mut state = playing_state();
        state.score = 100;
        assert!(state.take_damage());
        assert_eq!(state.status, GameStatus::GameOver);
        let total_after_first = state.stats.total_score;

        // Second hit in the same frame: no-op, no second fold
        assert!(!state.take_damage());
        assert_eq!(state.stats.total_score, total_after_first);
    }

    #[test]
    fn test_level_derivation() {
        let mut state = playing_state();
        assert_eq!(state.level, 1);
        for expected in [1, 1, 2, 2, 2, 3] {
            state.collect_vaccine();
            assert_eq!(state.level, expected);
        }
    }

    #[test]
    fn test_pause_resume_countdown() {
        let mut state = playing_state();
        state.toggle_pause();
        assert_eq!(state.status, GameStatus::Paused);

        state.toggle_pause();
        assert_eq!(state.status, GameStatus::Paused);
        assert_eq!(state.countdown_value, COUNTDOWN_STEPS);

        // One step short of the full countdown: still paused
        state.advance_countdown(COUNTDOWN_STEP_SECS * (COUNTDOWN_STEPS - 1) as f32);
        assert_eq!(state.status, GameStatus::Paused);
        assert_eq!(state.countdown_value, 1);

        state.advance_countdown(COUNTDOWN_STEP_SECS);
        assert_eq!(state.status, GameStatus::Playing);
        assert!(!state.milestone_paused);
    }

    #[test]
    fn test_milestone_dismiss_countdown() {
        let mut state = playing_state();
        for _ in 0..MILESTONE_VACCINE_COUNT {
            state.collect_vaccine();
        }
        state.dismiss_milestone();
        assert!(!state.show_level_up_popup);
        assert!(state.gameplay_suppressed());

        state.advance_countdown(COUNTDOWN_STEP_SECS * COUNTDOWN_STEPS as f32);
        assert!(!state.gameplay_suppressed());
        assert_eq!(state.status, GameStatus::Playing);
    }

    #[test]
    fn test_timer_frozen_during_popup() {
        let mut state = playing_state();
        for _ in 0..MILESTONE_VACCINE_COUNT {
            state.collect_vaccine();
        }
        let t = state.time_left;
        state.advance_time(5.0);
        assert_eq!(state.time_left, t);
    }

    #[test]
    fn test_immortality_window_expires() {
        let mut state = playing_state();
        state.has_immortality = true;
        state.activate_special();
        assert!(state.is_immortal());
        assert!(!state.take_damage());

        state.advance_time(IMMORTALITY_SECS + 0.1);
        assert!(!state.is_immortal());
        assert!(state.take_damage());
    }

    #[test]
    fn test_stats_fold_on_victory() {
        let mut state = playing_state();
        state.session_elapsed = 12.7;
        for _ in 0..MAX_VACCINES {
            state.collect_vaccine();
        }
        assert_eq!(state.stats.total_vaccines_collected, MAX_VACCINES as u64);
        assert_eq!(state.stats.total_score, state.score);
        assert_eq!(state.stats.highest_level_reached, state.level);
        assert_eq!(state.stats.total_play_time_seconds, 12);
        assert!(state.take_stats_dirty());
        assert!(!state.take_stats_dirty());
    }

    #[test]
    fn test_score_monotonic_through_session() {
        let mut state = playing_state();
        let mut last = state.score;
        for i in 0..MAX_VACCINES {
            if i % 3 == 0 {
                state.advance_time(0.25);
            }
            state.collect_vaccine();
            state.dismiss_milestone();
            state.advance_countdown(COUNTDOWN_STEP_SECS * COUNTDOWN_STEPS as f32);
            assert!(state.score >= last);
            last = state.score;
        }
    }
}
