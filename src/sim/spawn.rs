//! Spawn/despawn scheduler
//!
//! Decides what to spawn and when, keyed off cumulative forward distance
//! (`speed * dt` integrated every frame) rather than wall-clock time, so
//! difficulty scales consistently with speed. Obstacle cadence is a
//! reaction-time window converted to distance at the current speed; pickups
//! run on an independent threshold gated behind a minimum obstacle count.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::GameState;
use crate::consts::*;

/// Resting heights of spawned objects (visual centers)
const GROUND_OBSTACLE_HEIGHT: f32 = 0.6;
const BARRIER_HEIGHT: f32 = 1.7;
const PICKUP_HEIGHT: f32 = 1.0;

/// What a world object is, and therefore how the resolver treats it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Jump over it
    GroundObstacle,
    /// Slide under it
    ElevatedBarrier,
    /// Collect it
    Pickup,
}

/// One spawned entity on the track
#[derive(Debug, Clone)]
pub struct WorldObject {
    pub id: u32,
    pub kind: ObjectKind,
    /// (lane-offset X, height Y, forward Z); Z rises toward the player
    pub pos: Vec3,
    pub lane: usize,
    /// Cleared on consumption; the removal sweep drops inactive objects
    pub active: bool,
    /// Forwarded with collect events for particle tinting
    pub color: u32,
    /// The run-winning pickup gets the gold treatment
    pub is_final: bool,
    /// First-ever encounter with this kind (drives the tutorial arrow)
    pub tutorial: bool,
}

/// Rolling spawn bookkeeping for one session
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    lane_count: usize,
    /// Monotonic forward-distance accumulator
    pub total_distance: f32,
    next_obstacle_distance: f32,
    next_pickup_distance: f32,
    obstacles_since_pickup: u32,
    pickups_spawned: u32,
    first_obstacle_pending: bool,
    last_obstacle_kind: Option<ObjectKind>,
    consecutive_same_kind: u32,
    last_pickup_lane: Option<usize>,
    next_id: u32,
}

impl Spawner {
    pub fn new(seed: u64, lane_count: usize) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            lane_count,
            total_distance: 0.0,
            // First obstacle is due immediately and spawns close
            next_obstacle_distance: 0.0,
            next_pickup_distance: PICKUP_INTERVAL,
            obstacles_since_pickup: 0,
            pickups_spawned: 0,
            first_obstacle_pending: true,
            last_obstacle_kind: None,
            consecutive_same_kind: 0,
            last_pickup_lane: None,
            next_id: 1,
        }
    }

    pub fn pickups_spawned(&self) -> u32 {
        self.pickups_spawned
    }

    fn next_object_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Time budget the player gets to react to a new obstacle. Shrinks with
    /// session elapsed time, tightens again after the milestone, never below
    /// the floor.
    fn reaction_secs(elapsed: f32, post_milestone: bool) -> f32 {
        let mut secs = REACTION_SECS_BASE - elapsed * REACTION_SHRINK_PER_SEC;
        if post_milestone {
            secs *= REACTION_POST_MILESTONE_SCALE;
        }
        secs.max(REACTION_SECS_MIN)
    }

    /// After two consecutive obstacles of the same kind, force the other one
    fn pick_obstacle_kind(&mut self) -> ObjectKind {
        let kind = if self.consecutive_same_kind >= 2 {
            match self.last_obstacle_kind {
                Some(ObjectKind::GroundObstacle) => ObjectKind::ElevatedBarrier,
                _ => ObjectKind::GroundObstacle,
            }
        } else if self.rng.random_bool(0.5) {
            ObjectKind::ElevatedBarrier
        } else {
            ObjectKind::GroundObstacle
        };

        if self.last_obstacle_kind == Some(kind) {
            self.consecutive_same_kind += 1;
        } else {
            self.consecutive_same_kind = 1;
        }
        self.last_obstacle_kind = Some(kind);
        kind
    }

    fn make_obstacle(&mut self, kind: ObjectKind, lane: usize, z: f32) -> WorldObject {
        let (y, color) = match kind {
            ObjectKind::GroundObstacle => (GROUND_OBSTACLE_HEIGHT, COLOR_GROUND),
            ObjectKind::ElevatedBarrier => (BARRIER_HEIGHT, COLOR_BARRIER),
            ObjectKind::Pickup => unreachable!("pickups spawn via roll_pickup"),
        };
        WorldObject {
            id: self.next_object_id(),
            kind,
            pos: Vec3::new(crate::lane_offset_x(lane, self.lane_count), y, z),
            lane,
            active: true,
            color,
            is_final: false,
            tutorial: false,
        }
    }

    /// Roll the obstacle threshold; returns 0, 1, or 2 objects (a double-lane
    /// spawn yields two in the same Z band, always leaving >=1 lane clear).
    pub fn roll_obstacles(
        &mut self,
        speed: f32,
        elapsed: f32,
        level: u32,
        post_milestone: bool,
    ) -> Vec<WorldObject> {
        if self.total_distance < self.next_obstacle_distance {
            return Vec::new();
        }

        let z = if self.first_obstacle_pending {
            self.first_obstacle_pending = false;
            -FIRST_OBSTACLE_DISTANCE
        } else {
            -SPAWN_DISTANCE
        };

        let kind = self.pick_obstacle_kind();
        let lane = self.rng.random_range(0..self.lane_count);
        let mut batch = vec![self.make_obstacle(kind, lane, z)];

        let double_chance = (DOUBLE_LANE_BASE_CHANCE
            + DOUBLE_LANE_CHANCE_PER_LEVEL * (level.saturating_sub(1)) as f64)
            .min(DOUBLE_LANE_MAX_CHANCE);
        if self.lane_count >= 3 && self.rng.random_bool(double_chance) {
            // Fixed stride of one lane: two occupied, >=1 always clear
            let second = (lane + 1) % self.lane_count;
            batch.push(self.make_obstacle(kind, second, z));
        }

        self.obstacles_since_pickup += 1;
        let gap = OBSTACLE_GAP_BASE + Self::reaction_secs(elapsed, post_milestone) * speed;
        self.next_obstacle_distance = self.total_distance + gap;
        batch
    }

    /// Roll the pickup threshold. Gated behind a minimum number of obstacles
    /// since the last pickup and the session-wide pickup cap.
    pub fn roll_pickup(&mut self) -> Option<WorldObject> {
        if self.total_distance < self.next_pickup_distance
            || self.obstacles_since_pickup < MIN_OBSTACLES_BETWEEN_PICKUPS
            || self.pickups_spawned >= MAX_VACCINES
        {
            return None;
        }

        let mut lane = self.rng.random_range(0..self.lane_count);
        if Some(lane) == self.last_pickup_lane {
            lane = (lane + 1) % self.lane_count;
        }
        self.last_pickup_lane = Some(lane);

        let is_final = self.pickups_spawned + 1 == MAX_VACCINES;
        self.pickups_spawned += 1;
        self.obstacles_since_pickup = 0;
        self.next_pickup_distance = self.total_distance + PICKUP_INTERVAL;

        Some(WorldObject {
            id: self.next_object_id(),
            kind: ObjectKind::Pickup,
            pos: Vec3::new(
                crate::lane_offset_x(lane, self.lane_count),
                PICKUP_HEIGHT,
                -SPAWN_DISTANCE,
            ),
            lane,
            active: true,
            color: if is_final { COLOR_FINAL_PICKUP } else { COLOR_PICKUP },
            is_final,
            tutorial: false,
        })
    }
}

/// Advance all world objects by one frame and spawn whatever is due.
/// Callers gate this on the session actually running.
pub fn advance_world(state: &mut GameState, dt: f32) {
    let dist = state.speed * dt;
    state.spawner.total_distance += dist;

    for obj in &mut state.objects {
        obj.pos.z += dist;
    }
    // Removal sweep: consumed objects and anything behind the player
    state.objects.retain(|o| o.active && o.pos.z <= REMOVE_DISTANCE);

    let post_milestone = state.vaccine_count >= MILESTONE_VACCINE_COUNT;
    let batch = state.spawner.roll_obstacles(
        state.speed,
        state.session_elapsed,
        state.level,
        post_milestone,
    );
    for (i, mut obj) in batch.into_iter().enumerate() {
        // Tutorial arrow only over the lead object of a double spawn
        let first_seen = state.mark_obstacle_seen(obj.kind);
        obj.tutorial = first_seen && i == 0;
        state.objects.push(obj);
    }

    if let Some(pickup) = state.spawner.roll_pickup() {
        state.objects.push(pickup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::PersistentStats;
    use proptest::prelude::*;

    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed, PersistentStats::default());
        state.start_game(seed);
        state
    }

    #[test]
    fn test_first_obstacle_spawns_close() {
        let mut state = playing_state(7);
        advance_world(&mut state, 1.0 / 60.0);

        let obstacles: Vec<_> = state
            .objects
            .iter()
            .filter(|o| o.kind != ObjectKind::Pickup)
            .collect();
        assert!(!obstacles.is_empty());
        assert_eq!(obstacles[0].pos.z, -FIRST_OBSTACLE_DISTANCE);
    }

    #[test]
    fn test_subsequent_obstacles_spawn_at_horizon() {
        let mut state = playing_state(7);
        // Run long enough for several spawn thresholds to trip
        for _ in 0..600 {
            advance_world(&mut state, 1.0 / 60.0);
        }
        let far: Vec<_> = state
            .objects
            .iter()
            .filter(|o| o.kind != ObjectKind::Pickup && o.pos.z < -FIRST_OBSTACLE_DISTANCE)
            .collect();
        assert!(!far.is_empty());
    }

    #[test]
    fn test_removal_sweep() {
        let mut state = playing_state(7);
        advance_world(&mut state, 1.0 / 60.0);
        let id = state.objects[0].id;

        // Push the object far behind the player
        state.objects[0].pos.z = REMOVE_DISTANCE + 1.0;
        advance_world(&mut state, 1.0 / 60.0);
        assert!(state.objects.iter().all(|o| o.id != id));
    }

    #[test]
    fn test_consumed_objects_removed_next_sweep() {
        let mut state = playing_state(7);
        advance_world(&mut state, 1.0 / 60.0);
        let id = state.objects[0].id;
        state.objects[0].active = false;
        advance_world(&mut state, 1.0 / 60.0);
        assert!(state.objects.iter().all(|o| o.id != id));
    }

    #[test]
    fn test_pickup_cap_and_gating() {
        let mut spawner = Spawner::new(42, 3);

        // Pickup distance reached but no obstacles yet: gated
        spawner.total_distance = PICKUP_INTERVAL + 1.0;
        assert!(spawner.roll_pickup().is_none());

        let mut spawned = 0u32;
        for _ in 0..1000 {
            spawner.total_distance += PICKUP_INTERVAL;
            let _ = spawner.roll_obstacles(BASE_SPEED, 0.0, 1, false);
            spawner.next_obstacle_distance = 0.0; // keep obstacles flowing
            if spawner.roll_pickup().is_some() {
                spawned += 1;
            }
        }
        assert_eq!(spawned, MAX_VACCINES);
        assert_eq!(spawner.pickups_spawned(), MAX_VACCINES);
    }

    #[test]
    fn test_final_pickup_flagged() {
        let mut spawner = Spawner::new(42, 3);
        let mut last = None;
        for _ in 0..MAX_VACCINES {
            spawner.total_distance += PICKUP_INTERVAL * 2.0;
            spawner.obstacles_since_pickup = MIN_OBSTACLES_BETWEEN_PICKUPS;
            last = spawner.roll_pickup();
            assert!(last.is_some());
        }
        let last = last.unwrap();
        assert!(last.is_final);
        assert_eq!(last.color, COLOR_FINAL_PICKUP);
    }

    #[test]
    fn test_pickup_avoids_previous_lane() {
        let mut spawner = Spawner::new(3, 3);
        let mut prev: Option<usize> = None;
        for _ in 0..MAX_VACCINES {
            spawner.total_distance += PICKUP_INTERVAL * 2.0;
            spawner.obstacles_since_pickup = MIN_OBSTACLES_BETWEEN_PICKUPS;
            let p = spawner.roll_pickup().unwrap();
            if let Some(prev) = prev {
                assert_ne!(p.lane, prev);
            }
            prev = Some(p.lane);
        }
    }

    #[test]
    fn test_reaction_window_shrinks() {
        let early = Spawner::reaction_secs(0.0, false);
        let late = Spawner::reaction_secs(40.0, false);
        let post = Spawner::reaction_secs(40.0, true);
        assert!(late < early);
        assert!(post < late);
        assert!(post >= REACTION_SECS_MIN);
    }

    proptest! {
        #[test]
        fn prop_double_lane_leaves_a_lane_clear(seed in 0u64..500, lane_count in 3usize..6) {
            let mut spawner = Spawner::new(seed, lane_count);
            for _ in 0..50 {
                spawner.total_distance = spawner.next_obstacle_distance + 1.0;
                // Max level pushes the double-lane chance to its cap
                let batch = spawner.roll_obstacles(BASE_SPEED, 0.0, 7, true);
                prop_assert!(!batch.is_empty());
                let mut lanes: Vec<usize> = batch.iter().map(|o| o.lane).collect();
                lanes.sort_unstable();
                lanes.dedup();
                prop_assert!(lanes.len() < lane_count);
            }
        }
    }
}
