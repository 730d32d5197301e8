//! Persistent lifetime stats ledger
//!
//! A flat snapshot persisted to LocalStorage on the web, zeroed defaults
//! elsewhere. Mutated only at session end (fold) or on explicit user reset.
//! Load/parse failures fall back silently to defaults.

use serde::{Deserialize, Serialize};

use crate::sim::ObjectKind;

/// Lifetime stats across all sessions
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PersistentStats {
    pub total_score: u64,
    pub highest_level_reached: u32,
    pub total_vaccines_collected: u64,
    pub total_play_time_seconds: u64,
    /// Obstacle kinds the player has encountered (gates tutorial hints)
    #[serde(default)]
    pub seen_obstacles: Vec<ObjectKind>,
}

impl PersistentStats {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "vax_runner_stats";

    /// Fold one finished session into the ledger
    pub fn fold_session(&mut self, score: u64, level: u32, vaccines: u32, play_secs: u64) {
        self.total_score += score;
        self.highest_level_reached = self.highest_level_reached.max(level);
        self.total_vaccines_collected += vaccines as u64;
        self.total_play_time_seconds += play_secs;
    }

    /// Record an obstacle kind as seen; true only on the first encounter
    pub fn mark_seen(&mut self, kind: ObjectKind) -> bool {
        if self.seen_obstacles.contains(&kind) {
            return false;
        }
        self.seen_obstacles.push(kind);
        true
    }

    /// Zero everything (explicit, irreversible user action)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Load from LocalStorage (WASM only); any failure yields defaults
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match serde_json::from_str::<PersistentStats>(&json) {
                    Ok(stats) => {
                        log::info!(
                            "loaded stats: {} lifetime score, {} vaccines",
                            stats.total_score,
                            stats.total_vaccines_collected
                        );
                        return stats;
                    }
                    Err(e) => log::warn!("stats snapshot unreadable, starting fresh: {e}"),
                }
            }
        }

        Self::default()
    }

    /// Save to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::debug!("stats saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No durable storage off the web
    }
}
