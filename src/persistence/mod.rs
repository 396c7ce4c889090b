//! Best-score persistence
//!
//! A single integer survives between sessions. On the web it lives in
//! LocalStorage; elsewhere it is kept in memory. Failures never reach the
//! player: a broken store reads as "no best score yet".

use crate::ports::ScoreStore;

/// LocalStorage key (used only in wasm32)
#[allow(dead_code)]
const STORAGE_KEY: &str = "chain_pop_best_score";

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreStore {
    best: Option<u32>,
    saves: u32,
}

impl MemoryScoreStore {
    pub fn with_best(best: u32) -> Self {
        Self {
            best: Some(best),
            saves: 0,
        }
    }

    /// Number of writes so far
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_best_score(&self) -> Option<u32> {
        self.best
    }

    fn save_best_score(&mut self, score: u32) {
        self.best = Some(score);
        self.saves += 1;
    }
}

/// Parse a stored value, ignoring anything that is not a score
pub fn parse_best_score(raw: &str) -> Option<u32> {
    serde_json::from_str::<u32>(raw.trim()).ok()
}

/// Best score in browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageScoreStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageScoreStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl ScoreStore for LocalStorageScoreStore {
    fn load_best_score(&self) -> Option<u32> {
        let Some(storage) = Self::storage() else {
            log::warn!("LocalStorage unavailable, no best score");
            return None;
        };
        match storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => {
                let best = parse_best_score(&raw);
                if best.is_none() {
                    log::warn!("Ignoring unreadable best score {:?}", raw);
                }
                best
            }
            Ok(None) => {
                log::info!("No best score found, starting fresh");
                None
            }
            Err(_) => {
                log::warn!("Failed to read best score");
                None
            }
        }
    }

    fn save_best_score(&mut self, score: u32) {
        let Some(storage) = Self::storage() else {
            return;
        };
        match serde_json::to_string(&score) {
            Ok(json) => {
                if storage.set_item(STORAGE_KEY, &json).is_err() {
                    log::warn!("Failed to save best score");
                }
            }
            Err(e) => log::warn!("Failed to encode best score: {}", e),
        }
    }
}
