//! # Sunup Store
//!
//! Per-chat state persistence. The chat map lives in memory and is
//! mirrored to a JSON file on every change — human-readable and cheap to
//! inspect. Pending notification tasks are deliberately NOT stored here:
//! they are ephemeral by design and rebuilt by the daily sweep.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use sunup_core::{ChatId, ChatStateStore, Coordinates, Result, Step, SunupError, UserState};

const STATE_FILE: &str = "states.json";

/// JSON-file backed chat state store.
pub struct FileStateStore {
    path: PathBuf,
    states: RwLock<HashMap<ChatId, UserState>>,
}

impl FileStateStore {
    /// Open (or create) a store in the given directory.
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        let path = dir.join(STATE_FILE);
        let states = Self::load(&path);
        Self {
            path,
            states: RwLock::new(states),
        }
    }

    /// Default store directory (~/.sunup).
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sunup")
    }

    fn load(path: &Path) -> HashMap<ChatId, UserState> {
        if !path.exists() {
            return HashMap::new();
        }
        match std::fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!("⚠️ Failed to parse {STATE_FILE}: {e}");
                HashMap::new()
            }),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {STATE_FILE}: {e}");
                HashMap::new()
            }
        }
    }

    fn save(&self, states: &HashMap<ChatId, UserState>) {
        let json = match serde_json::to_string_pretty(states) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("⚠️ Failed to serialize chat states: {e}");
                return;
            }
        };
        match std::fs::write(&self.path, json) {
            Ok(()) => {
                tracing::debug!("💾 Saved {} chat state(s) to {}", states.len(), self.path.display());
            }
            Err(e) => tracing::warn!("⚠️ Failed to save chat states: {e}"),
        }
    }

    pub fn chat_count(&self) -> usize {
        self.states.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl ChatStateStore for FileStateStore {
    fn eligible_chats(&self) -> Vec<(ChatId, Coordinates)> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states
            .iter()
            .filter(|(_, state)| state.step.is_eligible())
            .map(|(chat_id, state)| (*chat_id, state.coordinates))
            .collect()
    }

    fn state(&self, chat_id: ChatId) -> Option<UserState> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states.get(&chat_id).cloned()
    }

    fn coordinates(&self, chat_id: ChatId) -> Result<Coordinates> {
        self.state(chat_id)
            .map(|state| state.coordinates)
            .ok_or(SunupError::ChatNotFound(chat_id))
    }

    fn set_state(&self, chat_id: ChatId, state: UserState) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.insert(chat_id, state);
        self.save(&states);
    }

    fn set_step(&self, chat_id: ChatId, step: Step) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = states.get_mut(&chat_id) {
            state.step = step;
            self.save(&states);
        }
    }
}

/// In-memory store, for tests and embedders that bring their own
/// persistence.
#[derive(Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<ChatId, UserState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chats(chats: impl IntoIterator<Item = (ChatId, UserState)>) -> Self {
        Self {
            states: RwLock::new(chats.into_iter().collect()),
        }
    }
}

impl ChatStateStore for MemoryStateStore {
    fn eligible_chats(&self) -> Vec<(ChatId, Coordinates)> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        let mut chats: Vec<_> = states
            .iter()
            .filter(|(_, state)| state.step.is_eligible())
            .map(|(chat_id, state)| (*chat_id, state.coordinates))
            .collect();
        chats.sort_by_key(|(chat_id, _)| *chat_id);
        chats
    }

    fn state(&self, chat_id: ChatId) -> Option<UserState> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        states.get(&chat_id).cloned()
    }

    fn coordinates(&self, chat_id: ChatId) -> Result<Coordinates> {
        self.state(chat_id)
            .map(|state| state.coordinates)
            .ok_or(SunupError::ChatNotFound(chat_id))
    }

    fn set_state(&self, chat_id: ChatId, state: UserState) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.insert(chat_id, state);
    }

    fn set_step(&self, chat_id: ChatId, step: Step) {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = states.get_mut(&chat_id) {
            state.step = step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(lat: f64, lon: f64) -> UserState {
        UserState::new(Coordinates::new(lat, lon), Step::Running)
    }

    #[test]
    fn test_eligibility_filter() {
        let store = MemoryStateStore::with_chats([
            (1, running(45.07, 7.68)),
            (2, UserState::new(Coordinates::new(0.0, 0.0), Step::Stopped)),
            (3, running(59.33, 18.07)),
            (4, UserState::new(Coordinates::new(0.0, 0.0), Step::Expired)),
        ]);

        let eligible = store.eligible_chats();
        assert_eq!(eligible.len(), 2);
        assert_eq!(eligible[0].0, 1);
        assert_eq!(eligible[1].0, 3);
    }

    #[test]
    fn test_unknown_chat() {
        let store = MemoryStateStore::new();
        assert!(matches!(
            store.coordinates(99),
            Err(SunupError::ChatNotFound(99))
        ));
    }

    #[test]
    fn test_set_step() {
        let store = MemoryStateStore::with_chats([(1, running(45.07, 7.68))]);
        store.set_step(1, Step::Expired);
        assert_eq!(store.state(1).unwrap().step, Step::Expired);
        assert!(store.eligible_chats().is_empty());

        // Unknown chat: no-op.
        store.set_step(2, Step::Running);
        assert!(store.state(2).is_none());
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join("sunup-test-store");
        std::fs::remove_dir_all(&dir).ok();

        let store = FileStateStore::new(&dir);
        store.set_state(42, running(45.07, 7.68));
        store.set_state(43, UserState::new(Coordinates::new(1.0, 2.0), Step::Stopped));

        let reloaded = FileStateStore::new(&dir);
        assert_eq!(reloaded.chat_count(), 2);
        assert_eq!(reloaded.state(42), store.state(42));
        assert_eq!(reloaded.eligible_chats().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
