// In-memory slot board - DisplaySurface implementation
use crate::application::display_surface::DisplaySurface;
use crate::domain::board::{slot, MetricSlot, SlotStatus, SlotUpdate, StatusBanner};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

/// Holds the current display state of every metric slot plus the global
/// status indicator. All mutation goes through the DisplaySurface port,
/// under one lock, so readers always see a consistent cycle.
pub struct SlotBoard {
    inner: Mutex<BoardState>,
}

struct BoardState {
    slots: HashMap<&'static str, MetricSlot>,
    status: StatusBanner,
}

impl SlotBoard {
    pub fn new() -> Self {
        let slots = slot::ALL
            .iter()
            .map(|key| (*key, MetricSlot::pending()))
            .collect();

        Self {
            inner: Mutex::new(BoardState {
                slots,
                status: StatusBanner::default(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<MetricSlot> {
        self.inner.lock().unwrap().slots.get(key).cloned()
    }

    pub fn status(&self) -> StatusBanner {
        self.inner.lock().unwrap().status.clone()
    }

    /// Consistent copy of all slots plus the status banner.
    pub fn snapshot(&self) -> (BTreeMap<String, MetricSlot>, StatusBanner) {
        let state = self.inner.lock().unwrap();
        let slots = state
            .slots
            .iter()
            .map(|(key, slot)| (key.to_string(), slot.clone()))
            .collect();
        (slots, state.status.clone())
    }
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySurface for SlotBoard {
    fn apply_slots(&self, updates: &[SlotUpdate]) {
        let mut state = self.inner.lock().unwrap();
        for update in updates {
            state.slots.insert(
                update.key,
                MetricSlot {
                    value: update.value.clone(),
                    status: SlotStatus::Loaded,
                },
            );
        }
    }

    fn mark_error(&self, keys: &[&str]) {
        let mut state = self.inner.lock().unwrap();
        for &key in keys {
            if let Some(slot) = state.slots.get_mut(key) {
                slot.status = SlotStatus::Error;
            }
        }
    }

    fn set_status(&self, message: &str, is_error: bool) {
        let mut state = self.inner.lock().unwrap();
        state.status = StatusBanner {
            message: message.to_string(),
            is_error,
            updated_at: Some(Utc::now()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_starts_with_pending_placeholders() {
        let board = SlotBoard::new();
        let stake = board.get(slot::STAKE).unwrap();
        assert_eq!(stake.value, "-");
        assert_eq!(stake.status, SlotStatus::Pending);
        assert!(!board.status().is_error);
    }

    #[test]
    fn test_apply_slots_loads_values() {
        let board = SlotBoard::new();
        board.apply_slots(&[SlotUpdate::new(slot::STAKE, "15.0K ADA")]);

        let stake = board.get(slot::STAKE).unwrap();
        assert_eq!(stake.value, "15.0K ADA");
        assert_eq!(stake.status, SlotStatus::Loaded);
    }

    #[test]
    fn test_mark_error_keeps_last_value() {
        let board = SlotBoard::new();
        board.apply_slots(&[SlotUpdate::new(slot::STAKE, "15.0K ADA")]);
        board.mark_error(slot::HISTORY_SLOTS);

        let stake = board.get(slot::STAKE).unwrap();
        assert_eq!(stake.value, "15.0K ADA");
        assert_eq!(stake.status, SlotStatus::Error);
    }

    #[test]
    fn test_mark_error_ignores_unknown_keys() {
        let board = SlotBoard::new();
        board.mark_error(&["no_such_slot"]);
        assert!(board.get("no_such_slot").is_none());
    }

    #[test]
    fn test_snapshot_contains_every_slot() {
        let board = SlotBoard::new();
        let (slots, _status) = board.snapshot();
        assert_eq!(slots.len(), slot::ALL.len());
    }
}
