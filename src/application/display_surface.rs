// Presentation port for the dashboard surface
use crate::domain::board::SlotUpdate;

/// Capability set the dashboard needs from whatever displays it.
/// Implementations must apply each call atomically so a reader never
/// observes a half-committed fetch.
pub trait DisplaySurface: Send + Sync {
    /// Commit a batch of slot values as one update; statuses become Loaded.
    fn apply_slots(&self, updates: &[SlotUpdate]);

    /// Flip the listed slots to Error, keeping their last good values.
    fn mark_error(&self, keys: &[&str]);

    /// Update the global status indicator.
    fn set_status(&self, message: &str, is_error: bool);
}
