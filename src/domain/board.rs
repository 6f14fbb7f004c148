// Metric slot model for the dashboard board
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Well-known slot keys. One entry per display target on the dashboard.
pub mod slot {
    pub const EPOCH: &str = "epoch";
    pub const EPOCH_START: &str = "epoch_start";
    pub const EPOCH_END: &str = "epoch_end";
    pub const EPOCH_PROGRESS: &str = "epoch_progress";

    pub const STAKE: &str = "stake";
    pub const STAKE_EPOCH: &str = "stake_epoch";
    pub const DELEGATORS: &str = "delegators";
    pub const BLOCKS: &str = "blocks";
    pub const SATURATION: &str = "saturation";
    pub const ROS: &str = "ros";
    pub const AVG_ROS: &str = "avg_ros";

    pub const POOL_TICKER: &str = "pool_ticker";
    pub const POOL_NAME: &str = "pool_name";
    pub const LIVE_STAKE: &str = "live_stake";
    pub const LIVE_DELEGATORS: &str = "live_delegators";

    /// Slots fed by the epoch fetch.
    pub const EPOCH_SLOTS: &[&str] = &[EPOCH, EPOCH_START, EPOCH_END, EPOCH_PROGRESS];

    /// Slots fed by the pool history fetch.
    pub const HISTORY_SLOTS: &[&str] = &[
        STAKE, STAKE_EPOCH, DELEGATORS, BLOCKS, SATURATION, ROS, AVG_ROS,
    ];

    /// Slots fed by the pool summary fetch.
    pub const SUMMARY_SLOTS: &[&str] = &[POOL_TICKER, POOL_NAME, LIVE_STAKE, LIVE_DELEGATORS];

    pub const ALL: &[&str] = &[
        EPOCH,
        EPOCH_START,
        EPOCH_END,
        EPOCH_PROGRESS,
        STAKE,
        STAKE_EPOCH,
        DELEGATORS,
        BLOCKS,
        SATURATION,
        ROS,
        AVG_ROS,
        POOL_TICKER,
        POOL_NAME,
        LIVE_STAKE,
        LIVE_DELEGATORS,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// Never successfully loaded
    Pending,
    Loaded,
    /// Last fetch failed; value is the last good one
    Error,
}

/// Current display state of one metric slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSlot {
    pub value: String,
    pub status: SlotStatus,
}

impl MetricSlot {
    pub fn pending() -> Self {
        Self {
            value: "-".to_string(),
            status: SlotStatus::Pending,
        }
    }
}

/// One formatted value destined for a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotUpdate {
    pub key: &'static str,
    pub value: String,
}

impl SlotUpdate {
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Global status indicator shown next to the metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBanner {
    pub message: String,
    pub is_error: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self {
            message: "Loading".to_string(),
            is_error: false,
            updated_at: None,
        }
    }
}
