// Chart renderer - Rebuilds the chart set from pool history
use crate::domain::chart::{epoch_label, ChartData, ChartKind};
use crate::domain::pool::PoolHistory;
use std::sync::Mutex;

const LOVELACE_PER_M_ADA: f64 = 1e12;

/// Owns the three chart handles. Every render call replaces the previous
/// chart set wholesale, so nothing accumulates across refresh cycles.
pub struct ChartRenderer {
    charts: Mutex<Vec<ChartData>>,
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self {
            charts: Mutex::new(Vec::new()),
        }
    }

    /// Rebuild all charts from `history` (oldest first). Histories of
    /// length 0 or 1 produce valid, possibly empty charts.
    pub fn render(&self, history: &PoolHistory) {
        let labels: Vec<String> = history
            .snapshots()
            .iter()
            .map(|s| epoch_label(s.epoch_no))
            .collect();

        let stake_values: Vec<f64> = history
            .snapshots()
            .iter()
            .map(|s| round_to(s.active_stake as f64 / LOVELACE_PER_M_ADA, 2))
            .collect();

        let block_values: Vec<f64> = history
            .snapshots()
            .iter()
            .map(|s| s.blocks as f64)
            .collect();

        let ros_values: Vec<f64> = history
            .snapshots()
            .iter()
            .map(|s| round_to(s.ros_pct, 3))
            .collect();

        let next = vec![
            ChartData::new(
                "stake",
                "Active Stake (M ADA)",
                ChartKind::Line,
                labels.clone(),
                stake_values,
            ),
            ChartData::new(
                "blocks",
                "Blocks per Epoch",
                ChartKind::Bar,
                labels.clone(),
                block_values,
            ),
            ChartData::new("ros", "ROS (%)", ChartKind::Line, labels, ros_values),
        ];

        *self.charts.lock().unwrap() = next;
    }

    /// Current chart set, empty before the first render.
    pub fn snapshot(&self) -> Vec<ChartData> {
        self.charts.lock().unwrap().clone()
    }
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
