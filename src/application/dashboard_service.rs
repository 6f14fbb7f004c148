// Polling dashboard service - The fetch, format, commit cycle
use crate::application::chart_renderer::ChartRenderer;
use crate::application::display_surface::DisplaySurface;
use crate::application::pool_repository::{FetchError, PoolRepository};
use crate::domain::board::{slot, SlotUpdate};
use crate::domain::epoch::EpochInfo;
use crate::domain::format::{format_ada, format_date, format_pct};
use crate::domain::pool::{PoolHistory, PoolSummary};
use crate::infrastructure::config::{DashboardConfig, SaturationSource};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Drives the refresh cycle: fetch the three endpoints independently,
/// format the results and commit them to the display surface.
///
/// Every cycle takes a sequence number at start; results are only
/// committed while the cycle is still the most recently started one, so
/// out-of-order network completions can never overwrite fresher data.
pub struct PollingDashboard {
    repository: Arc<dyn PoolRepository>,
    surface: Arc<dyn DisplaySurface>,
    charts: Arc<ChartRenderer>,
    pool_id: String,
    history_limit: usize,
    interval: Duration,
    saturation_source: SaturationSource,
    refresh_seq: AtomicU64,
}

impl PollingDashboard {
    pub fn new(
        repository: Arc<dyn PoolRepository>,
        surface: Arc<dyn DisplaySurface>,
        charts: Arc<ChartRenderer>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            repository,
            surface,
            charts,
            pool_id: config.pool.id.clone(),
            history_limit: config.pool.history_limit,
            interval: Duration::from_secs(config.refresh.interval_secs),
            saturation_source: config.refresh.saturation_source,
            refresh_seq: AtomicU64::new(0),
        }
    }

    /// Run one refresh cycle. Never fails; every fetch error is contained
    /// and reflected in slot/status state.
    pub async fn refresh(&self) {
        let cycle = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;

        let (epoch, history, summary) = futures::join!(
            self.repository.latest_epoch(),
            self.repository.pool_history(&self.pool_id, self.history_limit),
            self.repository.pool_summary(&self.pool_id),
        );

        // A newer cycle started while we were waiting on the network;
        // its results win, ours are discarded.
        if !self.is_current(cycle) {
            tracing::debug!(cycle, "discarding results of superseded refresh cycle");
            return;
        }

        let mut cycle_ok = true;

        match epoch {
            Ok(info) => self.commit_epoch(&info),
            Err(e) => {
                cycle_ok = false;
                self.fail("epoch fetch", slot::EPOCH_SLOTS, &e);
            }
        }

        match history {
            Ok(history) => self.commit_history(&history),
            Err(e) => {
                cycle_ok = false;
                self.fail("pool history fetch", slot::HISTORY_SLOTS, &e);
            }
        }

        match summary {
            Ok(summary) => self.commit_summary(&summary),
            Err(e) => {
                cycle_ok = false;
                self.fail("pool summary fetch", slot::SUMMARY_SLOTS, &e);
            }
        }

        if cycle_ok {
            let message = format!("Live, updated {}", Utc::now().format("%H:%M:%S"));
            self.surface.set_status(&message, false);
        } else {
            self.surface
                .set_status("API unreachable, try again later", true);
        }
    }

    /// Spawn the refresh loop: one cycle immediately, then one per
    /// configured interval. Ticks that fall due while a refresh is still
    /// running are skipped rather than piled up.
    pub fn start(self: Arc<Self>, cancel_token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            tracing::info!(
                interval_secs = self.interval.as_secs(),
                pool_id = %self.pool_id,
                "dashboard refresh loop started"
            );

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => {
                        tracing::info!("dashboard refresh loop shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        self.refresh().await;
                    }
                }
            }
        })
    }

    fn is_current(&self, cycle: u64) -> bool {
        self.refresh_seq.load(Ordering::SeqCst) == cycle
    }

    fn commit_epoch(&self, info: &EpochInfo) {
        let now = Utc::now().timestamp();
        let updates = [
            SlotUpdate::new(slot::EPOCH, info.epoch_no.to_string()),
            SlotUpdate::new(slot::EPOCH_START, format_date(info.start_time)),
            SlotUpdate::new(slot::EPOCH_END, format_date(info.end_time)),
            SlotUpdate::new(
                slot::EPOCH_PROGRESS,
                format!("{:.1}", info.progress_pct(now)),
            ),
        ];
        self.surface.apply_slots(&updates);
    }

    fn commit_history(&self, history: &PoolHistory) {
        let Some(latest) = history.latest() else {
            // The HTTP repository reports empty payloads as errors; guard
            // anyway so an alternative source cannot commit half a cycle.
            self.fail(
                "pool history fetch",
                slot::HISTORY_SLOTS,
                &FetchError::EmptyPayload,
            );
            return;
        };

        let mut updates = vec![
            SlotUpdate::new(slot::STAKE, format!("{} ADA", format_ada(latest.active_stake))),
            SlotUpdate::new(slot::STAKE_EPOCH, format!("Epoch {}", latest.epoch_no)),
            SlotUpdate::new(slot::DELEGATORS, latest.delegators.to_string()),
            SlotUpdate::new(slot::BLOCKS, latest.blocks.to_string()),
            SlotUpdate::new(slot::ROS, format_pct(latest.ros_pct, 3)),
        ];

        if self.saturation_source == SaturationSource::History {
            updates.push(SlotUpdate::new(
                slot::SATURATION,
                format_pct(latest.saturation_pct, 2),
            ));
        }

        if let Some(avg) = history.average_ros() {
            updates.push(SlotUpdate::new(slot::AVG_ROS, format_pct(avg, 3)));
        }

        self.surface.apply_slots(&updates);
        self.charts.render(history);
    }

    fn commit_summary(&self, summary: &PoolSummary) {
        let mut updates = vec![
            SlotUpdate::new(
                slot::POOL_TICKER,
                summary.ticker.clone().unwrap_or_else(|| "-".to_string()),
            ),
            SlotUpdate::new(
                slot::POOL_NAME,
                summary.name.clone().unwrap_or_else(|| "-".to_string()),
            ),
            SlotUpdate::new(
                slot::LIVE_STAKE,
                format!("{} ADA", format_ada(summary.live_stake)),
            ),
            SlotUpdate::new(slot::LIVE_DELEGATORS, summary.live_delegators.to_string()),
        ];

        if self.saturation_source == SaturationSource::Summary {
            updates.push(SlotUpdate::new(
                slot::SATURATION,
                format_pct(summary.live_saturation_pct, 2),
            ));
        }

        self.surface.apply_slots(&updates);
    }

    fn fail(&self, what: &str, keys: &[&str], error: &FetchError) {
        tracing::warn!(error = %error, "{what} failed");
        self.surface.mark_error(keys);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{MetricSlot, SlotStatus};
    use crate::domain::pool::PoolSnapshot;
    use crate::infrastructure::config::{ApiSettings, PoolSettings, RefreshSettings};
    use crate::presentation::board::SlotBoard;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    fn test_config(saturation_source: SaturationSource) -> DashboardConfig {
        DashboardConfig {
            api: ApiSettings {
                base_url: "http://localhost".to_string(),
                timeout_secs: 5,
            },
            pool: PoolSettings {
                id: "pool1test".to_string(),
                history_limit: 10,
            },
            refresh: RefreshSettings {
                interval_secs: 3600,
                saturation_source,
            },
        }
    }

    fn sample_snapshot(epoch_no: u64) -> PoolSnapshot {
        PoolSnapshot {
            epoch_no,
            active_stake: 15_000_000_000_000,
            delegators: 42,
            blocks: 3,
            saturation_pct: 2.13,
            ros_pct: 3.123,
        }
    }

    fn sample_summary() -> PoolSummary {
        PoolSummary {
            pool_id: "pool1test".to_string(),
            ticker: Some("TAPSY".to_string()),
            name: Some("TapTap Vienna".to_string()),
            live_stake: 15_500_000_000_000,
            live_delegators: 44,
            live_saturation_pct: 2.25,
        }
    }

    struct StubRepo {
        fail_history: AtomicBool,
    }

    impl StubRepo {
        fn new() -> Self {
            Self {
                fail_history: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl PoolRepository for StubRepo {
        async fn latest_epoch(&self) -> Result<EpochInfo, FetchError> {
            Ok(EpochInfo::new(523, 1000, 2000))
        }

        async fn pool_history(
            &self,
            _pool_id: &str,
            limit: usize,
        ) -> Result<PoolHistory, FetchError> {
            if self.fail_history.load(Ordering::SeqCst) {
                return Err(FetchError::Network("connection reset".to_string()));
            }
            Ok(PoolHistory::from_fetched(vec![sample_snapshot(523)], limit))
        }

        async fn pool_summary(&self, _pool_id: &str) -> Result<PoolSummary, FetchError> {
            Ok(sample_summary())
        }
    }

    /// First history fetch blocks until released, so two cycles can be
    /// forced to complete out of order.
    struct RacingRepo {
        release_first: Notify,
        history_calls: AtomicU64,
    }

    impl RacingRepo {
        fn new() -> Self {
            Self {
                release_first: Notify::new(),
                history_calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl PoolRepository for RacingRepo {
        async fn latest_epoch(&self) -> Result<EpochInfo, FetchError> {
            Ok(EpochInfo::new(523, 1000, 2000))
        }

        async fn pool_history(
            &self,
            _pool_id: &str,
            limit: usize,
        ) -> Result<PoolHistory, FetchError> {
            let call = self.history_calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.release_first.notified().await;
                Ok(PoolHistory::from_fetched(vec![sample_snapshot(100)], limit))
            } else {
                Ok(PoolHistory::from_fetched(vec![sample_snapshot(200)], limit))
            }
        }

        async fn pool_summary(&self, _pool_id: &str) -> Result<PoolSummary, FetchError> {
            Ok(sample_summary())
        }
    }

    fn build(
        repo: Arc<dyn PoolRepository>,
        source: SaturationSource,
    ) -> (Arc<PollingDashboard>, Arc<SlotBoard>, Arc<ChartRenderer>) {
        let board = Arc::new(SlotBoard::new());
        let charts = Arc::new(ChartRenderer::new());
        let dashboard = Arc::new(PollingDashboard::new(
            repo,
            board.clone(),
            charts.clone(),
            &test_config(source),
        ));
        (dashboard, board, charts)
    }

    fn value_of(board: &SlotBoard, key: &str) -> MetricSlot {
        board.get(key).expect("slot should exist")
    }

    #[tokio::test]
    async fn test_refresh_commits_formatted_slots() {
        let (dashboard, board, charts) =
            build(Arc::new(StubRepo::new()), SaturationSource::History);

        dashboard.refresh().await;

        assert_eq!(value_of(&board, slot::EPOCH).value, "523");
        assert_eq!(value_of(&board, slot::EPOCH).status, SlotStatus::Loaded);
        assert_eq!(value_of(&board, slot::STAKE).value, "15.00M ADA");
        assert_eq!(value_of(&board, slot::STAKE_EPOCH).value, "Epoch 523");
        assert_eq!(value_of(&board, slot::DELEGATORS).value, "42");
        assert_eq!(value_of(&board, slot::BLOCKS).value, "3");
        assert_eq!(value_of(&board, slot::SATURATION).value, "2.13%");
        assert_eq!(value_of(&board, slot::ROS).value, "3.123%");
        assert_eq!(value_of(&board, slot::AVG_ROS).value, "3.123%");
        assert_eq!(value_of(&board, slot::POOL_TICKER).value, "TAPSY");
        assert_eq!(value_of(&board, slot::LIVE_STAKE).value, "15.50M ADA");

        let banner = board.status();
        assert!(!banner.is_error);
        assert!(banner.message.starts_with("Live, updated"));
        assert!(banner.updated_at.is_some());

        assert_eq!(charts.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_saturation_from_summary_when_configured() {
        let (dashboard, board, _charts) =
            build(Arc::new(StubRepo::new()), SaturationSource::Summary);

        dashboard.refresh().await;

        assert_eq!(value_of(&board, slot::SATURATION).value, "2.25%");
    }

    #[tokio::test]
    async fn test_failed_history_keeps_prior_values() {
        let repo = Arc::new(StubRepo::new());
        let (dashboard, board, _charts) = build(repo.clone(), SaturationSource::History);

        dashboard.refresh().await;
        assert_eq!(value_of(&board, slot::STAKE).value, "15.00M ADA");

        repo.fail_history.store(true, Ordering::SeqCst);
        dashboard.refresh().await;

        let stake = value_of(&board, slot::STAKE);
        assert_eq!(stake.value, "15.00M ADA");
        assert_eq!(stake.status, SlotStatus::Error);

        // The independent epoch fetch still succeeded
        assert_eq!(value_of(&board, slot::EPOCH).status, SlotStatus::Loaded);

        let banner = board.status();
        assert!(banner.is_error);
        assert_eq!(banner.message, "API unreachable, try again later");
    }

    #[tokio::test]
    async fn test_failed_history_before_first_success_keeps_placeholder() {
        let repo = Arc::new(StubRepo::new());
        repo.fail_history.store(true, Ordering::SeqCst);
        let (dashboard, board, charts) = build(repo, SaturationSource::History);

        dashboard.refresh().await;

        let stake = value_of(&board, slot::STAKE);
        assert_eq!(stake.value, "-");
        assert_eq!(stake.status, SlotStatus::Error);
        assert!(charts.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_freshest_cycle_wins_over_stale_response() {
        let repo = Arc::new(RacingRepo::new());
        let (dashboard, board, charts) = build(repo.clone(), SaturationSource::History);

        // Cycle A starts first and stalls inside its history fetch.
        let slow = tokio::spawn({
            let dashboard = dashboard.clone();
            async move { dashboard.refresh().await }
        });
        tokio::task::yield_now().await;

        // Cycle B starts later but completes first.
        dashboard.refresh().await;
        assert_eq!(value_of(&board, slot::STAKE_EPOCH).value, "Epoch 200");

        // A's response finally arrives; it must be discarded.
        repo.release_first.notify_one();
        slow.await.unwrap();

        assert_eq!(value_of(&board, slot::STAKE_EPOCH).value, "Epoch 200");
        assert_eq!(charts.snapshot()[0].labels, vec!["E200".to_string()]);
    }

    #[tokio::test]
    async fn test_start_refreshes_immediately_and_stops_on_cancel() {
        let (dashboard, board, _charts) =
            build(Arc::new(StubRepo::new()), SaturationSource::History);

        let cancel_token = CancellationToken::new();
        let handle = dashboard.start(cancel_token.clone());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(value_of(&board, slot::EPOCH).value, "523");

        cancel_token.cancel();
        handle.await.unwrap();
    }
}
