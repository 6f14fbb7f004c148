// HTTP request handlers
use crate::domain::board::{MetricSlot, StatusBanner};
use crate::domain::chart::ChartData;
use crate::presentation::app_state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub slots: BTreeMap<String, MetricSlot>,
    pub status: StatusBanner,
    pub charts: Vec<ChartData>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard snapshot: slots, status indicator and chart set
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let (slots, status) = state.board.snapshot();

    Json(DashboardView {
        slots,
        status,
        charts: state.charts.snapshot(),
    })
}
