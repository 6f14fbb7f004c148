// Application state for HTTP handlers
use crate::application::chart_renderer::ChartRenderer;
use crate::presentation::board::SlotBoard;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub board: Arc<SlotBoard>,
    pub charts: Arc<ChartRenderer>,
}
