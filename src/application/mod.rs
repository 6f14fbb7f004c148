// Application layer - Use cases and ports
pub mod chart_renderer;
pub mod dashboard_service;
pub mod display_surface;
pub mod pool_repository;
