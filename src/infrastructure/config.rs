use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub api: ApiSettings,
    pub pool: PoolSettings,
    pub refresh: RefreshSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL of the Koios-style REST API, without trailing slash
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PoolSettings {
    /// Bech32 pool id the dashboard tracks
    pub id: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub saturation_source: SaturationSource,
}

/// Which endpoint feeds the saturation slot.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SaturationSource {
    #[default]
    History,
    Summary,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_history_limit() -> usize {
    10
}

fn default_interval_secs() -> u64 {
    300
}

pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
