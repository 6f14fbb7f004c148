// Koios-style HTTP API repository implementation
use crate::application::pool_repository::{FetchError, PoolRepository};
use crate::domain::epoch::EpochInfo;
use crate::domain::pool::{PoolHistory, PoolSnapshot, PoolSummary};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct KoiosRepository {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EpochInfoRow {
    epoch_no: u64,
    start_time: i64,
    end_time: i64,
}

// The API serves big numbers as strings and omits percentages for old
// epochs, hence the flexible field deserializers.
#[derive(Debug, Deserialize)]
struct PoolHistoryRow {
    epoch_no: u64,
    #[serde(deserialize_with = "u64_flex")]
    active_stake: u64,
    delegator_cnt: u64,
    block_cnt: u64,
    #[serde(default, deserialize_with = "f64_flex_opt")]
    saturation_pct: Option<f64>,
    #[serde(default, deserialize_with = "f64_flex_opt")]
    epoch_ros: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PoolInfoRow {
    pool_id_bech32: String,
    #[serde(default)]
    meta_json: Option<PoolMeta>,
    #[serde(deserialize_with = "u64_flex")]
    live_stake: u64,
    live_delegators: u64,
    #[serde(default, deserialize_with = "f64_flex_opt")]
    live_saturation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PoolMeta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    ticker: Option<String>,
}

impl From<PoolHistoryRow> for PoolSnapshot {
    fn from(row: PoolHistoryRow) -> Self {
        Self {
            epoch_no: row.epoch_no,
            active_stake: row.active_stake,
            delegators: row.delegator_cnt,
            blocks: row.block_cnt,
            saturation_pct: row.saturation_pct.unwrap_or(0.0),
            // The API reports ROS as a fraction
            ros_pct: row.epoch_ros.map(|r| r * 100.0).unwrap_or(0.0),
        }
    }
}

impl KoiosRepository {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>, FetchError> {
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_send_error)?;

        decode_rows(response).await
    }

    async fn post_rows<T: DeserializeOwned>(
        &self,
        url: String,
        body: Value,
    ) -> Result<Vec<T>, FetchError> {
        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        decode_rows(response).await
    }
}

#[async_trait]
impl PoolRepository for KoiosRepository {
    async fn latest_epoch(&self) -> Result<EpochInfo, FetchError> {
        let url = format!("{}/epoch_info?limit=1&order=epoch_no.desc", self.base_url);
        let rows: Vec<EpochInfoRow> = self.get_rows(url).await?;
        let row = rows.into_iter().next().ok_or(FetchError::EmptyPayload)?;

        if row.end_time <= row.start_time {
            return Err(FetchError::Parse(format!(
                "epoch {} window end precedes start",
                row.epoch_no
            )));
        }

        Ok(EpochInfo::new(row.epoch_no, row.start_time, row.end_time))
    }

    async fn pool_history(&self, pool_id: &str, limit: usize) -> Result<PoolHistory, FetchError> {
        let url = format!(
            "{}/pool_history?_pool_bech32={}&order=epoch_no.desc&limit={}",
            self.base_url,
            urlencoding::encode(pool_id),
            limit
        );
        let rows: Vec<PoolHistoryRow> = self.get_rows(url).await?;
        let snapshots = rows.into_iter().map(PoolSnapshot::from).collect();

        Ok(PoolHistory::from_fetched(snapshots, limit))
    }

    async fn pool_summary(&self, pool_id: &str) -> Result<PoolSummary, FetchError> {
        let url = format!("{}/pool_info", self.base_url);
        let body = serde_json::json!({ "_pool_bech32_ids": [pool_id] });
        let rows: Vec<PoolInfoRow> = self.post_rows(url, body).await?;
        let row = rows.into_iter().next().ok_or(FetchError::EmptyPayload)?;

        Ok(PoolSummary {
            pool_id: row.pool_id_bech32,
            ticker: row.meta_json.as_ref().and_then(|m| m.ticker.clone()),
            name: row.meta_json.and_then(|m| m.name),
            live_stake: row.live_stake,
            live_delegators: row.live_delegators,
            live_saturation_pct: row.live_saturation.unwrap_or(0.0),
        })
    }
}

async fn decode_rows<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Vec<T>, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::BadStatus(status.as_u16()));
    }

    let rows: Vec<T> = response.json().await.map_err(map_body_error)?;
    if rows.is_empty() {
        return Err(FetchError::EmptyPayload);
    }

    Ok(rows)
}

fn map_send_error(error: reqwest::Error) -> FetchError {
    FetchError::Network(error.to_string())
}

fn map_body_error(error: reqwest::Error) -> FetchError {
    if error.is_decode() {
        FetchError::Parse(error.to_string())
    } else {
        FetchError::Network(error.to_string())
    }
}

fn u64_flex<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("expected unsigned integer")),
        Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}

fn f64_flex_opt<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("number out of range")),
        Value::String(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected number or string, got {other}"
        ))),
    }
}
