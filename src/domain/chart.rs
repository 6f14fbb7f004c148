// Chart domain models
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

/// One rendered chart: categorical x-axis labels plus a single value series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartData {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: ChartKind,
        labels: Vec<String>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            labels,
            values,
        }
    }
}

/// X-axis label for an epoch, e.g. "E523".
pub fn epoch_label(epoch_no: u64) -> String {
    format!("E{epoch_no}")
}
