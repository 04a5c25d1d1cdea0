use crate::store::SessionSummary;
use serde::{Deserialize, Serialize};

/// One point on the progress chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPoint {
    /// 1-based position in the session list
    pub index: usize,
    pub accuracy: f64,
    pub response_time_ms: f64,
    pub date: String,
}

impl From<(usize, &SessionSummary)> for GraphPoint {
    fn from((index, summary): (usize, &SessionSummary)) -> Self {
        Self {
            index,
            accuracy: summary.accuracy,
            response_time_ms: summary.avg_response_time_ms as f64,
            date: summary.date().to_string(),
        }
    }
}

/// Chart series in list order
pub fn graph_series(sessions: &[SessionSummary]) -> Vec<GraphPoint> {
    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| GraphPoint::from((i + 1, s)))
        .collect()
}
