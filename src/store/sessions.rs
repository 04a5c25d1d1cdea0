use super::{field, open_for_append, read_records, CorruptRecord};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SESSION_HEADER: [&str; 10] = [
    "session_id",
    "start_time",
    "end_time",
    "session_type",
    "total_questions",
    "correct_answers",
    "accuracy",
    "avg_response_time",
    "difficulty",
    "clef",
];

/// Everything through `accuracy` must be present
pub const MIN_SESSION_FIELDS: usize = 7;

/// Rollup of one practice session, either persisted at completion or
/// reconstructed from the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: String,
    pub end_time: String,
    pub session_type: String,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Percent, one decimal
    pub accuracy: f64,
    #[serde(rename = "avg_response_time")]
    pub avg_response_time_ms: u64,
    pub difficulty: String,
    pub clef: String,
}

impl SessionSummary {
    /// `YYYY-MM-DD` prefix of the start time, empty when there is none
    pub fn date(&self) -> &str {
        self.start_time.get(..10).unwrap_or(&self.start_time)
    }

    fn to_record(&self) -> [String; 10] {
        [
            self.session_id.clone(),
            self.start_time.clone(),
            self.end_time.clone(),
            self.session_type.clone(),
            self.total_questions.to_string(),
            self.correct_answers.to_string(),
            format!("{:.1}", self.accuracy),
            self.avg_response_time_ms.to_string(),
            self.difficulty.clone(),
            self.clef.clone(),
        ]
    }

    fn from_record(
        line: Option<u64>,
        record: &csv::StringRecord,
    ) -> std::result::Result<Self, CorruptRecord> {
        if record.len() < MIN_SESSION_FIELDS {
            return Err(CorruptRecord {
                line,
                reason: format!(
                    "{} fields, need at least {}",
                    record.len(),
                    MIN_SESSION_FIELDS
                ),
            });
        }

        Ok(Self {
            session_id: field(record, 0),
            start_time: field(record, 1),
            end_time: field(record, 2),
            session_type: field(record, 3),
            total_questions: parse_number(record.get(4)).round() as u32,
            correct_answers: parse_number(record.get(5)).round() as u32,
            accuracy: parse_number(record.get(6)),
            // older rows stored this as a float like "1534.0"
            avg_response_time_ms: parse_number(record.get(7)).round() as u64,
            difficulty: field(record, 8),
            clef: field(record, 9),
        })
    }
}

fn parse_number(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// The durable log of completed sessions
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, summary: &SessionSummary) -> Result<()> {
        let file = open_for_append(&self.path, &SESSION_HEADER)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(summary.to_record())?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<SessionSummary>> {
        let summaries = read_records(&self.path)?
            .into_iter()
            .filter_map(
                |(line, record)| match SessionSummary::from_record(line, &record) {
                    Ok(summary) => Some(summary),
                    Err(corrupt) => {
                        tracing::warn!(?corrupt, "skipping short session row");
                        None
                    }
                },
            )
            .collect();
        Ok(summaries)
    }
}
