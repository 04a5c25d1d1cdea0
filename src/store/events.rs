use super::{field, open_for_append, read_records, CorruptRecord};
use crate::error::Result;
use crate::music::{Clef, Difficulty};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const EVENT_HEADER: [&str; 12] = [
    "timestamp",
    "type",
    "score",
    "difficulty",
    "clef",
    "correct_answer",
    "user_answer",
    "key_signature",
    "time_signature",
    "session_id",
    "response_time_ms",
    "notes",
];

/// Rows shorter than this are unreadable
pub const MIN_EVENT_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EventType {
    KeyPractice,
    SightReadingGenerated,
    PdfExport,
    /// Written by early builds, excluded from activity counts
    SessionStart,
    /// Anything a newer build might log
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::KeyPractice => "key_practice",
            EventType::SightReadingGenerated => "sight_reading_generated",
            EventType::PdfExport => "pdf_export",
            EventType::SessionStart => "session_start",
            EventType::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "key_practice" => EventType::KeyPractice,
            "sight_reading_generated" => EventType::SightReadingGenerated,
            "pdf_export" => EventType::PdfExport,
            "session_start" => EventType::SessionStart,
            _ => EventType::Other(s),
        }
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeEvent {
    pub timestamp: String,
    pub event_type: EventType,
    /// 1 correct, 0 incorrect, None when ungraded or unreadable
    pub score: Option<u8>,
    pub difficulty: Option<Difficulty>,
    pub clef: Option<Clef>,
    pub correct_answer: String,
    pub user_answer: String,
    pub key_signature: String,
    pub time_signature: String,
    pub session_id: String,
    /// Defaults to 0 for rows that predate the column; None when the text is not a number
    pub response_time_ms: Option<u64>,
    pub notes: String,
}

impl PracticeEvent {
    /// Blank event of `event_type` stamped with the current local time
    pub fn now(event_type: EventType) -> Self {
        Self {
            timestamp: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            event_type,
            score: None,
            difficulty: None,
            clef: None,
            correct_answer: String::new(),
            user_answer: String::new(),
            key_signature: String::new(),
            time_signature: String::new(),
            session_id: String::new(),
            response_time_ms: Some(0),
            notes: String::new(),
        }
    }

    pub fn is_correct(&self) -> bool {
        self.score == Some(1)
    }

    /// `YYYY-MM-DD` prefix of the timestamp
    pub fn date(&self) -> &str {
        self.timestamp.get(..10).unwrap_or(&self.timestamp)
    }

    fn to_record(&self) -> [String; 12] {
        [
            self.timestamp.clone(),
            self.event_type.to_string(),
            self.score.map(|s| s.to_string()).unwrap_or_default(),
            self.difficulty.map(|d| d.to_string()).unwrap_or_default(),
            self.clef.map(|c| c.to_string()).unwrap_or_default(),
            self.correct_answer.clone(),
            self.user_answer.clone(),
            self.key_signature.clone(),
            self.time_signature.clone(),
            self.session_id.clone(),
            self.response_time_ms.unwrap_or(0).to_string(),
            self.notes.clone(),
        ]
    }

    /// Positional decode. Missing trailing columns take their defaults and
    /// extra trailing columns are ignored.
    fn from_record(
        line: Option<u64>,
        record: &csv::StringRecord,
    ) -> std::result::Result<Self, CorruptRecord> {
        if record.len() < MIN_EVENT_FIELDS {
            return Err(CorruptRecord {
                line,
                reason: format!(
                    "{} fields, need at least {}",
                    record.len(),
                    MIN_EVENT_FIELDS
                ),
            });
        }

        let response_time_ms = match record.get(10) {
            None => Some(0),
            Some(raw) => parse_response_time(raw),
        };

        Ok(Self {
            timestamp: field(record, 0),
            event_type: EventType::from(field(record, 1)),
            score: parse_score(record.get(2).unwrap_or_default()),
            difficulty: record.get(3).and_then(|s| s.parse().ok()),
            clef: record.get(4).and_then(|s| s.parse().ok()),
            correct_answer: field(record, 5),
            user_answer: field(record, 6),
            key_signature: field(record, 7),
            time_signature: field(record, 8),
            session_id: field(record, 9),
            response_time_ms,
            notes: field(record, 11),
        })
    }
}

/// Accepts "1", "0", "1.0"; anything else is ungraded
fn parse_score(raw: &str) -> Option<u8> {
    let value: f64 = raw.trim().parse().ok()?;
    if value == 1.0 {
        Some(1)
    } else if value == 0.0 {
        Some(0)
    } else {
        None
    }
}

/// Non-negative decimal milliseconds, rounded to a whole number
fn parse_response_time(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    Some(value.round() as u64)
}

/// The durable practice log
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, event: &PracticeEvent) -> Result<()> {
        let file = open_for_append(&self.path, &EVENT_HEADER)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(event.to_record())?;
        writer.flush()?;
        tracing::debug!(event_type = %event.event_type, session_id = %event.session_id, "event appended");
        Ok(())
    }

    /// Best-effort reconstruction of every readable row, in append order
    pub fn read_all(&self) -> Result<Vec<PracticeEvent>> {
        let events = read_records(&self.path)?
            .into_iter()
            .filter_map(|(line, record)| match PracticeEvent::from_record(line, &record) {
                Ok(event) => Some(event),
                Err(corrupt) => {
                    tracing::warn!(?corrupt, "skipping short event row");
                    None
                }
            })
            .collect();
        Ok(events)
    }
}
