//! Accuracy and timing rollups rebuilt from the event log on demand.
//!
//! Nothing here fails: an empty or fully corrupt log yields zeroed output.

use crate::music::Clef;
use crate::store::{EventType, PracticeEvent, SessionSummary};
use crate::util::{mean_ms, percentage, round_to};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Recent activity shown on the dashboard
pub const RECENT_EVENTS: usize = 10;

/// Live groups smaller than this are treated as abandoned
pub const MIN_LIVE_SESSION_EVENTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEvent {
    pub timestamp: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub score: String,
    pub difficulty: String,
    pub clef: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub response_time_ms: Option<u64>,
    pub notes: String,
}

impl From<&PracticeEvent> for RecentEvent {
    fn from(event: &PracticeEvent) -> Self {
        Self {
            timestamp: event.timestamp.clone(),
            event_type: event.event_type.to_string(),
            score: event.score.map(|s| s.to_string()).unwrap_or_default(),
            difficulty: event.difficulty.map(|d| d.to_string()).unwrap_or_default(),
            clef: event.clef.map(|c| c.to_string()).unwrap_or_default(),
            correct_answer: event.correct_answer.clone(),
            user_answer: event.user_answer.clone(),
            response_time_ms: event.response_time_ms,
            notes: event.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_sessions: usize,
    pub key_practice_accuracy: f64,
    pub treble_accuracy: f64,
    pub bass_accuracy: f64,
    #[serde(rename = "avg_response_time")]
    pub avg_response_time_ms: u64,
    pub sight_reading_generated: usize,
    pub pdfs_exported: usize,
    pub current_session_id: Option<String>,
    pub current_session_progress: u32,
    pub recent_sessions: Vec<RecentEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub total_sessions: usize,
    pub total_questions: usize,
    pub accuracy: f64,
    #[serde(rename = "avg_response_time")]
    pub avg_response_time_ms: u64,
    pub practice_time_minutes: f64,
}

fn accuracy_of<'a>(events: impl IntoIterator<Item = &'a PracticeEvent>) -> f64 {
    let (correct, total) = events
        .into_iter()
        .fold((0, 0), |(c, t), e| (c + e.is_correct() as usize, t + 1));
    percentage(correct, total)
}

fn valid_times<'a>(events: impl IntoIterator<Item = &'a PracticeEvent>) -> Vec<u64> {
    events
        .into_iter()
        .filter_map(|e| e.response_time_ms)
        .collect()
}

fn key_practice(events: &[PracticeEvent]) -> Vec<&PracticeEvent> {
    events
        .iter()
        .filter(|e| e.event_type == EventType::KeyPractice)
        .collect()
}

/// Dashboard rollup. The current-session fields are left for the caller,
/// who knows which token is asking.
pub fn compute_stats(events: &[PracticeEvent]) -> StatsSummary {
    let key_events = key_practice(events);
    let clef_accuracy = |clef: Clef| {
        accuracy_of(
            key_events
                .iter()
                .copied()
                .filter(|e| e.clef == Some(clef)),
        )
    };

    let active: Vec<&PracticeEvent> = events
        .iter()
        .filter(|e| e.event_type != EventType::SessionStart)
        .collect();
    let recent_start = active.len().saturating_sub(RECENT_EVENTS);

    StatsSummary {
        total_sessions: active.len(),
        key_practice_accuracy: accuracy_of(key_events.iter().copied()),
        treble_accuracy: clef_accuracy(Clef::Treble),
        bass_accuracy: clef_accuracy(Clef::Bass),
        avg_response_time_ms: mean_ms(&valid_times(key_events.iter().copied())),
        sight_reading_generated: events
            .iter()
            .filter(|e| e.event_type == EventType::SightReadingGenerated)
            .count(),
        pdfs_exported: events
            .iter()
            .filter(|e| e.event_type == EventType::PdfExport)
            .count(),
        current_session_id: None,
        current_session_progress: 0,
        recent_sessions: active[recent_start..]
            .iter()
            .map(|e| RecentEvent::from(*e))
            .collect(),
    }
}

/// Rebuild session summaries from key_practice events grouped by session id.
///
/// Groups keep first-appearance order; start and end come from the first and
/// last event as logged, not sorted by timestamp.
pub fn compute_session_list(events: &[PracticeEvent]) -> Vec<SessionSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&PracticeEvent>> = HashMap::new();
    for event in key_practice(events) {
        groups
            .entry(event.session_id.as_str())
            .or_insert_with(|| {
                order.push(event.session_id.as_str());
                Vec::new()
            })
            .push(event);
    }

    order
        .into_iter()
        .filter_map(|sid| {
            let questions = groups.remove(sid)?;
            if questions.len() < MIN_LIVE_SESSION_EVENTS {
                return None;
            }
            let first = questions.first()?;
            let last = questions.last()?;
            let correct = questions.iter().filter(|q| q.is_correct()).count();
            Some(SessionSummary {
                session_id: sid.to_string(),
                start_time: first.timestamp.clone(),
                end_time: last.timestamp.clone(),
                session_type: EventType::KeyPractice.to_string(),
                total_questions: questions.len() as u32,
                correct_answers: correct as u32,
                accuracy: percentage(correct, questions.len()),
                avg_response_time_ms: mean_ms(&valid_times(questions.iter().copied())),
                difficulty: "mixed".to_string(),
                clef: "mixed".to_string(),
            })
        })
        .collect()
}

/// Persisted summaries followed by live reconstructions.
///
/// No deduplication: a session that was persisted and is still present in the
/// event log appears twice.
pub fn combined_sessions(
    persisted: Vec<SessionSummary>,
    events: &[PracticeEvent],
) -> Vec<SessionSummary> {
    let mut sessions = persisted;
    sessions.extend(compute_session_list(events));
    sessions
}

/// Per-day rollup of key practice, oldest first
pub fn compute_daily_stats(events: &[PracticeEvent]) -> Vec<DailyStats> {
    key_practice(events)
        .into_iter()
        .into_group_map_by(|e| e.date().to_string())
        .into_iter()
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .map(|(date, day)| {
            let times = valid_times(day.iter().copied());
            let sessions: HashSet<&str> = day.iter().map(|e| e.session_id.as_str()).collect();
            DailyStats {
                date,
                total_sessions: sessions.len(),
                total_questions: day.len(),
                accuracy: accuracy_of(day.iter().copied()),
                avg_response_time_ms: mean_ms(&times),
                practice_time_minutes: round_to(
                    times.iter().sum::<u64>() as f64 / 60_000.0,
                    1,
                ),
            }
        })
        .collect()
}
