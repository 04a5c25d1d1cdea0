use crate::error::{PracticeError, Result};
use crate::key_quiz::KeyChallenge;
use crate::melody::Melody;
use crate::store::{SessionLog, SessionSummary};
use crate::util::{mean_ms, percentage};
use chrono::Local;
use std::collections::HashMap;
use std::time::Instant;

/// Graded answers that make up one session
pub const SESSION_LENGTH: u32 = 10;

/// Counters for the streak in progress under one token
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub session_id: String,
    pub start_time: String,
    pub question_count: u32,
    pub correct_count: u32,
    pub response_times_ms: Vec<u64>,
}

impl SessionState {
    fn start() -> Self {
        Self {
            session_id: new_session_id(),
            start_time: timestamp_now(),
            question_count: 0,
            correct_count: 0,
            response_times_ms: Vec::new(),
        }
    }

    fn summarize(&self, end_time: String) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            start_time: self.start_time.clone(),
            end_time,
            session_type: "key_practice".to_string(),
            total_questions: self.question_count,
            correct_answers: self.correct_count,
            accuracy: percentage(self.correct_count as usize, self.question_count as usize),
            avg_response_time_ms: mean_ms(&self.response_times_ms),
            difficulty: "mixed".to_string(),
            clef: "mixed".to_string(),
        }
    }
}

/// Result of feeding one graded answer to the tracker
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerProgress {
    pub session_id: String,
    pub question_count: u32,
    pub session_complete: bool,
    pub summary: Option<SessionSummary>,
}

/// A generated question waiting for its answer or export
#[derive(Debug, Clone, PartialEq)]
pub enum Challenge {
    Key(KeyChallenge),
    Melody(Melody),
}

#[derive(Debug, Clone)]
struct PendingChallenge {
    challenge: Challenge,
    issued_at: Instant,
}

/// Per-token session counters and current challenge.
///
/// A token is Idle until `ensure_session`, Active while it has answered 0..9
/// questions, and drops back to Idle when the tenth answer flushes a summary.
#[derive(Debug)]
pub struct SessionTracker {
    summaries: SessionLog,
    sessions: HashMap<String, SessionState>,
    challenges: HashMap<String, PendingChallenge>,
}

impl SessionTracker {
    pub fn new(summaries: SessionLog) -> Self {
        Self {
            summaries,
            sessions: HashMap::new(),
            challenges: HashMap::new(),
        }
    }

    pub fn summary_log(&self) -> &SessionLog {
        &self.summaries
    }

    /// Start a session for `token` unless one is running; returns its id
    pub fn ensure_session(&mut self, token: &str) -> String {
        self.sessions
            .entry(token.to_string())
            .or_insert_with(|| {
                let state = SessionState::start();
                tracing::info!(token, session_id = %state.session_id, "session started");
                state
            })
            .session_id
            .clone()
    }

    pub fn state(&self, token: &str) -> Option<&SessionState> {
        self.sessions.get(token)
    }

    pub fn current_session_id(&self, token: &str) -> Option<&str> {
        self.sessions.get(token).map(|s| s.session_id.as_str())
    }

    /// Questions answered so far in the running session, 0 when idle
    pub fn progress(&self, token: &str) -> u32 {
        self.sessions
            .get(token)
            .map(|s| s.question_count)
            .unwrap_or(0)
    }

    /// Count one graded answer. The tenth answer writes the summary and
    /// ends the session.
    pub fn record_answer(
        &mut self,
        token: &str,
        correct: bool,
        response_time_ms: u64,
    ) -> Result<AnswerProgress> {
        let state = self.sessions.get_mut(token).ok_or_else(|| {
            PracticeError::InvalidState(format!("no active session for token '{token}'"))
        })?;

        state.question_count += 1;
        if correct {
            state.correct_count += 1;
        }
        state.response_times_ms.push(response_time_ms);

        let session_id = state.session_id.clone();
        let question_count = state.question_count;

        if question_count != SESSION_LENGTH {
            return Ok(AnswerProgress {
                session_id,
                question_count,
                session_complete: false,
                summary: None,
            });
        }

        let summary = state.summarize(timestamp_now());
        if let Err(err) = self.summaries.append(&summary) {
            // back to nine answers so the tenth can be retried
            state.question_count -= 1;
            if correct {
                state.correct_count -= 1;
            }
            state.response_times_ms.pop();
            tracing::warn!(
                token,
                session_id = %summary.session_id,
                %err,
                "session summary not written"
            );
            return Err(err);
        }
        self.sessions.remove(token);
        tracing::info!(
            token,
            session_id = %summary.session_id,
            accuracy = summary.accuracy,
            "session complete"
        );

        Ok(AnswerProgress {
            session_id,
            question_count,
            session_complete: true,
            summary: Some(summary),
        })
    }

    /// Replace whatever `token` was working on
    pub fn set_challenge(&mut self, token: &str, challenge: Challenge) {
        self.challenges.insert(
            token.to_string(),
            PendingChallenge {
                challenge,
                issued_at: Instant::now(),
            },
        );
    }

    /// Remove and return the pending key challenge with its age in ms.
    /// A pending melody is left in place.
    pub fn take_key_challenge(&mut self, token: &str) -> Result<(KeyChallenge, u64)> {
        match self.challenges.get(token) {
            Some(PendingChallenge {
                challenge: Challenge::Key(_),
                ..
            }) => {}
            _ => return Err(PracticeError::NoActiveChallenge),
        }

        match self.challenges.remove(token) {
            Some(PendingChallenge {
                challenge: Challenge::Key(key),
                issued_at,
            }) => Ok((key, issued_at.elapsed().as_millis() as u64)),
            _ => Err(PracticeError::NoActiveChallenge),
        }
    }

    pub fn current_melody(&self, token: &str) -> Option<&Melody> {
        match self.challenges.get(token) {
            Some(PendingChallenge {
                challenge: Challenge::Melody(melody),
                ..
            }) => Some(melody),
            _ => None,
        }
    }
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn timestamp_now() -> String {
    Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
