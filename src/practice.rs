use crate::error::{PracticeError, Result};
use crate::export::{DocumentWriter, LayoutRequest};
use crate::key_quiz::{check_answer, generate_key_challenge, KeyChallenge};
use crate::melody::{generate_melody, Melody};
use crate::music::{Clef, Difficulty};
use crate::session::{Challenge, SessionTracker, SESSION_LENGTH};
use crate::stats::{
    combined_sessions, compute_daily_stats, compute_stats, DailyStats, StatsSummary,
};
use crate::store::{EventLog, EventType, PracticeEvent, SessionLog, SessionSummary};
use crate::time_series::{graph_series, GraphPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const EVENTS_FILE: &str = "data.csv";
pub const SESSIONS_FILE: &str = "sessions.csv";

/// Response to a key answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub correct: bool,
    pub correct_answer: String,
    pub user_answer: String,
    pub response_time_ms: u64,
    pub session_complete: bool,
    /// "N/10"
    pub session_progress: String,
}

/// Challenge/check surface over the stores, the tracker and the generators
pub struct PracticeService<R: Rng = StdRng> {
    events: EventLog,
    tracker: SessionTracker,
    rng: R,
}

impl PracticeService<StdRng> {
    /// Service over `data.csv` and `sessions.csv` in `data_dir`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::with_rng(data_dir, StdRng::from_entropy())
    }

    pub fn seeded<P: AsRef<Path>>(data_dir: P, seed: u64) -> Self {
        Self::with_rng(data_dir, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PracticeService<R> {
    pub fn with_rng<P: AsRef<Path>>(data_dir: P, rng: R) -> Self {
        let dir: PathBuf = data_dir.as_ref().to_path_buf();
        Self {
            events: EventLog::new(dir.join(EVENTS_FILE)),
            tracker: SessionTracker::new(SessionLog::new(dir.join(SESSIONS_FILE))),
            rng,
        }
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn tracker(&self) -> &SessionTracker {
        &self.tracker
    }

    /// Draw a key challenge and make it the token's current one
    pub fn new_key_challenge(&mut self, token: &str) -> KeyChallenge {
        let challenge = generate_key_challenge(&mut self.rng);
        self.issue_key_challenge(token, challenge.clone());
        challenge
    }

    /// Make `challenge` the token's current one, starting a session if needed
    pub fn issue_key_challenge(&mut self, token: &str, challenge: KeyChallenge) {
        self.tracker.ensure_session(token);
        tracing::debug!(token, note = %challenge.display_name, clef = %challenge.clef, "key challenge issued");
        self.tracker.set_challenge(token, Challenge::Key(challenge));
    }

    /// Grade `answer` against the token's current key challenge, log it and
    /// advance the session
    pub fn check_key_answer(&mut self, token: &str, answer: &str) -> Result<CheckResult> {
        let (challenge, response_time_ms) = self.tracker.take_key_challenge(token)?;
        let user_answer = answer.trim().to_string();
        let correct = check_answer(&challenge, &user_answer);
        let session_id = self.tracker.ensure_session(token);

        self.events.append(&PracticeEvent {
            score: Some(correct as u8),
            difficulty: Some(Difficulty::Beginner),
            clef: Some(challenge.clef),
            correct_answer: challenge.display_name.clone(),
            user_answer: user_answer.clone(),
            session_id,
            response_time_ms: Some(response_time_ms),
            notes: format!("Octave: {}", challenge.octave),
            ..PracticeEvent::now(EventType::KeyPractice)
        })?;

        let progress = self.tracker.record_answer(token, correct, response_time_ms)?;

        Ok(CheckResult {
            correct,
            correct_answer: challenge.display_name,
            user_answer,
            response_time_ms,
            session_complete: progress.session_complete,
            session_progress: format!("{}/{}", self.tracker.progress(token), SESSION_LENGTH),
        })
    }

    /// Generate a melody, log it, and hold it for export
    pub fn generate_melody(
        &mut self,
        token: &str,
        difficulty: Difficulty,
        clef: Clef,
    ) -> Result<Melody> {
        let melody = generate_melody(&mut self.rng, difficulty, clef);

        self.events.append(&PracticeEvent {
            score: Some(1),
            difficulty: Some(difficulty),
            clef: Some(clef),
            key_signature: melody.key_signature.clone(),
            time_signature: melody.time_signature.clone(),
            session_id: self.tracker.ensure_session(token),
            notes: format!("{} notes, {} measures", melody.melody.len(), melody.measures),
            ..PracticeEvent::now(EventType::SightReadingGenerated)
        })?;

        self.tracker
            .set_challenge(token, Challenge::Melody(melody.clone()));
        Ok(melody)
    }

    /// String-facing variant; unknown names are rejected before anything is logged
    pub fn generate_melody_named(
        &mut self,
        token: &str,
        difficulty: &str,
        clef: &str,
    ) -> Result<Melody> {
        let difficulty: Difficulty = difficulty.parse()?;
        let clef: Clef = clef.parse()?;
        self.generate_melody(token, difficulty, clef)
    }

    /// Hand the token's current melody to `writer` and log the export
    pub fn export_melody(
        &mut self,
        token: &str,
        writer: &dyn DocumentWriter,
    ) -> Result<String> {
        let layout = self
            .tracker
            .current_melody(token)
            .map(LayoutRequest::from)
            .ok_or(PracticeError::NoActiveChallenge)?;

        let filename = writer.write(&layout)?;

        self.events.append(&PracticeEvent {
            score: Some(1),
            difficulty: Some(layout.difficulty),
            clef: Some(layout.clef),
            key_signature: layout.key_signature.clone(),
            time_signature: layout.time_signature.clone(),
            session_id: self.tracker.ensure_session(token),
            notes: format!("Exported: {filename}"),
            ..PracticeEvent::now(EventType::PdfExport)
        })?;

        Ok(filename)
    }

    /// Dashboard numbers, with the asking token's live session filled in
    pub fn stats(&self, token: &str) -> Result<StatsSummary> {
        let events = self.events.read_all()?;
        let mut stats = compute_stats(&events);
        stats.current_session_id = self.tracker.current_session_id(token).map(str::to_string);
        stats.current_session_progress = self.tracker.progress(token);
        Ok(stats)
    }

    /// Persisted summaries followed by sessions rebuilt from the event log
    pub fn session_summaries(&self) -> Result<Vec<SessionSummary>> {
        let persisted = self.tracker.summary_log().read_all()?;
        let events = self.events.read_all()?;
        Ok(combined_sessions(persisted, &events))
    }

    pub fn graph_series(&self) -> Result<Vec<GraphPoint>> {
        Ok(graph_series(&self.session_summaries()?))
    }

    pub fn daily_stats(&self) -> Result<Vec<DailyStats>> {
        Ok(compute_daily_stats(&self.events.read_all()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::{Accidental, NoteLetter};
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn check_without_challenge_is_an_error() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 1);
        assert_matches!(
            service.check_key_answer("t", "c"),
            Err(PracticeError::NoActiveChallenge)
        );
        assert!(service.events().read_all().unwrap().is_empty());
    }

    #[test]
    fn a_challenge_can_only_be_answered_once() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 1);
        let challenge = service.new_key_challenge("t");
        service
            .check_key_answer("t", &challenge.note.to_string())
            .unwrap();
        assert_matches!(
            service.check_key_answer("t", "c"),
            Err(PracticeError::NoActiveChallenge)
        );
    }

    #[test]
    fn wrong_answer_is_logged_with_score_zero() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 1);
        service.issue_key_challenge(
            "t",
            KeyChallenge::new(NoteLetter::D, Accidental::Flat, Clef::Bass, 3),
        );
        let result = service.check_key_answer("t", " e ").unwrap();
        assert!(!result.correct);
        assert_eq!(result.correct_answer, "Db");
        assert_eq!(result.user_answer, "e");

        let events = service.events().read_all().unwrap();
        assert_eq!(events[0].score, Some(0));
        assert_eq!(events[0].notes, "Octave: 3");
        assert_eq!(events[0].clef, Some(Clef::Bass));
    }

    #[test]
    fn tokens_do_not_see_each_others_challenges() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 2);
        service.new_key_challenge("alice");
        assert_matches!(
            service.check_key_answer("bob", "c"),
            Err(PracticeError::NoActiveChallenge)
        );
        assert!(service.check_key_answer("alice", "c").is_ok());
    }

    #[test]
    fn melody_generation_is_logged() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 3);
        let melody = service
            .generate_melody("t", Difficulty::Intermediate, Clef::Treble)
            .unwrap();

        let events = service.events().read_all().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::SightReadingGenerated);
        assert_eq!(events[0].key_signature, melody.key_signature);
        assert_eq!(events[0].time_signature, melody.time_signature);
        assert_eq!(
            events[0].notes,
            format!("{} notes, 8 measures", melody.melody.len())
        );
    }

    #[test]
    fn unknown_difficulty_logs_nothing() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 3);
        assert_matches!(
            service.generate_melody_named("t", "grandmaster", "treble"),
            Err(PracticeError::InvalidArgument(_))
        );
        assert!(service.events().read_all().unwrap().is_empty());
    }

    #[test]
    fn stats_report_the_callers_live_session() {
        let dir = tempdir().unwrap();
        let mut service = PracticeService::seeded(dir.path(), 4);
        for _ in 0..3 {
            service.new_key_challenge("t");
            service.check_key_answer("t", "x").unwrap();
        }
        let stats = service.stats("t").unwrap();
        assert_eq!(stats.current_session_progress, 3);
        assert_eq!(
            stats.current_session_id.as_deref(),
            service.tracker().current_session_id("t")
        );
        assert_eq!(stats.key_practice_accuracy, 0.0);

        let other = service.stats("someone-else").unwrap();
        assert_eq!(other.current_session_progress, 0);
        assert_eq!(other.current_session_id, None);
    }
}
