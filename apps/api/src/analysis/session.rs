//! Per-user submission state.
//!
//! Idle → Submitting → Succeeded(report) | Failed(kind)
//!
//! Succeeded and Failed are resting states: a new submission may start from
//! them and discards the previous result. Submitting admits nothing, which is
//! the only admission control: at most one external call in flight per session.
//!
//! Settled sessions expire `ttl` after `settled_at` and are swept on the next
//! admission. A Submitting session is never swept.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::analysis::interpreter::{AnalysisError, FailureKind, GENERIC_FAILURE_MESSAGE};
use crate::analysis::report::AnalysisReport;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("an analysis is already in progress for this session")]
    AlreadySubmitting,

    #[error("session has no analysis in progress")]
    NotSubmitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionPhase {
    Idle,
    Submitting,
    Succeeded(AnalysisReport),
    Failed(FailureKind),
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: SessionPhase,
    submitted_at: Option<DateTime<Utc>>,
    settled_at: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            submitted_at: None,
            settled_at: None,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, SessionPhase::Submitting)
    }

    /// Admits a new submission. Clears any previous report or failure.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        if self.is_submitting() {
            return Err(SessionError::AlreadySubmitting);
        }
        self.phase = SessionPhase::Submitting;
        self.submitted_at = Some(Utc::now());
        self.settled_at = None;
        Ok(())
    }

    /// Records the outcome of the in-flight call.
    pub fn settle(
        &mut self,
        outcome: &Result<AnalysisReport, AnalysisError>,
    ) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        self.phase = match outcome {
            Ok(report) => SessionPhase::Succeeded(report.clone()),
            Err(e) => SessionPhase::Failed(e.kind()),
        };
        self.settled_at = Some(Utc::now());
        Ok(())
    }

    /// Drops back to Idle without a result. Used when the call task itself died.
    /// `settled_at` is kept so the session still expires.
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.submitted_at = None;
        self.settled_at = Some(Utc::now());
    }

    /// True once a settled session has rested for at least `ttl`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        if self.is_submitting() {
            return false;
        }
        self.settled_at.is_some_and(|settled| now - settled >= ttl)
    }

    pub fn snapshot(&self, session_id: Uuid) -> SessionSnapshot {
        let (phase, report, error) = match self.phase() {
            SessionPhase::Idle => ("idle", None, None),
            SessionPhase::Submitting => ("submitting", None, None),
            SessionPhase::Succeeded(report) => ("succeeded", Some(report.clone()), None),
            SessionPhase::Failed(_) => ("failed", None, Some(GENERIC_FAILURE_MESSAGE)),
        };
        SessionSnapshot {
            session_id,
            phase,
            report,
            error,
            submitted_at: self.submitted_at,
            settled_at: self.settled_at,
        }
    }
}

/// What the presentation layer sees when it polls a session.
/// Failure kinds are not exposed; every failure reads the same.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AnalysisReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub settled_at: Option<DateTime<Utc>>,
}

/// How long a settled session stays readable when no TTL is configured.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 30 * 60;

/// In-memory sessions keyed by id. The lock guards state transitions only
/// and is never held across the external call.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::with_ttl(Duration::seconds(DEFAULT_SESSION_TTL_SECS))
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Sweeps expired sessions, creates this one on first use, then admits a submission.
    pub async fn begin(&self, session_id: Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        sweep(&mut sessions, Utc::now(), self.ttl);
        sessions.entry(session_id).or_default().begin()
    }

    /// Drops every session that expired as of `now`. Returns how many went.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        sweep(&mut *self.sessions.lock().await, now, self.ttl)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn settle(
        &self,
        session_id: Uuid,
        outcome: &Result<AnalysisReport, AnalysisError>,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotSubmitting)?
            .settle(outcome)
    }

    pub async fn reset(&self, session_id: Uuid) {
        if let Some(session) = self.sessions.lock().await.get_mut(&session_id) {
            session.reset();
        }
    }

    pub async fn snapshot(&self, session_id: Uuid) -> Option<SessionSnapshot> {
        self.sessions
            .lock()
            .await
            .get(&session_id)
            .map(|s| s.snapshot(session_id))
    }
}

fn sweep(sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(now, ttl));
    let swept = before - sessions.len();
    if swept > 0 {
        debug!(swept, remaining = sessions.len(), "expired demo sessions dropped");
    }
    swept
}
