//! Submission pipeline — the one place that ties composer, session and
//! interpreter together.
//!
//! Flow: trim/reject → compose → session.begin → (detached) run_analysis →
//!       session.settle → report | error.
//!
//! The external call runs on its own task. If the caller goes away mid-call
//! the task still finishes and settles the session, so it never stays
//! Submitting after the transport resolves.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::composer::{compose_request, PlanText};
use crate::analysis::interpreter::{run_analysis, AnalysisError};
use crate::analysis::report::AnalysisReport;
use crate::analysis::session::{SessionError, SessionRegistry};
use crate::llm_client::TextGenerator;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("business plan is empty")]
    EmptyPlan,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("analysis task did not complete: {0}")]
    Interrupted(String),
}

/// Runs one submission for `session_id`.
///
/// Empty input is rejected before the session is touched. A session that
/// already has a call in flight rejects the submission without a second call.
pub async fn submit(
    registry: &SessionRegistry,
    generator: Arc<dyn TextGenerator>,
    session_id: Uuid,
    raw_plan: &str,
) -> Result<AnalysisReport, SubmitError> {
    let plan = PlanText::parse(raw_plan).ok_or(SubmitError::EmptyPlan)?;
    let request = compose_request(&plan);

    registry.begin(session_id).await?;
    info!(%session_id, plan_chars = plan.as_str().len(), "analysis submitted");

    let task_registry = registry.clone();
    let task = tokio::spawn(async move {
        let outcome = run_analysis(generator.as_ref(), &request).await;
        if let Err(e) = task_registry.settle(session_id, &outcome).await {
            error!(%session_id, "failed to settle session: {e}");
        }
        outcome
    });

    match task.await {
        Ok(Ok(report)) => {
            info!(%session_id, firm = %report.firm_name, "analysis succeeded");
            Ok(report)
        }
        Ok(Err(e)) => {
            warn!(%session_id, kind = ?e.kind(), "analysis failed: {e}");
            Err(SubmitError::Analysis(e))
        }
        Err(join_err) => {
            error!(%session_id, "analysis task aborted: {join_err}");
            registry.reset(session_id).await;
            Err(SubmitError::Interrupted(join_err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analysis::interpreter::testing::ScriptedGenerator;
    use crate::analysis::interpreter::{FailureKind, GENERIC_FAILURE_MESSAGE};
    use crate::analysis::report::fixtures::TECHFORWARD_REPORT_JSON;

    const TECHFORWARD_PLAN: &str = "TechForward sells a SaaS product, 4 employees, $50/mo, 500 customers, $8,000 startup cost, $3,500/mo operating cost.";

    async fn phase(registry: &SessionRegistry, id: Uuid) -> &'static str {
        registry.snapshot(id).await.unwrap().phase
    }

    #[tokio::test]
    async fn test_submit_succeeds_and_settles() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(ScriptedGenerator::replying(TECHFORWARD_REPORT_JSON));
        let id = Uuid::new_v4();

        let report = submit(&registry, generator.clone(), id, TECHFORWARD_PLAN)
            .await
            .unwrap();

        assert_eq!(report.monte_carlo.win_probability_pct, 62.0);
        assert_eq!(generator.calls(), 1);
        assert_eq!(phase(&registry, id).await, "succeeded");
    }

    #[tokio::test]
    async fn test_empty_plan_issues_no_call() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(ScriptedGenerator::replying(TECHFORWARD_REPORT_JSON));
        let id = Uuid::new_v4();

        let err = submit(&registry, generator.clone(), id, "   \n ").await.unwrap_err();

        assert!(matches!(err, SubmitError::EmptyPlan));
        assert_eq!(generator.calls(), 0);
        assert!(registry.snapshot(id).await.is_none());
    }

    #[tokio::test]
    async fn test_empty_plan_leaves_existing_session_untouched() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(ScriptedGenerator::replying(TECHFORWARD_REPORT_JSON));
        let id = Uuid::new_v4();
        submit(&registry, generator.clone(), id, TECHFORWARD_PLAN)
            .await
            .unwrap();

        submit(&registry, generator.clone(), id, "").await.unwrap_err();

        assert_eq!(generator.calls(), 1);
        assert_eq!(phase(&registry, id).await, "succeeded");
    }

    #[tokio::test]
    async fn test_transport_failure_settles_failed() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(ScriptedGenerator::failing(502));
        let id = Uuid::new_v4();

        let err = submit(&registry, generator, id, TECHFORWARD_PLAN)
            .await
            .unwrap_err();

        match err {
            SubmitError::Analysis(e) => {
                assert_eq!(e.kind(), FailureKind::Transport);
                assert_eq!(e.user_message(), GENERIC_FAILURE_MESSAGE);
            }
            other => panic!("expected analysis failure, got {other:?}"),
        }
        assert_eq!(phase(&registry, id).await, "failed");
    }

    #[tokio::test]
    async fn test_decode_failure_settles_failed_and_allows_retry() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("{ not json".to_string()),
            Ok(TECHFORWARD_REPORT_JSON.to_string()),
        ]));
        let id = Uuid::new_v4();

        let err = submit(&registry, generator.clone(), id, TECHFORWARD_PLAN)
            .await
            .unwrap_err();
        assert!(matches!(&err, SubmitError::Analysis(e) if e.kind() == FailureKind::Decode));
        assert_eq!(phase(&registry, id).await, "failed");

        submit(&registry, generator.clone(), id, TECHFORWARD_PLAN)
            .await
            .unwrap();
        assert_eq!(generator.calls(), 2);
        assert_eq!(phase(&registry, id).await, "succeeded");
    }

    #[tokio::test]
    async fn test_second_submission_while_in_flight_is_rejected() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(
            ScriptedGenerator::replying(TECHFORWARD_REPORT_JSON)
                .with_delay(Duration::from_millis(200)),
        );
        let id = Uuid::new_v4();

        let first = {
            let registry = registry.clone();
            let generator = generator.clone();
            tokio::spawn(async move { submit(&registry, generator, id, TECHFORWARD_PLAN).await })
        };

        // Wait until the first submission has been admitted.
        while registry.snapshot(id).await.map(|s| s.phase) != Some("submitting") {
            tokio::task::yield_now().await;
        }

        let second = submit(&registry, generator.clone(), id, TECHFORWARD_PLAN).await;
        assert!(matches!(
            second,
            Err(SubmitError::Session(SessionError::AlreadySubmitting))
        ));

        first.await.unwrap().unwrap();
        assert_eq!(generator.calls(), 1);
        assert_eq!(phase(&registry, id).await, "succeeded");
    }

    #[tokio::test]
    async fn test_dropped_caller_still_settles_session() {
        let registry = SessionRegistry::new();
        let generator = Arc::new(
            ScriptedGenerator::replying(TECHFORWARD_REPORT_JSON)
                .with_delay(Duration::from_millis(50)),
        );
        let id = Uuid::new_v4();

        let caller = {
            let registry = registry.clone();
            let generator = generator.clone();
            tokio::spawn(async move { submit(&registry, generator, id, TECHFORWARD_PLAN).await })
        };
        while registry.snapshot(id).await.map(|s| s.phase) != Some("submitting") {
            tokio::task::yield_now().await;
        }
        caller.abort();

        tokio::time::sleep(Duration::from_millis(200)).await;
        let snapshot = registry.snapshot(id).await.unwrap();
        assert_eq!(snapshot.phase, "succeeded");
        assert_eq!(snapshot.report.unwrap().firm_name, "TechForward");
        assert!(snapshot.settled_at.is_some());
    }
}
