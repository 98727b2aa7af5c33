//! Workflow coordinator: owns the session and runs the four user-triggered transitions.
//!
//! # Transition contract
//! - Each transition issues at most one remote call and awaits it; nothing is retried.
//! - Every failure becomes exactly one error notification and is returned as `Err`;
//!   the session keeps its last good state.
//! - Score and tailor results are applied only if neither id has been replaced since the
//!   request was issued, even by an upload that returned an equal id.
//!
//! The session lock is held only for synchronous reads and updates, never across an
//! `.await`, so independent transitions may overlap.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::{Operation, WorkflowError};
use crate::models::EntityId;
use crate::normalize::{EntityKind, IdentifierResponse, ScoreResponse, TailorResponse};
use crate::remote_client::{ClientError, JobMetadata, RemoteService, ResumeFile};
use crate::workflow::notification::{Notification, Presenter};
use crate::workflow::session::{ReadyPair, Session};
use crate::workflow::{format_score, ServiceHealth, PASSING_SCORE};

const UPSTREAM_WARNING: &str = "HF API returned an error (showing message). Check your token/URL.";

pub struct Coordinator {
    service: Arc<dyn RemoteService>,
    presenter: Arc<dyn Presenter>,
    session: Mutex<Session>,
}

impl Coordinator {
    pub fn new(service: Arc<dyn RemoteService>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            service,
            presenter,
            session: Mutex::new(Session::default()),
        }
    }

    /// A consistent copy of the current session.
    pub fn session(&self) -> Session {
        self.lock().clone()
    }

    // ────────────────────────────────────────────────────────────────────────
    // Transitions
    // ────────────────────────────────────────────────────────────────────────

    pub async fn upload_resume(&self, file: &ResumeFile) -> Result<EntityId, WorkflowError> {
        info!(file = %file.file_name, "Uploading resume");

        let op = Operation::UploadResume;
        let response = self.service.upload_resume(file).await;
        let id = match decode_id(op, EntityKind::Resume, response) {
            Ok(id) => id,
            Err(e) => return Err(self.fail(op, e)),
        };

        self.lock().replace_resume(id.clone());
        info!(resume_id = %id, "Resume stored");
        self.presenter
            .notify(&Notification::success(format!("Uploaded resume (#{id})")));
        Ok(id)
    }

    pub async fn save_job(
        &self,
        description: &str,
        metadata: &JobMetadata,
    ) -> Result<EntityId, WorkflowError> {
        info!(chars = description.len(), "Saving job description");

        let op = Operation::SaveJob;
        let response = self.service.save_job(description, metadata).await;
        let id = match decode_id(op, EntityKind::Job, response) {
            Ok(id) => id,
            Err(e) => return Err(self.fail(op, e)),
        };

        self.lock().replace_job(id.clone());
        info!(job_id = %id, "Job description stored");
        self.presenter.notify(&Notification::success(format!(
            "Saved job description (#{id})"
        )));
        Ok(id)
    }

    /// Fetches the ATS score for the current pair. Missing score fields read as `0`.
    pub async fn fetch_score(&self) -> Result<f64, WorkflowError> {
        let op = Operation::FetchScore;
        let pair = self.ready_pair(op)?;
        let (resume_id, job_id) = (&pair.resume_id, &pair.job_id);
        info!(%resume_id, %job_id, "Fetching ATS score");

        let body = match self.service.fetch_score(resume_id, job_id).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(op, WorkflowError::network(op, e))),
        };
        let score = ScoreResponse::decode(&body).score();

        {
            let mut session = self.lock();
            if session.is_current(&pair) {
                session.record_score(score);
            } else {
                warn!(%resume_id, %job_id, "Discarding ATS score for a replaced resume or job");
            }
        }

        let message = format!("ATS Score: {}", format_score(score));
        let notification = if score >= PASSING_SCORE {
            Notification::success(message)
        } else {
            Notification::warning(message)
        };
        info!(score, "ATS score received");
        self.presenter.notify(&notification);
        Ok(score)
    }

    /// Requests a tailored resume for the current pair and opens the result view.
    ///
    /// A payload whose text starts with the upstream-error marker still succeeds: the text
    /// is stored and shown, and the notification is downgraded to a warning.
    pub async fn tailor(&self) -> Result<TailorResponse, WorkflowError> {
        let op = Operation::Tailor;
        let pair = self.ready_pair(op)?;
        let (resume_id, job_id) = (&pair.resume_id, &pair.job_id);
        info!(%resume_id, %job_id, "Requesting tailored resume");

        let body = match self.service.tailor(resume_id, job_id).await {
            Ok(body) => body,
            Err(e) => return Err(self.fail(op, WorkflowError::network(op, e))),
        };
        let tailored = TailorResponse::decode(&body, resume_id, job_id);

        {
            let mut session = self.lock();
            if session.is_current(&pair) {
                session.record_tailoring(tailored.ats_score, tailored.tailored_text.clone());
            } else {
                warn!(%resume_id, %job_id, "Discarding tailored text for a replaced resume or job");
            }
        }

        self.presenter.show_tailored(&tailored.tailored_text);

        if tailored.is_upstream_error() {
            warn!(text = %tailored.tailored_text, "Upstream generation error in tailoring payload");
            self.presenter.notify(&Notification::warning(UPSTREAM_WARNING));
        } else {
            info!(
                resume_id = %tailored.resume_id,
                job_id = %tailored.job_id,
                chars = tailored.tailored_text.len(),
                score = ?tailored.ats_score,
                "Tailored resume received"
            );
            self.presenter
                .notify(&Notification::success("Tailored resume generated"));
        }

        Ok(tailored)
    }

    /// Probes the service. Never fails; an unreachable service reads as degraded.
    pub async fn check_health(&self) -> ServiceHealth {
        let status = self.service.ping().await;
        let health = ServiceHealth::from_status(&status);
        info!(status = %health.label(), "Service health checked");
        health
    }

    // ────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ────────────────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready_pair(&self, op: Operation) -> Result<ReadyPair, WorkflowError> {
        let pair = self.lock().ready_pair();
        pair.map_err(|missing| {
            self.fail(
                op,
                WorkflowError::PreconditionFailed {
                    operation: op,
                    missing,
                },
            )
        })
    }

    /// Logs and reports a failed transition, handing the error back to the caller.
    fn fail(&self, op: Operation, err: WorkflowError) -> WorkflowError {
        match &err {
            WorkflowError::PreconditionFailed { .. } => warn!(operation = %op, "{err}"),
            _ => error!(operation = %op, "{err}"),
        }
        self.presenter.notify(&Notification::error(format!(
            "{}: {}",
            op.failure_label(),
            err
        )));
        err
    }
}

/// Turns the raw reply of an id-minting call into the stored entity's identifier.
fn decode_id(
    op: Operation,
    kind: EntityKind,
    response: Result<Value, ClientError>,
) -> Result<EntityId, WorkflowError> {
    let body = response.map_err(|e| WorkflowError::network(op, e))?;
    Ok(IdentifierResponse::decode(kind, &body)?.id)
}
