use crate::models::EntityId;

/// Identifiers and derived results for one workflow session.
///
/// `ats_score` and `tailored_text` only ever describe the current `(resume_id, job_id)`
/// pair: replacing either id clears both in the same call. Mutators are visible to the
/// coordinator only; everyone else reads snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    resume_id: Option<EntityId>,
    job_id: Option<EntityId>,
    ats_score: Option<f64>,
    tailored_text: String,
    /// Bumped on every id replacement, including one that stores an equal id.
    generation: u64,
}

/// The id pair a score/tailor request is issued for, tagged with the session generation
/// it was read at.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ReadyPair {
    pub resume_id: EntityId,
    pub job_id: EntityId,
    pub generation: u64,
}

impl Session {
    pub fn resume_id(&self) -> Option<&EntityId> {
        self.resume_id.as_ref()
    }

    pub fn job_id(&self) -> Option<&EntityId> {
        self.job_id.as_ref()
    }

    pub fn ats_score(&self) -> Option<f64> {
        self.ats_score
    }

    pub fn tailored_text(&self) -> &str {
        &self.tailored_text
    }

    /// True once both a resume and a job description are stored.
    pub fn is_ready(&self) -> bool {
        self.resume_id.is_some() && self.job_id.is_some()
    }

    pub(super) fn replace_resume(&mut self, id: EntityId) {
        self.resume_id = Some(id);
        self.clear_results();
    }

    pub(super) fn replace_job(&mut self, id: EntityId) {
        self.job_id = Some(id);
        self.clear_results();
    }

    /// The id pair score/tailor requests are issued for, or a description of what is missing.
    pub(super) fn ready_pair(&self) -> Result<ReadyPair, &'static str> {
        match (&self.resume_id, &self.job_id) {
            (Some(resume), Some(job)) => Ok(ReadyPair {
                resume_id: resume.clone(),
                job_id: job.clone(),
                generation: self.generation,
            }),
            (None, Some(_)) => Err("an uploaded resume"),
            (Some(_), None) => Err("a saved job description"),
            (None, None) => Err("an uploaded resume and a saved job description"),
        }
    }

    /// Whether a result requested for `pair` still belongs to this session. Any id
    /// replacement since the pair was read makes it stale.
    pub(super) fn is_current(&self, pair: &ReadyPair) -> bool {
        self.generation == pair.generation
    }

    pub(super) fn record_score(&mut self, score: f64) {
        self.ats_score = Some(score);
    }

    pub(super) fn record_tailoring(&mut self, score: Option<f64>, text: String) {
        self.ats_score = score;
        self.tailored_text = text;
    }

    fn clear_results(&mut self) {
        self.generation += 1;
        self.ats_score = None;
        self.tailored_text.clear();
    }
}
