//! Resume tailoring workflow: session state, transitions and the notifications shown to users.

pub mod coordinator;
pub mod notification;
pub mod session;

pub use coordinator::Coordinator;
pub use notification::{Notification, Presenter, Severity};

/// Scores at or above this are reported as a success.
pub const PASSING_SCORE: f64 = 70.0;
const FAIR_SCORE: f64 = 50.0;

/// Coarse grading of an ATS score for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Fair,
    Weak,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score >= PASSING_SCORE {
            ScoreBand::Strong
        } else if score >= FAIR_SCORE {
            ScoreBand::Fair
        } else {
            ScoreBand::Weak
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::Strong => "strong",
            ScoreBand::Fair => "fair",
            ScoreBand::Weak => "weak",
        }
    }
}

/// Liveness of the generation backend as shown in the status header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceHealth {
    Ok,
    /// Anything else the probe reported, including `"DOWN"` for an unreachable service.
    Degraded(String),
}

impl ServiceHealth {
    pub fn from_status(status: &str) -> Self {
        if status.to_uppercase().contains("OK") {
            ServiceHealth::Ok
        } else {
            ServiceHealth::Degraded(status.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ServiceHealth::Ok => "OK",
            ServiceHealth::Degraded(status) => status,
        }
    }
}

/// Whole scores print without a fractional part.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score}")
    }
}
