use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::research::{LegalResearchAnswer, RetrievedContext};

/// Final answer of a run, tagged with whether verification succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResearchAnswer {
    /// The verification stage's answer, which replaced the candidate.
    Verified { answer: LegalResearchAnswer },
    /// The formulation stage's answer, returned because verification failed.
    Unverified {
        answer: LegalResearchAnswer,
        reason: String,
    },
}

impl ResearchAnswer {
    pub fn answer(&self) -> &LegalResearchAnswer {
        match self {
            ResearchAnswer::Verified { answer } | ResearchAnswer::Unverified { answer, .. } => {
                answer
            }
        }
    }

    pub fn into_answer(self) -> LegalResearchAnswer {
        match self {
            ResearchAnswer::Verified { answer } | ResearchAnswer::Unverified { answer, .. } => {
                answer
            }
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, ResearchAnswer::Verified { .. })
    }

    /// Why verification did not apply, for unverified answers.
    pub fn unverified_reason(&self) -> Option<&str> {
        match self {
            ResearchAnswer::Verified { .. } => None,
            ResearchAnswer::Unverified { reason, .. } => Some(reason),
        }
    }
}

/// Everything a completed run hands back to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub run_id: Uuid,
    pub query: String,
    pub context: RetrievedContext,
    pub answer: ResearchAnswer,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl PipelineOutcome {
    /// Wall-clock duration of the run in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
