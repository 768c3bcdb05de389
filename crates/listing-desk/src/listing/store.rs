use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::draft::{DraftPatch, ListingDraft};

const ABANDONED_MESSAGE: &str = "submission abandoned before the listing service answered";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Idle,
    Saving,
    Submitting,
    Submitted,
    Failed,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Saving => "Saving",
            Self::Submitting => "Submitting",
            Self::Submitted => "Submitted",
            Self::Failed => "Failed",
        }
    }

    /// States from which a new submission may start.
    pub const fn can_submit(self) -> bool {
        matches!(self, Self::Idle | Self::Saving | Self::Failed)
    }
}

/// Outbound hook that publishes a finished listing and echoes it back.
#[async_trait]
pub trait ListingSubmitter: Send + Sync {
    async fn submit_listing(&self, draft: &ListingDraft) -> Result<ListingDraft, SubmitError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Rejected(String),
    #[error("listing service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("cannot submit while the listing is {}", .0.label().to_lowercase())]
    InvalidTransition(SubmissionStatus),
    #[error("listing submission failed: {0}")]
    Failed(String),
}

/// Holds the listing being edited and the lifecycle of its submission.
#[derive(Debug, Clone)]
pub struct DraftStore {
    draft: ListingDraft,
    status: SubmissionStatus,
    error: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

impl Default for DraftStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftStore {
    pub fn new() -> Self {
        Self {
            draft: ListingDraft::skeleton(),
            status: SubmissionStatus::Idle,
            error: None,
            submitted_at: None,
        }
    }

    pub fn draft(&self) -> &ListingDraft {
        &self.draft
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn save_draft(&mut self, patch: &DraftPatch) {
        self.draft = self.draft.merged(patch);
        self.status = SubmissionStatus::Saving;
    }

    pub fn hydrate_draft(&mut self, draft: ListingDraft) {
        self.draft = draft;
        self.status = SubmissionStatus::Idle;
    }

    pub fn reset_draft(&mut self) {
        self.draft = ListingDraft::skeleton();
        self.error = None;
        self.submitted_at = None;
        self.status = SubmissionStatus::Idle;
    }

    /// Moves into `submitting` and hands back the payload to send.
    pub fn begin_submit(&mut self) -> Result<ListingDraft, SubmissionError> {
        if !self.status.can_submit() {
            return Err(SubmissionError::InvalidTransition(self.status));
        }
        self.status = SubmissionStatus::Submitting;
        self.error = None;
        Ok(self.draft.clone())
    }

    /// Resolves an in-flight submission.
    pub fn complete_submit(
        &mut self,
        outcome: Result<ListingDraft, SubmitError>,
    ) -> Result<(), SubmissionError> {
        if self.status != SubmissionStatus::Submitting {
            return Err(SubmissionError::InvalidTransition(self.status));
        }

        match outcome {
            Ok(echoed) => {
                self.draft = echoed;
                self.submitted_at = Some(Utc::now());
                self.status = SubmissionStatus::Submitted;
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                self.error = Some(message.clone());
                self.status = SubmissionStatus::Failed;
                Err(SubmissionError::Failed(message))
            }
        }
    }

    /// Gives up on an in-flight submission whose outcome will never arrive.
    pub fn abandon_submit(&mut self) -> Result<(), SubmissionError> {
        if self.status != SubmissionStatus::Submitting {
            return Err(SubmissionError::InvalidTransition(self.status));
        }
        self.error = Some(ABANDONED_MESSAGE.to_string());
        self.status = SubmissionStatus::Failed;
        Ok(())
    }

    /// Runs a full submission against `submitter`.
    ///
    /// Dropping the returned future before it resolves leaves the store in
    /// `submitting`; call [`DraftStore::abandon_submit`] to make it retryable.
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<(), SubmissionError>
    where
        S: ListingSubmitter + ?Sized,
    {
        let payload = self.begin_submit()?;
        let outcome = submitter.submit_listing(&payload).await;
        match &outcome {
            Ok(_) => info!("listing submitted"),
            Err(err) => warn!(error = %err, "listing submission failed"),
        }
        self.complete_submit(outcome)
    }
}
