use tracing::{debug, info};

use super::draft::{DraftPatch, ListingDraft};
use super::persistence::{PersistedSnapshot, SnapshotStore};
use super::steps::{StepError, StepOrchestrator, WizardStep};
use super::store::{DraftStore, ListingSubmitter, SubmissionError, SubmissionStatus};
use super::validation::{validate_step, StepValidationError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] StepValidationError),
    #[error(transparent)]
    Navigation(#[from] StepError),
    #[error("listings can only be submitted from the review step (currently on {})", .0.label())]
    NotOnReviewStep(WizardStep),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// One seller's listing session: draft, position, and its durable mirror.
#[derive(Debug)]
pub struct ListingWizard<S> {
    store: DraftStore,
    steps: StepOrchestrator,
    snapshots: S,
}

impl<S> ListingWizard<S>
where
    S: SnapshotStore,
{
    /// Starts a session, resuming from a stored snapshot when one exists.
    pub fn mount(snapshots: S) -> Self {
        let mut store = DraftStore::new();
        let steps = match snapshots.load() {
            Some(snapshot) => {
                debug!(step = snapshot.step.number(), "resuming listing draft");
                store.hydrate_draft(snapshot.draft);
                StepOrchestrator::resume_at(snapshot.step)
            }
            None => StepOrchestrator::new(),
        };

        Self {
            store,
            steps,
            snapshots,
        }
    }

    pub fn draft(&self) -> &ListingDraft {
        self.store.draft()
    }

    pub fn step(&self) -> WizardStep {
        self.steps.current()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.store.status()
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    /// Merges the step's answers (if any) and moves forward one step.
    pub fn next(&mut self, patch: Option<&DraftPatch>) -> WizardStep {
        if let Some(patch) = patch {
            self.store.save_draft(patch);
        }
        let step = self.steps.next();
        self.persist();
        step
    }

    /// Checks the current step's required fields against the merged answers
    /// before advancing. Nothing changes when the check fails.
    pub fn continue_step(&mut self, patch: &DraftPatch) -> Result<WizardStep, WizardError> {
        let candidate = self.store.draft().merged(patch);
        validate_step(self.steps.current(), &candidate)?;
        Ok(self.next(Some(patch)))
    }

    pub fn back(&mut self) -> WizardStep {
        let step = self.steps.back();
        self.persist();
        step
    }

    pub fn jump_to(&mut self, number: u8) -> Result<WizardStep, WizardError> {
        let step = self.steps.jump_to(number)?;
        self.persist();
        Ok(step)
    }

    pub async fn submit<T>(&mut self, submitter: &T) -> Result<(), WizardError>
    where
        T: ListingSubmitter + ?Sized,
    {
        if !self.steps.is_final() {
            return Err(WizardError::NotOnReviewStep(self.steps.current()));
        }
        validate_step(WizardStep::Review, self.store.draft())?;

        match self.store.submit(submitter).await {
            Ok(()) => {
                self.snapshots.clear();
                info!("listing wizard completed");
                Ok(())
            }
            Err(err) => {
                // A refused transition leaves storage as it was; a submitted listing stays cleared.
                if matches!(err, SubmissionError::Failed(_)) {
                    self.persist();
                }
                Err(err.into())
            }
        }
    }

    /// Marks a submission whose future was dropped as failed so it can be retried.
    pub fn abandon_submit(&mut self) -> Result<(), WizardError> {
        self.store.abandon_submit()?;
        self.persist();
        Ok(())
    }

    pub fn reset(&mut self) {
        self.store.reset_draft();
        self.steps.reset();
        self.snapshots.clear();
    }

    fn persist(&self) {
        self.snapshots.persist(&PersistedSnapshot {
            draft: self.store.draft().clone(),
            step: self.steps.current(),
        });
    }
}
