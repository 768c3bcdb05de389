//! Listing creation wizard: the draft value tree, its submission lifecycle,
//! step navigation, per-step validation, and resumable persistence.

pub mod draft;
pub mod fields;
pub mod persistence;
pub mod steps;
pub mod store;
pub mod validation;
pub mod value;
mod wizard;

pub use draft::{DraftError, DraftPatch, DraftSection, ListingDraft};
pub use persistence::{
    DisabledSnapshotStore, FileSnapshotStore, MemorySnapshotStore, PersistedSnapshot,
    SnapshotStore, DRAFT_STORAGE_KEY,
};
pub use steps::{StepError, StepOrchestrator, WizardStep};
pub use store::{
    DraftStore, ListingSubmitter, SubmissionError, SubmissionStatus, SubmitError,
};
pub use validation::{validate_step, StepValidationError};
pub use value::{DraftValue, Record, Scalar};
pub use wizard::{ListingWizard, WizardError};
