use serde::{Deserialize, Serialize};

/// Wizard pages in the order a seller walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    BasicDetails,
    Location,
    PropertyProfile,
    Media,
    Pricing,
    Amenities,
    Review,
}

impl WizardStep {
    pub const FIRST: Self = Self::BasicDetails;
    pub const LAST: Self = Self::Review;

    pub const fn ordered() -> [Self; 7] {
        [
            Self::BasicDetails,
            Self::Location,
            Self::PropertyProfile,
            Self::Media,
            Self::Pricing,
            Self::Amenities,
            Self::Review,
        ]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::BasicDetails => 1,
            Self::Location => 2,
            Self::PropertyProfile => 3,
            Self::Media => 4,
            Self::Pricing => 5,
            Self::Amenities => 6,
            Self::Review => 7,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::BasicDetails),
            2 => Some(Self::Location),
            3 => Some(Self::PropertyProfile),
            4 => Some(Self::Media),
            5 => Some(Self::Pricing),
            6 => Some(Self::Amenities),
            7 => Some(Self::Review),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::BasicDetails => "Basic Details",
            Self::Location => "Location",
            Self::PropertyProfile => "Property Profile",
            Self::Media => "Photos/Videos",
            Self::Pricing => "Pricing",
            Self::Amenities => "Amenities",
            Self::Review => "Review",
        }
    }

    /// Saturates at the review step.
    pub const fn next(self) -> Self {
        match Self::from_number(self.number() + 1) {
            Some(step) => step,
            None => Self::LAST,
        }
    }

    /// Saturates at the first step.
    pub const fn previous(self) -> Self {
        match Self::from_number(self.number().saturating_sub(1)) {
            Some(step) => step,
            None => Self::FIRST,
        }
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = StepError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_number(value).ok_or(StepError::OutOfRange(value))
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("step {0} does not exist; the wizard has steps 1 to 7")]
    OutOfRange(u8),
    #[error("cannot jump to step {requested} before completing step {}", .current.number())]
    AheadOfProgress { requested: u8, current: WizardStep },
}

/// Position tracker for the listing wizard. Validation belongs to the steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOrchestrator {
    current: WizardStep,
}

impl Default for StepOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl StepOrchestrator {
    pub const fn new() -> Self {
        Self {
            current: WizardStep::FIRST,
        }
    }

    pub const fn resume_at(step: WizardStep) -> Self {
        Self { current: step }
    }

    pub const fn current(&self) -> WizardStep {
        self.current
    }

    pub fn is_final(&self) -> bool {
        self.current == WizardStep::LAST
    }

    pub fn next(&mut self) -> WizardStep {
        self.current = self.current.next();
        self.current
    }

    pub fn back(&mut self) -> WizardStep {
        self.current = self.current.previous();
        self.current
    }

    /// Revisits an earlier (or the current) step; skipping ahead is refused.
    pub fn jump_to(&mut self, number: u8) -> Result<WizardStep, StepError> {
        let requested = WizardStep::try_from(number)?;
        if requested > self.current {
            return Err(StepError::AheadOfProgress {
                requested: number,
                current: self.current,
            });
        }
        self.current = requested;
        Ok(requested)
    }

    pub fn reset(&mut self) {
        self.current = WizardStep::FIRST;
    }
}
