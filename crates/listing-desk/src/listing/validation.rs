use std::fmt;

use super::draft::ListingDraft;
use super::fields::ENUMERATED_PATHS;
use super::steps::WizardStep;

/// Draft paths a step must fill before the wizard moves past it.
pub const fn required_paths(step: WizardStep) -> &'static [&'static str] {
    match step {
        WizardStep::BasicDetails => &["context.listingType", "context.category"],
        WizardStep::Location => &["location.cityId", "location.cityName"],
        WizardStep::PropertyProfile => &["details.builtUpArea"],
        WizardStep::Media | WizardStep::Amenities => &[],
        WizardStep::Pricing => &["pricing.amount"],
        WizardStep::Review => &["meta.title"],
    }
}

/// Enumerated paths a step owns. Review re-checks all of them.
fn enumerated_paths(step: WizardStep) -> Vec<(&'static str, &'static [&'static str])> {
    let sections: &[&str] = match step {
        WizardStep::BasicDetails => &["context"],
        WizardStep::Pricing => &["pricing"],
        WizardStep::Amenities => &["amenities", "availability"],
        WizardStep::Review => return ENUMERATED_PATHS.to_vec(),
        WizardStep::Location | WizardStep::PropertyProfile | WizardStep::Media => &[],
    };

    ENUMERATED_PATHS
        .iter()
        .filter(|(path, _)| {
            sections
                .iter()
                .any(|section| path.split('.').next() == Some(*section))
        })
        .copied()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepValidationError {
    pub step: WizardStep,
    pub missing: Vec<String>,
    pub invalid: Vec<String>,
}

impl fmt::Display for StepValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is incomplete", self.step.label())?;
        if !self.missing.is_empty() {
            write!(f, "; missing {}", self.missing.join(", "))?;
        }
        if !self.invalid.is_empty() {
            write!(f, "; invalid {}", self.invalid.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for StepValidationError {}

pub fn validate_step(step: WizardStep, draft: &ListingDraft) -> Result<(), StepValidationError> {
    let missing: Vec<String> = required_paths(step)
        .iter()
        .filter(|path| !draft.get(path).is_some_and(|value| value.is_filled()))
        .map(|path| path.to_string())
        .collect();

    let invalid: Vec<String> = enumerated_paths(step)
        .into_iter()
        .filter(|(path, allowed)| match draft.get(path) {
            None => false,
            Some(value) if value.is_null() => false,
            Some(value) => !value.as_str().is_some_and(|raw| allowed.contains(&raw)),
        })
        .map(|(path, _)| path.to_string())
        .collect();

    if missing.is_empty() && invalid.is_empty() {
        Ok(())
    } else {
        Err(StepValidationError {
            step,
            missing,
            invalid,
        })
    }
}
