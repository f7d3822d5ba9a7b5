//! The enrollment session: one user moving through the steps.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::guard::{missing_prerequisite, resolve_entry};
use super::step::StepId;
use crate::models::{EnrollmentAnswer, EnrollmentPatch, toggle_subject};
use crate::pins::PinDirectory;
use crate::review::ReviewSummary;
use crate::store::{EnrollmentStore, StoreError};
use crate::submission::{SubmissionError, SubmissionReceipt, Submitter};
use crate::validation::{
    AcademicRules, AcademicValidator, FieldErrors, StepInput, ValidationContext, validate_step,
};

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStage {
    Step(StepId),
    Submitted,
}

impl FlowStage {
    pub fn step(&self) -> Option<StepId> {
        match self {
            Self::Step(step) => Some(*step),
            Self::Submitted => None,
        }
    }
}

impl fmt::Display for FlowStage {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Step(step) => write!(f, "{step}"),
            Self::Submitted => f.write_str("submitted"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error("{requested} is not available yet, complete {redirect} first")]
    Redirected { requested: StepId, redirect: StepId },

    #[error("input for {got} does not belong to the current stage ({stage})")]
    WrongStep { stage: FlowStage, got: StepId },

    #[error("cannot go back from {from} to {to}")]
    NotEarlier { from: FlowStage, to: StepId },

    #[error("enrollment is not ready for submission (at {stage})")]
    NotAtReview { stage: FlowStage },

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("enrollment already submitted, restart to begin a new one")]
    AlreadySubmitted,
}

/// Holds the in-flight flag for the lifetime of one submitter call. The flag
/// is cleared on drop, so a cancelled submission can be retried.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn begin(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// Drives one enrollment from step 1 to submission.
///
/// The session owns the [`EnrollmentStore`]: answers only reach it after the
/// step that produced them validated. Navigation is guarded, so a stage is
/// never entered without its prerequisite fields.
pub struct EnrollmentFlow {
    store: EnrollmentStore,
    stage: FlowStage,
    rules: AcademicRules,
    pins: PinDirectory,
    submitting: bool,
}

impl EnrollmentFlow {
    pub fn new(store: EnrollmentStore) -> Self {
        Self {
            store,
            stage: FlowStage::Step(StepId::Student),
            rules: AcademicRules::default(),
            pins: PinDirectory::default(),
            submitting: false,
        }
    }

    pub fn with_academic_rules(
        mut self,
        rules: AcademicRules,
    ) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_pin_directory(
        mut self,
        pins: PinDirectory,
    ) -> Self {
        self.pins = pins;
        self
    }

    pub fn stage(&self) -> FlowStage {
        self.stage
    }

    pub fn state(&self) -> &EnrollmentAnswer {
        self.store.state()
    }

    pub fn store(&self) -> &EnrollmentStore {
        &self.store
    }

    pub fn pins(&self) -> &PinDirectory {
        &self.pins
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Fraction of the flow reached, 1.0 once submitted.
    pub fn progress(&self) -> f64 {
        match self.stage {
            FlowStage::Step(step) => step.progress_fraction(),
            FlowStage::Submitted => 1.0,
        }
    }

    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext::from_answer(self.state(), self.rules)
    }

    /// The step 2 rule for the currently stored class.
    pub fn academic_validator(&self) -> AcademicValidator {
        AcademicValidator::for_grade(self.state().grade, self.rules)
    }

    /// Moves to `step`, or to the earliest step whose prerequisites are
    /// missing. Returns the step actually entered.
    pub fn enter(
        &mut self,
        step: StepId,
    ) -> Result<StepId, FlowError> {
        if self.stage == FlowStage::Submitted {
            return Err(FlowError::AlreadySubmitted);
        }
        let target = resolve_entry(step, self.state());
        if target != step {
            debug!(requested = %step, entered = %target, "step guard redirected");
        }
        self.stage = FlowStage::Step(target);
        Ok(target)
    }

    /// Like [`enter`](Self::enter), but a redirect is an error instead of a
    /// silent move.
    pub fn enter_exact(
        &mut self,
        step: StepId,
    ) -> Result<StepId, FlowError> {
        if self.stage == FlowStage::Submitted {
            return Err(FlowError::AlreadySubmitted);
        }
        if let Some(redirect) = missing_prerequisite(step, self.state()) {
            let redirect = resolve_entry(redirect, self.state());
            self.stage = FlowStage::Step(redirect);
            return Err(FlowError::Redirected {
                requested: step,
                redirect,
            });
        }
        self.stage = FlowStage::Step(step);
        Ok(step)
    }

    /// Validates the current step's input, merges it into the store and
    /// advances. On failure nothing is stored and the stage is unchanged.
    pub async fn submit_step(
        &mut self,
        mut input: StepInput,
    ) -> Result<StepId, FlowError> {
        let current = match self.stage {
            FlowStage::Step(step) if step == input.step() => step,
            stage => {
                return Err(FlowError::WrongStep {
                    stage,
                    got: input.step(),
                });
            }
        };

        if let StepInput::Address(form) = &mut input {
            form.apply_pin_lookup(&self.pins);
        }

        let data = match validate_step(&input, &self.validation_context()) {
            Ok(data) => data,
            Err(errors) => {
                warn!(step = %current, errors = errors.len(), "step rejected: {errors}");
                return Err(errors.into());
            }
        };

        self.store.merge(EnrollmentPatch::from(data)).await?;
        let next = current.next();
        self.stage = FlowStage::Step(next);
        info!(from = %current, to = %next, "step completed");
        Ok(next)
    }

    /// Returns to an earlier step without validating anything.
    pub fn back(
        &mut self,
        to: StepId,
    ) -> Result<StepId, FlowError> {
        match self.stage {
            FlowStage::Step(current) if to.index() < current.index() => {
                self.stage = FlowStage::Step(to);
                debug!(from = %current, to = %to, "navigated back");
                Ok(to)
            }
            stage => Err(FlowError::NotEarlier { from: stage, to }),
        }
    }

    /// Selects or deselects one subject and stores the new selection right
    /// away, ahead of validating the rest of step 2. Needs a stored class.
    pub async fn toggle_subject(
        &mut self,
        subject: &str,
    ) -> Result<bool, FlowError> {
        self.enter_exact(StepId::Academic)?;
        let mut subjects = self.state().subjects.clone();
        let selected = toggle_subject(&mut subjects, subject);
        self.store.merge(EnrollmentPatch::subjects(subjects)).await?;
        debug!(subject, selected, "subject toggled");
        Ok(selected)
    }

    /// Raw input for `step` pre-filled from stored answers.
    pub fn draft_for(
        &self,
        step: StepId,
    ) -> Option<StepInput> {
        StepInput::draft(step, self.state())
    }

    /// Read-only summary for the review step.
    pub fn review(&self) -> ReviewSummary {
        ReviewSummary::from_answer(self.state())
    }

    /// Hands the record to `submitter` from the review step.
    ///
    /// On success the store is reset and the session is done. On failure
    /// the record and stage stay as they were, so the user can retry.
    pub async fn submit(
        &mut self,
        submitter: &dyn Submitter,
    ) -> Result<SubmissionReceipt, FlowError> {
        if self.submitting {
            return Err(FlowError::SubmissionInFlight);
        }
        match self.stage {
            FlowStage::Submitted => return Err(FlowError::AlreadySubmitted),
            FlowStage::Step(StepId::Review) => {}
            stage => return Err(FlowError::NotAtReview { stage }),
        }
        if let Some(redirect) = missing_prerequisite(StepId::Review, self.state()) {
            let redirect = resolve_entry(redirect, self.state());
            self.stage = FlowStage::Step(redirect);
            return Err(FlowError::Redirected {
                requested: StepId::Review,
                redirect,
            });
        }

        let outcome = {
            let _in_flight = InFlight::begin(&mut self.submitting);
            submitter.submit(self.store.state()).await
        };

        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(error = %e, "submission failed, record kept");
                return Err(e.into());
            }
        };

        self.store.reset().await?;
        self.stage = FlowStage::Submitted;
        info!(email = %receipt.email, "enrollment submitted");
        Ok(receipt)
    }

    /// Starts a new enrollment after a completed one.
    pub fn restart(&mut self) {
        self.stage = FlowStage::Step(StepId::Student);
    }

    /// Replaces stored answers with the defaults and returns to step 1.
    pub async fn reset(&mut self) -> Result<(), FlowError> {
        self.store.reset().await?;
        self.stage = FlowStage::Step(StepId::Student);
        Ok(())
    }

    /// Deletes the stored record entirely and returns to step 1.
    pub async fn discard(&mut self) -> Result<(), FlowError> {
        self.store.purge().await?;
        self.stage = FlowStage::Step(StepId::Student);
        Ok(())
    }
}
