//! Entry guards for each step.
//!
//! Guards form a simple prerequisite chain: each step after the first needs
//! one field produced by the step before it.

use tracing::debug;

use super::step::StepId;
use crate::models::EnrollmentAnswer;

/// The step that must be completed before `step` can be entered, if the
/// field it produces is still missing from `state`.
pub fn missing_prerequisite(
    step: StepId,
    state: &EnrollmentAnswer,
) -> Option<StepId> {
    match step {
        StepId::Student => None,
        StepId::Academic => state.grade.is_none().then_some(StepId::Student),
        StepId::Address => state.exam_goal.is_none().then_some(StepId::Academic),
        StepId::Review => state.payment_plan.is_none().then_some(StepId::Address),
    }
}

pub fn can_enter(
    step: StepId,
    state: &EnrollmentAnswer,
) -> bool {
    missing_prerequisite(step, state).is_none()
}

/// Follows guard redirects until reaching a step that can be entered.
///
/// Entering the address step with nothing stored lands on step 1, since
/// step 2 is itself guarded by step 1.
pub fn resolve_entry(
    step: StepId,
    state: &EnrollmentAnswer,
) -> StepId {
    let mut target = step;
    while let Some(redirect) = missing_prerequisite(target, state) {
        debug!(from = %target, to = %redirect, "prerequisite missing, redirecting");
        target = redirect;
    }
    target
}

pub fn next_step(step: StepId) -> StepId {
    step.next()
}

pub fn progress_fraction(step: StepId) -> f64 {
    step.progress_fraction()
}
