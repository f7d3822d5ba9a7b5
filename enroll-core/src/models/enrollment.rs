use serde::{Deserialize, Serialize};

use super::choices::{Board, ExamGoal, Grade, Language, PaymentMode, PaymentPlan};

/// The accumulated answer set spanning every enrollment step.
///
/// Fields stay `None` until the step that owns them has been submitted.
/// `subjects` and `is_scholarship` always carry a value so a fresh record
/// serializes as `{"subjects":[],"isScholarship":false}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentAnswer {
    // Step 1: student details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,

    // Step 2: academic details
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exam_goal: Option<ExamGoal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub study_hours: Option<u32>,
    pub is_scholarship: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_exam_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<String>,

    // Step 3: address, guardian and payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_plan: Option<PaymentPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
}

/// A partial update to an [`EnrollmentAnswer`].
///
/// `None` means "leave the stored field alone"; a patch can never remove
/// a value, only overwrite it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentPatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub grade: Option<Grade>,
    pub board: Option<Board>,
    pub language: Option<Language>,
    pub subjects: Option<Vec<String>>,
    pub exam_goal: Option<ExamGoal>,
    pub study_hours: Option<u32>,
    pub is_scholarship: Option<bool>,
    pub last_exam_score: Option<u8>,
    pub achievements: Option<String>,
    pub pin_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_mobile: Option<String>,
    pub payment_plan: Option<PaymentPlan>,
    pub payment_mode: Option<PaymentMode>,
}

impl EnrollmentPatch {
    /// Patch that replaces only the subject selection.
    pub fn subjects(subjects: Vec<String>) -> Self {
        Self {
            subjects: Some(subjects),
            ..Default::default()
        }
    }

    /// Returns `true` when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn overwrite<T>(
    slot: &mut Option<T>,
    value: Option<T>,
) {
    if value.is_some() {
        *slot = value;
    }
}

impl EnrollmentAnswer {
    /// Shallow merge: every field present in `patch` replaces the stored one.
    pub fn merge(
        &mut self,
        patch: EnrollmentPatch,
    ) {
        overwrite(&mut self.full_name, patch.full_name);
        overwrite(&mut self.email, patch.email);
        overwrite(&mut self.mobile, patch.mobile);
        overwrite(&mut self.grade, patch.grade);
        overwrite(&mut self.board, patch.board);
        overwrite(&mut self.language, patch.language);
        if let Some(subjects) = patch.subjects {
            self.subjects = subjects;
        }
        overwrite(&mut self.exam_goal, patch.exam_goal);
        overwrite(&mut self.study_hours, patch.study_hours);
        if let Some(is_scholarship) = patch.is_scholarship {
            self.is_scholarship = is_scholarship;
        }
        overwrite(&mut self.last_exam_score, patch.last_exam_score);
        overwrite(&mut self.achievements, patch.achievements);
        overwrite(&mut self.pin_code, patch.pin_code);
        overwrite(&mut self.city, patch.city);
        overwrite(&mut self.state, patch.state);
        overwrite(&mut self.address, patch.address);
        overwrite(&mut self.guardian_name, patch.guardian_name);
        overwrite(&mut self.guardian_mobile, patch.guardian_mobile);
        overwrite(&mut self.payment_plan, patch.payment_plan);
        overwrite(&mut self.payment_mode, patch.payment_mode);
    }

    /// Returns a copy with `patch` merged in, leaving `self` untouched.
    pub fn merged(
        &self,
        patch: EnrollmentPatch,
    ) -> Self {
        let mut next = self.clone();
        next.merge(patch);
        next
    }

    /// Returns `true` when nothing beyond the defaults has been recorded.
    pub fn is_pristine(&self) -> bool {
        self == &Self::default()
    }
}

/// Adds `subject` when absent, removes it when present.
///
/// Returns `true` when the subject ends up selected. Selection order is
/// preserved and no duplicate can be introduced.
pub fn toggle_subject(
    subjects: &mut Vec<String>,
    subject: &str,
) -> bool {
    let subject = subject.trim();
    if subject.is_empty() {
        return false;
    }
    if let Some(pos) = subjects.iter().position(|s| s == subject) {
        subjects.remove(pos);
        false
    } else {
        subjects.push(subject.to_string());
        true
    }
}
