//! Per-step validation rules.
//!
//! Each step owns a raw input form (plain strings, exactly as typed) and a
//! validator that turns it into typed step data or a list of field errors.
//! Validators never stop at the first failure: every offending field is
//! reported in one [`FieldErrors`] value.

mod academic;
mod address;
mod patterns;
mod student;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flow::StepId;
use crate::models::{Choice, EnrollmentAnswer, Grade, StepData};

pub use academic::{AcademicForm, AcademicRules, AcademicValidator};
pub use address::{AddressForm, validate_address};
pub use student::{StudentForm, validate_student};

/// Every user-editable field of the enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Email,
    Mobile,
    Grade,
    Board,
    Language,
    Subjects,
    ExamGoal,
    StudyHours,
    IsScholarship,
    LastExamScore,
    Achievements,
    PinCode,
    City,
    State,
    Address,
    GuardianName,
    GuardianMobile,
    PaymentPlan,
    PaymentMode,
}

impl Field {
    /// Key of the field in the serialized record.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Grade => "grade",
            Self::Board => "board",
            Self::Language => "language",
            Self::Subjects => "subjects",
            Self::ExamGoal => "examGoal",
            Self::StudyHours => "studyHours",
            Self::IsScholarship => "isScholarship",
            Self::LastExamScore => "lastExamScore",
            Self::Achievements => "achievements",
            Self::PinCode => "pinCode",
            Self::City => "city",
            Self::State => "state",
            Self::Address => "address",
            Self::GuardianName => "guardianName",
            Self::GuardianMobile => "guardianMobile",
            Self::PaymentPlan => "paymentPlan",
            Self::PaymentMode => "paymentMode",
        }
    }

    /// Human label, used as the subject of "is required" messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "Name",
            Self::Email => "Email",
            Self::Mobile => "Mobile",
            Self::Grade => "Class",
            Self::Board => "Board",
            Self::Language => "Language",
            Self::Subjects => "Subjects",
            Self::ExamGoal => "Goal",
            Self::StudyHours => "Study hours",
            Self::IsScholarship => "Scholarship",
            Self::LastExamScore => "Last exam score",
            Self::Achievements => "Achievements",
            Self::PinCode => "PIN code",
            Self::City => "City",
            Self::State => "State",
            Self::Address => "Address",
            Self::GuardianName => "Guardian name",
            Self::GuardianMobile => "Guardian mobile",
            Self::PaymentPlan => "Plan",
            Self::PaymentMode => "Mode",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single failed check, attached to the field the user has to fix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All failures found while validating one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl fmt::Display for FieldErrors {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        field: Field,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Messages recorded against `field`, in the order they were found.
    pub fn messages_for(
        &self,
        field: Field,
    ) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    pub fn has(
        &self,
        field: Field,
    ) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when no error was collected.
    pub fn into_result<T>(
        self,
        value: impl FnOnce() -> T,
    ) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// Parses a mandatory choice field, recording "required" for empty
    /// input and "invalid" for anything outside the allowed set.
    pub(crate) fn required_choice<C: Choice>(
        &mut self,
        field: Field,
        raw: &str,
    ) -> Option<C> {
        if raw.trim().is_empty() {
            self.push(field, format!("{} is required", field.label()));
            return None;
        }
        let parsed = C::parse(raw);
        if parsed.is_none() {
            self.push(
                field,
                format!("{} must be one of: {}", field.label(), C::allowed()),
            );
        }
        parsed
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Answers from earlier steps that later validators depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Class chosen on step 1; drives the subject minimum on step 2.
    pub grade: Option<Grade>,
    pub academic_rules: AcademicRules,
}

impl ValidationContext {
    pub fn from_answer(
        answer: &EnrollmentAnswer,
        academic_rules: AcademicRules,
    ) -> Self {
        Self {
            grade: answer.grade,
            academic_rules,
        }
    }
}

/// Raw input for one of the three data-entry steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Student(StudentForm),
    Academic(AcademicForm),
    Address(AddressForm),
}

impl StepInput {
    /// Rebuilds the raw input of `step` from stored answers, so a returning
    /// user sees what they entered before. Review has no input.
    pub fn draft(
        step: StepId,
        answer: &EnrollmentAnswer,
    ) -> Option<Self> {
        match step {
            StepId::Student => Some(Self::Student(StudentForm::from_answer(answer))),
            StepId::Academic => Some(Self::Academic(AcademicForm::from_answer(answer))),
            StepId::Address => Some(Self::Address(AddressForm::from_answer(answer))),
            StepId::Review => None,
        }
    }

    /// The step this input belongs to.
    pub fn step(&self) -> StepId {
        match self {
            Self::Student(_) => StepId::Student,
            Self::Academic(_) => StepId::Academic,
            Self::Address(_) => StepId::Address,
        }
    }
}

/// Validates the raw input of one step.
///
/// The step is identified by the input variant; `context` carries the
/// earlier answers the rule is parameterized by.
pub fn validate_step(
    input: &StepInput,
    context: &ValidationContext,
) -> Result<StepData, FieldErrors> {
    match input {
        StepInput::Student(form) => validate_student(form).map(StepData::Student),
        StepInput::Academic(form) => {
            AcademicValidator::for_grade(context.grade, context.academic_rules)
                .validate(form)
                .map(StepData::Academic)
        }
        StepInput::Address(form) => validate_address(form).map(StepData::Address),
    }
}

/// Display string of an optional stored value, empty when absent.
pub(crate) fn display_or_empty<T: fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Trimmed character count, the length measure used by every text rule.
pub(crate) fn text_len(s: &str) -> usize {
    s.trim().chars().count()
}
