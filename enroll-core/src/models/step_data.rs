use serde::{Deserialize, Serialize};

use super::choices::{Board, ExamGoal, Grade, Language, PaymentMode, PaymentPlan};
use super::enrollment::EnrollmentPatch;

/// Validated output of the student details step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub grade: Grade,
    pub board: Board,
    pub language: Language,
}

/// Validated output of the academic details step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicDetails {
    pub subjects: Vec<String>,
    pub exam_goal: ExamGoal,
    pub study_hours: u32,
    pub is_scholarship: bool,
    pub last_exam_score: Option<u8>,
    pub achievements: Option<String>,
}

/// Validated output of the address, guardian and payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub pin_code: String,
    pub city: String,
    pub state: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_mobile: String,
    pub payment_plan: PaymentPlan,
    pub payment_mode: PaymentMode,
}

/// Validated data for any input step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepData {
    Student(StudentDetails),
    Academic(AcademicDetails),
    Address(AddressDetails),
}

impl From<StudentDetails> for EnrollmentPatch {
    fn from(d: StudentDetails) -> Self {
        Self {
            full_name: Some(d.full_name),
            email: Some(d.email),
            mobile: Some(d.mobile),
            grade: Some(d.grade),
            board: Some(d.board),
            language: Some(d.language),
            ..Default::default()
        }
    }
}

impl From<AcademicDetails> for EnrollmentPatch {
    fn from(d: AcademicDetails) -> Self {
        Self {
            subjects: Some(d.subjects),
            exam_goal: Some(d.exam_goal),
            study_hours: Some(d.study_hours),
            is_scholarship: Some(d.is_scholarship),
            last_exam_score: d.last_exam_score,
            achievements: d.achievements,
            ..Default::default()
        }
    }
}

impl From<AddressDetails> for EnrollmentPatch {
    fn from(d: AddressDetails) -> Self {
        Self {
            pin_code: Some(d.pin_code),
            city: Some(d.city),
            state: Some(d.state),
            address: Some(d.address),
            guardian_name: Some(d.guardian_name),
            guardian_mobile: Some(d.guardian_mobile),
            payment_plan: Some(d.payment_plan),
            payment_mode: Some(d.payment_mode),
            ..Default::default()
        }
    }
}

impl From<StepData> for EnrollmentPatch {
    fn from(data: StepData) -> Self {
        match data {
            StepData::Student(d) => d.into(),
            StepData::Academic(d) => d.into(),
            StepData::Address(d) => d.into(),
        }
    }
}
