use serde::{Deserialize, Serialize};

use super::patterns::{EMAIL, MOBILE};
use super::{Field, FieldErrors, display_or_empty, text_len};
use crate::models::{Board, EnrollmentAnswer, Grade, Language, StudentDetails};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 60;

/// Raw values of the student details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentForm {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub grade: String,
    pub board: String,
    pub language: String,
}

impl StudentForm {
    /// Pre-fills the form from previously stored answers.
    pub fn from_answer(answer: &EnrollmentAnswer) -> Self {
        Self {
            full_name: answer.full_name.clone().unwrap_or_default(),
            email: answer.email.clone().unwrap_or_default(),
            mobile: answer.mobile.clone().unwrap_or_default(),
            grade: display_or_empty(answer.grade),
            board: display_or_empty(answer.board),
            language: display_or_empty(answer.language),
        }
    }
}

/// Step 1 rule: identity fields plus class, board and language.
pub fn validate_student(form: &StudentForm) -> Result<StudentDetails, FieldErrors> {
    let mut errors = FieldErrors::new();

    let full_name = form.full_name.trim();
    let name_len = text_len(full_name);
    if name_len < NAME_MIN {
        errors.push(
            Field::FullName,
            format!("Name must be at least {NAME_MIN} characters"),
        );
    } else if name_len > NAME_MAX {
        errors.push(
            Field::FullName,
            format!("Name must be at most {NAME_MAX} characters"),
        );
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.push(Field::Email, "Email is required");
    } else if !EMAIL.is_match(email) {
        errors.push(Field::Email, "Invalid email address");
    }

    let mobile = form.mobile.trim();
    if !MOBILE.is_match(mobile) {
        errors.push(
            Field::Mobile,
            "Must be a valid 10-digit Indian mobile number",
        );
    }

    let grade = errors.required_choice::<Grade>(Field::Grade, &form.grade);
    let board = errors.required_choice::<Board>(Field::Board, &form.board);
    let language = errors.required_choice::<Language>(Field::Language, &form.language);

    match (grade, board, language) {
        (Some(grade), Some(board), Some(language)) if errors.is_empty() => Ok(StudentDetails {
            full_name: full_name.to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            grade,
            board,
            language,
        }),
        _ => Err(errors),
    }
}
