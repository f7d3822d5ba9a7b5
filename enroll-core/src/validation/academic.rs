use serde::{Deserialize, Serialize};

use super::{Field, FieldErrors, display_or_empty};
use crate::models::{AcademicDetails, EnrollmentAnswer, ExamGoal, Grade, toggle_subject};

const STUDY_HOURS_MIN: i64 = 1;
const STUDY_HOURS_MAX: i64 = 40;
const SCORE_MIN: i64 = 0;
const SCORE_MAX: i64 = 100;

/// Tunable parts of the academic step rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicRules {
    /// Treat a last exam score of exactly 0 as "not provided" when the
    /// student applies for a scholarship.
    pub zero_score_is_missing: bool,
}

impl Default for AcademicRules {
    fn default() -> Self {
        Self {
            zero_score_is_missing: true,
        }
    }
}

/// Raw values of the academic details step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AcademicForm {
    pub subjects: Vec<String>,
    pub exam_goal: String,
    pub study_hours: String,
    pub is_scholarship: bool,
    pub last_exam_score: String,
    pub achievements: String,
}

impl AcademicForm {
    /// Pre-fills the form from previously stored answers.
    pub fn from_answer(answer: &EnrollmentAnswer) -> Self {
        Self {
            subjects: answer.subjects.clone(),
            exam_goal: display_or_empty(answer.exam_goal),
            study_hours: display_or_empty(answer.study_hours),
            is_scholarship: answer.is_scholarship,
            last_exam_score: display_or_empty(answer.last_exam_score),
            achievements: answer.achievements.clone().unwrap_or_default(),
        }
    }

    /// Selects `subject` when absent, deselects it when present.
    pub fn toggle_subject(
        &mut self,
        subject: &str,
    ) -> bool {
        toggle_subject(&mut self.subjects, subject)
    }
}

/// Step 2 rule, built for the class chosen on step 1.
///
/// The subject minimum depends on the grade, so the validator is produced
/// by [`AcademicValidator::for_grade`] rather than being a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcademicValidator {
    grade: Option<Grade>,
    rules: AcademicRules,
}

impl AcademicValidator {
    pub fn for_grade(
        grade: Option<Grade>,
        rules: AcademicRules,
    ) -> Self {
        Self { grade, rules }
    }

    /// 3 for classes 11 and 12, otherwise 2 (including an unknown class).
    pub fn min_subjects(&self) -> usize {
        self.grade.map_or(2, |g| g.min_subjects())
    }

    pub fn validate(
        &self,
        form: &AcademicForm,
    ) -> Result<AcademicDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let exam_goal = errors.required_choice::<ExamGoal>(Field::ExamGoal, &form.exam_goal);
        let study_hours = check_study_hours(&mut errors, &form.study_hours);
        let subjects = normalize_subjects(&form.subjects);
        let score = parse_score(&form.last_exam_score);

        // Cross-field checks run after the per-field ones and share the list.
        self.check_subject_count(&mut errors, subjects.len());
        if form.is_scholarship {
            self.check_scholarship_score(&mut errors, &score);
        }

        let last_exam_score = match score {
            ScoreInput::Value(v) if (SCORE_MIN..=SCORE_MAX).contains(&v) => u8::try_from(v).ok(),
            _ => None,
        };
        let achievements = Some(form.achievements.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        match (exam_goal, study_hours) {
            (Some(exam_goal), Some(study_hours)) if errors.is_empty() => Ok(AcademicDetails {
                subjects,
                exam_goal,
                study_hours,
                is_scholarship: form.is_scholarship,
                last_exam_score,
                achievements,
            }),
            _ => Err(errors),
        }
    }

    fn check_subject_count(
        &self,
        errors: &mut FieldErrors,
        count: usize,
    ) {
        let min = self.min_subjects();
        if count < min {
            let class = self
                .grade
                .map_or_else(|| "selected".to_string(), |g| g.to_string());
            errors.push(
                Field::Subjects,
                format!("Class {class} requires at least {min} subjects"),
            );
        }
    }

    /// Presence and range are checked independently so both messages can
    /// show at once.
    fn check_scholarship_score(
        &self,
        errors: &mut FieldErrors,
        score: &ScoreInput,
    ) {
        let missing = match score {
            ScoreInput::Missing | ScoreInput::Malformed => true,
            ScoreInput::Value(0) => self.rules.zero_score_is_missing,
            ScoreInput::Value(_) => false,
        };
        if missing {
            let message = if matches!(score, ScoreInput::Malformed) {
                "Last exam score must be a whole number"
            } else {
                "Last exam score is required for scholarship applications"
            };
            errors.push(Field::LastExamScore, message);
        }

        if let ScoreInput::Value(v) = score {
            if !(SCORE_MIN..=SCORE_MAX).contains(v) {
                errors.push(Field::LastExamScore, "Percentage must be between 0 and 100");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScoreInput {
    Missing,
    Malformed,
    Value(i64),
}

fn parse_score(raw: &str) -> ScoreInput {
    let raw = raw.trim();
    if raw.is_empty() {
        return ScoreInput::Missing;
    }
    raw.parse()
        .map_or(ScoreInput::Malformed, ScoreInput::Value)
}

/// Empty input counts as 0 hours and fails the minimum.
fn check_study_hours(
    errors: &mut FieldErrors,
    raw: &str,
) -> Option<u32> {
    let raw = raw.trim();
    let hours: i64 = if raw.is_empty() {
        0
    } else {
        match raw.parse() {
            Ok(h) => h,
            Err(_) => {
                errors.push(Field::StudyHours, "Study hours must be a whole number");
                return None;
            }
        }
    };

    if hours < STUDY_HOURS_MIN {
        errors.push(Field::StudyHours, "At least 1 hour required");
        None
    } else if hours > STUDY_HOURS_MAX {
        errors.push(Field::StudyHours, "Max 40 hours allowed");
        None
    } else {
        u32::try_from(hours).ok()
    }
}

/// Trims names, drops blanks and removes repeats, keeping first-seen order.
fn normalize_subjects(subjects: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(subjects.len());
    for subject in subjects {
        let subject = subject.trim();
        if !subject.is_empty() && !out.iter().any(|s| s == subject) {
            out.push(subject.to_string());
        }
    }
    out
}
