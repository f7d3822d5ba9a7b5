//! Read-only summary shown on the review step.

use std::fmt;

use serde::Serialize;

use crate::flow::StepId;
use crate::models::EnrollmentAnswer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub label: &'static str,
    pub value: String,
}

/// One block of the summary, editable through `step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSection {
    pub title: &'static str,
    pub step: StepId,
    pub rows: Vec<ReviewRow>,
}

impl ReviewSection {
    fn new(
        title: &'static str,
        step: StepId,
    ) -> Self {
        Self {
            title,
            step,
            rows: Vec::new(),
        }
    }

    /// Adds a row unless the value is absent or blank.
    fn row(
        mut self,
        label: &'static str,
        value: Option<String>,
    ) -> Self {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            self.rows.push(ReviewRow { label, value });
        }
        self
    }

    pub fn value_of(
        &self,
        label: &str,
    ) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub sections: Vec<ReviewSection>,
}

impl ReviewSummary {
    pub fn from_answer(answer: &EnrollmentAnswer) -> Self {
        let student = ReviewSection::new("Student Details", StepId::Student)
            .row("Name", answer.full_name.clone())
            .row("Email", answer.email.clone())
            .row("Mobile", answer.mobile.clone())
            .row("Class", answer.grade.map(|g| g.to_string()))
            .row("Board", answer.board.map(|b| b.to_string()));

        let academic = ReviewSection::new("Academic Details", StepId::Academic)
            .row("Subjects", Some(answer.subjects.join(", ")))
            .row("Goal", answer.exam_goal.map(|g| g.to_string()))
            .row("Study Hours", answer.study_hours.map(|h| h.to_string()))
            .row(
                "Scholarship",
                Some(if answer.is_scholarship { "Yes" } else { "No" }.to_string()),
            );

        let address = ReviewSection::new("Address & Guardian", StepId::Address)
            .row("Address", address_line(answer))
            .row("Guardian", answer.guardian_name.clone())
            .row("Guardian Mobile", answer.guardian_mobile.clone())
            .row("Plan", answer.payment_plan.map(|p| p.to_string()));

        Self {
            sections: vec![student, academic, address],
        }
    }

    pub fn section(
        &self,
        step: StepId,
    ) -> Option<&ReviewSection> {
        self.sections.iter().find(|s| s.step == step)
    }
}

/// `<address>, <city> - <pin>`, skipping whichever parts are missing.
fn address_line(answer: &EnrollmentAnswer) -> Option<String> {
    let street = answer.address.as_deref()?;
    let mut line = street.to_string();
    if let Some(city) = answer.city.as_deref() {
        line.push_str(", ");
        line.push_str(city);
    }
    if let Some(pin) = answer.pin_code.as_deref() {
        line.push_str(" - ");
        line.push_str(pin);
    }
    Some(line)
}

impl fmt::Display for ReviewSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{} (edit: {})", section.title, section.step.route())?;
            for row in &section.rows {
                writeln!(f, "  {:<16} {}", format!("{}:", row.label), row.value)?;
            }
        }
        Ok(())
    }
}
