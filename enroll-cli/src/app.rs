use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use enroll_core::flow::{EnrollmentFlow, FlowError, StepId, resolve_entry};
use enroll_core::submission::SimulatedSubmitter;
use enroll_core::validation::StepInput;
use enroll_core::{AnswerSlot, EnrollmentStore, PinDirectory, SlotRegistry};
use enroll_data::PinTableLoader;
use enroll_db_sqlite::SqliteSlotFactory;
use tracing::{debug, info};

use crate::cli::{AcademicArgs, AddressArgs, Command, StudentArgs};
use crate::config::EnrollConfig;

/// Build a registry with every backend compiled into this binary.
///
/// Adding a new backend is one extra `register` call here.
pub fn build_registry() -> SlotRegistry {
    let mut registry = SlotRegistry::with_builtin();
    registry.register(Box::new(SqliteSlotFactory));
    registry
}

async fn open_slot(config: &EnrollConfig) -> Result<Box<dyn AnswerSlot>> {
    debug!(backend = %config.storage.backend, "opening enrollment slot");
    build_registry()
        .create(&config.storage)
        .await
        .with_context(|| format!("Failed to open '{}' storage", config.storage.backend))
}

/// Opens the configured slot and wraps it in a session.
pub async fn open_flow(config: &EnrollConfig) -> Result<EnrollmentFlow> {
    let slot = open_slot(config).await?;
    let store = EnrollmentStore::open(slot)
        .await
        .context("Failed to load the stored enrollment")?;

    let pins = match &config.pins.table {
        Some(path) => PinTableLoader::load_from_file(path)
            .with_context(|| format!("Failed to load PIN table: {}", path.display()))?,
        None => PinDirectory::default(),
    };

    Ok(EnrollmentFlow::new(store)
        .with_academic_rules(config.validation)
        .with_pin_directory(pins))
}

/// Whether a command did what was asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// Validation failed or a guard redirected; nothing was stored.
    Rejected,
}

impl Outcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Done => ExitCode::SUCCESS,
            Outcome::Rejected => ExitCode::from(2),
        }
    }
}

/// Runs one command from a fresh process.
///
/// `reset` never reads the stored record, so it also recovers a record that
/// no longer loads. Every other command opens a session first.
pub async fn execute(
    command: Command,
    config: &EnrollConfig,
    out: &mut impl Write,
) -> Result<Outcome> {
    if let Command::Reset { purge } = command {
        return reset_record(config, purge, out).await;
    }
    let mut flow = open_flow(config).await?;
    run(command, &mut flow, config, out).await
}

async fn reset_record(
    config: &EnrollConfig,
    purge: bool,
    out: &mut impl Write,
) -> Result<Outcome> {
    let mut store = EnrollmentStore::detached(open_slot(config).await?);
    if purge {
        store.purge().await.context("Failed to delete the enrollment record")?;
        writeln!(out, "Enrollment record deleted.")?;
    } else {
        store.reset().await.context("Failed to reset the enrollment record")?;
        writeln!(out, "Enrollment record reset.")?;
    }
    Ok(Outcome::Done)
}

/// Runs one command against `flow`, writing user-facing output to `out`.
pub async fn run(
    command: Command,
    flow: &mut EnrollmentFlow,
    config: &EnrollConfig,
    out: &mut impl Write,
) -> Result<Outcome> {
    match command {
        Command::Student(args) => {
            fill_step(flow, StepId::Student, |input| apply_student(input, args), out).await
        }
        Command::Academic(args) => {
            fill_step(flow, StepId::Academic, |input| apply_academic(input, args), out).await
        }
        Command::Address(args) => {
            fill_step(flow, StepId::Address, |input| apply_address(input, args), out).await
        }
        Command::Subject { name } => toggle_subject(flow, &name, out).await,
        Command::Subjects => list_subjects(flow, out),
        Command::Status => status(flow, out),
        Command::Review => review(flow, out),
        Command::Submit => submit(flow, config, out).await,
        Command::Reset { purge } => {
            if purge {
                flow.discard().await?;
                writeln!(out, "Enrollment record deleted.")?;
            } else {
                flow.reset().await?;
                writeln!(out, "Enrollment record reset.")?;
            }
            Ok(Outcome::Done)
        }
    }
}

/// Reports redirects and validation failures as a rejected outcome; any
/// other flow error is a real failure.
fn report_flow_error(
    err: FlowError,
    out: &mut impl Write,
) -> Result<Outcome> {
    match err {
        FlowError::Redirected { requested, redirect } => {
            writeln!(
                out,
                "{} is not available yet. Complete {} ({}) first.",
                requested.route(),
                redirect.route(),
                redirect.label()
            )?;
            Ok(Outcome::Rejected)
        }
        FlowError::Validation(errors) => {
            writeln!(out, "Please fix the following:")?;
            for error in &errors {
                writeln!(out, "  {}: {}", error.field.key(), error.message)?;
            }
            Ok(Outcome::Rejected)
        }
        other => Err(other.into()),
    }
}

async fn fill_step(
    flow: &mut EnrollmentFlow,
    step: StepId,
    apply: impl FnOnce(&mut StepInput),
    out: &mut impl Write,
) -> Result<Outcome> {
    if let Err(err) = flow.enter_exact(step) {
        return report_flow_error(err, out);
    }
    let Some(mut input) = flow.draft_for(step) else {
        anyhow::bail!("{step} takes no input");
    };
    apply(&mut input);

    match flow.submit_step(input).await {
        Ok(next) => {
            writeln!(out, "{} saved. Next: {} ({}).", step.label(), next.route(), next.label())?;
            Ok(Outcome::Done)
        }
        Err(err) => report_flow_error(err, out),
    }
}

fn apply_student(
    input: &mut StepInput,
    args: StudentArgs,
) {
    let StepInput::Student(form) = input else {
        return;
    };
    overwrite(&mut form.full_name, args.name);
    overwrite(&mut form.email, args.email);
    overwrite(&mut form.mobile, args.mobile);
    overwrite(&mut form.grade, args.grade);
    overwrite(&mut form.board, args.board);
    overwrite(&mut form.language, args.language);
}

fn apply_academic(
    input: &mut StepInput,
    args: AcademicArgs,
) {
    let StepInput::Academic(form) = input else {
        return;
    };
    if !args.subjects.is_empty() {
        form.subjects = args.subjects;
    }
    if args.scholarship {
        form.is_scholarship = true;
    }
    if args.no_scholarship {
        form.is_scholarship = false;
    }
    overwrite(&mut form.exam_goal, args.goal);
    overwrite(&mut form.study_hours, args.hours);
    overwrite(&mut form.last_exam_score, args.score);
    overwrite(&mut form.achievements, args.achievements);
}

fn apply_address(
    input: &mut StepInput,
    args: AddressArgs,
) {
    let StepInput::Address(form) = input else {
        return;
    };
    overwrite(&mut form.pin_code, args.pin);
    overwrite(&mut form.city, args.city);
    overwrite(&mut form.state, args.state);
    overwrite(&mut form.address, args.address);
    overwrite(&mut form.guardian_name, args.guardian);
    overwrite(&mut form.guardian_mobile, args.guardian_mobile);
    overwrite(&mut form.payment_plan, args.plan);
    overwrite(&mut form.payment_mode, args.mode);
}

fn overwrite(
    field: &mut String,
    value: Option<String>,
) {
    if let Some(value) = value {
        *field = value;
    }
}

async fn toggle_subject(
    flow: &mut EnrollmentFlow,
    name: &str,
    out: &mut impl Write,
) -> Result<Outcome> {
    match flow.toggle_subject(name).await {
        Ok(selected) => {
            let verb = if selected { "Selected" } else { "Removed" };
            writeln!(out, "{verb} {}. Now: {}", name.trim(), flow.state().subjects.join(", "))?;
            Ok(Outcome::Done)
        }
        Err(err) => report_flow_error(err, out),
    }
}

fn list_subjects(
    flow: &EnrollmentFlow,
    out: &mut impl Write,
) -> Result<Outcome> {
    let Some(grade) = flow.state().grade else {
        return report_flow_error(
            FlowError::Redirected {
                requested: StepId::Academic,
                redirect: StepId::Student,
            },
            out,
        );
    };
    let selected = &flow.state().subjects;
    writeln!(
        out,
        "Class {grade} subjects (pick at least {}):",
        flow.academic_validator().min_subjects()
    )?;
    for subject in grade.available_subjects() {
        let mark = if selected.iter().any(|s| s == subject) { "x" } else { " " };
        writeln!(out, "  [{mark}] {subject}")?;
    }
    Ok(Outcome::Done)
}

fn status(
    flow: &mut EnrollmentFlow,
    out: &mut impl Write,
) -> Result<Outcome> {
    let reachable = resolve_entry(StepId::Review, flow.state());
    flow.enter(reachable)?;
    writeln!(
        out,
        "Next: {} ({}), step {} of {}, {:.0}% complete.",
        reachable.route(),
        reachable.label(),
        reachable.index() + 1,
        StepId::SEQUENCE.len(),
        flow.progress() * 100.0
    )?;
    Ok(Outcome::Done)
}

fn review(
    flow: &mut EnrollmentFlow,
    out: &mut impl Write,
) -> Result<Outcome> {
    if let Err(err) = flow.enter_exact(StepId::Review) {
        return report_flow_error(err, out);
    }
    write!(out, "{}", flow.review())?;
    Ok(Outcome::Done)
}

async fn submit(
    flow: &mut EnrollmentFlow,
    config: &EnrollConfig,
    out: &mut impl Write,
) -> Result<Outcome> {
    if let Err(err) = flow.enter_exact(StepId::Review) {
        return report_flow_error(err, out);
    }
    let submitter = SimulatedSubmitter::new(config.submission.delay());
    let receipt = flow
        .submit(&submitter)
        .await
        .context("Submission failed; your answers are still saved")?;
    info!(at = %receipt.submitted_at, "enrollment accepted");
    writeln!(out, "Enrollment submitted. {}", receipt.confirmation())?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::SubmissionConfig;
    use enroll_core::SlotConfig;

    fn memory_config() -> EnrollConfig {
        EnrollConfig {
            storage: SlotConfig {
                backend: "memory".to_string(),
                location: String::new(),
            },
            submission: SubmissionConfig { delay_ms: 1 },
            ..Default::default()
        }
    }

    async fn exec(
        flow: &mut EnrollmentFlow,
        command: Command,
    ) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = run(command, flow, &memory_config(), &mut out)
            .await
            .expect("command should not fail");
        (outcome, String::from_utf8(out).unwrap())
    }

    fn student() -> Command {
        Command::Student(StudentArgs {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            mobile: Some("9876543210".to_string()),
            grade: Some("10".to_string()),
            board: Some("CBSE".to_string()),
            language: Some("English".to_string()),
        })
    }

    #[test]
    fn registry_knows_every_backend() {
        assert_eq!(build_registry().available_backends(), vec!["file", "memory", "sqlite"]);
    }

    #[tokio::test]
    async fn step_before_prerequisite_is_rejected() {
        let mut flow = open_flow(&memory_config()).await.unwrap();

        let (outcome, text) = exec(&mut flow, Command::Address(AddressArgs::default())).await;

        assert_eq!(outcome, Outcome::Rejected);
        assert_eq!(
            text,
            "step-3 is not available yet. Complete step-1 (Student) first.\n"
        );
    }

    #[tokio::test]
    async fn validation_errors_are_listed_per_field() {
        let mut flow = open_flow(&memory_config()).await.unwrap();

        let (outcome, text) = exec(
            &mut flow,
            Command::Student(StudentArgs {
                name: Some("A".to_string()),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(outcome, Outcome::Rejected);
        assert!(text.contains("  fullName: Name must be at least 2 characters"));
        assert!(text.contains("  grade: Class is required"));
    }

    #[tokio::test]
    async fn subjects_toggle_then_academic_uses_selection() {
        let mut flow = open_flow(&memory_config()).await.unwrap();
        exec(&mut flow, student()).await;

        exec(&mut flow, Command::Subject { name: "Maths".to_string() }).await;
        exec(&mut flow, Command::Subject { name: "Science".to_string() }).await;
        let (_, listing) = exec(&mut flow, Command::Subjects).await;
        assert!(listing.contains("[x] Maths"));
        assert!(listing.contains("[ ] English"));

        let (outcome, text) = exec(
            &mut flow,
            Command::Academic(AcademicArgs {
                goal: Some("Concept Mastery".to_string()),
                hours: Some("8".to_string()),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(outcome, Outcome::Done, "{text}");
        assert_eq!(text, "Academic saved. Next: step-3 (Address).\n");
    }

    #[tokio::test]
    async fn full_run_through_submit() {
        let mut flow = open_flow(&memory_config()).await.unwrap();
        exec(&mut flow, student()).await;
        exec(
            &mut flow,
            Command::Academic(AcademicArgs {
                subjects: vec!["Maths".to_string(), "Science".to_string()],
                goal: Some("Board Excellence".to_string()),
                hours: Some("10".to_string()),
                ..Default::default()
            }),
        )
        .await;
        exec(
            &mut flow,
            Command::Address(AddressArgs {
                pin: Some("110001".to_string()),
                address: Some("221B Connaught Place".to_string()),
                guardian: Some("Ravi Rao".to_string()),
                guardian_mobile: Some("9123456780".to_string()),
                plan: Some("Annual".to_string()),
                mode: Some("UPI".to_string()),
                ..Default::default()
            }),
        )
        .await;

        let (_, status_text) = exec(&mut flow, Command::Status).await;
        assert_eq!(status_text, "Next: review (Review), step 4 of 4, 100% complete.\n");

        let (_, summary) = exec(&mut flow, Command::Review).await;
        assert!(summary.contains("221B Connaught Place, New Delhi - 110001"));

        let (outcome, text) = exec(&mut flow, Command::Submit).await;
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(
            text,
            "Enrollment submitted. We have sent a confirmation email to asha@example.com\n"
        );
        assert!(flow.state().is_pristine());
    }

    #[tokio::test]
    async fn submit_before_review_is_rejected() {
        let mut flow = open_flow(&memory_config()).await.unwrap();
        exec(&mut flow, student()).await;

        let (outcome, text) = exec(&mut flow, Command::Submit).await;

        assert_eq!(outcome, Outcome::Rejected);
        assert!(text.starts_with("review is not available yet. Complete step-2"));
    }
}
