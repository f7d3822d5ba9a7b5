use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Multi-step student enrollment.
///
/// Each invocation runs one command against the stored enrollment record:
/// fill in a step, inspect progress, review, or submit.
#[derive(Debug, Parser)]
#[command(name = "enroll", version, about, long_about = None)]
pub struct Cli {
    /// Config file. Defaults to `enroll.toml` in the working directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: memory, file or sqlite.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Backend location: a directory for `file`, a database path for
    /// `sqlite` (or `:memory:`).
    #[arg(long, global = true)]
    pub location: Option<String>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Hide log output on the console (file logging is unaffected).
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Step 1: student details.
    Student(StudentArgs),
    /// Step 2: academic details.
    Academic(AcademicArgs),
    /// Step 3: address, guardian and payment.
    Address(AddressArgs),
    /// Select or deselect one subject in the stored selection.
    Subject {
        /// Subject name, e.g. "Physics".
        name: String,
    },
    /// List subjects offered for the stored class.
    Subjects,
    /// Show the next step and overall progress.
    Status,
    /// Print the review summary.
    Review,
    /// Submit the completed enrollment.
    Submit,
    /// Clear the enrollment record.
    Reset {
        /// Delete the stored record instead of resetting it to defaults.
        #[arg(long)]
        purge: bool,
    },
}

/// Flags left out keep their stored value.
#[derive(Debug, Clone, Default, Args)]
pub struct StudentArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    /// Class: 9, 10, 11 or 12.
    #[arg(long = "class")]
    pub grade: Option<String>,
    /// CBSE, ICSE or "State Board".
    #[arg(long)]
    pub board: Option<String>,
    #[arg(long)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AcademicArgs {
    /// Replaces the stored selection; repeat for each subject.
    #[arg(long = "subject")]
    pub subjects: Vec<String>,
    /// "Board Excellence", "Concept Mastery" or "Competitive Prep".
    #[arg(long)]
    pub goal: Option<String>,
    /// Weekly study hours, 1 to 40.
    #[arg(long)]
    pub hours: Option<String>,
    /// Apply for a scholarship.
    #[arg(long, conflicts_with = "no_scholarship")]
    pub scholarship: bool,
    /// Withdraw a scholarship application.
    #[arg(long)]
    pub no_scholarship: bool,
    /// Last exam percentage.
    #[arg(long)]
    pub score: Option<String>,
    #[arg(long)]
    pub achievements: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct AddressArgs {
    /// 6-digit PIN; known codes fill in city and state.
    #[arg(long)]
    pub pin: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub guardian: Option<String>,
    #[arg(long)]
    pub guardian_mobile: Option<String>,
    /// Quarterly, Half-Yearly or Annual.
    #[arg(long)]
    pub plan: Option<String>,
    /// UPI, Card or NetBanking.
    #[arg(long)]
    pub mode: Option<String>,
}
