pub mod flow;
pub mod models;
pub mod pins;
pub mod review;
pub mod store;
pub mod submission;
pub mod validation;

pub use flow::{EnrollmentFlow, FlowError, FlowStage, StepId};
pub use models::*;
pub use pins::{PinDirectory, PinLocation};
pub use review::{ReviewRow, ReviewSection, ReviewSummary};
pub use store::{AnswerSlot, EnrollmentStore, SlotConfig, SlotFactory, SlotRegistry, StoreError};
pub use submission::{SimulatedSubmitter, SubmissionError, SubmissionReceipt, Submitter};
pub use validation::{FieldErrors, StepInput, validate_step};
