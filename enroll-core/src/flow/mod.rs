pub mod guard;
pub mod session;
pub mod step;

pub use guard::{can_enter, missing_prerequisite, next_step, progress_fraction, resolve_entry};
pub use session::{EnrollmentFlow, FlowError, FlowStage};
pub use step::StepId;
