mod choices;
mod enrollment;
mod step_data;

pub use choices::{Board, Choice, ExamGoal, Grade, Language, PaymentMode, PaymentPlan};
pub use enrollment::{EnrollmentAnswer, EnrollmentPatch, toggle_subject};
pub use step_data::{AcademicDetails, AddressDetails, StepData, StudentDetails};
