pub mod submit_contact;

pub use submit_contact::{FlowState, SubmissionOutcome, SubmitContactUseCase};
