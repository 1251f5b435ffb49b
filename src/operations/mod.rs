pub mod deletion;
pub mod interactive;
pub mod prompt;

pub use deletion::{DeleteOutcome, DeletionController, DeletionSummary};
pub use interactive::Decision;
pub use prompt::confirm;
