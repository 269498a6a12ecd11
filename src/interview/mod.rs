//! Interview: transcript model, state machine and the controller driving it.

pub mod controller;
pub mod model;
pub mod prompts;
pub mod state;

pub use controller::InterviewController;
pub use model::{ConversationMessage, InterviewSession, MessageRole, SessionStatus};
pub use state::InterviewPhase;
