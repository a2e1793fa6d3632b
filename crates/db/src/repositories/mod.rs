//! Repositories wrapping entity queries.

mod choice;
mod poll;
mod question;
mod session;
mod user;
mod user_form;

pub use choice::ChoiceRepository;
pub use poll::PollRepository;
pub use question::QuestionRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
pub use user_form::{NewAnswer, NewSubmission, UserFormRepository};
