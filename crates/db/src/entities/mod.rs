//! Database entities.

pub mod choice;
pub mod poll;
pub mod question;
pub mod session;
pub mod user;
pub mod user_answer;
pub mod user_answer_choice;
pub mod user_form;

pub use choice::Entity as Choice;
pub use poll::Entity as Poll;
pub use question::Entity as Question;
pub use session::Entity as Session;
pub use user::Entity as User;
pub use user_answer::Entity as UserAnswer;
pub use user_answer_choice::Entity as UserAnswerChoice;
pub use user_form::Entity as UserForm;
