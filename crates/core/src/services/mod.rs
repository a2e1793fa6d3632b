//! Business logic services.

#![allow(missing_docs)]

pub mod choice;
pub mod poll;
pub mod question;
pub mod session;
pub mod submission;
pub mod user;

pub use choice::{ChoiceService, CreateChoiceInput, UpdateChoiceInput};
pub use poll::{CreatePollInput, PollDetail, PollService, UpdatePollInput};
pub use question::{CreateQuestionInput, QuestionDetail, QuestionService, UpdateQuestionInput};
pub use session::SessionService;
pub use submission::{
    Answer, AnswerRecord, ProposedAnswer, SubmissionService, SubmitInput, UserFormDetail,
    validate_answer,
};
pub use user::{SigninInput, UserService};

use serde::Serialize;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Number of items matching the listing, across all pages.
    pub count: u64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// A page with nothing on it.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }

    /// Convert every item, keeping the count.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

/// Offset pagination resolved against the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}
