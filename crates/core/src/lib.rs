//! Core business logic for survey-rs.

pub mod access;
pub mod services;

pub use access::{
    Caller, Operation, Policy, PollVisibility, SubmissionScope, authorize, poll_visibility,
    submission_scope,
};
pub use services::*;
