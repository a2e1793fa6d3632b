//! Access control for poll content and submissions.
//!
//! Every check here is a pure function of the caller and the operation.

use chrono::{DateTime, Utc};
use survey_common::{AppError, AppResult, SessionKey};
use survey_db::entities::user;

/// Who is making a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller {
    pub is_authenticated: bool,
    pub is_admin: bool,
}

impl Caller {
    /// A caller without credentials.
    pub const ANONYMOUS: Self = Self {
        is_authenticated: false,
        is_admin: false,
    };

    /// Derive the caller from the signed-in user, if any.
    #[must_use]
    pub const fn from_user(user: Option<&user::Model>) -> Self {
        match user {
            Some(user) => Self {
                is_authenticated: true,
                is_admin: user.is_admin,
            },
            None => Self::ANONYMOUS,
        }
    }
}

/// What the caller wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Whether the operation leaves stored data untouched.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::Read)
    }
}

/// Access policy attached to an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Reads are open, writes need an administrator.
    AdminOrReadOnly,
    /// Everything needs an administrator.
    AdminOnly,
    /// Anyone may submit; listings are narrowed by [`submission_scope`].
    SubmitOrOwnRead,
}

/// Check whether `caller` may perform `op` under `policy`.
pub fn authorize(policy: Policy, caller: Caller, op: Operation) -> AppResult<()> {
    let allowed = match policy {
        Policy::AdminOrReadOnly => op.is_safe() || caller.is_admin,
        Policy::AdminOnly => caller.is_admin,
        Policy::SubmitOrOwnRead => true,
    };

    if allowed {
        Ok(())
    } else {
        tracing::debug!(?policy, ?op, ?caller, "Access denied");
        Err(AppError::Unauthorized)
    }
}

/// Which polls a caller can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollVisibility {
    All,
    /// Only polls whose `[start_date, end_date]` window contains the instant.
    ActiveAt(DateTime<Utc>),
}

impl PollVisibility {
    /// The instant to filter on, if any.
    #[must_use]
    pub const fn active_at(self) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::ActiveAt(now) => Some(now),
        }
    }
}

/// Administrators see every poll, everyone else only the active ones.
#[must_use]
pub const fn poll_visibility(caller: Caller, now: DateTime<Utc>) -> PollVisibility {
    if caller.is_admin {
        PollVisibility::All
    } else {
        PollVisibility::ActiveAt(now)
    }
}

/// Which submissions a caller can list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionScope {
    All,
    Session(SessionKey),
    /// No session yet, so no submissions of its own.
    Nothing,
}

/// Administrators see every submission, a session sees its own.
#[must_use]
pub fn submission_scope(caller: Caller, session: Option<&SessionKey>) -> SubmissionScope {
    if caller.is_admin {
        return SubmissionScope::All;
    }
    session.map_or(SubmissionScope::Nothing, |key| {
        SubmissionScope::Session(key.clone())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ADMIN: Caller = Caller {
        is_authenticated: true,
        is_admin: true,
    };
    const STAFF: Caller = Caller {
        is_authenticated: true,
        is_admin: false,
    };
    const WRITES: [Operation; 3] = [Operation::Create, Operation::Update, Operation::Delete];

    #[test]
    fn test_admin_or_read_only_allows_reads_for_everyone() {
        for caller in [Caller::ANONYMOUS, STAFF, ADMIN] {
            assert!(authorize(Policy::AdminOrReadOnly, caller, Operation::Read).is_ok());
        }
    }

    #[test]
    fn test_admin_or_read_only_rejects_non_admin_writes() {
        for caller in [Caller::ANONYMOUS, STAFF] {
            for op in WRITES {
                let result = authorize(Policy::AdminOrReadOnly, caller, op);
                assert!(matches!(result, Err(AppError::Unauthorized)));
            }
        }
        for op in WRITES {
            assert!(authorize(Policy::AdminOrReadOnly, ADMIN, op).is_ok());
        }
    }

    #[test]
    fn test_admin_only_rejects_even_reads() {
        assert!(authorize(Policy::AdminOnly, STAFF, Operation::Read).is_err());
        assert!(authorize(Policy::AdminOnly, Caller::ANONYMOUS, Operation::Create).is_err());
        assert!(authorize(Policy::AdminOnly, ADMIN, Operation::Create).is_ok());
    }

    #[test]
    fn test_submission_policy_is_open() {
        assert!(authorize(Policy::SubmitOrOwnRead, Caller::ANONYMOUS, Operation::Create).is_ok());
        assert!(authorize(Policy::SubmitOrOwnRead, Caller::ANONYMOUS, Operation::Read).is_ok());
    }

    #[test]
    fn test_poll_visibility() {
        let now = Utc::now();
        assert_eq!(poll_visibility(ADMIN, now), PollVisibility::All);
        assert_eq!(poll_visibility(STAFF, now), PollVisibility::ActiveAt(now));
        assert_eq!(
            poll_visibility(Caller::ANONYMOUS, now).active_at(),
            Some(now)
        );
    }

    #[test]
    fn test_submission_scope() {
        let key = SessionKey::new("abc").unwrap();

        assert_eq!(submission_scope(ADMIN, None), SubmissionScope::All);
        assert_eq!(submission_scope(ADMIN, Some(&key)), SubmissionScope::All);
        assert_eq!(
            submission_scope(Caller::ANONYMOUS, Some(&key)),
            SubmissionScope::Session(key)
        );
        assert_eq!(
            submission_scope(Caller::ANONYMOUS, None),
            SubmissionScope::Nothing
        );
    }

    #[test]
    fn test_caller_from_user() {
        assert_eq!(Caller::from_user(None), Caller::ANONYMOUS);
    }
}
