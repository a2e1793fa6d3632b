//! Request extractors.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use survey_common::{AppError, SessionKey, config::PaginationConfig};
use survey_core::{Caller, PageRequest};
use survey_db::entities::user;

/// Signed-in user, if the request carried a valid bearer token.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl MaybeAuthUser {
    /// Access-control view of the caller.
    #[must_use]
    pub const fn caller(&self) -> Caller {
        Caller::from_user(self.0.as_ref())
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// `?limit=&offset=` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl PageParams {
    /// Resolve against the configured page sizes.
    #[must_use]
    pub fn resolve(&self, config: &PaginationConfig) -> PageRequest {
        PageRequest {
            limit: config.clamp(self.limit),
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Read the session key carried by the request's cookie.
#[must_use]
pub fn session_key(jar: &CookieJar, cookie_name: &str) -> Option<SessionKey> {
    jar.get(cookie_name)
        .and_then(|cookie| SessionKey::new(cookie.value()))
}
