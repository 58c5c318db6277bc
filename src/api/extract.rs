//! Request extractors.

use crate::{
    api::AppState,
    auth::{Claims, token},
    core::{
        accounts,
        authz::{self, Requirement},
    },
    entities::{admin, user},
    errors::{Error, Result},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// An authenticated principal, decoded from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct Session(pub Claims);

impl Session {
    /// Email the session belongs to.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Resolves `requirement` against the store and returns the acting admin.
    pub async fn require(&self, state: &AppState, requirement: Requirement) -> Result<admin::Model> {
        authz::require(state.db.as_ref(), self.email(), requirement).await
    }

    /// The member profile behind the session, if the principal registered.
    pub async fn member(&self, state: &AppState) -> Result<Option<user::Model>> {
        accounts::find_user_by_email(state.db.as_ref(), self.email()).await
    }
}

fn bearer(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer(parts).ok_or(Error::Unauthorized)?;
        let claims = token::verify(
            state.config.session.secret.as_bytes(),
            token,
            chrono::Utc::now().timestamp(),
        )?;
        Ok(Self(claims))
    }
}
