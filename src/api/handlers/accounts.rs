//! Registration, login and profile routes.

use crate::{
    api::{AppState, extract::Session},
    auth::Claims,
    core::{
        accounts::{self, Profile, ProfileUpdate, Registration},
        authz::Requirement,
        invites::{self, InvitePreview},
        pagination::{Page, PageRequest},
    },
    entities::user,
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Login form.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Password
    pub password: String,
    /// Issue a long-lived session
    #[serde(default, rename = "rememberMe")]
    pub remember_me: bool,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,
    /// Decoded claims
    pub user: Claims,
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<user::Model>)> {
    let created = accounts::register(state.db.as_ref(), registration).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let outcome = accounts::login(
        state.db.as_ref(),
        &state.config.session,
        &request.email,
        &request.password,
        request.remember_me,
    )
    .await?;
    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.claims,
    }))
}

/// `GET /api/auth/me`
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Json<Profile>> {
    Ok(Json(accounts::profile(state.db.as_ref(), session.email()).await?))
}

/// `PUT /api/auth/me`
pub async fn update_me(
    State(state): State<AppState>,
    session: Session,
    Json(changes): Json<ProfileUpdate>,
) -> Result<Json<user::Model>> {
    Ok(Json(
        accounts::update_profile(state.db.as_ref(), session.email(), changes).await?,
    ))
}

/// `GET /api/invites/token/:token`
pub async fn preview_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<InvitePreview>> {
    Ok(Json(invites::preview(state.db.as_ref(), &token).await?))
}

/// `GET /api/users`
pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Query(request): Query<PageRequest>,
) -> Result<Json<Page<user::Model>>> {
    session.require(&state, Requirement::AnyAdmin).await?;
    Ok(Json(accounts::list_users(state.db.as_ref(), request).await?))
}
