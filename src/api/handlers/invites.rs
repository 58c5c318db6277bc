//! Invite routes.

use crate::{
    api::{AppState, extract::Session},
    core::{
        authz::Requirement,
        invites::{self, NewInvite},
    },
    entities::{Permission, invite},
    errors::Result,
    services::{OutgoingMail, dispatch},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Body of a link request; `null` clears the link.
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    /// Master-list entry to link
    pub master_list_id: Option<i64>,
}

/// Outcome of deleting an invite.
#[derive(Debug, Serialize)]
pub struct DeletedInvite {
    /// Whether an admin sharing the email was removed
    pub admin_removed: bool,
}

fn registration_link(state: &AppState, token: &str) -> String {
    format!(
        "{}/register?token={token}",
        state.config.server.public_base_url.trim_end_matches('/')
    )
}

/// `GET /api/invites`
pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<invite::Model>>> {
    session.require(&state, Requirement::AnyAdmin).await?;
    Ok(Json(invites::list_invites(state.db.as_ref()).await?))
}

/// `POST /api/invites`
///
/// The invite email is sent in the background after the row is stored.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_invite): Json<NewInvite>,
) -> Result<(StatusCode, Json<invite::Model>)> {
    let admin = session
        .require(&state, Requirement::Permission(Permission::InvitesAdd))
        .await?;
    let created = invites::create_invite(state.db.as_ref(), new_invite, Some(admin.id)).await?;

    dispatch(
        &state.mailer,
        OutgoingMail::invite(
            &created.email,
            created.name.as_deref(),
            &registration_link(&state, &created.token),
        ),
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/invites/:id/link`
pub async fn link(
    State(state): State<AppState>,
    session: Session,
    Path(invite_id): Path<i64>,
    Json(request): Json<LinkRequest>,
) -> Result<Json<invite::Model>> {
    session
        .require(&state, Requirement::Permission(Permission::InvitesLink))
        .await?;
    Ok(Json(
        invites::link_invite(state.db.as_ref(), invite_id, request.master_list_id).await?,
    ))
}

/// `DELETE /api/invites/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(invite_id): Path<i64>,
) -> Result<Json<DeletedInvite>> {
    session
        .require(&state, Requirement::Permission(Permission::InvitesAdd))
        .await?;
    let admin_removed = invites::delete_invite(state.db.as_ref(), invite_id).await?;
    Ok(Json(DeletedInvite { admin_removed }))
}
