//! Committee admin routes.

use crate::{
    api::{AppState, extract::Session},
    core::{
        admins::{self, AdminRoleUpdate, NewAdmin},
        authz::{self, Requirement},
    },
    entities::{Permission, admin},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// An admin with its effective permissions.
#[derive(Debug, Serialize)]
pub struct AdminView {
    /// The admin row
    #[serde(flatten)]
    pub admin: admin::Model,
    /// Effective permission map
    pub permissions: BTreeMap<Permission, bool>,
}

/// `GET /api/admins/me`
pub async fn me(State(state): State<AppState>, session: Session) -> Result<Json<AdminView>> {
    let admin = session.require(&state, Requirement::AnyAdmin).await?;
    let permissions = authz::effective_permissions(state.db.as_ref(), &admin).await?;
    Ok(Json(AdminView { admin, permissions }))
}

/// `GET /api/admins`
pub async fn list(State(state): State<AppState>, session: Session) -> Result<Json<Vec<AdminView>>> {
    session.require(&state, Requirement::AnyAdmin).await?;

    let mut views = Vec::new();
    for admin in admins::list_admins(state.db.as_ref()).await? {
        let permissions = authz::effective_permissions(state.db.as_ref(), &admin).await?;
        views.push(AdminView { admin, permissions });
    }
    Ok(Json(views))
}

/// `POST /api/admins`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_admin): Json<NewAdmin>,
) -> Result<(StatusCode, Json<admin::Model>)> {
    session.require(&state, Requirement::SuperAdmin).await?;
    let created = admins::create_admin(state.db.as_ref(), new_admin).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/admins/:id`
pub async fn update_role(
    State(state): State<AppState>,
    session: Session,
    Path(admin_id): Path<i64>,
    Json(changes): Json<AdminRoleUpdate>,
) -> Result<Json<admin::Model>> {
    session.require(&state, Requirement::SuperAdmin).await?;
    Ok(Json(
        admins::update_admin_role(state.db.as_ref(), admin_id, changes).await?,
    ))
}

/// `PUT /api/admins/:id/permissions`
pub async fn set_permissions(
    State(state): State<AppState>,
    session: Session,
    Path(admin_id): Path<i64>,
    Json(raw): Json<BTreeMap<String, bool>>,
) -> Result<Json<BTreeMap<Permission, bool>>> {
    session.require(&state, Requirement::SuperAdmin).await?;
    let permissions = admins::parse_permission_map(&raw)?;
    admins::set_permissions(state.db.as_ref(), admin_id, &permissions).await?;

    let admin = admins::get_admin(state.db.as_ref(), admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin", admin_id))?;
    Ok(Json(authz::effective_permissions(state.db.as_ref(), &admin).await?))
}

/// `DELETE /api/admins/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(admin_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, Requirement::SuperAdmin).await?;
    admins::delete_admin(state.db.as_ref(), admin_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
