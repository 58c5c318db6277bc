//! Class roster routes.

use crate::{
    api::{AppState, extract::Session},
    core::{
        authz::Requirement,
        masterlist::{self, DeletedEntry, EntryUpdate, EntryWithPayment, NewEntry, Promotion},
    },
    entities::{Permission, admin, master_list},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

const EDIT: Requirement = Requirement::Permission(Permission::MasterlistEdit);

/// `GET /api/masterlist`
pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<EntryWithPayment>>> {
    session.require(&state, Requirement::AnyAdmin).await?;
    Ok(Json(
        masterlist::list_with_payments(state.db.as_ref(), &state.config.ledger).await?,
    ))
}

/// `POST /api/masterlist`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_entry): Json<NewEntry>,
) -> Result<(StatusCode, Json<master_list::Model>)> {
    session.require(&state, EDIT).await?;
    let created = masterlist::create_entry(state.db.as_ref(), new_entry).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/masterlist/:id`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(entry_id): Path<i64>,
    Json(changes): Json<EntryUpdate>,
) -> Result<Json<master_list::Model>> {
    session.require(&state, EDIT).await?;
    Ok(Json(
        masterlist::update_entry(state.db.as_ref(), entry_id, changes).await?,
    ))
}

/// `DELETE /api/masterlist/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(entry_id): Path<i64>,
) -> Result<Json<DeletedEntry>> {
    session.require(&state, EDIT).await?;
    Ok(Json(masterlist::delete_entry(state.db.as_ref(), entry_id).await?))
}

/// `POST /api/masterlist/:id/promote`
pub async fn promote(
    State(state): State<AppState>,
    session: Session,
    Path(entry_id): Path<i64>,
    Json(promotion): Json<Promotion>,
) -> Result<Json<admin::Model>> {
    session.require(&state, Requirement::SuperAdmin).await?;
    Ok(Json(
        masterlist::promote(state.db.as_ref(), entry_id, promotion).await?,
    ))
}

/// `POST /api/masterlist/:id/demote`
pub async fn demote(
    State(state): State<AppState>,
    session: Session,
    Path(entry_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, Requirement::SuperAdmin).await?;
    masterlist::demote(state.db.as_ref(), entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
