//! Meeting minutes routes.

use crate::{
    api::{AppState, extract::Session, handlers::UploadQuery},
    core::{
        authz::Requirement,
        minutes::{self, MinutesUpdate, NewMinutes},
    },
    entities::{Permission, meeting_minute},
    errors::Result,
    services::discard,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};

const VIEW: Requirement = Requirement::Permission(Permission::MinutesView);
const EDIT: Requirement = Requirement::Permission(Permission::MinutesEdit);

/// `GET /api/minutes`
pub async fn list(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<meeting_minute::Model>>> {
    session.require(&state, VIEW).await?;
    Ok(Json(minutes::list_minutes(state.db.as_ref()).await?))
}

/// `GET /api/minutes/:id`
pub async fn get(
    State(state): State<AppState>,
    session: Session,
    Path(minutes_id): Path<i64>,
) -> Result<Json<meeting_minute::Model>> {
    session.require(&state, VIEW).await?;
    Ok(Json(minutes::get_minutes(state.db.as_ref(), minutes_id).await?))
}

/// `POST /api/minutes`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_minutes): Json<NewMinutes>,
) -> Result<(StatusCode, Json<meeting_minute::Model>)> {
    let admin = session.require(&state, EDIT).await?;
    let created = minutes::create_minutes(state.db.as_ref(), new_minutes, Some(admin.id)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/minutes/:id`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(minutes_id): Path<i64>,
    Json(changes): Json<MinutesUpdate>,
) -> Result<Json<meeting_minute::Model>> {
    session.require(&state, EDIT).await?;
    Ok(Json(
        minutes::update_minutes(state.db.as_ref(), minutes_id, changes).await?,
    ))
}

/// `POST /api/minutes/:id/attachment?filename=...`
pub async fn upload_attachment(
    State(state): State<AppState>,
    session: Session,
    Path(minutes_id): Path<i64>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<meeting_minute::Model>> {
    session.require(&state, EDIT).await?;
    minutes::get_minutes(state.db.as_ref(), minutes_id).await?;

    let stored = state
        .storage
        .put("minutes", query.file_name(), &body)
        .await?;
    match minutes::attach_file(state.db.as_ref(), minutes_id, stored.url, stored.key.clone()).await {
        Ok((updated, previous)) => {
            discard(&state.storage, previous.as_deref()).await;
            Ok(Json(updated))
        }
        Err(e) => {
            discard(&state.storage, Some(&stored.key)).await;
            Err(e)
        }
    }
}

/// `DELETE /api/minutes/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(minutes_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, EDIT).await?;
    let deleted = minutes::delete_minutes(state.db.as_ref(), minutes_id).await?;
    discard(&state.storage, deleted.attachment_key.as_deref()).await;
    Ok(StatusCode::NO_CONTENT)
}
