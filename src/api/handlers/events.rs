//! Event and RSVP routes.

use crate::{
    api::{AppState, extract::Session},
    core::{
        authz::Requirement,
        events::{self, Attendee, EventSummary, EventUpdate, NewEvent, RsvpStatus},
    },
    entities::{Permission, event, rsvp},
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

const MANAGE: Requirement = Requirement::Permission(Permission::EventsManage);

/// Body of an RSVP.
#[derive(Debug, Deserialize)]
pub struct RsvpRequest {
    /// The member's answer
    pub status: RsvpStatus,
}

/// `GET /api/events`
pub async fn list(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<Vec<EventSummary>>> {
    Ok(Json(events::list_events(state.db.as_ref()).await?))
}

/// `POST /api/events`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_event): Json<NewEvent>,
) -> Result<(StatusCode, Json<event::Model>)> {
    session.require(&state, MANAGE).await?;
    let created = events::create_event(state.db.as_ref(), new_event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/events/:id`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i64>,
    Json(changes): Json<EventUpdate>,
) -> Result<Json<event::Model>> {
    session.require(&state, MANAGE).await?;
    Ok(Json(events::update_event(state.db.as_ref(), event_id, changes).await?))
}

/// `DELETE /api/events/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, MANAGE).await?;
    events::delete_event(state.db.as_ref(), event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/events/:id/rsvp`
pub async fn rsvp(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i64>,
    Json(request): Json<RsvpRequest>,
) -> Result<Json<rsvp::Model>> {
    let member = session.member(&state).await?.ok_or_else(|| Error::Forbidden {
        message: "Only registered members can RSVP".to_string(),
    })?;
    Ok(Json(
        events::rsvp(state.db.as_ref(), event_id, member.id, request.status).await?,
    ))
}

/// `GET /api/events/:id/rsvps`
pub async fn list_rsvps(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<Attendee>>> {
    session.require(&state, Requirement::AnyAdmin).await?;
    Ok(Json(events::list_rsvps(state.db.as_ref(), event_id).await?))
}
