//! Announcement routes.

use crate::{
    api::{AppState, extract::Session},
    core::{
        accounts,
        announcements::{self, NewAnnouncement},
        authz::Requirement,
        pagination::{Page, PageRequest},
    },
    entities::{Permission, announcement},
    errors::Result,
    services::{OutgoingMail, dispatch},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

const SEND: Requirement = Requirement::Permission(Permission::AnnouncementsSend);

/// `GET /api/announcements`
pub async fn list(
    State(state): State<AppState>,
    _session: Session,
    Query(request): Query<PageRequest>,
) -> Result<Json<Page<announcement::Model>>> {
    Ok(Json(
        announcements::list_announcements(state.db.as_ref(), request).await?,
    ))
}

/// `POST /api/announcements`
///
/// With `send_email`, every registered member gets a copy in the background.
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_announcement): Json<NewAnnouncement>,
) -> Result<(StatusCode, Json<announcement::Model>)> {
    let admin = session.require(&state, SEND).await?;
    let created =
        announcements::create_announcement(state.db.as_ref(), &new_announcement, Some(admin.id)).await?;

    if new_announcement.send_email {
        let recipients = accounts::all_user_emails(state.db.as_ref()).await?;
        tracing::info!(
            "Mailing announcement {} to {} member(s)",
            created.id,
            recipients.len()
        );
        for email in recipients {
            dispatch(
                &state.mailer,
                OutgoingMail::announcement(&email, &created.title, &created.body),
            );
        }
    }

    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/announcements/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(announcement_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, SEND).await?;
    announcements::delete_announcement(state.db.as_ref(), announcement_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_post_and_read_announcements() -> Result<()> {
        let (state, _dir) = test_state().await?;
        create_test_admin(state.db.as_ref(), "chair@example.org", true).await?;
        create_test_user(state.db.as_ref(), "uno@example.org").await?;
        let chair = session_token(&state, "chair@example.org");
        let member = session_token(&state, "uno@example.org");

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/announcements",
            Some(&chair),
            Some(json!({
                "title": "Venue confirmed",
                "body": "See you at the Main Hall.",
                "send_email": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, page) = call(
            &state,
            Method::GET,
            "/api/announcements?per_page=5",
            Some(&member),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["total"], 1);
        assert_eq!(page["per_page"], 5);
        assert_eq!(page["items"][0]["title"], "Venue confirmed");

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/announcements",
            Some(&member),
            Some(json!({ "title": "Spam", "body": "Spam" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        Ok(())
    }
}
