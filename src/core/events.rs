//! Event business logic - reunion activities and member RSVPs.

use crate::{
    core::validation::{optional, required},
    entities::{Event, Rsvp, event, rsvp, user},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set, TransactionTrait, prelude::*,
    sea_query::OnConflict,
};
use serde::{Deserialize, Serialize};

pub use crate::entities::RsvpStatus;

/// Input for a new event.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEvent {
    /// Event title
    pub title: String,
    /// Longer description
    #[serde(default)]
    pub description: Option<String>,
    /// Venue
    #[serde(default)]
    pub location: Option<String>,
    /// When it takes place
    pub event_date: DateTimeUtc,
}

/// Changes to an event; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New venue
    pub location: Option<String>,
    /// New date
    pub event_date: Option<DateTimeUtc>,
}

/// Tally of answers for one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RsvpCounts {
    /// Attending
    pub going: u64,
    /// Undecided
    pub maybe: u64,
    /// Not attending
    pub not_going: u64,
}

impl RsvpCounts {
    fn record(&mut self, status: RsvpStatus) {
        match status {
            RsvpStatus::Going => self.going += 1,
            RsvpStatus::Maybe => self.maybe += 1,
            RsvpStatus::NotGoing => self.not_going += 1,
        }
    }
}

/// An event with its RSVP tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// The event
    #[serde(flatten)]
    pub event: event::Model,
    /// Answers so far
    pub counts: RsvpCounts,
}

/// One RSVP together with who gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attendee {
    /// The RSVP row
    #[serde(flatten)]
    pub rsvp: rsvp::Model,
    /// The member's name
    pub full_name: Option<String>,
    /// The member's email
    pub email: Option<String>,
}

/// Lists events in date order with their RSVP counts.
pub async fn list_events(db: &DatabaseConnection) -> Result<Vec<EventSummary>> {
    let events = Event::find()
        .order_by_asc(event::Column::EventDate)
        .order_by_asc(event::Column::Id)
        .find_with_related(Rsvp)
        .all(db)
        .await?;

    Ok(events
        .into_iter()
        .map(|(event, rsvps)| {
            let mut counts = RsvpCounts::default();
            for answer in rsvps {
                counts.record(answer.status);
            }
            EventSummary { event, counts }
        })
        .collect())
}

/// Retrieves an event by id.
pub async fn get_event<C>(db: &C, event_id: i64) -> Result<Option<event::Model>>
where
    C: ConnectionTrait,
{
    Event::find_by_id(event_id).one(db).await.map_err(Into::into)
}

async fn require_event<C>(db: &C, event_id: i64) -> Result<event::Model>
where
    C: ConnectionTrait,
{
    get_event(db, event_id)
        .await?
        .ok_or_else(|| Error::not_found("Event", event_id))
}

/// Creates an event.
pub async fn create_event(db: &DatabaseConnection, new_event: NewEvent) -> Result<event::Model> {
    let event = event::ActiveModel {
        title: Set(required("Title", &new_event.title)?),
        description: Set(optional(new_event.description)),
        location: Set(optional(new_event.location)),
        event_date: Set(new_event.event_date),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = event.insert(db).await?;
    tracing::info!("Created event {} ({})", created.id, created.title);
    Ok(created)
}

/// Applies changes to an event.
pub async fn update_event(
    db: &DatabaseConnection,
    event_id: i64,
    changes: EventUpdate,
) -> Result<event::Model> {
    let existing = require_event(db, event_id).await?;

    let mut event: event::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        event.title = Set(required("Title", &title)?);
    }
    if let Some(description) = changes.description {
        event.description = Set(optional(Some(description)));
    }
    if let Some(location) = changes.location {
        event.location = Set(optional(Some(location)));
    }
    if let Some(event_date) = changes.event_date {
        event.event_date = Set(event_date);
    }

    event.update(db).await.map_err(Into::into)
}

/// Deletes an event together with its RSVPs.
pub async fn delete_event(db: &DatabaseConnection, event_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    require_event(&txn, event_id).await?;

    let removed = Rsvp::delete_many()
        .filter(rsvp::Column::EventId.eq(event_id))
        .exec(&txn)
        .await?;
    Event::delete_by_id(event_id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Deleted event {} and {} RSVPs",
        event_id,
        removed.rows_affected
    );
    Ok(())
}

/// Records a member's answer, replacing any earlier one.
pub async fn rsvp(
    db: &DatabaseConnection,
    event_id: i64,
    user_id: i64,
    status: RsvpStatus,
) -> Result<rsvp::Model> {
    require_event(db, event_id).await?;

    let answer = rsvp::ActiveModel {
        event_id: Set(event_id),
        user_id: Set(user_id),
        status: Set(status),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    Rsvp::insert(answer)
        .on_conflict(
            OnConflict::columns([rsvp::Column::EventId, rsvp::Column::UserId])
                .update_columns([rsvp::Column::Status, rsvp::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Rsvp::find()
        .filter(rsvp::Column::EventId.eq(event_id))
        .filter(rsvp::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("RSVP", format!("{event_id}/{user_id}")))
}

/// Lists who answered for an event.
pub async fn list_rsvps(db: &DatabaseConnection, event_id: i64) -> Result<Vec<Attendee>> {
    require_event(db, event_id).await?;

    let rows = Rsvp::find()
        .filter(rsvp::Column::EventId.eq(event_id))
        .order_by_desc(rsvp::Column::UpdatedAt)
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(rsvp, member)| Attendee {
            full_name: member.as_ref().map(|m| m.full_name.clone()),
            email: member.map(|m| m.email),
            rsvp,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::TimeZone;

    fn homecoming() -> NewEvent {
        NewEvent {
            title: "Homecoming Dinner".to_string(),
            description: None,
            location: Some("Main Hall".to_string()),
            event_date: chrono::Utc
                .with_ymd_and_hms(2025, 12, 20, 18, 0, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn test_rsvp_is_idempotent_upsert() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_event(&db, homecoming()).await?;
        let user = create_test_user(&db, "uno@example.org").await?;

        rsvp(&db, event.id, user.id, RsvpStatus::Going).await?;
        rsvp(&db, event.id, user.id, RsvpStatus::Going).await?;
        let latest = rsvp(&db, event.id, user.id, RsvpStatus::Maybe).await?;
        assert_eq!(latest.status, RsvpStatus::Maybe);

        let rows = Rsvp::find()
            .filter(rsvp::Column::EventId.eq(event.id))
            .all(&db)
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, RsvpStatus::Maybe);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_events_counts_answers() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_event(&db, homecoming()).await?;
        let uno = create_test_user(&db, "uno@example.org").await?;
        let dos = create_test_user(&db, "dos@example.org").await?;
        let tres = create_test_user(&db, "tres@example.org").await?;

        rsvp(&db, event.id, uno.id, RsvpStatus::Going).await?;
        rsvp(&db, event.id, dos.id, RsvpStatus::Going).await?;
        rsvp(&db, event.id, tres.id, RsvpStatus::NotGoing).await?;

        let summaries = list_events(&db).await?;
        assert_eq!(summaries.len(), 1);
        assert_eq!(
            summaries[0].counts,
            RsvpCounts {
                going: 2,
                maybe: 0,
                not_going: 1
            }
        );

        let attendees = list_rsvps(&db, event.id).await?;
        assert_eq!(attendees.len(), 3);
        assert!(attendees.iter().all(|a| a.email.is_some()));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_event_cascades_rsvps() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_event(&db, homecoming()).await?;
        let user = create_test_user(&db, "uno@example.org").await?;
        rsvp(&db, event.id, user.id, RsvpStatus::Going).await?;

        delete_event(&db, event.id).await?;
        assert!(get_event(&db, event.id).await?.is_none());
        assert_eq!(Rsvp::find().all(&db).await?.len(), 0);

        let again = delete_event(&db, event.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_rsvp_unknown_event() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "uno@example.org").await?;

        let result = rsvp(&db, 42, user.id, RsvpStatus::Going).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_event_rejects_blank_title() -> Result<()> {
        let db = setup_test_db().await?;
        let event = create_event(&db, homecoming()).await?;

        let blank = update_event(
            &db,
            event.id,
            EventUpdate {
                title: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let moved = update_event(
            &db,
            event.id,
            EventUpdate {
                location: Some("Gymnasium".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(moved.location.as_deref(), Some("Gymnasium"));
        assert_eq!(moved.title, "Homecoming Dinner");

        Ok(())
    }
}
