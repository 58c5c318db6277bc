//! Meeting minutes business logic.

use crate::{
    core::validation::required,
    entities::{MeetingMinute, meeting_minute},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Input for new minutes.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMinutes {
    /// Meeting title
    pub title: String,
    /// Day of the meeting
    pub meeting_date: NaiveDate,
    /// The notes
    pub content: String,
}

/// Changes to minutes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MinutesUpdate {
    /// New title
    pub title: Option<String>,
    /// New meeting date
    pub meeting_date: Option<NaiveDate>,
    /// New notes
    pub content: Option<String>,
}

/// Lists minutes, most recent meeting first.
pub async fn list_minutes(db: &DatabaseConnection) -> Result<Vec<meeting_minute::Model>> {
    MeetingMinute::find()
        .order_by_desc(meeting_minute::Column::MeetingDate)
        .order_by_desc(meeting_minute::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves minutes by id, failing when they do not exist.
pub async fn get_minutes(db: &DatabaseConnection, minutes_id: i64) -> Result<meeting_minute::Model> {
    MeetingMinute::find_by_id(minutes_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Meeting minutes", minutes_id))
}

/// Records minutes on behalf of `created_by`.
pub async fn create_minutes(
    db: &DatabaseConnection,
    new_minutes: NewMinutes,
    created_by: Option<i64>,
) -> Result<meeting_minute::Model> {
    let now = chrono::Utc::now();
    let minutes = meeting_minute::ActiveModel {
        title: Set(required("Title", &new_minutes.title)?),
        meeting_date: Set(new_minutes.meeting_date),
        content: Set(required("Content", &new_minutes.content)?),
        attachment_url: Set(None),
        attachment_key: Set(None),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = minutes.insert(db).await?;
    tracing::info!("Recorded minutes {} for {}", created.id, created.meeting_date);
    Ok(created)
}

/// Applies changes to minutes.
pub async fn update_minutes(
    db: &DatabaseConnection,
    minutes_id: i64,
    changes: MinutesUpdate,
) -> Result<meeting_minute::Model> {
    let existing = get_minutes(db, minutes_id).await?;

    let mut minutes: meeting_minute::ActiveModel = existing.into();
    if let Some(title) = changes.title {
        minutes.title = Set(required("Title", &title)?);
    }
    if let Some(meeting_date) = changes.meeting_date {
        minutes.meeting_date = Set(meeting_date);
    }
    if let Some(content) = changes.content {
        minutes.content = Set(required("Content", &content)?);
    }
    minutes.updated_at = Set(chrono::Utc::now());

    minutes.update(db).await.map_err(Into::into)
}

/// Records a new attachment and returns the key of the one it replaced.
pub async fn attach_file(
    db: &DatabaseConnection,
    minutes_id: i64,
    url: String,
    key: String,
) -> Result<(meeting_minute::Model, Option<String>)> {
    let existing = get_minutes(db, minutes_id).await?;
    let previous_key = existing.attachment_key.clone();

    let mut minutes: meeting_minute::ActiveModel = existing.into();
    minutes.attachment_url = Set(Some(url));
    minutes.attachment_key = Set(Some(key));
    minutes.updated_at = Set(chrono::Utc::now());

    let updated = minutes.update(db).await?;
    Ok((updated, previous_key))
}

/// Deletes minutes and returns them so any attachment can be discarded.
pub async fn delete_minutes(
    db: &DatabaseConnection,
    minutes_id: i64,
) -> Result<meeting_minute::Model> {
    let existing = get_minutes(db, minutes_id).await?;
    MeetingMinute::delete_by_id(minutes_id).exec(db).await?;
    tracing::info!("Deleted minutes {}", minutes_id);
    Ok(existing)
}
