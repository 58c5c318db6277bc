//! Announcement business logic.
//!
//! Emailing an announcement to members is handled by the caller after the row is
//! stored; a failed send never undoes the post.

use crate::{
    core::{
        pagination::{Page, PageRequest},
        validation::required,
    },
    entities::{Announcement, announcement},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Input for a new announcement.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAnnouncement {
    /// Headline
    pub title: String,
    /// Message body
    pub body: String,
    /// Also email every registered member
    #[serde(default)]
    pub send_email: bool,
}

/// Lists announcements, newest first.
pub async fn list_announcements(
    db: &DatabaseConnection,
    request: PageRequest,
) -> Result<Page<announcement::Model>> {
    let per_page = request.per_page();
    let paginator = Announcement::find()
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(request.page() - 1).await?;
    Ok(Page {
        items,
        page: request.page(),
        per_page,
        total,
    })
}

/// Posts an announcement on behalf of `created_by`.
pub async fn create_announcement(
    db: &DatabaseConnection,
    new_announcement: &NewAnnouncement,
    created_by: Option<i64>,
) -> Result<announcement::Model> {
    let announcement = announcement::ActiveModel {
        title: Set(required("Title", &new_announcement.title)?),
        body: Set(required("Body", &new_announcement.body)?),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = announcement.insert(db).await?;
    tracing::info!("Posted announcement {} ({})", created.id, created.title);
    Ok(created)
}

/// Deletes an announcement.
pub async fn delete_announcement(db: &DatabaseConnection, announcement_id: i64) -> Result<()> {
    let result = Announcement::delete_by_id(announcement_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::not_found("Announcement", announcement_id));
    }
    Ok(())
}
