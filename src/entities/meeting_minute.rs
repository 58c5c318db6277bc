//! Meeting minute entity - Notes from one committee meeting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Meeting minute database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "meeting_minutes")]
pub struct Model {
    /// Unique identifier for the minutes
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Meeting title
    pub title: String,
    /// Day the meeting was held
    pub meeting_date: Date,
    /// The notes themselves
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Public URL of an attached file
    pub attachment_url: Option<String>,
    /// Object-store key of the attached file
    pub attachment_key: Option<String>,
    /// Admin who wrote them
    pub created_by: Option<i64>,
    /// When they were created
    pub created_at: DateTimeUtc,
    /// When they were last modified
    pub updated_at: DateTimeUtc,
}

/// `MeetingMinute` has no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
