//! Announcement entity - A notice posted by the committee.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Announcement database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "announcements")]
pub struct Model {
    /// Unique identifier for the announcement
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Headline
    pub title: String,
    /// Message body
    #[sea_orm(column_type = "Text")]
    pub body: String,
    /// Admin who posted it
    pub created_by: Option<i64>,
    /// When it was posted
    pub created_at: DateTimeUtc,
}

/// `Announcement` has no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
