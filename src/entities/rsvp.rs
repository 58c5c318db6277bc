//! RSVP entity - One member's answer for one event.
//!
//! `(event_id, user_id)` is unique; answering again overwrites the status.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Attendance answer
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// Attending
    #[sea_orm(string_value = "going")]
    Going,
    /// Undecided
    #[sea_orm(string_value = "maybe")]
    Maybe,
    /// Not attending
    #[sea_orm(string_value = "not_going")]
    NotGoing,
}

/// RSVP database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rsvps")]
pub struct Model {
    /// Unique identifier for the RSVP
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Event being answered
    pub event_id: i64,
    /// Member answering
    pub user_id: i64,
    /// Latest answer
    pub status: RsvpStatus,
    /// When the answer was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Rsvp and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each RSVP belongs to one event
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
    /// Each RSVP belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
