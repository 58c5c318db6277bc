//! User entity - A registered alumnus with a member profile.
//!
//! Users register through an invite. The email is stored lower-cased and is the
//! identity key shared with the admin table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lower-cased email address
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Argon2 PHC string, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional phone number
    pub phone: Option<String>,
    /// Invite the user registered with
    pub invite_id: Option<i64>,
    /// Master-list entry copied from the invite at registration
    pub master_list_id: Option<i64>,
    /// When the user registered
    pub created_at: DateTimeUtc,
    /// When the profile was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many RSVPs
    #[sea_orm(has_many = "super::rsvp::Entity")]
    Rsvps,
}

impl Related<super::rsvp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rsvps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
