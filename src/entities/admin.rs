//! Admin entity - An organizing-committee member with administrative capability.
//!
//! Super-admins implicitly hold every permission. Regular admins hold only the
//! grants stored in `admin_permissions`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Admin database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    /// Unique identifier for the admin
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lower-cased email address, may match a user's email
    #[sea_orm(unique)]
    pub email: String,
    /// Display name
    pub name: String,
    /// Bypasses every permission check
    pub is_super_admin: bool,
    /// Committee title (e.g. "Treasurer")
    pub title: Option<String>,
    /// Sub-committee the admin belongs to
    pub sub_committee: Option<String>,
    /// Whether the admin leads their sub-committee
    pub is_leader: bool,
    /// Master-list entry this admin was promoted from
    pub master_list_id: Option<i64>,
    /// Password for committee members without a member profile
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    /// When the admin was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Admin and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One admin has many permission grants
    #[sea_orm(has_many = "super::admin_permission::Entity")]
    Permissions,
}

impl Related<super::admin_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
