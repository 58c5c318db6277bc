//! Admin permission entity - Binds an admin to one named permission.
//!
//! A missing row is equivalent to `enabled = false`. `(admin_id, permission)` is
//! unique so grants can be upserted.

use sea_orm::Iterable;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The closed set of grantable permissions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create and delete invites
    #[sea_orm(string_value = "invites_add")]
    InvitesAdd,
    /// Link invites to master-list entries
    #[sea_orm(string_value = "invites_link")]
    InvitesLink,
    /// Edit the master list
    #[sea_orm(string_value = "masterlist_edit")]
    MasterlistEdit,
    /// Create, edit and delete events
    #[sea_orm(string_value = "events_manage")]
    EventsManage,
    /// Post announcements and message members
    #[sea_orm(string_value = "announcements_send")]
    AnnouncementsSend,
    /// Record and verify ledger transactions
    #[sea_orm(string_value = "accounting_edit")]
    AccountingEdit,
    /// Read meeting minutes
    #[sea_orm(string_value = "minutes_view")]
    MinutesView,
    /// Write meeting minutes
    #[sea_orm(string_value = "minutes_edit")]
    MinutesEdit,
}

impl Permission {
    /// Wire and storage name of the permission.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvitesAdd => "invites_add",
            Self::InvitesLink => "invites_link",
            Self::MasterlistEdit => "masterlist_edit",
            Self::EventsManage => "events_manage",
            Self::AnnouncementsSend => "announcements_send",
            Self::AccountingEdit => "accounting_edit",
            Self::MinutesView => "minutes_view",
            Self::MinutesEdit => "minutes_edit",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| format!("Unknown permission: {s}"))
    }
}

/// Admin permission database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_permissions")]
pub struct Model {
    /// Unique identifier for the grant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Admin holding the grant
    pub admin_id: i64,
    /// Which permission this row controls
    pub permission: Permission,
    /// Whether the permission is currently granted
    pub enabled: bool,
}

/// Defines relationships between `AdminPermission` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each grant belongs to one admin
    #[sea_orm(
        belongs_to = "super::admin::Entity",
        from = "Column::AdminId",
        to = "super::admin::Column::Id",
        on_delete = "Cascade"
    )]
    Admin,
}

impl Related<super::admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
