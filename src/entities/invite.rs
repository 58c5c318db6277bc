//! Invite entity - A registration invitation sent to one email address.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invite database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invites")]
pub struct Model {
    /// Unique identifier for the invite
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Lower-cased invitee email, one invite per address
    #[sea_orm(unique)]
    pub email: String,
    /// Invitee name, if known
    pub name: Option<String>,
    /// Random registration token
    #[sea_orm(unique)]
    pub token: String,
    /// Master-list entry this invite is linked to
    pub master_list_id: Option<i64>,
    /// Admin who issued the invite
    pub invited_by: Option<i64>,
    /// When the invite was redeemed, if it was
    pub used_at: Option<DateTimeUtc>,
    /// When the invite was issued
    pub created_at: DateTimeUtc,
}

/// `Invite` has no declared relationships
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
