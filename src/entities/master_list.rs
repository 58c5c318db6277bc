//! Master list entity - The roster of alumni expected at the reunion.
//!
//! Entries exist independently of registration. Ledger deposits can be linked to an
//! entry to track that person's dues.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Master list database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "master_list")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Full name as it appears in the class roster
    pub full_name: String,
    /// Lower-cased email, required before promotion to admin
    pub email: Option<String>,
    /// Class section
    pub section: Option<String>,
    /// Contact number
    pub contact_number: Option<String>,
    /// Whether this entry has been promoted to admin
    pub is_admin: bool,
    /// When the entry was created
    pub created_at: DateTimeUtc,
    /// When the entry was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `MasterList` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One entry has many linked ledger transactions
    #[sea_orm(has_many = "super::ledger_transaction::Entity")]
    LedgerTransactions,
}

impl Related<super::ledger_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
