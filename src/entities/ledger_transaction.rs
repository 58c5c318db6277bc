//! Ledger transaction entity - One deposit or withdrawal in the reunion fund.
//!
//! Exactly one of `deposit` / `withdrawal` is populated and positive; the write path
//! in `core::ledger` enforces this. Running balances are derived, never stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Verification state of a transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum VerificationStatus {
    /// Recorded but not yet checked against the bank record
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Checked; included in the public ledger
    #[sea_orm(string_value = "OK")]
    #[serde(rename = "OK")]
    Verified,
}

/// Ledger transaction database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Date the money moved (may be backdated)
    pub transaction_date: Date,
    /// Payer or payee name
    pub name: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Amount received
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub deposit: Option<Decimal>,
    /// Amount paid out
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub withdrawal: Option<Decimal>,
    /// Bank or receipt reference number
    pub reference_number: Option<String>,
    /// Verification state
    pub status: VerificationStatus,
    /// Public URL of the attached receipt
    pub receipt_url: Option<String>,
    /// Object-store key of the attached receipt
    pub receipt_key: Option<String>,
    /// Master-list entry this payment belongs to
    pub master_list_id: Option<i64>,
    /// When the row was recorded
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `LedgerTransaction` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A transaction may belong to one master-list entry
    #[sea_orm(
        belongs_to = "super::master_list::Entity",
        from = "Column::MasterListId",
        to = "super::master_list::Column::Id",
        on_delete = "SetNull"
    )]
    MasterList,
}

impl Related<super::master_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MasterList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
