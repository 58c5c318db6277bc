//! Master list business logic - the class roster and promotion to the committee.
//!
//! Deleting an entry that is marked admin removes the linked admin row and its grants,
//! except for super-admins, which are only unlinked. Ledger rows and invites pointing
//! at the entry are unlinked rather than deleted.

use crate::{
    config::LedgerPolicy,
    core::{
        admins::{self, NewAdmin},
        payment::{self, MemberPayment},
        validation::{normalize_email, optional, parse_email, required},
    },
    entities::{Admin, Invite, LedgerTransaction, MasterList, admin, invite, ledger_transaction, master_list},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

/// Input for a new roster entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewEntry {
    /// Full name
    pub full_name: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Class section
    #[serde(default)]
    pub section: Option<String>,
    /// Contact number
    #[serde(default)]
    pub contact_number: Option<String>,
}

/// Changes to a roster entry; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryUpdate {
    /// New full name
    pub full_name: Option<String>,
    /// New email
    pub email: Option<String>,
    /// New section
    pub section: Option<String>,
    /// New contact number
    pub contact_number: Option<String>,
}

/// Role metadata applied when promoting an entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Promotion {
    /// Committee title
    #[serde(default)]
    pub title: Option<String>,
    /// Sub-committee
    #[serde(default)]
    pub sub_committee: Option<String>,
    /// Leader flag
    #[serde(default)]
    pub is_leader: bool,
}

/// A roster entry with its payment summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryWithPayment {
    /// The stored entry
    #[serde(flatten)]
    pub entry: master_list::Model,
    /// Dues paid so far
    pub payment: MemberPayment,
}

/// Retrieves all entries ordered by name.
pub async fn list_entries(db: &DatabaseConnection) -> Result<Vec<master_list::Model>> {
    MasterList::find()
        .order_by_asc(master_list::Column::FullName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all entries with their payment status.
pub async fn list_with_payments(
    db: &DatabaseConnection,
    policy: &LedgerPolicy,
) -> Result<Vec<EntryWithPayment>> {
    let entries = list_entries(db).await?;
    let mut totals = payment::load_paid_totals(db).await?;

    Ok(entries
        .into_iter()
        .map(|entry| {
            let total = totals.remove(&entry.id).unwrap_or_default();
            EntryWithPayment {
                payment: MemberPayment::from_total(total, policy),
                entry,
            }
        })
        .collect())
}

/// Retrieves an entry by id.
pub async fn get_entry<C>(db: &C, entry_id: i64) -> Result<Option<master_list::Model>>
where
    C: ConnectionTrait,
{
    MasterList::find_by_id(entry_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_entry<C>(db: &C, entry_id: i64) -> Result<master_list::Model>
where
    C: ConnectionTrait,
{
    get_entry(db, entry_id)
        .await?
        .ok_or_else(|| Error::not_found("Master list entry", entry_id))
}

fn parse_optional_email(email: Option<String>) -> Result<Option<String>> {
    optional(email).as_deref().map(parse_email).transpose()
}

/// Creates a roster entry.
pub async fn create_entry(db: &DatabaseConnection, new_entry: NewEntry) -> Result<master_list::Model> {
    let now = chrono::Utc::now();
    let entry = master_list::ActiveModel {
        full_name: Set(required("Full name", &new_entry.full_name)?),
        email: Set(parse_optional_email(new_entry.email)?),
        section: Set(optional(new_entry.section)),
        contact_number: Set(optional(new_entry.contact_number)),
        is_admin: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    entry.insert(db).await.map_err(Into::into)
}

/// Updates a roster entry.
pub async fn update_entry(
    db: &DatabaseConnection,
    entry_id: i64,
    changes: EntryUpdate,
) -> Result<master_list::Model> {
    let existing = require_entry(db, entry_id).await?;

    let mut entry: master_list::ActiveModel = existing.into();
    if let Some(full_name) = changes.full_name {
        entry.full_name = Set(required("Full name", &full_name)?);
    }
    if let Some(email) = changes.email {
        entry.email = Set(parse_optional_email(Some(email))?);
    }
    if let Some(section) = changes.section {
        entry.section = Set(optional(Some(section)));
    }
    if let Some(contact_number) = changes.contact_number {
        entry.contact_number = Set(optional(Some(contact_number)));
    }
    entry.updated_at = Set(chrono::Utc::now());

    entry.update(db).await.map_err(Into::into)
}

/// Sets the `is_admin` flag of an entry.
pub async fn set_admin_flag<C>(db: &C, entry_id: i64, is_admin: bool) -> Result<()>
where
    C: ConnectionTrait,
{
    MasterList::update_many()
        .col_expr(master_list::Column::IsAdmin, Expr::value(is_admin))
        .col_expr(master_list::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(master_list::Column::Id.eq(entry_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Finds the admin promoted from an entry, by link first and email second.
async fn linked_admin<C>(db: &C, entry: &master_list::Model) -> Result<Option<admin::Model>>
where
    C: ConnectionTrait,
{
    if let Some(admin) = Admin::find()
        .filter(admin::Column::MasterListId.eq(entry.id))
        .one(db)
        .await?
    {
        return Ok(Some(admin));
    }

    match &entry.email {
        Some(email) => crate::core::authz::find_admin_by_email(db, email).await,
        None => Ok(None),
    }
}

/// Outcome of deleting an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeletedEntry {
    /// Whether an admin row was removed with the entry
    pub admin_removed: bool,
}

/// Deletes an entry, cascading to its admin (unless super-admin) and unlinking
/// ledger rows and invites.
pub async fn delete_entry(db: &DatabaseConnection, entry_id: i64) -> Result<DeletedEntry> {
    let txn = db.begin().await?;
    let entry = require_entry(&txn, entry_id).await?;

    let mut admin_removed = false;
    if entry.is_admin {
        if let Some(admin) = linked_admin(&txn, &entry).await? {
            admin_removed = admins::remove_admin(&txn, &admin).await?;
            if !admin_removed {
                let mut survivor: admin::ActiveModel = admin.into();
                survivor.master_list_id = Set(None);
                survivor.update(&txn).await?;
            }
        }
    }

    LedgerTransaction::update_many()
        .col_expr(
            ledger_transaction::Column::MasterListId,
            Expr::value(Option::<i64>::None),
        )
        .filter(ledger_transaction::Column::MasterListId.eq(entry_id))
        .exec(&txn)
        .await?;
    Invite::update_many()
        .col_expr(invite::Column::MasterListId, Expr::value(Option::<i64>::None))
        .filter(invite::Column::MasterListId.eq(entry_id))
        .exec(&txn)
        .await?;
    MasterList::delete_by_id(entry_id).exec(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        "Deleted master list entry {} (admin removed: {})",
        entry_id,
        admin_removed
    );
    Ok(DeletedEntry { admin_removed })
}

/// Promotes an entry to the committee, creating or linking its admin row.
pub async fn promote(
    db: &DatabaseConnection,
    entry_id: i64,
    promotion: Promotion,
) -> Result<admin::Model> {
    let txn = db.begin().await?;
    let entry = require_entry(&txn, entry_id).await?;
    let email = entry
        .email
        .clone()
        .ok_or_else(|| Error::validation("An email address is required before promotion"))?;

    let admin = match crate::core::authz::find_admin_by_email(&txn, &email).await? {
        Some(existing) => {
            let mut admin: admin::ActiveModel = existing.into();
            admin.master_list_id = Set(Some(entry.id));
            if let Some(title) = promotion.title {
                admin.title = Set(Some(title));
            }
            if let Some(sub_committee) = promotion.sub_committee {
                admin.sub_committee = Set(Some(sub_committee));
            }
            admin.is_leader = Set(promotion.is_leader);
            admin.update(&txn).await?
        }
        None => {
            admins::create_admin(
                &txn,
                NewAdmin {
                    email: normalize_email(&email),
                    name: entry.full_name.clone(),
                    title: promotion.title,
                    sub_committee: promotion.sub_committee,
                    is_leader: promotion.is_leader,
                    master_list_id: Some(entry.id),
                    ..Default::default()
                },
            )
            .await?
        }
    };

    set_admin_flag(&txn, entry.id, true).await?;
    txn.commit().await?;
    tracing::info!("Promoted master list entry {} to admin {}", entry_id, admin.id);
    Ok(admin)
}

/// Demotes an entry, deleting its admin row and grants. Super-admins are rejected.
///
/// Entries that were never promoted have no admin to remove, even if an admin
/// shares their email.
pub async fn demote(db: &DatabaseConnection, entry_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let entry = require_entry(&txn, entry_id).await?;

    if entry.is_admin {
        if let Some(admin) = linked_admin(&txn, &entry).await? {
            if admin.is_super_admin {
                return Err(Error::validation("Super-admins cannot be demoted"));
            }
            admins::remove_admin(&txn, &admin).await?;
        }
    }

    set_admin_flag(&txn, entry.id, false).await?;
    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::ledger::{self, NewTransaction};
    use crate::entities::{AdminPermission, Permission, admin_permission};
    use crate::test_utils::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_entry_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let blank = create_entry(
            &db,
            NewEntry {
                full_name: "  ".to_string(),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let bad_email = create_entry(
            &db,
            NewEntry {
                full_name: "Juan Dela Cruz".to_string(),
                email: Some("juan-at-example".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(bad_email, Err(Error::Validation { .. })));

        let entry = create_test_member(&db, "Juan Dela Cruz", Some("Juan@Example.org")).await?;
        assert_eq!(entry.email.as_deref(), Some("juan@example.org"));
        assert!(!entry.is_admin);

        Ok(())
    }

    #[tokio::test]
    async fn test_promote_and_demote() -> Result<()> {
        let db = setup_test_db().await?;
        let entry = create_test_member(&db, "Maria Santos", Some("maria@example.org")).await?;

        let admin = promote(
            &db,
            entry.id,
            Promotion {
                title: Some("Secretary".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(admin.email, "maria@example.org");
        assert_eq!(admin.master_list_id, Some(entry.id));
        assert!(get_entry(&db, entry.id).await?.unwrap().is_admin);

        demote(&db, entry.id).await?;
        assert!(admins::get_admin(&db, admin.id).await?.is_none());
        assert!(!get_entry(&db, entry.id).await?.unwrap().is_admin);

        Ok(())
    }

    #[tokio::test]
    async fn test_promote_existing_admin_applies_role() -> Result<()> {
        let db = setup_test_db().await?;
        let existing = create_test_admin(&db, "lito@example.org", false).await?;
        let entry = create_test_member(&db, "Lito Cruz", Some("lito@example.org")).await?;

        let admin = promote(
            &db,
            entry.id,
            Promotion {
                title: Some("Treasurer".to_string()),
                sub_committee: Some("Finance".to_string()),
                is_leader: true,
            },
        )
        .await?;
        assert_eq!(admin.id, existing.id);
        assert_eq!(admin.master_list_id, Some(entry.id));

        let stored = admins::get_admin(&db, existing.id).await?.unwrap();
        assert_eq!(stored.title.as_deref(), Some("Treasurer"));
        assert_eq!(stored.sub_committee.as_deref(), Some("Finance"));
        assert!(stored.is_leader);

        Ok(())
    }

    #[tokio::test]
    async fn test_demote_unpromoted_entry_keeps_admin_with_same_email() -> Result<()> {
        let db = setup_test_db().await?;
        let unrelated = create_test_admin(&db, "shared@example.org", false).await?;
        let entry = create_test_member(&db, "Never Promoted", Some("shared@example.org")).await?;
        assert!(!entry.is_admin);

        demote(&db, entry.id).await?;
        assert!(admins::get_admin(&db, unrelated.id).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_promote_requires_email() -> Result<()> {
        let db = setup_test_db().await?;
        let entry = create_test_member(&db, "No Email", None).await?;

        let result = promote(&db, entry.id, Promotion::default()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_admin_entry_removes_admin_and_grants() -> Result<()> {
        let db = setup_test_db().await?;
        let entry = create_test_member(&db, "Pedro Reyes", Some("pedro@example.org")).await?;
        let admin = promote(&db, entry.id, Promotion::default()).await?;
        grant_permission(&db, admin.id, Permission::InvitesAdd, true).await?;

        let deleted = delete_entry(&db, entry.id).await?;
        assert!(deleted.admin_removed);
        assert!(get_entry(&db, entry.id).await?.is_none());
        assert!(admins::get_admin(&db, admin.id).await?.is_none());
        let grants = AdminPermission::find()
            .filter(admin_permission::Column::AdminId.eq(admin.id))
            .all(&db)
            .await?;
        assert!(grants.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_super_admin_entry_keeps_admin() -> Result<()> {
        let db = setup_test_db().await?;
        let chair = create_test_admin(&db, "chair@example.org", true).await?;
        let entry = create_test_member(&db, "Committee Chair", Some("chair@example.org")).await?;
        promote(&db, entry.id, Promotion::default()).await?;

        let deleted = delete_entry(&db, entry.id).await?;
        assert!(!deleted.admin_removed);

        let survivor = admins::get_admin(&db, chair.id).await?.unwrap();
        assert!(survivor.is_super_admin);
        assert_eq!(survivor.master_list_id, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_super_admin_cannot_be_demoted() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_admin(&db, "chair@example.org", true).await?;
        let entry = create_test_member(&db, "Committee Chair", Some("chair@example.org")).await?;
        promote(&db, entry.id, Promotion::default()).await?;

        let result = demote(&db, entry.id).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_with_payments() -> Result<()> {
        let db = setup_test_db().await?;
        let paid = create_test_member(&db, "Ana Paid", None).await?;
        let partial = create_test_member(&db, "Ben Partial", None).await?;
        create_test_member(&db, "Cy Unpaid", None).await?;

        let on = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (member, amount) in [(paid.id, dec!(20000)), (paid.id, dec!(5000)), (partial.id, dec!(1000))] {
            ledger::create_transaction(
                &db,
                NewTransaction {
                    transaction_date: on,
                    name: None,
                    description: None,
                    deposit: Some(amount),
                    withdrawal: None,
                    reference_number: None,
                    master_list_id: Some(member),
                },
            )
            .await?;
        }

        let rows = list_with_payments(&db, &LedgerPolicy::default()).await?;
        let statuses: Vec<_> = rows.iter().map(|r| r.payment.status).collect();
        assert_eq!(
            statuses,
            vec![
                payment::PaymentStatus::Full,
                payment::PaymentStatus::Partial,
                payment::PaymentStatus::Unpaid
            ]
        );
        assert_eq!(rows[1].payment.balance_due, dec!(24000));

        // Deleting a member unlinks but keeps their transactions
        delete_entry(&db, partial.id).await?;
        let view = ledger::admin_ledger(&db).await?;
        assert_eq!(view.entries.len(), 3);
        assert_eq!(view.totals.total_deposits, dec!(26000));

        Ok(())
    }
}
