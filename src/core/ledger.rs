//! Ledger business logic - the reunion fund's deposits, withdrawals and running balance.
//!
//! The running balance is derived on every read: rows are replayed oldest-first by
//! `(transaction_date, created_at, id)` and each row carries the cumulative
//! `deposit - withdrawal` up to and including itself. Listings are then presented
//! newest-first without recomputing. The admin view covers every row; the public
//! view only rows with status OK.
//!
//! The write path enforces that exactly one of deposit / withdrawal is set and
//! positive. The aggregator still treats a missing amount as zero.

use crate::{
    core::validation::optional,
    entities::{LedgerTransaction, VerificationStatus, ledger_transaction},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const BOTH_AMOUNTS: &str = "Cannot have both deposit and withdrawal in same transaction";
const NO_AMOUNT: &str = "Either a deposit or a withdrawal amount is required";
const NON_POSITIVE: &str = "Amount must be greater than zero";
const SUB_CENT: &str = "Amount cannot have more than two decimal places";
const TOO_LARGE: &str = "Amount must be less than 10,000,000,000";

/// Amounts are stored as `DECIMAL(12,2)`.
const MAX_SCALE: u32 = 2;
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// A transaction annotated with its running balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    /// The stored row
    #[serde(flatten)]
    pub transaction: ledger_transaction::Model,
    /// Cumulative balance after this transaction, in chronological order
    pub balance: Decimal,
}

/// Aggregate totals over a working set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    /// Sum of all deposits
    pub total_deposits: Decimal,
    /// Sum of all withdrawals
    pub total_withdrawals: Decimal,
    /// `total_deposits - total_withdrawals`
    pub balance: Decimal,
}

/// A ledger listing ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerView {
    /// Entries, newest first
    pub entries: Vec<LedgerEntry>,
    /// Totals over the same entries
    pub totals: LedgerTotals,
}

/// Which amount a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    /// Money received
    Deposit(Decimal),
    /// Money paid out
    Withdrawal(Decimal),
}

impl Amount {
    /// Checks the deposit/withdrawal exclusivity rule for submitted amounts.
    pub fn from_parts(deposit: Option<Decimal>, withdrawal: Option<Decimal>) -> Result<Self> {
        let amount = match (deposit, withdrawal) {
            (Some(_), Some(_)) => return Err(Error::validation(BOTH_AMOUNTS)),
            (None, None) => return Err(Error::validation(NO_AMOUNT)),
            (Some(deposit), None) => Self::Deposit(deposit),
            (None, Some(withdrawal)) => Self::Withdrawal(withdrawal),
        };

        let value = amount.value();
        if value <= Decimal::ZERO {
            return Err(Error::validation(NON_POSITIVE));
        }
        if value.normalize().scale() > MAX_SCALE {
            return Err(Error::validation(SUB_CENT));
        }
        if value >= AMOUNT_LIMIT {
            return Err(Error::validation(TOO_LARGE));
        }
        Ok(amount)
    }

    /// Absolute amount.
    #[must_use]
    pub const fn value(self) -> Decimal {
        match self {
            Self::Deposit(value) | Self::Withdrawal(value) => value,
        }
    }

    const fn columns(self) -> (Option<Decimal>, Option<Decimal>) {
        match self {
            Self::Deposit(value) => (Some(value), None),
            Self::Withdrawal(value) => (None, Some(value)),
        }
    }
}

/// Input for recording a transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTransaction {
    /// Date the money moved
    pub transaction_date: NaiveDate,
    /// Payer or payee
    #[serde(default)]
    pub name: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Amount received
    #[serde(default)]
    pub deposit: Option<Decimal>,
    /// Amount paid out
    #[serde(default)]
    pub withdrawal: Option<Decimal>,
    /// Bank or receipt reference
    #[serde(default)]
    pub reference_number: Option<String>,
    /// Linked master-list entry
    #[serde(default)]
    pub master_list_id: Option<i64>,
}

/// Changes to a recorded transaction; `None` leaves a field untouched.
///
/// Submitting one amount replaces the stored amount and clears the other side.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionUpdate {
    /// New date
    pub transaction_date: Option<NaiveDate>,
    /// New payer or payee
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New deposit amount
    pub deposit: Option<Decimal>,
    /// New withdrawal amount
    pub withdrawal: Option<Decimal>,
    /// New reference
    pub reference_number: Option<String>,
    /// New master-list link
    pub master_list_id: Option<i64>,
}

/// Chronological order used for balance computation.
///
/// Ties on date and creation time fall back to the id, i.e. insertion order.
#[must_use]
pub fn chronological(a: &ledger_transaction::Model, b: &ledger_transaction::Model) -> Ordering {
    a.transaction_date
        .cmp(&b.transaction_date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Signed effect of one row on the balance; a missing side counts as zero.
#[must_use]
pub fn net_amount(transaction: &ledger_transaction::Model) -> Decimal {
    transaction.deposit.unwrap_or_default() - transaction.withdrawal.unwrap_or_default()
}

/// Annotates rows with running balances, returned oldest-first.
#[must_use]
pub fn running_balances(mut transactions: Vec<ledger_transaction::Model>) -> Vec<LedgerEntry> {
    transactions.sort_by(chronological);

    let mut balance = Decimal::ZERO;
    transactions
        .into_iter()
        .map(|transaction| {
            balance += net_amount(&transaction);
            LedgerEntry {
                transaction,
                balance,
            }
        })
        .collect()
}

/// Sums deposits and withdrawals over a working set.
#[must_use]
pub fn totals(transactions: &[ledger_transaction::Model]) -> LedgerTotals {
    let (total_deposits, total_withdrawals) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(deposits, withdrawals), transaction| {
            (
                deposits + transaction.deposit.unwrap_or_default(),
                withdrawals + transaction.withdrawal.unwrap_or_default(),
            )
        },
    );

    LedgerTotals {
        total_deposits,
        total_withdrawals,
        balance: total_deposits - total_withdrawals,
    }
}

/// Builds a display view: balances computed oldest-first, entries listed newest-first.
#[must_use]
pub fn build_view(transactions: Vec<ledger_transaction::Model>) -> LedgerView {
    let totals = totals(&transactions);
    let mut entries = running_balances(transactions);
    entries.reverse();
    LedgerView { entries, totals }
}

/// Every transaction, for committee members.
pub async fn admin_ledger(db: &DatabaseConnection) -> Result<LedgerView> {
    let transactions = LedgerTransaction::find().all(db).await?;
    Ok(build_view(transactions))
}

/// Only verified transactions, for members.
pub async fn public_ledger(db: &DatabaseConnection) -> Result<LedgerView> {
    let transactions = LedgerTransaction::find()
        .filter(ledger_transaction::Column::Status.eq(VerificationStatus::Verified))
        .all(db)
        .await?;
    Ok(build_view(transactions))
}

/// Retrieves a transaction by id.
pub async fn get_transaction<C>(db: &C, transaction_id: i64) -> Result<Option<ledger_transaction::Model>>
where
    C: ConnectionTrait,
{
    LedgerTransaction::find_by_id(transaction_id)
        .one(db)
        .await
        .map_err(Into::into)
}

async fn require_transaction<C>(db: &C, transaction_id: i64) -> Result<ledger_transaction::Model>
where
    C: ConnectionTrait,
{
    get_transaction(db, transaction_id)
        .await?
        .ok_or_else(|| Error::not_found("Transaction", transaction_id))
}

async fn ensure_master_list_entry<C>(db: &C, master_list_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(id) = master_list_id {
        crate::core::masterlist::get_entry(db, id)
            .await?
            .ok_or_else(|| Error::not_found("Master list entry", id))?;
    }
    Ok(())
}

/// Records a new transaction with status Pending.
pub async fn create_transaction(
    db: &DatabaseConnection,
    new_transaction: NewTransaction,
) -> Result<ledger_transaction::Model> {
    let amount = Amount::from_parts(new_transaction.deposit, new_transaction.withdrawal)?;
    ensure_master_list_entry(db, new_transaction.master_list_id).await?;

    let (deposit, withdrawal) = amount.columns();
    let now = chrono::Utc::now();
    let transaction = ledger_transaction::ActiveModel {
        transaction_date: Set(new_transaction.transaction_date),
        name: Set(optional(new_transaction.name)),
        description: Set(optional(new_transaction.description)),
        deposit: Set(deposit),
        withdrawal: Set(withdrawal),
        reference_number: Set(optional(new_transaction.reference_number)),
        status: Set(VerificationStatus::Pending),
        receipt_url: Set(None),
        receipt_key: Set(None),
        master_list_id: Set(new_transaction.master_list_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = transaction.insert(db).await?;
    tracing::info!("Recorded ledger transaction {} ({:?})", created.id, amount);
    Ok(created)
}

/// Applies changes to a transaction.
pub async fn update_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
    changes: TransactionUpdate,
) -> Result<ledger_transaction::Model> {
    let amount = match (changes.deposit, changes.withdrawal) {
        (None, None) => None,
        (deposit, withdrawal) => Some(Amount::from_parts(deposit, withdrawal)?),
    };

    let txn = db.begin().await?;
    let existing = require_transaction(&txn, transaction_id).await?;
    ensure_master_list_entry(&txn, changes.master_list_id).await?;

    let mut transaction: ledger_transaction::ActiveModel = existing.into();
    if let Some(date) = changes.transaction_date {
        transaction.transaction_date = Set(date);
    }
    if let Some(name) = changes.name {
        transaction.name = Set(optional(Some(name)));
    }
    if let Some(description) = changes.description {
        transaction.description = Set(optional(Some(description)));
    }
    if let Some(amount) = amount {
        let (deposit, withdrawal) = amount.columns();
        transaction.deposit = Set(deposit);
        transaction.withdrawal = Set(withdrawal);
    }
    if let Some(reference) = changes.reference_number {
        transaction.reference_number = Set(optional(Some(reference)));
    }
    if let Some(master_list_id) = changes.master_list_id {
        transaction.master_list_id = Set(Some(master_list_id));
    }
    transaction.updated_at = Set(chrono::Utc::now());

    let updated = transaction.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Sets the verification status of a transaction.
pub async fn set_status(
    db: &DatabaseConnection,
    transaction_id: i64,
    status: VerificationStatus,
) -> Result<ledger_transaction::Model> {
    let existing = require_transaction(db, transaction_id).await?;
    let mut transaction: ledger_transaction::ActiveModel = existing.into();
    transaction.status = Set(status);
    transaction.updated_at = Set(chrono::Utc::now());
    transaction.update(db).await.map_err(Into::into)
}

/// Records a new receipt and returns the updated row with the key of the receipt it
/// replaced, which the caller discards from object storage.
pub async fn attach_receipt(
    db: &DatabaseConnection,
    transaction_id: i64,
    url: String,
    key: String,
) -> Result<(ledger_transaction::Model, Option<String>)> {
    let existing = require_transaction(db, transaction_id).await?;
    let previous_key = existing.receipt_key.clone();

    let mut transaction: ledger_transaction::ActiveModel = existing.into();
    transaction.receipt_url = Set(Some(url));
    transaction.receipt_key = Set(Some(key));
    transaction.updated_at = Set(chrono::Utc::now());

    let updated = transaction.update(db).await?;
    Ok((updated, previous_key))
}

/// Deletes a transaction and returns it so any receipt can be discarded.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    transaction_id: i64,
) -> Result<ledger_transaction::Model> {
    let existing = require_transaction(db, transaction_id).await?;
    LedgerTransaction::delete_by_id(transaction_id).exec(db).await?;
    tracing::info!("Deleted ledger transaction {}", transaction_id);
    Ok(existing)
}
