//! Per-member payment status.
//!
//! Computed independently of the running balance: only positive deposits linked to a
//! member's master-list id count, withdrawals never do. The due amount comes from the
//! injected [`LedgerPolicy`].

use crate::{
    config::LedgerPolicy,
    entities::{LedgerTransaction, ledger_transaction},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// How much of the due amount a member has paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    /// Nothing paid
    Unpaid,
    /// Something paid, less than the due amount
    Partial,
    /// Due amount reached or exceeded
    Full,
}

impl PaymentStatus {
    /// Classifies a paid total against the due amount.
    #[must_use]
    pub fn classify(total_paid: Decimal, due_amount: Decimal) -> Self {
        if total_paid <= Decimal::ZERO {
            Self::Unpaid
        } else if total_paid >= due_amount {
            Self::Full
        } else {
            Self::Partial
        }
    }
}

/// Payment summary for one master-list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemberPayment {
    /// Sum of the member's linked deposits
    pub total_paid: Decimal,
    /// Due amount minus `total_paid`
    pub balance_due: Decimal,
    /// Classification of `total_paid`
    pub status: PaymentStatus,
}

impl MemberPayment {
    /// Builds a summary from a paid total.
    #[must_use]
    pub fn from_total(total_paid: Decimal, policy: &LedgerPolicy) -> Self {
        Self {
            total_paid,
            balance_due: policy.due_amount - total_paid,
            status: PaymentStatus::classify(total_paid, policy.due_amount),
        }
    }
}

/// Per-member paid totals keyed by master-list id.
#[must_use]
pub fn paid_totals(transactions: &[ledger_transaction::Model]) -> HashMap<i64, Decimal> {
    let mut totals: HashMap<i64, Decimal> = HashMap::new();
    for transaction in transactions {
        let (Some(member), Some(deposit)) = (transaction.master_list_id, transaction.deposit)
        else {
            continue;
        };
        if deposit > Decimal::ZERO {
            *totals.entry(member).or_default() += deposit;
        }
    }
    totals
}

/// Payment summary for one member over a working set of transactions.
#[must_use]
pub fn member_payment(
    master_list_id: i64,
    transactions: &[ledger_transaction::Model],
    policy: &LedgerPolicy,
) -> MemberPayment {
    let total = paid_totals(transactions)
        .remove(&master_list_id)
        .unwrap_or_default();
    MemberPayment::from_total(total, policy)
}

/// Loads linked deposits and returns paid totals keyed by master-list id.
pub async fn load_paid_totals(db: &DatabaseConnection) -> Result<HashMap<i64, Decimal>> {
    let linked = LedgerTransaction::find()
        .filter(ledger_transaction::Column::MasterListId.is_not_null())
        .filter(ledger_transaction::Column::Deposit.is_not_null())
        .all(db)
        .await?;
    Ok(paid_totals(&linked))
}
