//! Ledger routes.
//!
//! The admin view carries every row; the public view only OK-verified rows. Both
//! return newest-first entries whose balances were computed oldest-first.

use crate::{
    api::{AppState, extract::Session, handlers::UploadQuery},
    core::{
        authz::Requirement,
        ledger::{self, LedgerView, NewTransaction, TransactionUpdate},
    },
    entities::{Permission, VerificationStatus, ledger_transaction},
    errors::{Error, Result},
    services::discard,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

const EDIT: Requirement = Requirement::Permission(Permission::AccountingEdit);

/// Body of a status change.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    /// New verification status
    pub status: VerificationStatus,
}

/// `GET /api/ledger`
pub async fn admin_view(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<LedgerView>> {
    session.require(&state, Requirement::AnyAdmin).await?;
    Ok(Json(ledger::admin_ledger(state.db.as_ref()).await?))
}

/// `GET /api/ledger/public`
pub async fn public_view(
    State(state): State<AppState>,
    _session: Session,
) -> Result<Json<LedgerView>> {
    Ok(Json(ledger::public_ledger(state.db.as_ref()).await?))
}

/// `POST /api/ledger`
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Json(new_transaction): Json<NewTransaction>,
) -> Result<(StatusCode, Json<ledger_transaction::Model>)> {
    session.require(&state, EDIT).await?;
    let created = ledger::create_transaction(state.db.as_ref(), new_transaction).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/ledger/:id`
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(transaction_id): Path<i64>,
    Json(changes): Json<TransactionUpdate>,
) -> Result<Json<ledger_transaction::Model>> {
    session.require(&state, EDIT).await?;
    Ok(Json(
        ledger::update_transaction(state.db.as_ref(), transaction_id, changes).await?,
    ))
}

/// `PUT /api/ledger/:id/status`
pub async fn set_status(
    State(state): State<AppState>,
    session: Session,
    Path(transaction_id): Path<i64>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ledger_transaction::Model>> {
    session.require(&state, EDIT).await?;
    Ok(Json(
        ledger::set_status(state.db.as_ref(), transaction_id, request.status).await?,
    ))
}

/// `POST /api/ledger/:id/receipt?filename=...`
pub async fn upload_receipt(
    State(state): State<AppState>,
    session: Session,
    Path(transaction_id): Path<i64>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ledger_transaction::Model>> {
    session.require(&state, EDIT).await?;
    ledger::get_transaction(state.db.as_ref(), transaction_id)
        .await?
        .ok_or_else(|| Error::not_found("Transaction", transaction_id))?;

    let stored = state
        .storage
        .put("receipts", query.file_name(), &body)
        .await?;
    match ledger::attach_receipt(state.db.as_ref(), transaction_id, stored.url, stored.key.clone()).await {
        Ok((updated, previous)) => {
            discard(&state.storage, previous.as_deref()).await;
            Ok(Json(updated))
        }
        Err(e) => {
            discard(&state.storage, Some(&stored.key)).await;
            Err(e)
        }
    }
}

/// `DELETE /api/ledger/:id`
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    Path(transaction_id): Path<i64>,
) -> Result<StatusCode> {
    session.require(&state, EDIT).await?;
    let deleted = ledger::delete_transaction(state.db.as_ref(), transaction_id).await?;
    discard(&state.storage, deleted.receipt_key.as_deref()).await;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::entities::Permission;
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn amount(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    async fn treasurer(state: &crate::api::AppState) -> Result<String> {
        let admin = create_test_admin(state.db.as_ref(), "treasurer@example.org", false).await?;
        grant_permission(state.db.as_ref(), admin.id, Permission::AccountingEdit, true).await?;
        Ok(session_token(state, "treasurer@example.org"))
    }

    async fn record(state: &crate::api::AppState, token: &str, body: serde_json::Value) -> i64 {
        let (status, created) =
            call(state, Method::POST, "/api/ledger", Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        created["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_accounting_edit_is_required() -> Result<()> {
        let (state, _dir) = test_state().await?;
        let inviter = create_test_admin(state.db.as_ref(), "inviter@example.org", false).await?;
        grant_permission(state.db.as_ref(), inviter.id, Permission::InvitesAdd, true).await?;
        let token = session_token(&state, "inviter@example.org");

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/ledger",
            Some(&token),
            Some(json!({ "transaction_date": "2024-01-01", "deposit": "1000" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Missing permission: accounting_edit");

        let (status, _) = call(
            &state,
            Method::POST,
            "/api/ledger",
            None,
            Some(json!({ "transaction_date": "2024-01-01", "deposit": "1000" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        Ok(())
    }

    #[tokio::test]
    async fn test_both_amounts_rejected() -> Result<()> {
        let (state, _dir) = test_state().await?;
        let token = treasurer(&state).await?;

        let (status, body) = call(
            &state,
            Method::POST,
            "/api/ledger",
            Some(&token),
            Some(json!({
                "transaction_date": "2024-01-01",
                "deposit": "1000",
                "withdrawal": "500"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Cannot have both deposit and withdrawal in same transaction"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_views_balance_chronologically_and_filter_public() -> Result<()> {
        let (state, _dir) = test_state().await?;
        let token = treasurer(&state).await?;

        let feb = record(
            &state,
            &token,
            json!({ "transaction_date": "2024-02-01", "deposit": "15000" }),
        )
        .await;
        let jan = record(
            &state,
            &token,
            json!({ "transaction_date": "2024-01-01", "deposit": "10000" }),
        )
        .await;
        record(
            &state,
            &token,
            json!({ "transaction_date": "2024-01-15", "withdrawal": "5000" }),
        )
        .await;

        let (status, view) = call(&state, Method::GET, "/api/ledger", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        let balances: Vec<Decimal> = view["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| amount(&entry["balance"]))
            .collect();
        assert_eq!(balances, vec![dec!(20000), dec!(5000), dec!(10000)]);
        assert_eq!(amount(&view["totals"]["balance"]), dec!(20000));

        for id in [jan, feb] {
            let (status, _) = call(
                &state,
                Method::PUT,
                &format!("/api/ledger/{id}/status"),
                Some(&token),
                Some(json!({ "status": "OK" })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        create_test_user(state.db.as_ref(), "uno@example.org").await?;
        let member = session_token(&state, "uno@example.org");
        let (status, public) =
            call(&state, Method::GET, "/api/ledger/public", Some(&member), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(public["entries"].as_array().unwrap().len(), 2);
        assert_eq!(amount(&public["totals"]["totalWithdrawals"]), Decimal::ZERO);
        assert_eq!(amount(&public["totals"]["balance"]), dec!(25000));

        let (status, _) = call(&state, Method::GET, "/api/ledger", Some(&member), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        Ok(())
    }

    #[tokio::test]
    async fn test_receipt_replacement_discards_old_file() -> Result<()> {
        let (state, dir) = test_state().await?;
        let token = treasurer(&state).await?;
        let id = record(
            &state,
            &token,
            json!({ "transaction_date": "2024-01-01", "deposit": "1000" }),
        )
        .await;
        let uri = format!("/api/ledger/{id}/receipt?filename=receipt.png");

        let (status, first) = upload(&state, &uri, &token, b"first").await;
        assert_eq!(status, StatusCode::OK);
        let first_key = first["receipt_key"].as_str().unwrap().to_string();
        assert!(dir.path().join(&first_key).exists());
        assert!(first["receipt_url"].as_str().unwrap().starts_with("/uploads/receipts/"));

        let (status, second) = upload(&state, &uri, &token, b"second").await;
        assert_eq!(status, StatusCode::OK);
        let second_key = second["receipt_key"].as_str().unwrap().to_string();
        assert!(!dir.path().join(&first_key).exists());

        let (status, _) = call(
            &state,
            Method::DELETE,
            &format!("/api/ledger/{id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!dir.path().join(&second_key).exists());

        Ok(())
    }
}
