//! Shared test utilities for `ReunionHub`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and driving the HTTP router.

use crate::{
    api::{self, AppState},
    auth::{Claims, token},
    config::{
        AppConfig,
        settings::{SessionConfig, UploadConfig},
    },
    core::{
        admins::{self, NewAdmin},
        masterlist::{self, NewEntry},
    },
    entities::{Permission, admin, ledger_transaction, master_list, user},
    errors::Result,
    services::{LocalObjectStore, LogMailer},
};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::{NaiveDate, TimeZone};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::sync::Arc;
use tower::ServiceExt;

/// Secret used to sign session tokens in tests.
pub const TEST_SECRET: &str = "reunion-hub-test-secret-0123456789abcdef";

/// Stored in place of a real hash by [`create_test_user`]; never verifies.
pub const UNUSABLE_HASH: &str = "not-a-password-hash";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Session settings with the test secret.
#[must_use]
pub fn test_session_config() -> SessionConfig {
    SessionConfig {
        secret: TEST_SECRET.to_string(),
        ..Default::default()
    }
}

/// Creates a test admin with sensible defaults.
///
/// # Defaults
/// * `name`: "Test Admin"
/// * no password, no role metadata, no grants
pub async fn create_test_admin(
    db: &DatabaseConnection,
    email: &str,
    is_super_admin: bool,
) -> Result<admin::Model> {
    admins::create_admin(
        db,
        NewAdmin {
            email: email.to_string(),
            name: "Test Admin".to_string(),
            is_super_admin,
            ..Default::default()
        },
    )
    .await
}

/// Upserts one permission grant for an admin.
pub async fn grant_permission(
    db: &DatabaseConnection,
    admin_id: i64,
    permission: Permission,
    enabled: bool,
) -> Result<()> {
    admins::set_permission(db, admin_id, permission, enabled).await
}

/// Inserts a registered user directly, skipping the invite flow.
///
/// The stored hash is [`UNUSABLE_HASH`], so the user cannot log in; go through
/// `accounts::register` when a test needs a working password.
pub async fn create_test_user(db: &DatabaseConnection, email: &str) -> Result<user::Model> {
    let now = chrono::Utc::now();
    let account = user::ActiveModel {
        email: Set(email.to_lowercase()),
        full_name: Set("Test Member".to_string()),
        password_hash: Set(UNUSABLE_HASH.to_string()),
        phone: Set(None),
        invite_id: Set(None),
        master_list_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(account.insert(db).await?)
}

/// Creates a master-list entry with only a name and an optional email.
pub async fn create_test_member(
    db: &DatabaseConnection,
    full_name: &str,
    email: Option<&str>,
) -> Result<master_list::Model> {
    masterlist::create_entry(
        db,
        NewEntry {
            full_name: full_name.to_string(),
            email: email.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Builds an unsaved Pending ledger row.
///
/// `created_at` is a fixed base time plus `id` seconds, so rows sharing a date
/// order by id.
#[must_use]
pub fn transaction_row(
    id: i64,
    transaction_date: NaiveDate,
    deposit: Option<Decimal>,
    withdrawal: Option<Decimal>,
) -> ledger_transaction::Model {
    let created_at = chrono::Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
        + chrono::Duration::seconds(id);
    ledger_transaction::Model {
        id,
        transaction_date,
        name: None,
        description: None,
        deposit,
        withdrawal,
        reference_number: None,
        status: ledger_transaction::VerificationStatus::Pending,
        receipt_url: None,
        receipt_key: None,
        master_list_id: None,
        created_at,
        updated_at: created_at,
    }
}

/// Application state over a fresh database, the log mailer, and a temporary
/// upload directory that lives as long as the returned guard.
pub async fn test_state() -> Result<(AppState, tempfile::TempDir)> {
    let dir = tempfile::tempdir()?;
    let config = AppConfig {
        session: test_session_config(),
        uploads: UploadConfig {
            directory: dir.path().to_path_buf(),
            public_prefix: "/uploads".to_string(),
        },
        ..Default::default()
    };

    let state = AppState {
        db: Arc::new(setup_test_db().await?),
        storage: Arc::new(LocalObjectStore::new(&config.uploads)),
        mailer: Arc::new(LogMailer),
        config: Arc::new(config),
    };
    Ok((state, dir))
}

/// Issues a two-hour session token for `email`.
#[must_use]
pub fn session_token(state: &AppState, email: &str) -> String {
    let claims = Claims::new(1, email.to_lowercase(), false, chrono::Duration::hours(2));
    token::issue(state.config.session.secret.as_bytes(), &claims).unwrap_or_default()
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = api::router(state.clone())
        .oneshot(request)
        .await
        .unwrap_or_else(|never| match never {});
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

/// Sends a JSON request through the router and returns the status and JSON body
/// (`null` for empty bodies).
pub async fn call(
    state: &AppState,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    };
    match request {
        Ok(request) => send(state, request).await,
        Err(_) => (StatusCode::BAD_REQUEST, serde_json::Value::Null),
    }
}

/// Posts raw bytes as an upload.
pub async fn upload(
    state: &AppState,
    uri: &str,
    token: &str,
    bytes: &'static [u8],
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(bytes));
    match request {
        Ok(request) => send(state, request).await,
        Err(_) => (StatusCode::BAD_REQUEST, serde_json::Value::Null),
    }
}
