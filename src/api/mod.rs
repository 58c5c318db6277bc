//! JSON HTTP interface.
//!
//! Shares the application state across requests and maps each route to a
//! handler in [`handlers`].

pub mod extract;
pub mod handlers;

use crate::{
    config::AppConfig,
    services::{Mailer, ObjectStore},
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Largest accepted upload body.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Shared connection pool
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration
    pub config: Arc<AppConfig>,
    /// Outgoing mail
    pub mailer: Arc<dyn Mailer>,
    /// Receipt and attachment storage
    pub storage: Arc<dyn ObjectStore>,
}

/// Builds the full router over `state`.
pub fn router(state: AppState) -> Router {
    use handlers::{
        accounts, admins, announcements, events, invites, ledger, masterlist, minutes,
    };

    let uploads = Router::new()
        .route("/api/ledger/:id/receipt", post(ledger::upload_receipt))
        .route("/api/minutes/:id/attachment", post(minutes::upload_attachment))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES));

    Router::new()
        .route("/api/auth/register", post(accounts::register))
        .route("/api/auth/login", post(accounts::login))
        .route("/api/auth/me", get(accounts::me).put(accounts::update_me))
        .route("/api/invites/token/:token", get(accounts::preview_invite))
        .route("/api/users", get(accounts::list_users))
        .route("/api/admins/me", get(admins::me))
        .route("/api/admins", get(admins::list).post(admins::create))
        .route(
            "/api/admins/:id",
            put(admins::update_role).delete(admins::delete),
        )
        .route("/api/admins/:id/permissions", put(admins::set_permissions))
        .route(
            "/api/masterlist",
            get(masterlist::list).post(masterlist::create),
        )
        .route(
            "/api/masterlist/:id",
            put(masterlist::update).delete(masterlist::delete),
        )
        .route("/api/masterlist/:id/promote", post(masterlist::promote))
        .route("/api/masterlist/:id/demote", post(masterlist::demote))
        .route("/api/invites", get(invites::list).post(invites::create))
        .route("/api/invites/:id", axum::routing::delete(invites::delete))
        .route("/api/invites/:id/link", put(invites::link))
        .route("/api/events", get(events::list).post(events::create))
        .route(
            "/api/events/:id",
            put(events::update).delete(events::delete),
        )
        .route("/api/events/:id/rsvp", post(events::rsvp))
        .route("/api/events/:id/rsvps", get(events::list_rsvps))
        .route("/api/ledger", get(ledger::admin_view).post(ledger::create))
        .route("/api/ledger/public", get(ledger::public_view))
        .route(
            "/api/ledger/:id",
            put(ledger::update).delete(ledger::delete),
        )
        .route("/api/ledger/:id/status", put(ledger::set_status))
        .route(
            "/api/announcements",
            get(announcements::list).post(announcements::create),
        )
        .route(
            "/api/announcements/:id",
            axum::routing::delete(announcements::delete),
        )
        .route("/api/minutes", get(minutes::list).post(minutes::create))
        .route(
            "/api/minutes/:id",
            get(minutes::get)
                .put(minutes::update)
                .delete(minutes::delete),
        )
        .merge(uploads)
        .nest_service(
            &state.config.uploads.public_prefix,
            ServeDir::new(&state.config.uploads.directory),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
