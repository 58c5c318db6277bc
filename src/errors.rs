//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer turns an
//! [`Error`] into a status code and a JSON body through [`IntoResponse`]; anything that
//! is not a client mistake collapses into a generic 500 and is logged here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is incomplete
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Request input failed validation before any write took place
    #[error("{message}")]
    Validation {
        /// Message shown to the client
        message: String,
    },

    /// A uniqueness constraint was violated in the store
    #[error("{message}")]
    Conflict {
        /// Message shown to the client
        message: String,
    },

    /// No session, or the session token is invalid or expired
    #[error("Authentication required")]
    Unauthorized,

    /// Login attempt with an unknown email or a wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authenticated, but not allowed to perform the action
    #[error("{message}")]
    Forbidden {
        /// Message naming the missing capability
        message: String,
    },

    /// An id-keyed lookup found nothing
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (e.g. "Event")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// Session token could not be encoded or decoded
    #[error("Token error: {message}")]
    Token {
        /// What went wrong
        message: String,
    },

    /// Password hashing failed
    #[error("Password hashing error: {message}")]
    PasswordHash {
        /// What went wrong
        message: String,
    },

    /// Sending mail failed
    #[error("Mail error: {message}")]
    Mail {
        /// What went wrong
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// I/O error (uploads, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::NotFound`] error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps a store error to [`Error::Conflict`] when it is a unique-constraint
    /// violation, and to [`Error::Database`] otherwise.
    pub fn unique_violation(err: DbErr, message: impl Into<String>) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict {
                message: message.into(),
            },
            _ => Self::Database(err),
        }
    }

    /// HTTP status this error is reported with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::Conflict { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Config { .. }
            | Self::Token { .. }
            | Self::PasswordHash { .. }
            | Self::Mail { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
        }

        let status = self.status_code();
        let error = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
