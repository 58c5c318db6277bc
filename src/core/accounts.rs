//! Member accounts - registration through an invite, login and profiles.
//!
//! Login accepts a registered user first and falls back to an admin with a password
//! of their own, so committee members without a member profile can still sign in.

use crate::{
    auth::{Claims, password, token},
    config::settings::SessionConfig,
    core::{
        authz,
        invites,
        pagination::{Page, PageRequest},
        validation::{normalize_email, optional, required},
    },
    entities::{Permission, User, admin, user},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Registration form submitted with an invite token.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    /// Token from the invite email
    pub token: String,
    /// Display name
    pub full_name: String,
    /// Chosen password
    pub password: String,
    /// Optional phone number
    #[serde(default)]
    pub phone: Option<String>,
}

/// Profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    /// New display name
    pub full_name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
}

/// A successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// Signed session token
    pub token: String,
    /// Claims inside the token
    pub claims: Claims,
}

/// Admin capability attached to a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSummary {
    /// The admin row
    pub admin: admin::Model,
    /// Effective permission map
    pub permissions: BTreeMap<Permission, bool>,
}

/// Everything known about the session principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    /// Principal email
    pub email: String,
    /// Member profile, if registered
    pub user: Option<user::Model>,
    /// Admin capability, if any
    pub admin: Option<AdminSummary>,
}

/// Finds a user by email, case-insensitively.
pub async fn find_user_by_email<C>(db: &C, email: &str) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a member account from an open invite and marks the invite used.
pub async fn register(db: &DatabaseConnection, registration: Registration) -> Result<user::Model> {
    let full_name = required("Full name", &registration.full_name)?;
    let password_hash = password::hash(&registration.password).await?;

    let txn = db.begin().await?;
    let invite = invites::find_open_invite(&txn, registration.token.trim())
        .await?
        .ok_or_else(|| Error::not_found("Invite", "token"))?;

    let now = chrono::Utc::now();
    let account = user::ActiveModel {
        email: Set(invite.email.clone()),
        full_name: Set(full_name),
        password_hash: Set(password_hash),
        phone: Set(optional(registration.phone)),
        invite_id: Set(Some(invite.id)),
        master_list_id: Set(invite.master_list_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = account
        .insert(&txn)
        .await
        .map_err(|e| Error::unique_violation(e, "An account with this email already exists"))?;
    invites::mark_used(&txn, invite).await?;
    txn.commit().await?;

    tracing::info!("Registered user {} ({})", created.id, created.email);
    Ok(created)
}

/// Verifies credentials and issues a session token.
pub async fn login(
    db: &DatabaseConnection,
    session: &SessionConfig,
    email: &str,
    password_attempt: &str,
    remember_me: bool,
) -> Result<LoginOutcome> {
    let email = normalize_email(email);
    let admin = authz::find_admin_by_email(db, &email).await?;

    let mut principal_id = None;
    if let Some(user) = find_user_by_email(db, &email).await? {
        if password::verify(password_attempt, &user.password_hash).await {
            principal_id = Some(user.id);
        }
    }
    if principal_id.is_none() {
        if let Some((id, stored)) = admin
            .as_ref()
            .and_then(|admin| Some((admin.id, admin.password_hash.as_deref()?)))
        {
            if password::verify(password_attempt, stored).await {
                principal_id = Some(id);
            }
        }
    }
    let principal_id = principal_id.ok_or(Error::InvalidCredentials)?;

    let ttl = if remember_me {
        chrono::Duration::days(session.remember_me_ttl_days)
    } else {
        chrono::Duration::minutes(session.default_ttl_minutes)
    };
    let claims = Claims::new(principal_id, email, admin.is_some(), ttl);
    let token = token::issue(session.secret.as_bytes(), &claims)?;

    tracing::info!("Login for {}", claims.email);
    Ok(LoginOutcome { token, claims })
}

/// Builds the profile of the principal identified by `email`.
pub async fn profile(db: &DatabaseConnection, email: &str) -> Result<Profile> {
    let user = find_user_by_email(db, email).await?;
    let admin = match authz::find_admin_by_email(db, email).await? {
        Some(admin) => {
            let permissions = authz::effective_permissions(db, &admin).await?;
            Some(AdminSummary { admin, permissions })
        }
        None => None,
    };

    Ok(Profile {
        email: normalize_email(email),
        user,
        admin,
    })
}

/// Updates the member profile of `email`.
pub async fn update_profile(
    db: &DatabaseConnection,
    email: &str,
    changes: ProfileUpdate,
) -> Result<user::Model> {
    let existing = find_user_by_email(db, email)
        .await?
        .ok_or_else(|| Error::not_found("User", normalize_email(email)))?;

    let mut account: user::ActiveModel = existing.into();
    if let Some(full_name) = changes.full_name {
        account.full_name = Set(required("Full name", &full_name)?);
    }
    if let Some(phone) = changes.phone {
        account.phone = Set(optional(Some(phone)));
    }
    account.updated_at = Set(chrono::Utc::now());

    account.update(db).await.map_err(Into::into)
}

/// Lists registered users, newest first.
pub async fn list_users(db: &DatabaseConnection, request: PageRequest) -> Result<Page<user::Model>> {
    let per_page = request.per_page();
    let paginator = User::find()
        .order_by_desc(user::Column::CreatedAt)
        .order_by_desc(user::Column::Id)
        .paginate(db, per_page);

    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(request.page() - 1).await?;
    Ok(Page {
        items,
        page: request.page(),
        per_page,
        total,
    })
}

/// All registered users' emails, for broadcast messages.
pub async fn all_user_emails(db: &DatabaseConnection) -> Result<Vec<String>> {
    Ok(User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|user| user.email)
        .collect())
}

/// Sets the password a committee member without a member profile logs in with.
pub async fn set_admin_password(
    db: &DatabaseConnection,
    admin: admin::Model,
    new_password: &str,
) -> Result<admin::Model> {
    let hash = password::hash(new_password).await?;
    let mut admin: admin::ActiveModel = admin.into();
    admin.password_hash = Set(Some(hash));
    admin.update(db).await.map_err(Into::into)
}
