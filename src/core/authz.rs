//! Authorization resolver - The single place that decides what a principal may do.
//!
//! The session token only identifies the principal by email. Every check re-reads
//! the admin store, so a revoked grant takes effect on the next request. Super-admins
//! short-circuit to allow for every requirement; regular admins need an enabled grant
//! row for permission-gated actions; everyone else is denied. Store failures are
//! returned as errors and never reported as a denial.

use crate::{
    core::validation::normalize_email,
    entities::{Admin, AdminPermission, Permission, admin, admin_permission},
    errors::{Error, Result},
};
use sea_orm::{Iterable, prelude::*};
use std::collections::BTreeMap;
use std::fmt;

/// What an action demands of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Presence in the admin store is enough
    AnyAdmin,
    /// Only super-admins
    SuperAdmin,
    /// A specific enabled grant (or super-admin)
    Permission(Permission),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyAdmin => f.write_str("admin access"),
            Self::SuperAdmin => f.write_str("super-admin access"),
            Self::Permission(permission) => write!(f, "permission {permission}"),
        }
    }
}

/// Why a principal was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The email is not in the admin store
    NotAdmin,
    /// The admin is not a super-admin
    NotSuperAdmin,
    /// The admin lacks an enabled grant for this permission
    MissingPermission(Permission),
}

impl Denial {
    /// Client-facing message for a 403 response.
    #[must_use]
    pub fn message(self) -> String {
        match self {
            Self::NotAdmin => "Admin access required".to_string(),
            Self::NotSuperAdmin => "Super-admin access required".to_string(),
            Self::MissingPermission(permission) => format!("Missing permission: {permission}"),
        }
    }
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allowed, with the admin row that was resolved
    Allow(admin::Model),
    /// Denied
    Deny(Denial),
}

impl Decision {
    /// Whether the check passed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }
}

/// Looks up an admin by email, case-insensitively.
pub async fn find_admin_by_email<C>(db: &C, email: &str) -> Result<Option<admin::Model>>
where
    C: ConnectionTrait,
{
    Admin::find()
        .filter(admin::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves whether `email` satisfies `requirement` from persisted state.
///
/// Missing grant rows are a denial, not an error.
pub async fn authorize<C>(db: &C, email: &str, requirement: Requirement) -> Result<Decision>
where
    C: ConnectionTrait,
{
    let Some(admin) = find_admin_by_email(db, email).await? else {
        return Ok(Decision::Deny(Denial::NotAdmin));
    };

    if admin.is_super_admin {
        return Ok(Decision::Allow(admin));
    }

    match requirement {
        Requirement::AnyAdmin => Ok(Decision::Allow(admin)),
        Requirement::SuperAdmin => Ok(Decision::Deny(Denial::NotSuperAdmin)),
        Requirement::Permission(permission) => {
            let grant = AdminPermission::find()
                .filter(admin_permission::Column::AdminId.eq(admin.id))
                .filter(admin_permission::Column::Permission.eq(permission))
                .one(db)
                .await?;

            if grant.is_some_and(|row| row.enabled) {
                Ok(Decision::Allow(admin))
            } else {
                Ok(Decision::Deny(Denial::MissingPermission(permission)))
            }
        }
    }
}

/// Boolean form of [`authorize`].
pub async fn is_allowed<C>(db: &C, email: &str, requirement: Requirement) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(authorize(db, email, requirement).await?.is_allowed())
}

/// Like [`authorize`], but turns a denial into [`Error::Forbidden`].
pub async fn require<C>(db: &C, email: &str, requirement: Requirement) -> Result<admin::Model>
where
    C: ConnectionTrait,
{
    match authorize(db, email, requirement).await? {
        Decision::Allow(admin) => Ok(admin),
        Decision::Deny(denial) => {
            tracing::debug!("Denied {} for {}: {:?}", requirement, email, denial);
            Err(Error::Forbidden {
                message: denial.message(),
            })
        }
    }
}

/// Every permission with its effective state for `admin`.
///
/// Super-admins report every permission as enabled regardless of stored rows.
pub async fn effective_permissions<C>(
    db: &C,
    admin: &admin::Model,
) -> Result<BTreeMap<Permission, bool>>
where
    C: ConnectionTrait,
{
    if admin.is_super_admin {
        return Ok(Permission::iter().map(|p| (p, true)).collect());
    }

    let grants = AdminPermission::find()
        .filter(admin_permission::Column::AdminId.eq(admin.id))
        .all(db)
        .await?;

    let mut permissions: BTreeMap<Permission, bool> =
        Permission::iter().map(|p| (p, false)).collect();
    for grant in grants {
        permissions.insert(grant.permission, grant.enabled);
    }
    Ok(permissions)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_super_admin_allowed_without_grants() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_admin(&db, "chair@example.org", true).await?;

        for permission in Permission::iter() {
            assert!(
                is_allowed(&db, "chair@example.org", Requirement::Permission(permission)).await?
            );
        }
        assert!(is_allowed(&db, "chair@example.org", Requirement::AnyAdmin).await?);
        assert!(is_allowed(&db, "chair@example.org", Requirement::SuperAdmin).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_super_admin_ignores_disabled_grants() -> Result<()> {
        let db = setup_test_db().await?;
        let chair = create_test_admin(&db, "chair@example.org", true).await?;
        grant_permission(&db, chair.id, Permission::AccountingEdit, false).await?;

        let decision = authorize(
            &db,
            "chair@example.org",
            Requirement::Permission(Permission::AccountingEdit),
        )
        .await?;
        assert!(decision.is_allowed());

        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_denied_everything() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_user(&db, "member@example.org").await?;

        assert_eq!(
            authorize(&db, "member@example.org", Requirement::AnyAdmin).await?,
            Decision::Deny(Denial::NotAdmin)
        );
        for permission in Permission::iter() {
            assert!(
                !is_allowed(&db, "member@example.org", Requirement::Permission(permission))
                    .await?
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_missing_and_disabled_grants_are_equivalent() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "sec@example.org", false).await?;
        grant_permission(&db, admin.id, Permission::MinutesView, false).await?;

        let disabled = authorize(
            &db,
            "sec@example.org",
            Requirement::Permission(Permission::MinutesView),
        )
        .await?;
        let missing = authorize(
            &db,
            "sec@example.org",
            Requirement::Permission(Permission::MinutesEdit),
        )
        .await?;

        assert_eq!(
            disabled,
            Decision::Deny(Denial::MissingPermission(Permission::MinutesView))
        );
        assert_eq!(
            missing,
            Decision::Deny(Denial::MissingPermission(Permission::MinutesEdit))
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_generic_admin_check_ignores_grants() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_admin(&db, "helper@example.org", false).await?;

        assert!(is_allowed(&db, "helper@example.org", Requirement::AnyAdmin).await?);
        assert!(!is_allowed(&db, "helper@example.org", Requirement::SuperAdmin).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "treasurer@example.org", false).await?;
        grant_permission(&db, admin.id, Permission::AccountingEdit, true).await?;

        assert!(
            is_allowed(
                &db,
                "Treasurer@Example.ORG",
                Requirement::Permission(Permission::AccountingEdit)
            )
            .await?
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_require_names_missing_permission() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "inviter@example.org", false).await?;
        grant_permission(&db, admin.id, Permission::InvitesAdd, true).await?;

        let allowed = require(
            &db,
            "inviter@example.org",
            Requirement::Permission(Permission::InvitesAdd),
        )
        .await?;
        assert_eq!(allowed.id, admin.id);

        let err = require(
            &db,
            "inviter@example.org",
            Requirement::Permission(Permission::AccountingEdit),
        )
        .await
        .unwrap_err();
        match err {
            Error::Forbidden { message } => assert!(message.contains("accounting_edit")),
            other => panic!("expected Forbidden, got {other:?}"),
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_revoked_grant_takes_effect_immediately() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = create_test_admin(&db, "editor@example.org", false).await?;
        grant_permission(&db, admin.id, Permission::MinutesEdit, true).await?;
        let requirement = Requirement::Permission(Permission::MinutesEdit);

        assert!(is_allowed(&db, "editor@example.org", requirement).await?);
        grant_permission(&db, admin.id, Permission::MinutesEdit, false).await?;
        assert!(!is_allowed(&db, "editor@example.org", requirement).await?);

        Ok(())
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error_not_a_denial() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let result = authorize(&db, "anyone@example.org", Requirement::AnyAdmin).await;
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[tokio::test]
    async fn test_effective_permissions() -> Result<()> {
        let db = setup_test_db().await?;
        let chair = create_test_admin(&db, "chair@example.org", true).await?;
        let admin = create_test_admin(&db, "sec@example.org", false).await?;
        grant_permission(&db, admin.id, Permission::MinutesView, true).await?;
        grant_permission(&db, admin.id, Permission::MinutesEdit, false).await?;

        let chair_permissions = effective_permissions(&db, &chair).await?;
        assert!(chair_permissions.values().all(|enabled| *enabled));

        let permissions = effective_permissions(&db, &admin).await?;
        assert_eq!(permissions.len(), Permission::iter().count());
        assert_eq!(permissions[&Permission::MinutesView], true);
        assert_eq!(permissions[&Permission::MinutesEdit], false);
        assert_eq!(permissions[&Permission::AccountingEdit], false);

        Ok(())
    }
}
