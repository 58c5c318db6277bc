//! Startup seeding of the bootstrap super-admin.
//!
//! The `[bootstrap_admin]` section names the committee chair who can grant everyone
//! else their permissions. Seeding runs on every start and is idempotent: an existing
//! admin with that email is promoted to super-admin, and a password is only set
//! when the admin has none yet.

use crate::{
    config::AppConfig,
    core::{
        accounts,
        admins::{self, NewAdmin},
        authz,
    },
    entities::admin,
    errors::Result,
};
use sea_orm::{DatabaseConnection, Set, prelude::*};

/// Ensures the configured bootstrap admin exists as a super-admin.
///
/// Returns the admin row, or `None` when no bootstrap admin is configured.
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    config: &AppConfig,
) -> Result<Option<admin::Model>> {
    let Some(bootstrap) = config.bootstrap_admin.as_ref() else {
        tracing::info!("No bootstrap admin configured, skipping seeding");
        return Ok(None);
    };

    let seeded = match authz::find_admin_by_email(db, &bootstrap.email).await? {
        Some(existing) if existing.is_super_admin => existing,
        Some(existing) => {
            tracing::info!("Promoting {} to super-admin", existing.email);
            let mut promoted: admin::ActiveModel = existing.into();
            promoted.is_super_admin = Set(true);
            promoted.update(db).await?
        }
        None => {
            tracing::info!("Seeding bootstrap super-admin {}", bootstrap.email);
            admins::create_admin(
                db,
                NewAdmin {
                    email: bootstrap.email.clone(),
                    name: bootstrap.name.clone(),
                    is_super_admin: true,
                    ..Default::default()
                },
            )
            .await?
        }
    };

    match (&bootstrap.password, &seeded.password_hash) {
        (Some(password), None) => Ok(Some(
            accounts::set_admin_password(db, seeded, password).await?,
        )),
        _ => Ok(Some(seeded)),
    }
}
