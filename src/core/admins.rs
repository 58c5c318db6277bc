//! Admin management - committee members, their role metadata and permission grants.
//!
//! Grants are upserted on `(admin_id, permission)`. Super-admins can never be deleted
//! through these functions; cascades from other entities skip them as well.

use crate::{
    core::validation::{optional, parse_email, required},
    entities::{Admin, AdminPermission, Permission, admin, admin_permission},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::OnConflict};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Input for creating an admin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAdmin {
    /// Email (normalized on write)
    pub email: String,
    /// Display name
    pub name: String,
    /// Committee title
    #[serde(default)]
    pub title: Option<String>,
    /// Sub-committee
    #[serde(default)]
    pub sub_committee: Option<String>,
    /// Sub-committee leader flag
    #[serde(default)]
    pub is_leader: bool,
    /// Super-admin flag, only settable by startup seeding
    #[serde(skip)]
    pub is_super_admin: bool,
    /// Linked master-list entry
    #[serde(skip)]
    pub master_list_id: Option<i64>,
    /// Pre-hashed password
    #[serde(skip)]
    pub password_hash: Option<String>,
}

/// Role metadata changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminRoleUpdate {
    /// New display name
    pub name: Option<String>,
    /// New committee title
    pub title: Option<String>,
    /// New sub-committee
    pub sub_committee: Option<String>,
    /// New leader flag
    pub is_leader: Option<bool>,
}

/// Retrieves all admins ordered by name.
pub async fn list_admins(db: &DatabaseConnection) -> Result<Vec<admin::Model>> {
    Admin::find()
        .order_by_asc(admin::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an admin by id.
pub async fn get_admin<C>(db: &C, admin_id: i64) -> Result<Option<admin::Model>>
where
    C: ConnectionTrait,
{
    Admin::find_by_id(admin_id).one(db).await.map_err(Into::into)
}

/// Creates an admin. Duplicate emails are reported as a conflict.
pub async fn create_admin<C>(db: &C, new_admin: NewAdmin) -> Result<admin::Model>
where
    C: ConnectionTrait,
{
    let email = parse_email(&new_admin.email)?;
    let name = required("Name", &new_admin.name)?;

    let admin = admin::ActiveModel {
        email: Set(email),
        name: Set(name),
        is_super_admin: Set(new_admin.is_super_admin),
        title: Set(optional(new_admin.title)),
        sub_committee: Set(optional(new_admin.sub_committee)),
        is_leader: Set(new_admin.is_leader),
        master_list_id: Set(new_admin.master_list_id),
        password_hash: Set(new_admin.password_hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = admin
        .insert(db)
        .await
        .map_err(|e| Error::unique_violation(e, "An admin with this email already exists"))?;
    tracing::info!("Created admin {} ({})", created.id, created.email);
    Ok(created)
}

/// Updates an admin's role metadata.
pub async fn update_admin_role(
    db: &DatabaseConnection,
    admin_id: i64,
    changes: AdminRoleUpdate,
) -> Result<admin::Model> {
    let existing = get_admin(db, admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin", admin_id))?;

    let mut admin: admin::ActiveModel = existing.into();
    if let Some(name) = changes.name {
        admin.name = Set(required("Name", &name)?);
    }
    if let Some(title) = changes.title {
        admin.title = Set(optional(Some(title)));
    }
    if let Some(sub_committee) = changes.sub_committee {
        admin.sub_committee = Set(optional(Some(sub_committee)));
    }
    if let Some(is_leader) = changes.is_leader {
        admin.is_leader = Set(is_leader);
    }

    admin.update(db).await.map_err(Into::into)
}

/// Upserts one permission grant.
pub async fn set_permission<C>(
    db: &C,
    admin_id: i64,
    permission: Permission,
    enabled: bool,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let grant = admin_permission::ActiveModel {
        admin_id: Set(admin_id),
        permission: Set(permission),
        enabled: Set(enabled),
        ..Default::default()
    };

    AdminPermission::insert(grant)
        .on_conflict(
            OnConflict::columns([
                admin_permission::Column::AdminId,
                admin_permission::Column::Permission,
            ])
            .update_column(admin_permission::Column::Enabled)
            .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

/// Parses submitted permission keys, rejecting the whole request on any unknown key.
pub fn parse_permission_map(raw: &BTreeMap<String, bool>) -> Result<BTreeMap<Permission, bool>> {
    raw.iter()
        .map(|(key, enabled)| {
            key.parse::<Permission>()
                .map(|permission| (permission, *enabled))
                .map_err(Error::validation)
        })
        .collect()
}

/// Applies a batch of grants atomically.
pub async fn set_permissions(
    db: &DatabaseConnection,
    admin_id: i64,
    permissions: &BTreeMap<Permission, bool>,
) -> Result<()> {
    let txn = db.begin().await?;

    get_admin(&txn, admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin", admin_id))?;

    for (permission, enabled) in permissions {
        set_permission(&txn, admin_id, *permission, *enabled).await?;
    }

    txn.commit().await?;
    tracing::info!("Updated {} permission(s) for admin {}", permissions.len(), admin_id);
    Ok(())
}

/// Deletes a non-super admin along with its grants.
///
/// Returns `false` and leaves the row in place for super-admins.
pub async fn remove_admin<C>(db: &C, admin: &admin::Model) -> Result<bool>
where
    C: ConnectionTrait,
{
    if admin.is_super_admin {
        return Ok(false);
    }

    AdminPermission::delete_many()
        .filter(admin_permission::Column::AdminId.eq(admin.id))
        .exec(db)
        .await?;
    Admin::delete_by_id(admin.id).exec(db).await?;

    tracing::info!("Removed admin {} ({})", admin.id, admin.email);
    Ok(true)
}

/// Deletes an admin by id. Super-admins are rejected.
pub async fn delete_admin(db: &DatabaseConnection, admin_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let admin = get_admin(&txn, admin_id)
        .await?
        .ok_or_else(|| Error::not_found("Admin", admin_id))?;

    if !remove_admin(&txn, &admin).await? {
        return Err(Error::validation("Super-admins cannot be deleted"));
    }

    // Keep the master-list flag in sync with the admin table
    if let Some(master_list_id) = admin.master_list_id {
        crate::core::masterlist::set_admin_flag(&txn, master_list_id, false).await?;
    }

    txn.commit().await?;
    Ok(())
}
