//! Invite business logic - issuing, linking and revoking registration invites.
//!
//! One invite per email address. The uniqueness check is left to the store and its
//! violation is reported as a conflict. Sending the invite email is the caller's job
//! and never blocks creation.

use crate::{
    core::{
        admins,
        validation::{optional, parse_email},
    },
    entities::{Invite, invite},
    errors::{Error, Result},
};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

const TOKEN_LENGTH: usize = 40;

/// Input for issuing an invite.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInvite {
    /// Invitee email
    pub email: String,
    /// Invitee name
    #[serde(default)]
    pub name: Option<String>,
    /// Master-list entry to link right away
    #[serde(default)]
    pub master_list_id: Option<i64>,
}

/// What an invitee sees before registering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvitePreview {
    /// Email the account will be created with
    pub email: String,
    /// Name on the invite
    pub name: Option<String>,
}

fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Retrieves all invites, newest first.
pub async fn list_invites(db: &DatabaseConnection) -> Result<Vec<invite::Model>> {
    Invite::find()
        .order_by_desc(invite::Column::CreatedAt)
        .order_by_desc(invite::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an invite by id.
pub async fn get_invite<C>(db: &C, invite_id: i64) -> Result<Option<invite::Model>>
where
    C: ConnectionTrait,
{
    Invite::find_by_id(invite_id).one(db).await.map_err(Into::into)
}

/// Finds an unused invite by its token.
pub async fn find_open_invite<C>(db: &C, token: &str) -> Result<Option<invite::Model>>
where
    C: ConnectionTrait,
{
    Invite::find()
        .filter(invite::Column::Token.eq(token))
        .filter(invite::Column::UsedAt.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Public preview of an open invite.
pub async fn preview(db: &DatabaseConnection, token: &str) -> Result<InvitePreview> {
    let invite = find_open_invite(db, token)
        .await?
        .ok_or_else(|| Error::not_found("Invite", "token"))?;
    Ok(InvitePreview {
        email: invite.email,
        name: invite.name,
    })
}

/// Issues an invite on behalf of `invited_by`.
pub async fn create_invite(
    db: &DatabaseConnection,
    new_invite: NewInvite,
    invited_by: Option<i64>,
) -> Result<invite::Model> {
    let email = parse_email(&new_invite.email)?;
    if let Some(id) = new_invite.master_list_id {
        crate::core::masterlist::get_entry(db, id)
            .await?
            .ok_or_else(|| Error::not_found("Master list entry", id))?;
    }

    let invite = invite::ActiveModel {
        email: Set(email),
        name: Set(optional(new_invite.name)),
        token: Set(generate_token()),
        master_list_id: Set(new_invite.master_list_id),
        invited_by: Set(invited_by),
        used_at: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = invite
        .insert(db)
        .await
        .map_err(|e| Error::unique_violation(e, "An invite for this email already exists"))?;
    tracing::info!("Issued invite {} to {}", created.id, created.email);
    Ok(created)
}

/// Links an invite to a master-list entry, or clears the link with `None`.
pub async fn link_invite(
    db: &DatabaseConnection,
    invite_id: i64,
    master_list_id: Option<i64>,
) -> Result<invite::Model> {
    let existing = get_invite(db, invite_id)
        .await?
        .ok_or_else(|| Error::not_found("Invite", invite_id))?;
    if let Some(id) = master_list_id {
        crate::core::masterlist::get_entry(db, id)
            .await?
            .ok_or_else(|| Error::not_found("Master list entry", id))?;
    }

    let mut invite: invite::ActiveModel = existing.into();
    invite.master_list_id = Set(master_list_id);
    invite.update(db).await.map_err(Into::into)
}

/// Marks an invite as redeemed.
pub async fn mark_used<C>(db: &C, invite: invite::Model) -> Result<invite::Model>
where
    C: ConnectionTrait,
{
    let mut invite: invite::ActiveModel = invite.into();
    invite.used_at = Set(Some(chrono::Utc::now()));
    invite.update(db).await.map_err(Into::into)
}

/// Deletes an invite and any non-super admin sharing its email.
///
/// Returns whether an admin was removed.
pub async fn delete_invite(db: &DatabaseConnection, invite_id: i64) -> Result<bool> {
    let txn = db.begin().await?;
    let invite = get_invite(&txn, invite_id)
        .await?
        .ok_or_else(|| Error::not_found("Invite", invite_id))?;

    let mut admin_removed = false;
    if let Some(admin) = crate::core::authz::find_admin_by_email(&txn, &invite.email).await? {
        admin_removed = admins::remove_admin(&txn, &admin).await?;
        if admin_removed {
            if let Some(master_list_id) = admin.master_list_id {
                crate::core::masterlist::set_admin_flag(&txn, master_list_id, false).await?;
            }
        }
    }

    Invite::delete_by_id(invite_id).exec(&txn).await?;
    txn.commit().await?;
    tracing::info!("Deleted invite {} (admin removed: {})", invite_id, admin_removed);
    Ok(admin_removed)
}
