//! Database configuration module.
//!
//! This module handles the database connection (`PostgreSQL` in production, `SQLite`
//! for local runs and tests) and table creation using `SeaORM`. Tables are generated
//! from the entity definitions with `Schema::create_table_from_entity`, so the schema
//! always matches the Rust structs. Composite unique indexes that the entity macros
//! cannot express are added here as well; upserts rely on them.

use crate::config::AppConfig;
use crate::entities::{
    Admin, AdminPermission, AdminPermissionColumn, Announcement, Event, Invite,
    LedgerTransaction, MasterList, MeetingMinute, Rsvp, RsvpColumn, User,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/reunion.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, then the
/// configuration file, then a local `SQLite` file.
#[must_use]
pub fn get_database_url(config: &AppConfig) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| config.database.url.clone())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection pool to the configured database.
pub async fn create_connection(config: &AppConfig) -> Result<DatabaseConnection> {
    let database_url = get_database_url(config);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and composite indexes if they do not exist yet.
///
/// Parent tables are created before the tables whose foreign keys reference them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    create_table(db, User).await?;
    create_table(db, MasterList).await?;
    create_table(db, Admin).await?;
    create_table(db, AdminPermission).await?;
    create_table(db, Invite).await?;
    create_table(db, Event).await?;
    create_table(db, Rsvp).await?;
    create_table(db, LedgerTransaction).await?;
    create_table(db, Announcement).await?;
    create_table(db, MeetingMinute).await?;

    let builder = db.get_database_backend();
    for index in composite_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

fn composite_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .name("idx_admin_permissions_admin_permission")
            .table(AdminPermission)
            .col(AdminPermissionColumn::AdminId)
            .col(AdminPermissionColumn::Permission)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_rsvps_event_user")
            .table(Rsvp)
            .col(RsvpColumn::EventId)
            .col(RsvpColumn::UserId)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}
