//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod admin;
pub mod admin_permission;
pub mod announcement;
pub mod event;
pub mod invite;
pub mod ledger_transaction;
pub mod master_list;
pub mod meeting_minute;
pub mod rsvp;
pub mod user;

// Re-export specific types to avoid conflicts
pub use admin::{Column as AdminColumn, Entity as Admin, Model as AdminModel};
pub use admin_permission::{
    Column as AdminPermissionColumn, Entity as AdminPermission, Model as AdminPermissionModel,
    Permission,
};
pub use announcement::{
    Column as AnnouncementColumn, Entity as Announcement, Model as AnnouncementModel,
};
pub use event::{Column as EventColumn, Entity as Event, Model as EventModel};
pub use invite::{Column as InviteColumn, Entity as Invite, Model as InviteModel};
pub use ledger_transaction::{
    Column as LedgerTransactionColumn, Entity as LedgerTransaction,
    Model as LedgerTransactionModel, VerificationStatus,
};
pub use master_list::{Column as MasterListColumn, Entity as MasterList, Model as MasterListModel};
pub use meeting_minute::{
    Column as MeetingMinuteColumn, Entity as MeetingMinute, Model as MeetingMinuteModel,
};
pub use rsvp::{Column as RsvpColumn, Entity as Rsvp, Model as RsvpModel, RsvpStatus};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};
