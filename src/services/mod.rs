/// Outgoing mail and fire-and-forget dispatch
pub mod mailer;
/// Object storage for uploads
pub mod storage;

pub use mailer::{LogMailer, Mailer, OutgoingMail, SmtpMailer, dispatch};
pub use storage::{LocalObjectStore, ObjectStore, StoredObject, discard};
