/// Invite registration, login and member profiles
pub mod accounts;
/// Committee admins and their permission grants
pub mod admins;
/// Announcements posted by the committee
pub mod announcements;
/// Permission resolution for every privileged operation
pub mod authz;
/// Events and RSVPs
pub mod events;
/// Registration invites
pub mod invites;
/// Ledger transactions, running balances and totals
pub mod ledger;
/// Class roster with payment status and promotion
pub mod masterlist;
/// Meeting minutes
pub mod minutes;
/// Page requests and paged results
pub mod pagination;
/// Per-member payment status
pub mod payment;
/// Input normalization
pub mod validation;
