//! Route handlers, one module per resource.
//!
//! Handlers stay thin: decode the request, check the route's requirement, call
//! into [`crate::core`], and shape the response.

pub mod accounts;
pub mod admins;
pub mod announcements;
pub mod events;
pub mod invites;
pub mod ledger;
pub mod masterlist;
pub mod minutes;

use serde::Deserialize;

/// Query string of an upload route.
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    /// Client-side file name; only its extension is kept
    pub filename: Option<String>,
}

impl UploadQuery {
    /// The supplied file name, or `upload` when none was given.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.filename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
    }
}
