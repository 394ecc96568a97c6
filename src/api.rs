//! The four Drive calls the crawler, enricher and transferer rely on.
//!
//! Production code talks to Google through [`crate::hub::HubClient`]; tests
//! substitute an in-memory implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{DriveItem, ItemKind};

/// Item descriptor as returned by `files.get` / `files.list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    pub id: String,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

impl RemoteItem {
    pub fn kind(&self) -> ItemKind {
        ItemKind::from_mime_type(self.mime_type.as_deref())
    }

    pub fn into_item(self) -> DriveItem {
        let kind = self.kind();
        DriveItem {
            id: self.id,
            name: self.name,
            kind,
            size: match kind {
                ItemKind::Folder => None,
                ItemKind::File => self.size,
            },
            owner: None,
        }
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, Default)]
pub struct ChildPage {
    pub items: Vec<RemoteItem>,
    /// The API reported a next page that was not requested.
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub role: Option<String>,
    pub email_address: Option<String>,
    pub display_name: Option<String>,
}

#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Fetches id, name, mimeType and size of a single item.
    async fn get_item(&self, id: &str) -> Result<RemoteItem>;

    /// Lists the direct children of a folder, a single page of at most `page_size`.
    async fn list_children(&self, folder_id: &str, page_size: i32) -> Result<ChildPage>;

    /// Fetches emailAddress, role and displayName of every permission on an item.
    async fn list_permissions(&self, id: &str) -> Result<Vec<PermissionEntry>>;

    /// Creates an `owner` permission for `email` with `transferOwnership` set.
    async fn transfer_ownership(&self, id: &str, email: &str) -> Result<()>;
}
