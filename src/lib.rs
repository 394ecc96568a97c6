//! Enumerate a Google Drive file or folder tree, annotate every item with its
//! owner, and hand ownership of the items held by one managed account over to
//! another user.

pub mod api;
pub mod config;
pub mod crawler;
pub mod enricher;
pub mod error;
pub mod hub;
pub mod model;
pub mod selection;
pub mod transfer;
pub mod url;
pub mod workflow;

pub use crate::api::{ChildPage, DriveApi, PermissionEntry, RemoteItem};
pub use crate::config::AppConfig;
pub use crate::error::{Error, Result};
pub use crate::model::{DriveItem, ItemKind, Owner, Tree};
pub use crate::selection::{Selection, SelectionPolicy};
pub use crate::transfer::{TransferMode, TransferReport};
pub use crate::workflow::{TransferOutcome, Workflow};
