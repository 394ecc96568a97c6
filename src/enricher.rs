use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::api::{DriveApi, PermissionEntry};
use crate::model::{DriveItem, Owner, Tree};

pub const DEFAULT_CONCURRENCY: usize = 8;

const OWNER_ROLE: &str = "owner";

/// Attaches the current owner to every item of a tree.
#[derive(Debug, Clone)]
pub struct PermissionEnricher {
    concurrency: usize,
}

impl Default for PermissionEnricher {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl PermissionEnricher {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Never fails: an item whose permissions cannot be read comes back
    /// without an owner. Item order is preserved.
    pub async fn enrich(&self, api: &dyn DriveApi, tree: Tree) -> Tree {
        let (items, truncated) = tree.into_parts();
        let total = items.len();

        let results: Vec<(DriveItem, bool)> = stream::iter(items)
            .map(|item| resolve_owner(api, item))
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|(_, ok)| !ok).count();
        if failed > 0 {
            warn!("Could not read permissions of {} of {} items", failed, total);
        }
        info!("Resolved owners for {} items", total - failed);

        Tree::from_items(results.into_iter().map(|(item, _)| item))
            .with_truncated_folders(truncated)
    }
}

async fn resolve_owner(api: &dyn DriveApi, mut item: DriveItem) -> (DriveItem, bool) {
    match api.list_permissions(&item.id).await {
        Ok(permissions) => {
            item.owner = find_owner(permissions);
            (item, true)
        }
        Err(err) => {
            warn!("Error getting permissions for {}: {}", item.id, err);
            item.owner = None;
            (item, false)
        }
    }
}

/// The first `owner` entry that carries an email address.
pub fn find_owner(permissions: Vec<PermissionEntry>) -> Option<Owner> {
    permissions
        .into_iter()
        .filter(|p| p.role.as_deref() == Some(OWNER_ROLE))
        .find_map(|p| {
            Some(Owner {
                email: p.email_address?,
                display_name: p.display_name,
            })
        })
}
