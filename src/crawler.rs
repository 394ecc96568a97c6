use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::api::{DriveApi, RemoteItem};
use crate::error::{Error, Result};
use crate::model::{ItemKind, Tree};

pub const DEFAULT_PAGE_SIZE: i32 = 1000;
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Enumerates everything beneath a root item, depth-first, pre-order.
///
/// Folder listings are awaited one at a time. Drive folders form a DAG, so
/// the crawl does not look for cycles; the visited set and `max_depth` are
/// what keeps a misbehaving backend from looping forever.
#[derive(Debug, Clone)]
pub struct TreeCrawler {
    page_size: i32,
    max_depth: usize,
}

impl Default for TreeCrawler {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_MAX_DEPTH)
    }
}

impl TreeCrawler {
    pub fn new(page_size: i32, max_depth: usize) -> Self {
        Self {
            page_size,
            max_depth,
        }
    }

    /// Any failed request aborts the whole crawl. Only the first page of each
    /// folder is read; folders with more children than `page_size` end up in
    /// [`Tree::truncated_folders`].
    pub async fn crawl(&self, api: &dyn DriveApi, root_id: &str) -> Result<Tree> {
        let root = api
            .get_item(root_id)
            .await
            .map_err(|e| Error::fetch(root_id, e))?;

        let mut visited = HashSet::from([root.id.clone()]);
        let mut truncated = Vec::new();
        let mut items = Vec::new();

        let root_folder = (root.kind() == ItemKind::Folder).then(|| root.id.clone());
        items.push(root.into_item());

        let Some(root_folder) = root_folder else {
            debug!("{} is a file, nothing to descend into", root_id);
            return Ok(Tree::from_items(items));
        };

        // Each frame holds the not yet visited siblings at one depth.
        let mut stack: Vec<(usize, std::vec::IntoIter<RemoteItem>)> = Vec::new();
        let children = self.list_folder(api, &root_folder, 1, &mut truncated).await?;
        stack.push((1, children.into_iter()));

        loop {
            let (depth, next) = match stack.last_mut() {
                Some((depth, siblings)) => (*depth, siblings.next()),
                None => break,
            };
            let Some(child) = next else {
                stack.pop();
                continue;
            };

            if !visited.insert(child.id.clone()) {
                debug!("Skipping {} already reached through another parent", child.id);
                continue;
            }

            let folder = (child.kind() == ItemKind::Folder).then(|| child.id.clone());
            items.push(child.into_item());

            if let Some(folder) = folder {
                let children = self
                    .list_folder(api, &folder, depth + 1, &mut truncated)
                    .await?;
                stack.push((depth + 1, children.into_iter()));
            }
        }

        info!("Found {} items under {}", items.len(), root_id);
        Ok(Tree::from_items(items).with_truncated_folders(truncated))
    }

    async fn list_folder(
        &self,
        api: &dyn DriveApi,
        folder_id: &str,
        child_depth: usize,
        truncated: &mut Vec<String>,
    ) -> Result<Vec<RemoteItem>> {
        if child_depth > self.max_depth {
            return Err(Error::DepthExceeded {
                id: folder_id.to_string(),
                max_depth: self.max_depth,
            });
        }

        let page = api
            .list_children(folder_id, self.page_size)
            .await
            .map_err(|e| Error::fetch(folder_id, e))?;

        if page.has_more {
            warn!(
                "Folder {} has more than {} children, only the first page was read",
                folder_id, self.page_size
            );
            truncated.push(folder_id.to_string());
        }

        Ok(page.items)
    }
}
