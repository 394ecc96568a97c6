use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::api::DriveApi;
use crate::config::AppConfig;
use crate::crawler::TreeCrawler;
use crate::enricher::PermissionEnricher;
use crate::error::{Error, Result};
use crate::model::Tree;
use crate::selection::{Selection, SelectionPolicy};
use crate::transfer::{OwnershipTransferer, TransferReport};
use crate::url::resolve_id;

#[derive(Debug, Clone, Serialize)]
pub struct TransferOutcome {
    pub report: TransferReport,
    /// Whether the tree was re-crawled after the transfer.
    pub refreshed: bool,
}

/// Caller-owned state of one explore / select / transfer session.
///
/// Every transition takes `&mut self`, so at most one crawl or transfer runs
/// against the state at a time.
pub struct Workflow {
    api: Arc<dyn DriveApi>,
    policy: SelectionPolicy,
    crawler: TreeCrawler,
    enricher: PermissionEnricher,
    transferer: OwnershipTransferer,
    root_url: Option<String>,
    tree: Tree,
    selection: Selection,
}

impl Workflow {
    pub fn new(api: Arc<dyn DriveApi>, config: &AppConfig) -> Self {
        let policy = SelectionPolicy::new(config.managed_owner.clone());
        Self {
            api,
            crawler: TreeCrawler::new(config.page_size, config.max_depth),
            enricher: PermissionEnricher::new(config.concurrency),
            transferer: OwnershipTransferer::new(policy.clone())
                .with_concurrency(config.concurrency)
                .with_mode(config.transfer_mode),
            policy,
            root_url: None,
            tree: Tree::default(),
            selection: Selection::new(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    pub fn root_url(&self) -> Option<&str> {
        self.root_url.as_deref()
    }

    /// Crawls and enriches the item behind `url`, which then becomes the
    /// target of later refreshes. On failure the previous tree and refresh
    /// target are kept.
    pub async fn explore(&mut self, url: &str) -> Result<&Tree> {
        let id = resolve_id(url)?;
        self.load(&id).await?;
        self.root_url = Some(url.trim().to_string());
        Ok(&self.tree)
    }

    /// Repeats the last exploration without asking for a URL.
    pub async fn refresh(&mut self) -> Result<&Tree> {
        let url = self.root_url.as_deref().ok_or(Error::NoRefreshTarget)?;
        let id = resolve_id(url)?;
        self.load(&id).await
    }

    async fn load(&mut self, root_id: &str) -> Result<&Tree> {
        let tree = self.crawler.crawl(self.api.as_ref(), root_id).await?;
        let tree = self.enricher.enrich(self.api.as_ref(), tree).await;

        self.tree = tree;
        self.selection.clear();
        Ok(&self.tree)
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.selection.toggle(&self.policy, &self.tree, id)
    }

    pub fn select_all(&mut self) -> usize {
        self.selection.select_all(&self.policy, &self.tree)
    }

    pub fn set_selection<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) -> usize {
        self.selection.set(&self.policy, &self.tree, ids)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Transfers the selected items, then re-crawls so the tree shows the new
    /// owners. A failed re-crawl is logged and leaves the old tree in place.
    pub async fn transfer(&mut self, destination: &str) -> Result<TransferOutcome> {
        let report = self
            .transferer
            .transfer(self.api.as_ref(), &self.tree, &self.selection, destination)
            .await?;

        if report.succeeded.is_empty() {
            return Ok(TransferOutcome {
                report,
                refreshed: false,
            });
        }

        let refreshed = match self.refresh().await {
            Ok(tree) => {
                info!("Refreshed {} items after transfer", tree.len());
                true
            }
            Err(err) => {
                warn!("Failed to refresh after transfer: {}", err);
                false
            }
        };
        self.selection.clear();

        Ok(TransferOutcome { report, refreshed })
    }
}
