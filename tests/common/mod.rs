#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use drive_ownership::model::FOLDER_MIME_TYPE;
use drive_ownership::{ChildPage, DriveApi, Error, PermissionEntry, RemoteItem, Result};

pub const MANAGED: &str = "admin@example.com";
pub const OTHER: &str = "someone@example.com";

/// In-memory Drive: items, parent links and owners, with switchable failures.
#[derive(Default)]
pub struct MemoryDrive {
    items: HashMap<String, RemoteItem>,
    children: HashMap<String, Vec<String>>,
    owners: Mutex<HashMap<String, String>>,
    failing_items: HashSet<String>,
    failing_listings: HashSet<String>,
    failing_permissions: HashSet<String>,
    failing_transfers: HashSet<String>,
    calls: Mutex<Vec<String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Counts one request as in flight until dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryDrive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folder(self, id: &str, parent: Option<&str>, owner: &str) -> Self {
        self.insert(id, Some(FOLDER_MIME_TYPE), None, parent, owner)
    }

    pub fn file(self, id: &str, size: u64, parent: Option<&str>, owner: &str) -> Self {
        self.insert(id, Some("application/pdf"), Some(size), parent, owner)
    }

    /// Adds an extra parent link for an existing item.
    pub fn link(mut self, id: &str, parent: &str) -> Self {
        self.children
            .entry(parent.to_string())
            .or_default()
            .push(id.to_string());
        self
    }

    pub fn fail_item(mut self, id: &str) -> Self {
        self.failing_items.insert(id.to_string());
        self
    }

    pub fn fail_listing(mut self, id: &str) -> Self {
        self.failing_listings.insert(id.to_string());
        self
    }

    pub fn fail_permissions(mut self, id: &str) -> Self {
        self.failing_permissions.insert(id.to_string());
        self
    }

    pub fn fail_transfer(mut self, id: &str) -> Self {
        self.failing_transfers.insert(id.to_string());
        self
    }

    /// Makes permission reads and transfers take `latency`, so concurrent
    /// requests overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Highest number of permission reads or transfers seen running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn reset_in_flight(&self) {
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    async fn in_flight(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.in_flight);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }

    fn insert(
        mut self,
        id: &str,
        mime_type: Option<&str>,
        size: Option<u64>,
        parent: Option<&str>,
        owner: &str,
    ) -> Self {
        self.items.insert(
            id.to_string(),
            RemoteItem {
                id: id.to_string(),
                name: format!("{id} name"),
                mime_type: mime_type.map(str::to_string),
                size,
            },
        );
        self.owners
            .get_mut()
            .unwrap()
            .insert(id.to_string(), owner.to_string());
        if let Some(parent) = parent {
            self = self.link(id, parent);
        }
        self
    }

    pub fn owner_of(&self, id: &str) -> Option<String> {
        self.owners.lock().unwrap().get(id).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DriveApi for MemoryDrive {
    async fn get_item(&self, id: &str) -> Result<RemoteItem> {
        self.record(format!("get:{id}"));
        if self.failing_items.contains(id) {
            return Err(Error::Api("500 internal error".to_string()));
        }
        self.items
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("404 file not found: {id}")))
    }

    async fn list_children(&self, folder_id: &str, page_size: i32) -> Result<ChildPage> {
        self.record(format!("list:{folder_id}"));
        if self.failing_listings.contains(folder_id) {
            return Err(Error::Api("500 internal error".to_string()));
        }

        let ids = self.children.get(folder_id).cloned().unwrap_or_default();
        let limit = page_size.max(0) as usize;
        Ok(ChildPage {
            has_more: ids.len() > limit,
            items: ids
                .iter()
                .take(limit)
                .filter_map(|id| self.items.get(id).cloned())
                .collect(),
        })
    }

    async fn list_permissions(&self, id: &str) -> Result<Vec<PermissionEntry>> {
        self.record(format!("perm:{id}"));
        let _in_flight = self.in_flight().await;
        if self.failing_permissions.contains(id) {
            return Err(Error::Api("403 forbidden".to_string()));
        }

        let mut entries = vec![PermissionEntry {
            role: Some("reader".to_string()),
            email_address: Some("reader@example.com".to_string()),
            display_name: Some("Reader".to_string()),
        }];
        if let Some(owner) = self.owner_of(id) {
            entries.push(PermissionEntry {
                role: Some("owner".to_string()),
                display_name: owner.split('@').next().map(str::to_string),
                email_address: Some(owner),
            });
        }
        Ok(entries)
    }

    async fn transfer_ownership(&self, id: &str, email: &str) -> Result<()> {
        self.record(format!("transfer:{id}:{email}"));
        let _in_flight = self.in_flight().await;
        if self.failing_transfers.contains(id) {
            return Err(Error::Api("403 consent required".to_string()));
        }
        self.owners
            .lock()
            .unwrap()
            .insert(id.to_string(), email.to_string());
        Ok(())
    }
}

/// root/
///   a.pdf
///   docs/
///     b.pdf
///     nested/
///       c.pdf        (owned by OTHER)
///   d.pdf
///   empty/
pub fn sample_drive() -> MemoryDrive {
    MemoryDrive::new()
        .folder("root", None, MANAGED)
        .file("a", 100, Some("root"), MANAGED)
        .folder("docs", Some("root"), MANAGED)
        .file("b", 2048, Some("docs"), MANAGED)
        .folder("nested", Some("docs"), OTHER)
        .file("c", 10, Some("nested"), OTHER)
        .file("d", 0, Some("root"), MANAGED)
        .folder("empty", Some("root"), MANAGED)
}

pub fn ids(tree: &drive_ownership::Tree) -> Vec<&str> {
    tree.iter().map(|item| item.id.as_str()).collect()
}
