use serde::Serialize;
use std::collections::HashSet;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Folder,
    File,
}

impl ItemKind {
    pub fn from_mime_type(mime_type: Option<&str>) -> Self {
        match mime_type {
            Some(FOLDER_MIME_TYPE) => ItemKind::Folder,
            _ => ItemKind::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub display_name: Option<String>,
    pub email: String,
}

/// A file or folder descriptor, optionally annotated with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    /// Absent for folders and for Google-native documents.
    pub size: Option<u64>,
    pub owner: Option<Owner>,
}

impl DriveItem {
    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn owner_email(&self) -> Option<&str> {
        self.owner.as_ref().map(|owner| owner.email.as_str())
    }

    pub fn owner_label(&self) -> &str {
        self.owner
            .as_ref()
            .and_then(|owner| owner.display_name.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Every item reachable from a root, root first, in pre-order discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tree {
    items: Vec<DriveItem>,
    /// Folders whose listing had more children than one page could hold.
    truncated_folders: Vec<String>,
}

impl Tree {
    /// Builds a tree from items, keeping the first occurrence of each id.
    pub fn from_items(items: impl IntoIterator<Item = DriveItem>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        Self {
            items,
            truncated_folders: Vec::new(),
        }
    }

    pub(crate) fn with_truncated_folders(mut self, folders: Vec<String>) -> Self {
        self.truncated_folders = folders;
        self
    }

    pub fn items(&self) -> &[DriveItem] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &DriveItem> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&DriveItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn root(&self) -> Option<&DriveItem> {
        self.items.first()
    }

    pub fn truncated_folders(&self) -> &[String] {
        &self.truncated_folders
    }

    pub(crate) fn into_parts(self) -> (Vec<DriveItem>, Vec<String>) {
        (self.items, self.truncated_folders)
    }
}

/// Formats a byte count the way the listing shows it ("1.50 MB", "N/A").
pub fn format_size(bytes: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    let bytes = match bytes {
        None | Some(0) => return "N/A".to_string(),
        Some(bytes) => bytes,
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit]).replace(".00 ", " ")
    }
}
