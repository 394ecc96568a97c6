use std::collections::BTreeSet;

use crate::model::{DriveItem, Tree};

/// Decides which items may be acted on: only those owned by the managed owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPolicy {
    managed_owner: String,
}

impl SelectionPolicy {
    pub fn new(managed_owner: impl Into<String>) -> Self {
        Self {
            managed_owner: managed_owner.into().trim().to_string(),
        }
    }

    pub fn managed_owner(&self) -> &str {
        &self.managed_owner
    }

    /// The owner email must match the managed owner exactly.
    pub fn is_eligible(&self, item: &DriveItem) -> bool {
        !self.managed_owner.is_empty() && item.owner_email() == Some(self.managed_owner.as_str())
    }

    pub fn eligible<'a>(&'a self, tree: &'a Tree) -> impl Iterator<Item = &'a DriveItem> + 'a {
        tree.iter().filter(move |item| self.is_eligible(item))
    }
}

/// Ids of the items picked for a transfer. Every mutation goes through the
/// policy, so the set only ever holds eligible members of the given tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Flips membership of an eligible item. Unknown and ineligible ids are
    /// ignored. Returns whether the item is selected afterwards.
    pub fn toggle(&mut self, policy: &SelectionPolicy, tree: &Tree, id: &str) -> bool {
        match tree.get(id) {
            Some(item) if policy.is_eligible(item) => {
                if !self.ids.remove(id) {
                    self.ids.insert(id.to_string());
                }
                self.ids.contains(id)
            }
            _ => false,
        }
    }

    /// Selects exactly the eligible items of the tree, returning how many.
    pub fn select_all(&mut self, policy: &SelectionPolicy, tree: &Tree) -> usize {
        self.ids = policy.eligible(tree).map(|item| item.id.clone()).collect();
        self.ids.len()
    }

    /// Replaces the selection with the eligible members of `ids`.
    pub fn set<'i>(
        &mut self,
        policy: &SelectionPolicy,
        tree: &Tree,
        ids: impl IntoIterator<Item = &'i str>,
    ) -> usize {
        self.ids = ids
            .into_iter()
            .filter_map(|id| tree.get(id))
            .filter(|item| policy.is_eligible(item))
            .map(|item| item.id.clone())
            .collect();
        self.ids.len()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
