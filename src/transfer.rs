use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::DriveApi;
use crate::enricher::DEFAULT_CONCURRENCY;
use crate::error::{Error, Result};
use crate::model::{DriveItem, Tree};
use crate::selection::{Selection, SelectionPolicy};

/// How a batch with some failed transfers is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransferMode {
    /// Report succeeded and failed items separately.
    #[default]
    PerItem,
    /// Any failure fails the whole batch.
    AllOrNothing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedTransfer {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub destination: String,
    pub succeeded: Vec<String>,
    pub failed: Vec<FailedTransfer>,
}

impl TransferReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OwnershipTransferer {
    policy: SelectionPolicy,
    concurrency: usize,
    mode: TransferMode,
}

impl OwnershipTransferer {
    pub fn new(policy: SelectionPolicy) -> Self {
        Self {
            policy,
            concurrency: DEFAULT_CONCURRENCY,
            mode: TransferMode::default(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    /// Selected items that are in the tree and owned by the managed owner, in
    /// tree order.
    pub fn eligible_items<'a>(
        &self,
        tree: &'a Tree,
        selection: &Selection,
    ) -> Vec<&'a DriveItem> {
        tree.iter()
            .filter(|item| selection.contains(&item.id) && self.policy.is_eligible(item))
            .collect()
    }

    /// Hands every eligible selected item over to `destination`.
    ///
    /// Nothing is sent when there is nothing eligible or the destination is
    /// blank.
    pub async fn transfer(
        &self,
        api: &dyn DriveApi,
        tree: &Tree,
        selection: &Selection,
        destination: &str,
    ) -> Result<TransferReport> {
        let items = self.eligible_items(tree, selection);
        if items.is_empty() {
            return Err(Error::NothingToTransfer {
                owner: self.policy.managed_owner().to_string(),
            });
        }

        let destination = destination.trim();
        if destination.is_empty() {
            return Err(Error::EmptyDestination);
        }

        info!(
            "Transferring ownership of {} items to {}",
            items.len(),
            destination
        );

        let mut results: Vec<(usize, String, Result<()>)> =
            stream::iter(items.into_iter().enumerate())
                .map(|(index, item)| async move {
                    let result = api.transfer_ownership(&item.id, destination).await;
                    (index, item.id.clone(), result)
                })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(index, _, _)| *index);

        let mut report = TransferReport {
            destination: destination.to_string(),
            ..Default::default()
        };
        for (_, id, result) in results {
            match result {
                Ok(()) => report.succeeded.push(id),
                Err(err) => {
                    error!("Error transferring ownership of {}: {}", id, err);
                    report.failed.push(FailedTransfer {
                        id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            "Transferred {} of {} items to {}",
            report.succeeded.len(),
            report.total(),
            destination
        );

        if self.mode == TransferMode::AllOrNothing && !report.is_complete() {
            return Err(Error::Transfer {
                failed: report.failed.len(),
                total: report.total(),
            });
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_mode_names() {
        let mode: TransferMode = serde_json::from_str("\"all-or-nothing\"").unwrap();
        assert_eq!(mode, TransferMode::AllOrNothing);
        assert_eq!(
            serde_json::to_string(&TransferMode::PerItem).unwrap(),
            "\"per-item\""
        );
        assert_eq!(TransferMode::default(), TransferMode::PerItem);
    }

    #[test]
    fn test_report_counts() {
        let report = TransferReport {
            destination: "new@example.com".to_string(),
            succeeded: vec!["a".to_string(), "b".to_string()],
            failed: vec![FailedTransfer {
                id: "c".to_string(),
                reason: "forbidden".to_string(),
            }],
        };
        assert_eq!(report.total(), 3);
        assert!(!report.is_complete());
    }
}
