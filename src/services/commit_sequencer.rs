//! Persists a composed catalog: create each asset, then attach its games.
//!
//! Everything runs strictly in order, one call at a time. A failed asset
//! creation halts the batch; a failed attach is recorded and skipped.

use serde_json::Value;
use uuid::Uuid;

use crate::backend::{ApiError, ParlourBackend};
use crate::dto::assets::CreateAssetRequest;
use crate::models::{Asset, CatalogItemRef};
use crate::services::draft_catalog::DraftCatalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item: CatalogItemRef,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub asset_local_id: Uuid,
    pub name: String,
    pub server_asset_id: Option<String>,
    pub succeeded_items: Vec<CatalogItemRef>,
    pub failed_items: Vec<ItemFailure>,
    /// Set when the asset was created but the response carried no usable id.
    pub error: Option<String>,
}

impl AssetOutcome {
    fn new(asset: &Asset) -> Self {
        Self {
            asset_local_id: asset.local_id,
            name: asset.name.clone(),
            server_asset_id: None,
            succeeded_items: Vec::new(),
            failed_items: Vec::new(),
            error: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.server_asset_id.is_some() && self.error.is_none() && self.failed_items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationFailure {
    pub asset_local_id: Uuid,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub outcomes: Vec<AssetOutcome>,
    /// Assets left alone because an earlier attempt already created them
    /// and nothing is left to attach (or their id was never reported).
    pub skipped: Vec<Uuid>,
    pub aborted: Option<CreationFailure>,
}

impl CommitReport {
    pub fn is_blocked(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn failed_item_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.failed_items.len()).sum()
    }

    pub fn outcome(&self, local_id: Uuid) -> Option<&AssetOutcome> {
        self.outcomes.iter().find(|o| o.asset_local_id == local_id)
    }

    /// Every outcome belongs to an asset the backend created; the draft
    /// remembers that, with its server id and attached items, so a retry
    /// neither re-creates it nor re-attaches what already succeeded.
    pub fn apply_to(&self, catalog: &mut DraftCatalog) {
        for outcome in &self.outcomes {
            catalog.record_commit(outcome);
        }
    }
}

/// The created asset's id sits either at `_id` or at `asset._id`.
pub fn extract_asset_id(body: &Value) -> Option<String> {
    [body.get("_id"), body.get("asset").and_then(|a| a.get("_id"))]
        .into_iter()
        .flatten()
        .find_map(|id| match id {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

pub struct CommitSequencer<'a> {
    backend: &'a dyn ParlourBackend,
    token: &'a str,
}

impl<'a> CommitSequencer<'a> {
    pub fn new(backend: &'a dyn ParlourBackend, token: &'a str) -> Self {
        Self { backend, token }
    }

    pub async fn run(&self, assets: &[Asset]) -> CommitReport {
        let mut report = CommitReport::default();

        for asset in assets {
            if asset.is_created() {
                match self.resume_asset(asset).await {
                    Some(outcome) => report.outcomes.push(outcome),
                    None => report.skipped.push(asset.local_id),
                }
                continue;
            }
            match self.commit_asset(asset).await {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(failure) => {
                    tracing::error!(asset = %failure.name, reason = %failure.reason, "asset creation failed, halting commit");
                    report.aborted = Some(failure);
                    break;
                }
            }
        }

        tracing::info!(
            created = report.outcomes.iter().filter(|o| o.server_asset_id.is_some()).count(),
            skipped = report.skipped.len(),
            failed_items = report.failed_item_count(),
            blocked = report.is_blocked(),
            "catalog commit finished"
        );
        report
    }

    /// Retries the items a previous attempt failed to attach to an asset the
    /// backend already has. `None` when there is nothing left to do.
    async fn resume_asset(&self, asset: &Asset) -> Option<AssetOutcome> {
        let Some(server_id) = &asset.server_id else {
            tracing::debug!(asset = %asset.name, "asset created without a reported id, not retrying");
            return None;
        };
        let pending: Vec<&CatalogItemRef> = asset.unattached_items().collect();
        if pending.is_empty() {
            return None;
        }

        tracing::debug!(asset = %asset.name, pending = pending.len(), "re-attaching games");
        let mut outcome = AssetOutcome::new(asset);
        self.attach_items(&mut outcome, server_id, pending).await;
        outcome.server_asset_id = Some(server_id.clone());
        Some(outcome)
    }

    async fn commit_asset(&self, asset: &Asset) -> Result<AssetOutcome, CreationFailure> {
        let mut outcome = AssetOutcome::new(asset);
        let request = CreateAssetRequest::from(asset);

        let body = match self.backend.create_asset(self.token, &request).await {
            Ok(body) => body,
            Err(ApiError::Decode(reason)) => {
                return Ok(self.malformed(asset, outcome, reason));
            }
            Err(err) => {
                return Err(CreationFailure {
                    asset_local_id: asset.local_id,
                    name: asset.name.clone(),
                    reason: err.message(),
                });
            }
        };

        let Some(server_id) = extract_asset_id(&body) else {
            return Ok(self.malformed(asset, outcome, "no asset id in response".to_string()));
        };
        tracing::debug!(asset = %asset.name, server_id = %server_id, "asset created");

        self.attach_items(&mut outcome, &server_id, asset.items.iter())
            .await;
        outcome.server_asset_id = Some(server_id);
        Ok(outcome)
    }

    async fn attach_items<'i>(
        &self,
        outcome: &mut AssetOutcome,
        server_id: &str,
        items: impl IntoIterator<Item = &'i CatalogItemRef>,
    ) {
        for item in items {
            match self
                .backend
                .attach_game(self.token, server_id, &item.external_id)
                .await
            {
                Ok(()) => outcome.succeeded_items.push(item.clone()),
                Err(err) => {
                    tracing::warn!(asset = %outcome.name, game = %item.external_id, error = %err, "attach game failed");
                    outcome.failed_items.push(ItemFailure {
                        item: item.clone(),
                        reason: err.message(),
                    });
                }
            }
        }
    }

    /// The asset's games are reported as failed since none can be attached.
    fn malformed(&self, asset: &Asset, mut outcome: AssetOutcome, reason: String) -> AssetOutcome {
        tracing::warn!(asset = %asset.name, reason = %reason, "malformed asset creation response");
        let message = format!("Malformed server response: {reason}");
        outcome.failed_items = asset
            .items
            .iter()
            .map(|item| ItemFailure {
                item: item.clone(),
                reason: message.clone(),
            })
            .collect();
        outcome.error = Some(message);
        outcome
    }
}
