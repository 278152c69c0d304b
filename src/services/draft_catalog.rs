use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Asset;
use crate::services::commit_sequencer::AssetOutcome;

/// Assets composed so far, in the order they were added.
///
/// Removal is two-phase: [`request_removal`](Self::request_removal) marks an
/// asset and only [`confirm_removal`](Self::confirm_removal) drops it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftCatalog {
    assets: Vec<Asset>,
    pending_removal: Option<Uuid>,
}

impl DraftCatalog {
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, local_id: Uuid) -> Option<&Asset> {
        self.assets.iter().find(|a| a.local_id == local_id)
    }

    /// Names are compared trimmed and case-insensitively.
    pub fn name_taken(&self, name: &str) -> bool {
        let name = name.trim();
        self.assets
            .iter()
            .any(|a| a.name.trim().eq_ignore_ascii_case(name))
    }

    pub(crate) fn push(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn request_removal(&mut self, local_id: Uuid) -> AppResult<()> {
        if self.get(local_id).is_none() {
            return Err(AppError::NotFound);
        }
        self.pending_removal = Some(local_id);
        Ok(())
    }

    pub fn pending_removal(&self) -> Option<&Asset> {
        self.pending_removal.and_then(|id| self.get(id))
    }

    pub fn confirm_removal(&mut self) -> Option<Asset> {
        let local_id = self.pending_removal.take()?;
        let index = self.assets.iter().position(|a| a.local_id == local_id)?;
        let removed = self.assets.remove(index);
        tracing::debug!(asset = %removed.name, "asset removed from draft");
        Some(removed)
    }

    pub fn cancel_removal(&mut self) {
        self.pending_removal = None;
    }

    /// Marks the asset as created and remembers which items made it across.
    pub(crate) fn record_commit(&mut self, outcome: &AssetOutcome) {
        let Some(asset) = self
            .assets
            .iter_mut()
            .find(|a| a.local_id == outcome.asset_local_id)
        else {
            return;
        };
        asset.created = true;
        if let Some(server_id) = &outcome.server_asset_id {
            asset.server_id = Some(server_id.clone());
        }
        asset.attached.extend(
            outcome
                .succeeded_items
                .iter()
                .map(|item| item.external_id.clone()),
        );
    }
}
