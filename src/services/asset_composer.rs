use std::collections::BTreeSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, AppResult, Violation};
use crate::models::{Asset, CatalogItemCandidate, CatalogItemRef, DeviceType, Pricing};
use crate::services::draft_catalog::DraftCatalog;
use crate::services::search_service::SearchOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetField {
    Device(DeviceType),
    Name(String),
    RegularPrice(Option<Decimal>),
    HappyHourPrice(Option<Decimal>),
    Specs(String),
}

/// The asset currently being edited, before it joins the draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingAsset {
    pub device: DeviceType,
    pub name: String,
    pub regular_price: Option<Decimal>,
    pub happy_hour_price: Option<Decimal>,
    pub specs: String,
    pub items: Vec<CatalogItemRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub term: String,
    pub results: Vec<CatalogItemCandidate>,
    /// Set when the last search failed; the results are then empty.
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetComposer {
    working: WorkingAsset,
    search: SearchState,
}

pub(crate) fn pricing_violations(
    regular: Option<Decimal>,
    happy_hour: Option<Decimal>,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if !regular.is_some_and(|p| p > Decimal::ZERO) {
        violations.push(Violation::RegularPriceNotPositive);
    }
    if happy_hour.is_some_and(|p| p < Decimal::ZERO) {
        violations.push(Violation::HappyHourPriceNegative);
    }
    violations
}

pub(crate) fn specs_violation(device: DeviceType, specs: &str) -> Option<Violation> {
    (device.requires_specs() && specs.trim().is_empty()).then_some(Violation::SpecsRequired(device))
}

impl AssetComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn working(&self) -> &WorkingAsset {
        &self.working
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn set_field(&mut self, field: AssetField) {
        let asset = &mut self.working;
        match field {
            AssetField::Device(device) => {
                if asset.device.requires_specs() && !device.requires_specs() {
                    asset.specs.clear();
                }
                asset.device = device;
            }
            AssetField::Name(name) => asset.name = name,
            AssetField::RegularPrice(price) => asset.regular_price = price,
            AssetField::HappyHourPrice(price) => asset.happy_hour_price = price,
            AssetField::Specs(specs) => asset.specs = specs,
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search.term = term.into();
    }

    /// Applies a finished search for `term`.
    ///
    /// Results for a term other than the current one, and superseded
    /// searches, are dropped. A failure empties the results and is handed
    /// back so the caller can notify the user.
    pub fn apply_search(
        &mut self,
        term: &str,
        result: AppResult<SearchOutcome>,
    ) -> Option<AppError> {
        if term.trim() != self.search.term.trim() {
            return None;
        }
        match result {
            Ok(SearchOutcome::Results(results)) => {
                self.search.results = results;
                self.search.notice = None;
                None
            }
            Ok(SearchOutcome::Superseded) => None,
            Err(err) => {
                self.search.results.clear();
                self.search.notice = Some(err.to_string());
                Some(err)
            }
        }
    }

    pub fn add_item(&mut self, candidate: CatalogItemCandidate) -> AppResult<()> {
        if self
            .working
            .items
            .iter()
            .any(|i| i.external_id == candidate.external_id)
        {
            return Err(AppError::DuplicateItem(candidate.external_id));
        }
        self.working.items.push(candidate);
        self.search = SearchState::default();
        Ok(())
    }

    /// Returns whether an item was removed.
    pub fn remove_item(&mut self, external_id: &str) -> bool {
        let before = self.working.items.len();
        self.working.items.retain(|i| i.external_id != external_id);
        before != self.working.items.len()
    }

    /// Every rule the working asset breaks against `catalog`.
    pub fn validate(&self, catalog: &DraftCatalog) -> Vec<Violation> {
        let asset = &self.working;
        let mut violations = Vec::new();

        let name = asset.name.trim();
        if name.is_empty() {
            violations.push(Violation::Required("name"));
        } else if catalog.name_taken(name) {
            violations.push(Violation::DuplicateName(name.to_string()));
        }

        violations.extend(pricing_violations(
            asset.regular_price,
            asset.happy_hour_price,
        ));
        violations.extend(specs_violation(asset.device, &asset.specs));
        violations
    }

    pub fn commit_to_draft(&mut self, catalog: &mut DraftCatalog) -> AppResult<Uuid> {
        let violations = self.validate(catalog);
        if !violations.is_empty() {
            return Err(AppError::validation(violations));
        }

        let working = std::mem::take(&mut self.working);
        self.search = SearchState::default();

        let specs = working.specs.trim();
        let asset = Asset {
            local_id: Uuid::new_v4(),
            server_id: None,
            created: false,
            attached: BTreeSet::new(),
            device: working.device,
            name: working.name.trim().to_string(),
            pricing: Pricing {
                regular: working.regular_price.unwrap_or_default(),
                happy_hour: working.happy_hour_price,
            },
            specs: (!specs.is_empty()).then(|| specs.to_string()),
            items: working.items,
        };
        let local_id = asset.local_id;
        tracing::debug!(asset = %asset.name, device = %asset.device, items = asset.items.len(), "asset added to draft");
        catalog.push(asset);
        Ok(local_id)
    }
}
