use crate::backend::{ApiError, ParlourBackend};
use crate::dto::assets::{RemoteAsset, RemoteGame, UpdateAssetRequest};
use crate::error::{AppError, AppResult, Violation};
use crate::models::{BookableAsset, CatalogItemRef};
use crate::services::asset_composer::{pricing_violations, specs_violation};

pub async fn list_assets(
    backend: &dyn ParlourBackend,
    token: &str,
    parlour_id: &str,
) -> AppResult<Vec<RemoteAsset>> {
    let assets = backend.list_assets(token, parlour_id).await?;
    tracing::debug!(parlour_id, count = assets.len(), "assets loaded");
    Ok(assets)
}

pub async fn bookable_assets(
    backend: &dyn ParlourBackend,
    token: &str,
    parlour_id: &str,
) -> AppResult<Vec<BookableAsset>> {
    let assets = list_assets(backend, token, parlour_id).await?;
    Ok(assets.iter().map(RemoteAsset::to_bookable).collect())
}

/// Rules the asset would break once `patch` is applied to `existing`.
pub fn validate_update(existing: &RemoteAsset, patch: &UpdateAssetRequest) -> Vec<Violation> {
    let mut violations = Vec::new();
    if patch.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
        violations.push(Violation::Required("name"));
    }

    let pricing = patch.pricing.as_ref().unwrap_or(&existing.pricing);
    violations.extend(pricing_violations(Some(pricing.regular), pricing.happy_hour));

    let device = patch.device.unwrap_or(existing.device);
    let specs = patch
        .specs
        .as_deref()
        .or(existing.specs.as_deref())
        .unwrap_or_default();
    violations.extend(specs_violation(device, specs));
    violations
}

pub async fn update_asset(
    backend: &dyn ParlourBackend,
    token: &str,
    existing: &RemoteAsset,
    patch: UpdateAssetRequest,
) -> AppResult<RemoteAsset> {
    if patch.is_empty() {
        return Ok(existing.clone());
    }

    let violations = validate_update(existing, &patch);
    if !violations.is_empty() {
        return Err(AppError::validation(violations));
    }

    match backend.update_asset(token, &existing.id, &patch).await {
        Ok(updated) => {
            tracing::info!(asset_id = %updated.id, "asset updated");
            Ok(updated)
        }
        Err(err) => Err(admin_failure(&existing.id, err)),
    }
}

/// Attaches a searched game to an asset that already exists on the backend.
pub async fn attach_game_to_asset(
    backend: &dyn ParlourBackend,
    token: &str,
    existing: &RemoteAsset,
    game: &CatalogItemRef,
) -> AppResult<RemoteAsset> {
    if existing.has_game(&game.external_id) {
        return Err(AppError::DuplicateItem(game.external_id.clone()));
    }

    backend
        .attach_game(token, &existing.id, &game.external_id)
        .await
        .map_err(|err| admin_failure(&existing.id, err))?;
    tracing::info!(asset_id = %existing.id, game = %game.external_id, "game attached");

    let mut updated = existing.clone();
    updated.games.push(RemoteGame {
        igdb_game_id: Some(game.external_id.clone()),
        name: Some(game.title.clone()),
    });
    Ok(updated)
}

/// Detaches a game by sending the remaining game list with the asset update.
pub async fn remove_game_from_asset(
    backend: &dyn ParlourBackend,
    token: &str,
    existing: &RemoteAsset,
    igdb_game_id: &str,
) -> AppResult<RemoteAsset> {
    if !existing.has_game(igdb_game_id) {
        return Err(AppError::NotFound);
    }
    let games = existing
        .game_ids()
        .into_iter()
        .filter(|id| id != igdb_game_id)
        .collect();
    update_asset(
        backend,
        token,
        existing,
        UpdateAssetRequest {
            games: Some(games),
            ..UpdateAssetRequest::default()
        },
    )
    .await
}

fn admin_failure(asset_id: &str, err: ApiError) -> AppError {
    match err {
        ApiError::Status { status: 404, .. } => AppError::NotFound,
        ApiError::Decode(reason) => AppError::MalformedServerResponse(reason),
        err => {
            tracing::warn!(asset_id, error = %err, "asset update failed");
            AppError::RemoteCommitFailed(err.message())
        }
    }
}
