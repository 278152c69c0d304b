//! Seams to the remote collaborators.
//!
//! [`ParlourBackend`] covers the operator REST API and [`CatalogSearch`]
//! the game catalog. Both are implemented over HTTP by
//! [`HttpClient`](crate::http::HttpClient); tests substitute in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::dto::assets::{CreateAssetRequest, RemoteAsset, UpdateAssetRequest};
use crate::dto::auth::{RegisterRequest, RegisterResponse};
use crate::dto::parlour::SetupRequest;
use crate::models::CatalogItemCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, DNS, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// Non-2xx status. `message` is the server's own wording when it sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Text suitable for showing the operator as-is.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[async_trait]
pub trait ParlourBackend: Send + Sync {
    /// `POST /api/auth/parlour/register`
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse>;

    /// `PATCH /api/parlour/setup/:id`
    async fn update_setup(&self, token: &str, parlour_id: &str, request: &SetupRequest)
    -> ApiResult<Value>;

    /// `POST /api/parlour/asset`; the raw body is returned because the id
    /// may sit at the top level or under `asset`.
    async fn create_asset(&self, token: &str, request: &CreateAssetRequest) -> ApiResult<Value>;

    /// `POST /api/parlour/asset/:assetId/game`
    async fn attach_game(&self, token: &str, asset_id: &str, igdb_game_id: &str) -> ApiResult<()>;

    /// `GET /api/parlour/assets/:parlourId`
    async fn list_assets(&self, token: &str, parlour_id: &str) -> ApiResult<Vec<RemoteAsset>>;

    /// `PUT /api/parlour/assets/:id`
    async fn update_asset(
        &self,
        token: &str,
        asset_id: &str,
        request: &UpdateAssetRequest,
    ) -> ApiResult<RemoteAsset>;
}

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// `GET /api/game/search?name=<term>`
    async fn search_games(&self, token: Option<&str>, term: &str)
    -> ApiResult<Vec<CatalogItemCandidate>>;
}
