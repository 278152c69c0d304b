//! HTTP implementation of the backend seams, built on [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{ApiError, ApiResult, CatalogSearch, ParlourBackend};
use crate::config::AppConfig;
use crate::dto::assets::{
    AssetBody, AssetListBody, AttachGameRequest, CreateAssetRequest, RemoteAsset,
    UpdateAssetRequest,
};
use crate::dto::auth::{RegisterRequest, RegisterResponse};
use crate::dto::games::IgdbGame;
use crate::dto::parlour::SetupRequest;
use crate::models::CatalogItemCandidate;
use crate::response::error_message;

#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.header(reqwest::header::AUTHORIZATION, bearer(token)),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> ApiResult<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status.as_u16(), content_type.as_deref(), &body);
        tracing::debug!(status = status.as_u16(), message = %message, "backend returned error");
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(builder: RequestBuilder) -> ApiResult<T> {
        let response = Self::send(builder).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Tokens may come back from the server already carrying the scheme.
fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}

#[async_trait]
impl ParlourBackend for HttpClient {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        let builder = self
            .request(Method::POST, "/api/auth/parlour/register", None)
            .json(request);
        Self::parse(builder).await
    }

    async fn update_setup(
        &self,
        token: &str,
        parlour_id: &str,
        request: &SetupRequest,
    ) -> ApiResult<Value> {
        let builder = self
            .request(
                Method::PATCH,
                &format!("/api/parlour/setup/{parlour_id}"),
                Some(token),
            )
            .json(request);
        Self::parse(builder).await
    }

    async fn create_asset(&self, token: &str, request: &CreateAssetRequest) -> ApiResult<Value> {
        let builder = self
            .request(Method::POST, "/api/parlour/asset", Some(token))
            .json(request);
        Self::parse(builder).await
    }

    async fn attach_game(&self, token: &str, asset_id: &str, igdb_game_id: &str) -> ApiResult<()> {
        let builder = self
            .request(
                Method::POST,
                &format!("/api/parlour/asset/{asset_id}/game"),
                Some(token),
            )
            .json(&AttachGameRequest {
                igdb_game_id: igdb_game_id.to_string(),
            });
        Self::send(builder).await?;
        Ok(())
    }

    async fn list_assets(&self, token: &str, parlour_id: &str) -> ApiResult<Vec<RemoteAsset>> {
        let builder = self.request(
            Method::GET,
            &format!("/api/parlour/assets/{parlour_id}"),
            Some(token),
        );
        let body: AssetListBody = Self::parse(builder).await?;
        Ok(body.into_assets())
    }

    async fn update_asset(
        &self,
        token: &str,
        asset_id: &str,
        request: &UpdateAssetRequest,
    ) -> ApiResult<RemoteAsset> {
        let builder = self
            .request(
                Method::PUT,
                &format!("/api/parlour/assets/{asset_id}"),
                Some(token),
            )
            .json(request);
        let body: AssetBody = Self::parse(builder).await?;
        Ok(body.into_asset())
    }
}

#[async_trait]
impl CatalogSearch for HttpClient {
    async fn search_games(
        &self,
        token: Option<&str>,
        term: &str,
    ) -> ApiResult<Vec<CatalogItemCandidate>> {
        let builder = self
            .request(Method::GET, "/api/game/search", token)
            .query(&[("name", term)]);
        let games: Vec<IgdbGame> = Self::parse(builder).await?;
        Ok(games.into_iter().map(CatalogItemCandidate::from).collect())
    }
}
