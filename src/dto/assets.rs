use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Asset, BookableAsset, DeviceType, Pricing};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssetRequest {
    pub device: DeviceType,
    pub name: String,
    pub pricing: Pricing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<String>,
}

/// Without a happy-hour price the backend is told the regular price applies
/// all day.
impl From<&Asset> for CreateAssetRequest {
    fn from(asset: &Asset) -> Self {
        let regular = asset.pricing.regular;
        Self {
            device: asset.device,
            name: asset.name.clone(),
            pricing: Pricing {
                regular,
                happy_hour: Some(asset.pricing.happy_hour.unwrap_or(regular)),
            },
            specs: asset.specs.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachGameRequest {
    #[serde(rename = "igdbGameId")]
    pub igdb_game_id: String,
}

/// Partial update: absent fields are left untouched on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAssetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs: Option<String>,
    /// Replaces the attached games; leaving one out detaches it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<String>>,
}

impl UpdateAssetRequest {
    pub fn is_empty(&self) -> bool {
        self.device.is_none()
            && self.name.is_none()
            && self.pricing.is_none()
            && self.specs.is_none()
            && self.games.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGame {
    #[serde(rename = "igdbGameId", alias = "_id", default)]
    pub igdb_game_id: Option<String>,
    #[serde(alias = "title", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    #[serde(rename = "_id")]
    pub id: String,
    pub device: DeviceType,
    pub name: String,
    pub pricing: Pricing,
    #[serde(default)]
    pub specs: Option<String>,
    #[serde(default)]
    pub games: Vec<RemoteGame>,
}

impl RemoteAsset {
    pub fn price_per_hour(&self) -> Decimal {
        self.pricing.regular
    }

    pub fn game_ids(&self) -> Vec<String> {
        self.games
            .iter()
            .filter_map(|g| g.igdb_game_id.clone())
            .collect()
    }

    pub fn has_game(&self, igdb_game_id: &str) -> bool {
        self.games
            .iter()
            .any(|g| g.igdb_game_id.as_deref() == Some(igdb_game_id))
    }

    pub fn to_bookable(&self) -> BookableAsset {
        BookableAsset {
            id: self.id.clone(),
            name: self.name.clone(),
            device: self.device,
            price_per_hour: self.price_per_hour(),
            games: self.games.iter().filter_map(|g| g.name.clone()).collect(),
        }
    }
}

/// The asset listing is either a bare array or wrapped as `{ "assets": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AssetListBody {
    List(Vec<RemoteAsset>),
    Wrapped { assets: Vec<RemoteAsset> },
}

impl AssetListBody {
    pub fn into_assets(self) -> Vec<RemoteAsset> {
        match self {
            AssetListBody::List(assets) | AssetListBody::Wrapped { assets } => assets,
        }
    }
}

/// `PUT` answers with the asset either bare or under `asset`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AssetBody {
    Wrapped { asset: RemoteAsset },
    Bare(RemoteAsset),
}

impl AssetBody {
    pub fn into_asset(self) -> RemoteAsset {
        match self {
            AssetBody::Wrapped { asset } | AssetBody::Bare(asset) => asset,
        }
    }
}
