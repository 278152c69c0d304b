use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::draft_catalog::DraftCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeviceType {
    #[default]
    PC,
    PS5,
    Xbox,
    VR,
    RacingSim,
}

impl DeviceType {
    pub const ALL: [DeviceType; 5] = [
        DeviceType::PC,
        DeviceType::PS5,
        DeviceType::Xbox,
        DeviceType::VR,
        DeviceType::RacingSim,
    ];

    /// Only gaming PCs vary enough in hardware to need a free-text spec sheet.
    pub fn requires_specs(self) -> bool {
        matches!(self, DeviceType::PC)
    }

    pub fn label(self) -> &'static str {
        match self {
            DeviceType::PC => "PC",
            DeviceType::PS5 => "PS5",
            DeviceType::Xbox => "Xbox",
            DeviceType::VR => "VR",
            DeviceType::RacingSim => "Racing Sim",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub regular: Decimal,
    #[serde(rename = "happyHour", default, skip_serializing_if = "Option::is_none")]
    pub happy_hour: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItemRef {
    pub external_id: String,
    pub title: String,
    pub cover_url: Option<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    pub release_date: Option<NaiveDate>,
}

/// Search results are already shaped like the references stored on an asset.
pub type CatalogItemCandidate = CatalogItemRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub local_id: Uuid,
    /// Set once the backend has created the asset.
    pub server_id: Option<String>,
    /// The backend created the asset, even if it never reported an id.
    #[serde(default)]
    pub created: bool,
    /// External ids of the items already attached on the backend.
    #[serde(default)]
    pub attached: BTreeSet<String>,
    pub device: DeviceType,
    pub name: String,
    pub pricing: Pricing,
    pub specs: Option<String>,
    pub items: Vec<CatalogItemRef>,
}

impl Asset {
    pub fn is_created(&self) -> bool {
        self.created || self.server_id.is_some()
    }

    pub fn unattached_items(&self) -> impl Iterator<Item = &CatalogItemRef> {
        self.items
            .iter()
            .filter(|item| !self.attached.contains(&item.external_id))
    }
}

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
}

impl fmt::Debug for BusinessInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusinessInfo")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("phone", &self.phone)
            .field("address", &self.address)
            .finish()
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), hhmm::FORMAT).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSlot {
    #[serde(with = "hhmm")]
    pub open: NaiveTime,
    #[serde(with = "hhmm")]
    pub close: NaiveTime,
}

impl TimingSlot {
    /// Parses `HH:MM` bounds. Ordering is checked when the stage is submitted.
    pub fn parse(open: &str, close: &str) -> Option<Self> {
        Some(Self {
            open: parse_time(open)?,
            close: parse_time(close)?,
        })
    }

    pub fn is_ordered(&self) -> bool {
        self.open < self.close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HappyHours {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    #[serde(rename = "discountPercent")]
    pub discount_percent: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingDraft {
    pub business_info: BusinessInfo,
    pub timings: Vec<TimingSlot>,
    pub happy_hours: Option<HappyHours>,
    pub catalog: DraftCatalog,
    pub server_id: Option<String>,
    pub auth_token: Option<String>,
}

impl OnboardingDraft {
    pub fn is_registered(&self) -> bool {
        self.server_id.is_some() && self.auth_token.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WizardStage {
    BasicInfo,
    TimingsAndHappyHours,
    AssetComposition,
    Summary,
    Committed,
    Abandoned,
}

impl WizardStage {
    pub fn next(self) -> Option<WizardStage> {
        match self {
            WizardStage::BasicInfo => Some(WizardStage::TimingsAndHappyHours),
            WizardStage::TimingsAndHappyHours => Some(WizardStage::AssetComposition),
            WizardStage::AssetComposition => Some(WizardStage::Summary),
            WizardStage::Summary => Some(WizardStage::Committed),
            WizardStage::Committed | WizardStage::Abandoned => None,
        }
    }

    pub fn previous(self) -> Option<WizardStage> {
        match self {
            WizardStage::TimingsAndHappyHours => Some(WizardStage::BasicInfo),
            WizardStage::AssetComposition => Some(WizardStage::TimingsAndHappyHours),
            WizardStage::Summary => Some(WizardStage::AssetComposition),
            WizardStage::BasicInfo | WizardStage::Committed | WizardStage::Abandoned => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WizardStage::Committed | WizardStage::Abandoned)
    }
}

/// An asset as offered to end users for booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableAsset {
    pub id: String,
    pub name: String,
    pub device: DeviceType,
    pub price_per_hour: Decimal,
    pub games: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLine {
    pub asset: BookableAsset,
    pub selected_game: Option<String>,
    pub hours: u32,
    pub players: u32,
}

impl BookingLine {
    pub fn line_total(&self) -> Decimal {
        self.asset.price_per_hour * Decimal::from(self.hours)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOrder {
    pub id: Uuid,
    pub lines: Vec<BookingLine>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}
