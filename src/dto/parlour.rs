use serde::{Deserialize, Serialize};

use crate::models::{HappyHours, TimingSlot};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRequest {
    pub address: String,
    pub timings: Vec<TimingSlot>,
    #[serde(rename = "happyHours", skip_serializing_if = "Option::is_none")]
    pub happy_hours: Option<HappyHours>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorRecord {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
