use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dto::parlour::OperatorRecord;
use crate::models::BusinessInfo;

#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phonenumber: String,
    pub location: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phonenumber", &self.phonenumber)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl From<&BusinessInfo> for RegisterRequest {
    fn from(info: &BusinessInfo) -> Self {
        Self {
            name: info.name.trim().to_string(),
            email: info.email.trim().to_string(),
            password: info.password.clone(),
            phonenumber: info.phone.trim().to_string(),
            location: info.address.trim().to_string(),
        }
    }
}

/// Registration answers with the token next to the operator record; the
/// record may be flattened into the top level or nested under `parlour`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub token: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parlour: Option<OperatorRecord>,
}

impl RegisterResponse {
    pub fn operator_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or_else(|| self.parlour.as_ref().and_then(|p| p.id.as_deref()))
            .filter(|id| !id.is_empty())
    }
}
