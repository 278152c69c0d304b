#![allow(dead_code)]

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::sync::Notify;

use parlour_booking::{
    backend::{ApiError, ApiResult, CatalogSearch, ParlourBackend},
    dto::{
        assets::{CreateAssetRequest, RemoteAsset, UpdateAssetRequest},
        auth::{RegisterRequest, RegisterResponse},
        parlour::SetupRequest,
    },
    models::{BusinessInfo, CatalogItemCandidate, CatalogItemRef, DeviceType, TimingSlot},
    services::{asset_composer::AssetField, onboarding_wizard::OnboardingWizard},
};

/// Pauses a mocked call until the test releases it.
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

pub struct MockBackend {
    pub calls: Mutex<Vec<String>>,
    pub register_result: Mutex<ApiResult<RegisterResponse>>,
    pub setup_error: Mutex<Option<ApiError>>,
    pub fail_create: Mutex<HashSet<String>>,
    pub malformed_create: Mutex<HashSet<String>>,
    pub nested_ids: bool,
    pub fail_attach: Mutex<HashSet<String>>,
    pub register_gate: Option<Arc<Gate>>,
    pub last_setup: Mutex<Option<SetupRequest>>,
    pub last_register: Mutex<Option<RegisterRequest>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            register_result: Mutex::new(Ok(RegisterResponse {
                token: "t1".into(),
                id: Some("p1".into()),
                parlour: None,
            })),
            setup_error: Mutex::new(None),
            fail_create: Mutex::new(HashSet::new()),
            malformed_create: Mutex::new(HashSet::new()),
            nested_ids: false,
            fail_attach: Mutex::new(HashSet::new()),
            register_gate: None,
            last_setup: Mutex::new(None),
            last_register: Mutex::new(None),
        }
    }
}

impl MockBackend {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

fn status(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: message.to_string(),
    }
}

#[async_trait]
impl ParlourBackend for MockBackend {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        self.record("register".into());
        *self.last_register.lock() = Some(request.clone());
        if let Some(gate) = &self.register_gate {
            gate.pass().await;
        }
        self.register_result.lock().clone()
    }

    async fn update_setup(
        &self,
        _token: &str,
        parlour_id: &str,
        request: &SetupRequest,
    ) -> ApiResult<Value> {
        self.record(format!("setup:{parlour_id}"));
        *self.last_setup.lock() = Some(request.clone());
        match self.setup_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(json!({ "_id": parlour_id })),
        }
    }

    async fn create_asset(&self, _token: &str, request: &CreateAssetRequest) -> ApiResult<Value> {
        self.record(format!("create:{}", request.name));
        if self.fail_create.lock().contains(&request.name) {
            return Err(status(400, "Asset name rejected"));
        }
        if self.malformed_create.lock().contains(&request.name) {
            return Ok(json!({ "ok": true }));
        }
        let id = format!("srv-{}", request.name);
        if self.nested_ids {
            Ok(json!({ "asset": { "_id": id } }))
        } else {
            Ok(json!({ "_id": id }))
        }
    }

    async fn attach_game(&self, _token: &str, asset_id: &str, igdb_game_id: &str) -> ApiResult<()> {
        self.record(format!("attach:{asset_id}:{igdb_game_id}"));
        if self.fail_attach.lock().contains(igdb_game_id) {
            return Err(status(500, "Could not attach game"));
        }
        Ok(())
    }

    async fn list_assets(&self, _token: &str, parlour_id: &str) -> ApiResult<Vec<RemoteAsset>> {
        self.record(format!("list:{parlour_id}"));
        Ok(Vec::new())
    }

    async fn update_asset(
        &self,
        _token: &str,
        asset_id: &str,
        _request: &UpdateAssetRequest,
    ) -> ApiResult<RemoteAsset> {
        self.record(format!("update:{asset_id}"));
        Err(status(404, "Asset not found"))
    }
}

/// Catalog that answers from a fixed list, optionally waiting on a gate.
#[derive(Default)]
pub struct MockSearch {
    pub games: Vec<CatalogItemCandidate>,
    pub calls: Mutex<Vec<String>>,
    pub fail: bool,
    pub gate: Option<Arc<Gate>>,
}

#[async_trait]
impl CatalogSearch for MockSearch {
    async fn search_games(
        &self,
        _token: Option<&str>,
        term: &str,
    ) -> ApiResult<Vec<CatalogItemCandidate>> {
        self.calls.lock().push(term.to_string());
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if self.fail {
            return Err(ApiError::Transport("connection refused".into()));
        }
        let needle = term.to_lowercase();
        Ok(self
            .games
            .iter()
            .filter(|g| g.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

pub fn item(id: &str, title: &str) -> CatalogItemRef {
    CatalogItemRef {
        external_id: id.to_string(),
        title: title.to_string(),
        cover_url: None,
        genres: BTreeSet::new(),
        release_date: None,
    }
}

pub fn business_info() -> BusinessInfo {
    BusinessInfo {
        name: "GZ".into(),
        email: "a@b.com".into(),
        password: "secret1".into(),
        phone: "999".into(),
        address: "X".into(),
    }
}

pub fn slot(open: &str, close: &str) -> TimingSlot {
    TimingSlot::parse(open, close).expect("valid HH:MM")
}

pub fn price(value: i64) -> Option<Decimal> {
    Some(Decimal::from(value))
}

/// Fills the composer with a valid console asset named `name`.
pub fn console_asset(wizard: &OnboardingWizard, name: &str, games: &[CatalogItemRef]) {
    wizard
        .compose(|composer, _| {
            composer.set_field(AssetField::Device(DeviceType::PS5));
            composer.set_field(AssetField::Name(name.to_string()));
            composer.set_field(AssetField::RegularPrice(price(100)));
            for game in games {
                composer.add_item(game.clone()).expect("unique game");
            }
        })
        .expect("composition stage");
    wizard.commit_asset().expect("valid asset");
}

/// Walks a fresh wizard through registration and setup.
pub async fn wizard_at_composition(backend: Arc<MockBackend>) -> OnboardingWizard {
    let wizard = OnboardingWizard::new(backend);
    wizard.set_business_info(business_info()).unwrap();
    wizard.advance().await.unwrap();
    wizard.add_timing(slot("09:00", "23:00")).unwrap();
    wizard.advance().await.unwrap();
    wizard
}
