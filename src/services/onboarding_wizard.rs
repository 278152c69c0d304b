//! Operator onboarding as an explicit state machine.
//!
//! `BasicInfo -> TimingsAndHappyHours -> AssetComposition -> Summary -> Committed`.
//! [`OnboardingWizard::advance`] and [`OnboardingWizard::retreat`] are the
//! only ways across a stage boundary; the other mutators each touch the
//! part of the draft their stage owns and fail outside it.
//!
//! The wizard is a cheap, cloneable handle. Only one `advance` may be in
//! flight at a time, and [`OnboardingWizard::abandon`] invalidates any call
//! still in flight so its late result is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::backend::{ApiError, CatalogSearch, ParlourBackend};
use crate::dto::auth::RegisterRequest;
use crate::dto::parlour::SetupRequest;
use crate::error::{AppError, AppResult, Violation};
use crate::models::{BusinessInfo, HappyHours, OnboardingDraft, TimingSlot, WizardStage};
use crate::services::asset_composer::AssetComposer;
use crate::services::commit_sequencer::{CommitReport, CommitSequencer};
use crate::services::draft_catalog::DraftCatalog;
use crate::services::search_service::SearchSession;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
struct WizardState {
    stage: WizardStage,
    draft: OnboardingDraft,
    composer: AssetComposer,
    last_report: Option<CommitReport>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            stage: WizardStage::BasicInfo,
            draft: OnboardingDraft::default(),
            composer: AssetComposer::new(),
            last_report: None,
        }
    }
}

/// Holds the single-submission flag for the lifetime of one `advance`.
struct Submission<'a>(&'a AtomicBool);

impl<'a> Submission<'a> {
    fn begin(flag: &'a AtomicBool) -> AppResult<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AppError::SubmissionInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub fn validate_business_info(info: &BusinessInfo) -> Vec<Violation> {
    let mut violations = Vec::new();
    if info.name.trim().is_empty() {
        violations.push(Violation::Required("business name"));
    }
    let email = info.email.trim();
    if email.is_empty() {
        violations.push(Violation::Required("email"));
    } else if !email.contains('@') {
        violations.push(Violation::InvalidEmail);
    }
    if info.password.chars().count() < MIN_PASSWORD_LEN {
        violations.push(Violation::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if info.phone.trim().is_empty() {
        violations.push(Violation::Required("phone number"));
    }
    if info.address.trim().is_empty() {
        violations.push(Violation::Required("address"));
    }
    violations
}

pub fn validate_setup(draft: &OnboardingDraft) -> Vec<Violation> {
    let mut violations = Vec::new();
    if draft.business_info.address.trim().is_empty() {
        violations.push(Violation::Required("address"));
    }
    if draft.timings.is_empty() {
        violations.push(Violation::NoTimings);
    }
    for (index, slot) in draft.timings.iter().enumerate() {
        if !slot.is_ordered() {
            violations.push(Violation::TimingOrder {
                index,
                open: slot.open.format("%H:%M").to_string(),
                close: slot.close.format("%H:%M").to_string(),
            });
        }
    }
    if let Some(happy) = &draft.happy_hours {
        if happy.start >= happy.end {
            violations.push(Violation::HappyHourWindow);
        }
        if happy.discount_percent > 100 {
            violations.push(Violation::DiscountOutOfRange(happy.discount_percent));
        }
    }
    violations
}

fn remote_failure(err: ApiError) -> AppError {
    match err {
        ApiError::Decode(reason) => AppError::MalformedServerResponse(reason),
        other => AppError::RemoteCommitFailed(other.message()),
    }
}

fn ensure_open(stage: WizardStage) -> AppResult<()> {
    match stage {
        WizardStage::Abandoned => Err(AppError::Abandoned),
        WizardStage::Committed => Err(AppError::WizardClosed),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct OnboardingWizard {
    backend: Arc<dyn ParlourBackend>,
    state: Arc<Mutex<WizardState>>,
    submitting: Arc<AtomicBool>,
    session: Arc<AtomicU64>,
}

impl OnboardingWizard {
    pub fn new(backend: Arc<dyn ParlourBackend>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(WizardState::default())),
            submitting: Arc::new(AtomicBool::new(false)),
            session: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn stage(&self) -> WizardStage {
        self.state.lock().stage
    }

    pub fn snapshot(&self) -> OnboardingDraft {
        self.state.lock().draft.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn last_commit_report(&self) -> Option<CommitReport> {
        self.state.lock().last_report.clone()
    }

    /// A search session authenticated as the registered operator.
    pub fn search_session(&self, source: Arc<dyn CatalogSearch>) -> SearchSession {
        let token = self.state.lock().draft.auth_token.clone();
        SearchSession::new(source, token)
    }

    fn edit<R>(&self, expected: WizardStage, f: impl FnOnce(&mut WizardState) -> R) -> AppResult<R> {
        let mut state = self.state.lock();
        ensure_open(state.stage)?;
        if self.is_submitting() {
            return Err(AppError::SubmissionInFlight);
        }
        if state.stage != expected {
            return Err(AppError::WrongStage {
                expected,
                actual: state.stage,
            });
        }
        Ok(f(&mut *state))
    }

    pub fn set_business_info(&self, info: BusinessInfo) -> AppResult<()> {
        self.edit(WizardStage::BasicInfo, |s| s.draft.business_info = info)
    }

    pub fn set_address(&self, address: impl Into<String>) -> AppResult<()> {
        let address = address.into();
        self.edit(WizardStage::TimingsAndHappyHours, |s| {
            s.draft.business_info.address = address
        })
    }

    pub fn add_timing(&self, slot: TimingSlot) -> AppResult<()> {
        self.edit(WizardStage::TimingsAndHappyHours, |s| s.draft.timings.push(slot))
    }

    pub fn remove_timing(&self, index: usize) -> AppResult<Option<TimingSlot>> {
        self.edit(WizardStage::TimingsAndHappyHours, |s| {
            (index < s.draft.timings.len()).then(|| s.draft.timings.remove(index))
        })
    }

    pub fn set_happy_hours(&self, happy_hours: Option<HappyHours>) -> AppResult<()> {
        self.edit(WizardStage::TimingsAndHappyHours, |s| {
            s.draft.happy_hours = happy_hours
        })
    }

    /// Runs `f` against the asset composer and the draft catalog.
    pub fn compose<R>(&self, f: impl FnOnce(&mut AssetComposer, &mut DraftCatalog) -> R) -> AppResult<R> {
        self.edit(WizardStage::AssetComposition, |s| {
            let WizardState {
                composer, draft, ..
            } = s;
            f(composer, &mut draft.catalog)
        })
    }

    pub fn commit_asset(&self) -> AppResult<Uuid> {
        self.compose(|composer, catalog| composer.commit_to_draft(catalog))?
    }

    /// Steps back one stage; a no-op at `BasicInfo`. Entered data is kept.
    pub fn retreat(&self) -> AppResult<WizardStage> {
        let mut state = self.state.lock();
        ensure_open(state.stage)?;
        if self.is_submitting() {
            return Err(AppError::SubmissionInFlight);
        }
        if let Some(previous) = state.stage.previous() {
            tracing::debug!(from = ?state.stage, to = ?previous, "wizard retreat");
            state.stage = previous;
        }
        Ok(state.stage)
    }

    /// Discards the draft and closes the wizard. Results of calls still in
    /// flight are ignored when they arrive.
    pub fn abandon(&self) {
        let mut state = self.state.lock();
        if state.stage == WizardStage::Committed {
            return;
        }
        self.session.fetch_add(1, Ordering::SeqCst);
        *state = WizardState {
            stage: WizardStage::Abandoned,
            ..WizardState::default()
        };
        tracing::info!("onboarding abandoned");
    }

    /// Re-locks the state after a remote call, provided the wizard was not
    /// abandoned while the call was in flight.
    fn resume(&self, session: u64) -> AppResult<MutexGuard<'_, WizardState>> {
        let state = self.state.lock();
        if self.session.load(Ordering::SeqCst) != session || state.stage == WizardStage::Abandoned
        {
            tracing::info!("dropping result of a call made before the wizard was abandoned");
            return Err(AppError::Abandoned);
        }
        Ok(state)
    }

    pub async fn advance(&self) -> AppResult<WizardStage> {
        let _submission = Submission::begin(&self.submitting)?;
        let session = self.session.load(Ordering::SeqCst);
        let stage = {
            let state = self.state.lock();
            ensure_open(state.stage)?;
            state.stage
        };

        match stage {
            WizardStage::BasicInfo => self.submit_business_info(session).await,
            WizardStage::TimingsAndHappyHours => self.submit_setup(session).await,
            WizardStage::AssetComposition => self.finish_composition(),
            WizardStage::Summary => self.commit_catalog(session).await,
            WizardStage::Committed | WizardStage::Abandoned => Err(AppError::WizardClosed),
        }
    }

    async fn submit_business_info(&self, session: u64) -> AppResult<WizardStage> {
        let request = {
            let mut state = self.state.lock();
            let violations = validate_business_info(&state.draft.business_info);
            if !violations.is_empty() {
                return Err(AppError::validation(violations));
            }
            if state.draft.is_registered() {
                // Operator record already exists from an earlier pass.
                state.stage = WizardStage::TimingsAndHappyHours;
                return Ok(state.stage);
            }
            RegisterRequest::from(&state.draft.business_info)
        };

        tracing::info!(email = %request.email, "registering operator");
        let result = self.backend.register(&request).await;
        let mut state = self.resume(session)?;

        let response = result.map_err(|err| {
            tracing::warn!(error = %err, "operator registration failed");
            remote_failure(err)
        })?;
        let token = response.token.trim();
        if token.is_empty() {
            return Err(AppError::MalformedServerResponse(
                "registration response carried no token".to_string(),
            ));
        }

        state.draft.auth_token = Some(token.to_string());
        state.draft.server_id = response.operator_id().map(str::to_owned);
        state.stage = WizardStage::TimingsAndHappyHours;
        if state.draft.server_id.is_none() {
            tracing::warn!("registration returned no operator id, basic info will be resubmitted");
        }
        tracing::info!(operator_id = ?state.draft.server_id, "operator registered");
        Ok(state.stage)
    }

    async fn submit_setup(&self, session: u64) -> AppResult<WizardStage> {
        let (token, parlour_id, request) = {
            let state = self.state.lock();
            let draft = &state.draft;
            let violations = validate_setup(draft);
            if !violations.is_empty() {
                return Err(AppError::validation(violations));
            }
            let token = draft.auth_token.clone().ok_or_else(|| {
                AppError::RemoteCommitFailed("operator is not registered".to_string())
            })?;
            let parlour_id = draft.server_id.clone().ok_or_else(|| {
                AppError::MalformedServerResponse(
                    "registration did not return an operator id; go back and resubmit the business info"
                        .to_string(),
                )
            })?;
            let request = SetupRequest {
                address: draft.business_info.address.trim().to_string(),
                timings: draft.timings.clone(),
                happy_hours: draft.happy_hours,
            };
            (token, parlour_id, request)
        };

        tracing::info!(parlour_id = %parlour_id, slots = request.timings.len(), "updating operator setup");
        let result = self.backend.update_setup(&token, &parlour_id, &request).await;
        let mut state = self.resume(session)?;

        result.map_err(|err| {
            tracing::warn!(parlour_id = %parlour_id, error = %err, "operator setup update failed");
            remote_failure(err)
        })?;
        state.stage = WizardStage::AssetComposition;
        Ok(state.stage)
    }

    fn finish_composition(&self) -> AppResult<WizardStage> {
        let mut state = self.state.lock();
        if state.draft.catalog.is_empty() {
            return Err(AppError::validation(vec![Violation::NoAssets]));
        }
        state.stage = WizardStage::Summary;
        Ok(state.stage)
    }

    async fn commit_catalog(&self, session: u64) -> AppResult<WizardStage> {
        let (token, assets) = {
            let state = self.state.lock();
            let token = state.draft.auth_token.clone().ok_or_else(|| {
                AppError::RemoteCommitFailed("operator is not registered".to_string())
            })?;
            let assets = state.draft.catalog.assets().to_vec();
            (token, assets)
        };

        let report = CommitSequencer::new(self.backend.as_ref(), &token)
            .run(&assets)
            .await;
        let mut state = self.resume(session)?;

        report.apply_to(&mut state.draft.catalog);
        let aborted = report.aborted.clone();
        state.last_report = Some(report);

        if let Some(failure) = aborted {
            return Err(AppError::RemoteCommitFailed(format!(
                "Could not create asset '{}': {}",
                failure.name, failure.reason
            )));
        }
        state.stage = WizardStage::Committed;
        tracing::info!("onboarding committed");
        Ok(state.stage)
    }
}
