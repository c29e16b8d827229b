//! Activity logger: a tabbed form that submits one category at a time.
//!
//! The logger owns three independent sub-forms. Submitting the active one
//! sends its values to the category endpoint, stores a fixed-shape
//! [`ActivityRecord`] in the cache and, one second later, asks the
//! [`Navigator`] to open the dashboard. Feedback banners clear themselves
//! after three seconds. All delayed work is tied to the logger's lifetime.

use crate::client::CarbonApi;
use crate::models::{
    ActivityRecord, BackfillPolicy, Category, CategoryFields, FoodType, FoodUnit, TransportMode,
};
use crate::storage::ActivityCache;
use crate::timers::ScopedTimer;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub const NAVIGATION_DELAY: Duration = Duration::from_secs(1);
pub const FEEDBACK_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Dashboard,
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportForm {
    pub mode: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodForm {
    pub category: String,
    pub quantity: String,
    pub unit: String,
}

impl Default for FoodForm {
    fn default() -> Self {
        Self {
            category: String::new(),
            quantity: String::new(),
            unit: FoodUnit::default().as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyForm {
    pub kwh: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    TransportMode,
    Distance,
    FoodCategory,
    FoodQuantity,
    FoodUnit,
    EnergyKwh,
}

impl FormField {
    pub fn category(self) -> Category {
        match self {
            FormField::TransportMode | FormField::Distance => Category::Transport,
            FormField::FoodCategory | FormField::FoodQuantity | FormField::FoodUnit => {
                Category::Food
            }
            FormField::EnergyKwh => Category::Energy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

impl Feedback {
    fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FeedbackKind::Success,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FeedbackKind::Error,
        }
    }
}

/// Snapshot of everything the logger page displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerView {
    pub active_tab: Category,
    pub transport: TransportForm,
    pub food: FoodForm,
    pub energy: EnergyForm,
    pub submitting: bool,
    pub feedback: Option<Feedback>,
    /// A successful submission is waiting to open the dashboard.
    pub navigation_pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// A required field was missing or unparseable; nothing happened.
    Invalid,
    /// Another submission is still in flight.
    Busy,
    Logged(ActivityRecord),
    Failed(String),
}

#[derive(Debug, Default)]
struct LoggerState {
    active_tab: Category,
    transport: TransportForm,
    food: FoodForm,
    energy: EnergyForm,
    submitting: bool,
    feedback: Option<(u64, Feedback)>,
    feedback_seq: u64,
}

impl LoggerState {
    fn validated_fields(&self) -> Option<CategoryFields> {
        match self.active_tab {
            Category::Transport => Some(CategoryFields::Transport {
                mode: required(&self.transport.mode)?.parse::<TransportMode>().ok()?,
                distance: parse_amount(&self.transport.distance)?,
            }),
            Category::Food => {
                let unit = match self.food.unit.trim() {
                    "" => FoodUnit::default(),
                    unit => unit.parse::<FoodUnit>().ok()?,
                };
                Some(CategoryFields::Food {
                    food_type: required(&self.food.category)?.parse::<FoodType>().ok()?,
                    quantity: parse_amount(&self.food.quantity)?,
                    unit,
                })
            }
            Category::Energy => Some(CategoryFields::Energy {
                kwh: parse_amount(&self.energy.kwh)?,
            }),
        }
    }

    fn reset_forms(&mut self) {
        self.transport = TransportForm::default();
        self.food = FoodForm::default();
        self.energy = EnergyForm::default();
    }
}

fn required(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_amount(value: &str) -> Option<f64> {
    let amount: f64 = required(value)?.parse().ok()?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn lock(state: &Mutex<LoggerState>) -> MutexGuard<'_, LoggerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Timers {
    feedback: Option<ScopedTimer>,
    navigation: Option<ScopedTimer>,
}

/// Clears `submitting` when the submission settles or is abandoned.
struct SubmittingGuard<'a>(&'a Mutex<LoggerState>);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        lock(self.0).submitting = false;
    }
}

pub struct ActivityLogger {
    state: Arc<Mutex<LoggerState>>,
    timers: Mutex<Timers>,
    api: Arc<dyn CarbonApi>,
    cache: Arc<dyn ActivityCache>,
    navigator: Arc<dyn Navigator>,
    policy: BackfillPolicy,
}

impl ActivityLogger {
    pub fn new(
        api: Arc<dyn CarbonApi>,
        cache: Arc<dyn ActivityCache>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(LoggerState::default())),
            timers: Mutex::new(Timers::default()),
            api,
            cache,
            navigator,
            policy: BackfillPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BackfillPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn view(&self) -> LoggerView {
        let navigation_pending = self
            .lock_timers()
            .navigation
            .as_ref()
            .is_some_and(|timer| !timer.is_finished());
        let state = lock(&self.state);
        LoggerView {
            active_tab: state.active_tab,
            transport: state.transport.clone(),
            food: state.food.clone(),
            energy: state.energy.clone(),
            submitting: state.submitting,
            feedback: state.feedback.as_ref().map(|(_, feedback)| feedback.clone()),
            navigation_pending,
        }
    }

    /// Cancels pending navigation and feedback expiry, e.g. when the view
    /// hosting the logger goes away while it stays alive.
    pub fn teardown(&self) {
        let mut timers = self.lock_timers();
        let cancelled = timers.feedback.take().is_some() | timers.navigation.take().is_some();
        if cancelled {
            debug!("cancelled pending logger timers");
        }
    }

    pub fn select_tab(&self, tab: Category) {
        lock(&self.state).active_tab = tab;
    }

    /// Updates one field of the active form. Returns `false` when the field
    /// belongs to another tab, in which case nothing changes.
    pub fn set_field(&self, field: FormField, value: impl Into<String>) -> bool {
        let mut state = lock(&self.state);
        if field.category() != state.active_tab {
            debug!(?field, active = state.active_tab.label(), "ignoring edit outside active tab");
            return false;
        }

        let value = value.into();
        match field {
            FormField::TransportMode => state.transport.mode = value,
            FormField::Distance => state.transport.distance = value,
            FormField::FoodCategory => state.food.category = value,
            FormField::FoodQuantity => state.food.quantity = value,
            FormField::FoodUnit => state.food.unit = value,
            FormField::EnergyKwh => state.energy.kwh = value,
        }
        true
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let fields = {
            let mut state = lock(&self.state);
            if state.submitting {
                return SubmitOutcome::Busy;
            }
            match state.validated_fields() {
                Some(fields) => {
                    state.submitting = true;
                    fields
                }
                None => {
                    state.submitting = false;
                    debug!(tab = state.active_tab.label(), "submit ignored, required field missing");
                    return SubmitOutcome::Invalid;
                }
            }
        };
        let _submitting = SubmittingGuard(&self.state);

        let category = fields.category();
        info!(category = category.label(), "submitting activity");

        match self.api.log_category(&fields.payload()).await {
            Ok(status) => {
                debug!(category = category.label(), status, "category request settled");
                self.complete(&fields).await
            }
            Err(err) => {
                warn!(category = category.label(), error = %err, "category request failed");
                let url = self.api.endpoint_url(category.endpoint());
                let message = format!(
                    "Failed to log {} data: could not reach {url}.",
                    category.label()
                );
                self.show_feedback(Feedback::error(message.clone()));
                SubmitOutcome::Failed(message)
            }
        }
    }

    async fn complete(&self, fields: &CategoryFields) -> SubmitOutcome {
        let category = fields.category();
        let record = ActivityRecord::from_submission(fields, self.policy);

        if let Err(err) = self.cache.set_last_activity(&record).await {
            error!(error = %err, "failed to cache activity");
            let message = format!(
                "Failed to save your {} data locally: {err}",
                category.label()
            );
            self.show_feedback(Feedback::error(message.clone()));
            return SubmitOutcome::Failed(message);
        }

        self.show_feedback(Feedback::success(format!(
            "Successfully logged your {} data!",
            category.label()
        )));
        lock(&self.state).reset_forms();
        self.schedule_navigation();

        info!(category = category.label(), "activity logged");
        SubmitOutcome::Logged(record)
    }

    fn show_feedback(&self, feedback: Feedback) {
        let id = {
            let mut state = lock(&self.state);
            state.feedback_seq += 1;
            let id = state.feedback_seq;
            state.feedback = Some((id, feedback));
            id
        };

        let state: Weak<Mutex<LoggerState>> = Arc::downgrade(&self.state);
        let timer = ScopedTimer::after(FEEDBACK_TTL, async move {
            if let Some(state) = state.upgrade() {
                let mut state = lock(&state);
                if matches!(state.feedback, Some((current, _)) if current == id) {
                    state.feedback = None;
                }
            }
        });
        self.lock_timers().feedback = Some(timer);
    }

    fn schedule_navigation(&self) {
        let state: Weak<Mutex<LoggerState>> = Arc::downgrade(&self.state);
        let navigator = Arc::clone(&self.navigator);
        let timer = ScopedTimer::after(NAVIGATION_DELAY, async move {
            if state.upgrade().is_some() {
                navigator.navigate(Route::Dashboard);
            }
        });
        self.lock_timers().navigation = Some(timer);
    }

    fn lock_timers(&self) -> MutexGuard<'_, Timers> {
        self.timers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
