use crate::dashboard::{Dashboard, DashboardView};
use crate::errors::AppError;
use crate::logger::{ActivityLogger, FormField, LoggerView, Route, SubmitOutcome};
use crate::models::Category;
use crate::state::AppState;
use crate::ui::{render_dashboard, render_logger};
use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A tab switch, carrying whatever the user typed into the tab being left.
#[derive(Debug, Deserialize)]
pub struct TabRequest {
    pub tab: String,
    #[serde(flatten)]
    pub fields: FieldValues,
}

/// Raw field values as typed into the logger; absent keys are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct FieldValues {
    pub mode: Option<String>,
    pub distance: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub kwh: Option<String>,
}

impl FieldValues {
    fn apply(self, logger: &ActivityLogger) {
        let edits = [
            (FormField::TransportMode, self.mode),
            (FormField::Distance, self.distance),
            (FormField::FoodCategory, self.category),
            (FormField::FoodQuantity, self.quantity),
            (FormField::FoodUnit, self.unit),
            (FormField::EnergyKwh, self.kwh),
        ];
        for (field, value) in edits {
            if let Some(value) = value {
                logger.set_field(field, value);
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoggerResponse {
    #[serde(flatten)]
    pub view: LoggerView,
    pub redirect: Option<Route>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub result: SubmitOutcome,
    pub view: LoggerView,
}

pub async fn index(State(state): State<AppState>) -> Response {
    if state.redirect.take() == Some(Route::Dashboard) {
        return Redirect::to("/dashboard").into_response();
    }
    Html(render_logger(&state.logger.view())).into_response()
}

pub async fn select_tab(
    State(state): State<AppState>,
    Form(payload): Form<TabRequest>,
) -> Result<Redirect, AppError> {
    switch_tab(&state, payload)?;
    Ok(Redirect::to("/"))
}

pub async fn submit(
    State(state): State<AppState>,
    Form(payload): Form<FieldValues>,
) -> Redirect {
    state.redirect.clear();
    payload.apply(&state.logger);
    state.logger.submit().await;
    Redirect::to("/")
}

pub async fn get_logger(State(state): State<AppState>) -> Json<LoggerResponse> {
    Json(LoggerResponse {
        view: state.logger.view(),
        redirect: state.redirect.take(),
    })
}

pub async fn api_select_tab(
    State(state): State<AppState>,
    Json(payload): Json<TabRequest>,
) -> Result<Json<LoggerView>, AppError> {
    switch_tab(&state, payload)?;
    Ok(Json(state.logger.view()))
}

pub async fn api_set_fields(
    State(state): State<AppState>,
    Json(payload): Json<FieldValues>,
) -> Json<LoggerView> {
    payload.apply(&state.logger);
    Json(state.logger.view())
}

pub async fn api_submit(State(state): State<AppState>) -> Json<SubmitResponse> {
    state.redirect.clear();
    let result = state.logger.submit().await;
    Json(SubmitResponse {
        result,
        view: state.logger.view(),
    })
}

pub async fn dashboard(State(state): State<AppState>) -> Html<String> {
    Html(render_dashboard(&mount_dashboard(&state).await))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(mount_dashboard(&state).await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Every page view gets a fresh dashboard, so a reload re-runs the fetch.
async fn mount_dashboard(state: &AppState) -> DashboardView {
    let mut dashboard = Dashboard::new(Arc::clone(&state.api), Arc::clone(&state.cache));
    dashboard.mount().await;
    dashboard.view()
}

/// Edits apply to the tab being left, so they land before the switch.
fn switch_tab(state: &AppState, payload: TabRequest) -> Result<(), AppError> {
    let tab = parse_tab(&payload.tab)?;
    state.redirect.clear();
    payload.fields.apply(&state.logger);
    state.logger.select_tab(tab);
    Ok(())
}

fn parse_tab(tab: &str) -> Result<Category, AppError> {
    tab.parse()
        .map_err(|_| AppError::bad_request("tab must be 'transport', 'food' or 'energy'"))
}
