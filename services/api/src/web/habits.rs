//! services/api/src/web/habits.rs
//!
//! Handlers for the habit registry: the index listing, adding and removing habits.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Extension,
};
use habit_tracker_core::forms::HabitForm;
use habit_tracker_core::ports::PortError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::web::{
    extract::FormBody,
    pages,
    response::{success, ErrorResponse, HttpError, SuccessResponse},
    state::{AppState, CurrentUser},
};

/// Form body naming a single habit.
#[derive(Deserialize, ToSchema)]
pub struct HabitRequest {
    pub habit_name: Option<String>,
}

impl From<HabitRequest> for HabitForm {
    fn from(req: HabitRequest) -> Self {
        Self {
            habit_name: req.habit_name,
        }
    }
}

async fn habits_of(
    state: &AppState,
    current: &CurrentUser,
) -> Result<Vec<habit_tracker_core::Habit>, HttpError> {
    state
        .db
        .list_habits(current.user_id)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to list habits: {:?}", e)))
}

/// GET / - The user's habits and the form for plotting one
pub async fn index_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, HttpError> {
    let habits = habits_of(&state, &current).await?;
    Ok(pages::index_page(&habits))
}

/// GET /add
pub async fn add_page_handler() -> Html<String> {
    pages::add_page()
}

/// POST /add - Register a new habit for the current user
#[utoipa::path(
    post,
    path = "/add",
    request_body(content = HabitRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Habit added", body = SuccessResponse),
        (status = 400, description = "Missing habit name or duplicate habit", body = ErrorResponse),
        (status = 500, description = "Store error, message passed through", body = ErrorResponse)
    )
)]
pub async fn add_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    FormBody(req): FormBody<HabitRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let form = HabitForm::from(req);
    let name = form
        .validate()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;

    state
        .db
        .add_habit(current.user_id, name)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HttpError::BadRequest("Habit already exists.".to_string()),
            e => HttpError::Store(e.to_string()),
        })?;

    info!("User {} added habit '{}'", current.user_id, name);
    Ok(success("Habit added successfully."))
}

/// GET /remove - The removal form, listing the user's habits
pub async fn remove_page_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, HttpError> {
    let habits = habits_of(&state, &current).await?;
    Ok(pages::remove_page(&habits))
}

/// POST /remove - Delete a habit together with its logged entries
#[utoipa::path(
    post,
    path = "/remove",
    request_body(content = HabitRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Habit removed, even if nothing matched", body = SuccessResponse),
        (status = 400, description = "Missing habit name", body = ErrorResponse),
        (status = 500, description = "Store error, message passed through", body = ErrorResponse)
    )
)]
pub async fn remove_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    FormBody(req): FormBody<HabitRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let form = HabitForm::from(req);
    let name = form
        .validate()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;

    state
        .db
        .remove_habit(current.user_id, name)
        .await
        .map_err(|e| HttpError::Store(e.to_string()))?;

    info!("User {} removed habit '{}'", current.user_id, name);
    Ok(success("Habit removed successfully."))
}
