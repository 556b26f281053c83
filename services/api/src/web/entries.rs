//! services/api/src/web/entries.rs
//!
//! Handlers for appending dated duration entries to a habit.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    Extension,
};
use habit_tracker_core::domain::HabitEntry;
use habit_tracker_core::forms::EntryForm;
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

const ALREADY_LOGGED: &str = "Habit already exists on that day.";

/// Form body for a new entry. `timestamp` is a `YYYY-MM-DD` date.
#[derive(Deserialize, ToSchema)]
pub struct EntryRequest {
    pub habit_name: Option<String>,
    pub duration: Option<String>,
    pub timestamp: Option<String>,
}

impl From<EntryRequest> for EntryForm {
    fn from(req: EntryRequest) -> Self {
        Self {
            habit_name: req.habit_name,
            duration: req.duration,
            timestamp: req.timestamp,
        }
    }
}

/// GET /update - The entry form, listing the user's habits
pub async fn update_page_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Html<String>, HttpError> {
    let habits = state
        .db
        .list_habits(current.user_id)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to list habits: {:?}", e)))?;
    Ok(pages::update_page(&habits))
}

/// POST /update - Append a dated duration entry, at most one per habit per day
#[utoipa::path(
    post,
    path = "/update",
    request_body(content = EntryRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Entry added", body = SuccessResponse),
        (status = 400, description = "Validation failures or an entry already exists on that day", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn update_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    FormBody(req): FormBody<EntryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Validate every field before touching the store
    let entry = EntryForm::from(req)
        .validate()
        .map_err(|e| HttpError::Invalid(e.0))?;

    // 2. One entry per habit per calendar day
    let exists = state
        .db
        .entry_exists_on(current.user_id, &entry.habit_name, entry.date)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to check for entry: {:?}", e)))?;
    if exists {
        return Err(HttpError::BadRequest(ALREADY_LOGGED.to_string()));
    }

    // 3. Record it; the store rejects a same-day entry that raced past the check
    state
        .db
        .add_entry(HabitEntry {
            user_id: current.user_id,
            habit_name: entry.habit_name.clone(),
            duration: entry.duration,
            date: entry.date,
        })
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HttpError::BadRequest(ALREADY_LOGGED.to_string()),
            e => HttpError::Internal(format!("Failed to add entry: {:?}", e)),
        })?;

    info!(
        "User {} logged {} minutes of '{}' on {}",
        current.user_id, entry.duration, entry.habit_name, entry.date
    );
    Ok(success("Habit added successfully."))
}
