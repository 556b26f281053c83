//! services/api/src/web/charts.rs
//!
//! Plots a habit's logged durations and embeds the image in the graph page.

use axum::{extract::State, response::Html, Extension};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use habit_tracker_core::domain::SeriesPoint;
use habit_tracker_core::forms::HabitForm;
use habit_tracker_core::ports::{PortError, RenderedChart};
use std::sync::Arc;

use crate::web::{
    extract::FormBody,
    habits::HabitRequest,
    pages::{self, GraphView},
    response::HttpError,
    state::{AppState, CurrentUser},
};

/// Encodes a chart as a `data:` URI suitable for an `<img src>`.
pub fn to_data_uri(chart: &RenderedChart) -> String {
    format!(
        "data:{};base64,{}",
        chart.content_type,
        STANDARD.encode(&chart.bytes)
    )
}

/// POST / - Render the chosen habit's series as a chart
///
/// An empty series is not an HTTP error: the graph page explains there is no data.
pub async fn plot_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    FormBody(req): FormBody<HabitRequest>,
) -> Result<Html<String>, HttpError> {
    let form = HabitForm::from(req);
    let habit_name = match form.validate() {
        Ok(name) => name,
        Err(e) => return Ok(pages::graph_page(&GraphView::Error(e.to_string()))),
    };

    let entries = state
        .db
        .get_entries(current.user_id, habit_name)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to load entries: {:?}", e)))?;
    let points: Vec<SeriesPoint> = entries.iter().map(SeriesPoint::from).collect();

    let view = match state.chart_renderer.render_series(habit_name, &points) {
        Ok(chart) => GraphView::Chart {
            habit_name: habit_name.to_string(),
            data_uri: to_data_uri(&chart),
        },
        Err(PortError::NotFound(message)) => GraphView::Error(message),
        Err(e) => return Err(HttpError::Internal(format!("Failed to render chart: {:?}", e))),
    };
    Ok(pages::graph_page(&view))
}
