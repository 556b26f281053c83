//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request session context.

use crate::config::Config;
use habit_tracker_core::ports::{ChartRenderingService, DatabaseService};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub chart_renderer: Arc<dyn ChartRenderingService>,
    pub config: Arc<Config>,
}

//=========================================================================================
// CurrentUser (Specific to One Authenticated Request)
//=========================================================================================

/// The session resolved from the request cookie by `require_auth`.
///
/// Handlers behind the access guard receive this as an `Extension`; nothing
/// reads session state from anywhere else.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub session_id: String,
}
