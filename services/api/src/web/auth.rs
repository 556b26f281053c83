//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for registration, login, and logout.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use habit_tracker_core::domain::UserCredentials;
use habit_tracker_core::forms::{LoginForm, RegisterForm};
use habit_tracker_core::ports::PortError;
use serde::Deserialize;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::{
    extract::FormBody,
    middleware::{session_id_from_headers, SESSION_COOKIE},
    pages,
    response::{success, ErrorResponse, HttpError, SuccessResponse},
    state::{AppState, CurrentUser},
};

const BAD_CREDENTIALS: &str = "Incorrect username or password.";
const USERNAME_TAKEN: &str = "Username already exists.";

/// Stands in for the stored hash of an unknown username, so that every failed
/// login costs one Argon2 verification.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown user placeholder").ok());

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirmation: Option<String>,
}

impl From<RegisterRequest> for RegisterForm {
    fn from(req: RegisterRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
            confirmation: req.confirmation,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<LoginRequest> for LoginForm {
    fn from(req: LoginRequest) -> Self {
        Self {
            username: req.username,
            password: req.password,
        }
    }
}

//=========================================================================================
// Password Hashing and Cookies
//=========================================================================================

fn hash_password(password: &str) -> Result<String, HttpError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HttpError::Internal(format!("Failed to hash password: {:?}", e)))
}

fn verify_password(password: &str, hashed: &str) -> Result<bool, HttpError> {
    let parsed_hash = PasswordHash::new(hashed)
        .map_err(|e| HttpError::Internal(format!("Failed to parse password hash: {:?}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn hash_to_verify(creds: Option<&UserCredentials>) -> Result<&str, HttpError> {
    match creds {
        Some(creds) => Ok(&creds.hashed_password),
        None => DUMMY_HASH
            .as_deref()
            .ok_or_else(|| HttpError::Internal("Failed to prepare placeholder hash".to_string())),
    }
}

/// Verifies `password` whether or not the user exists. Returns the user's id
/// only when the user exists and the password matches.
fn check_credentials(
    creds: Option<&UserCredentials>,
    password: &str,
) -> Result<Option<Uuid>, HttpError> {
    let matched = verify_password(password, hash_to_verify(creds)?)?;
    Ok(creds.filter(|_| matched).map(|c| c.user_id))
}

fn session_cookie(session_id: &str, ttl: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session_id,
        ttl.num_seconds()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn cleared_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

/// Drops whatever session the client presented. Failures are logged, not surfaced.
async fn forget_session(state: &AppState, headers: &HeaderMap) {
    if let Some(session_id) = session_id_from_headers(headers) {
        if let Err(e) = state.db.delete_auth_session(&session_id).await {
            error!("Failed to delete auth session: {:?}", e);
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /login - Show the login form, forgetting any current session
pub async fn login_page_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    forget_session(&state, &headers).await;
    ([(header::SET_COOKIE, cleared_cookie())], pages::login_page())
}

/// POST /login - Login with an existing account
#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful, session cookie set", body = SuccessResponse),
        (status = 400, description = "Missing fields or incorrect credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    FormBody(req): FormBody<LoginRequest>,
) -> Result<Response, HttpError> {
    forget_session(&state, &headers).await;

    // 1. Validate the form
    let form = LoginForm::from(req);
    let (username, password) = form
        .validate()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;

    // 2. Look up the user; an unknown name is verified against a placeholder hash
    let user_creds = match state.db.get_user_by_username(username).await {
        Ok(creds) => Some(creds),
        Err(PortError::NotFound(_)) => None,
        Err(e) => return Err(HttpError::Internal(format!("Failed to get user: {:?}", e))),
    };

    // 3. Verify password; an unknown name and a wrong password look the same
    let Some(user_id) = check_credentials(user_creds.as_ref(), password)? else {
        warn!("Login rejected for username '{}'", username);
        return Err(HttpError::BadRequest(BAD_CREDENTIALS.to_string()));
    };

    // 4. Create auth session
    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = state.config.session_ttl;
    state
        .db
        .create_auth_session(&auth_session_id, user_id, Utc::now() + ttl)
        .await
        .map_err(|e| HttpError::Internal(format!("Failed to create auth session: {:?}", e)))?;

    info!("User {} logged in", user_id);
    let cookie = session_cookie(&auth_session_id, ttl, state.config.cookie_secure);
    Ok((
        [(header::SET_COOKIE, cookie)],
        success("Log in successful."),
    )
        .into_response())
}

/// GET /register - Show the registration form
pub async fn register_page_handler() -> Html<String> {
    pages::register_page()
}

/// POST /register - Create a new user account
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User registered", body = SuccessResponse),
        (status = 400, description = "Validation failures or username taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    FormBody(req): FormBody<RegisterRequest>,
) -> Result<impl IntoResponse, HttpError> {
    // 1. Validate every field, reporting all problems at once
    let registration = RegisterForm::from(req)
        .validate()
        .map_err(|e| HttpError::Invalid(e.0))?;

    // 2. Reject taken usernames before hashing
    match state.db.get_user_by_username(&registration.username).await {
        Ok(_) => return Err(HttpError::Invalid(vec![USERNAME_TAKEN.to_string()])),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(HttpError::Internal(format!("Failed to get user: {:?}", e))),
    }

    // 3. Hash the password and create the user
    let password_hash = hash_password(&registration.password)?;
    let user = state
        .db
        .create_user(&registration.username, &password_hash)
        .await
        .map_err(|e| match e {
            PortError::Conflict(_) => HttpError::Invalid(vec![USERNAME_TAKEN.to_string()]),
            e => HttpError::Internal(format!("Failed to create user: {:?}", e)),
        })?;

    info!("Registered user {}", user.user_id);
    Ok(success("Registration successful. You can now log in."))
}

/// GET /logout - Invalidate the session and return to the login page
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> impl IntoResponse {
    if let Err(e) = state.db.delete_auth_session(&current.session_id).await {
        error!("Failed to delete auth session: {:?}", e);
    }
    info!("User {} logged out", current.user_id);
    ([(header::SET_COOKIE, cleared_cookie())], Redirect::to("/login"))
}
