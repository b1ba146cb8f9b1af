//! Handlers for the `/auth` resource (signup, login, refresh, me).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chromance_core::error::CoreError;
use chromance_core::validation::{normalize_email, validate_name, validate_password_strength};
use chromance_db::models::user::{CreateUser, User, UserResponse};
use chromance_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, validate_token, TokenType};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::{ensure_active, AuthUser};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Successful authentication response returned by signup, login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/signup
///
/// Register a new account and sign it in. Duplicate emails are rejected with 409.
pub async fn signup(
    State(state): State<AppState>,
    AppJson(input): AppJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let name = validate_name(&input.name)?;
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password)?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.db,
        &CreateUser {
            name,
            email,
            password_hash,
        },
    )
    .await
    .map_err(|e| {
        if chromance_db::is_duplicate_key(&e) {
            AppError::Core(CoreError::Conflict("Email already registered".into()))
        } else {
            AppError::Database(e)
        }
    })?;

    tracing::info!(user_id = %user.id_hex(), "User registered");
    Ok((StatusCode::CREATED, Json(token_response(&state, &user)?)))
}

/// POST /api/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let email = normalize_email(&input.email)?;
    let user = UserRepo::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = %user.id_hex(), "Failed login attempt");
        return Err(invalid());
    }

    ensure_active(&user)?;
    Ok(Json(token_response(&state, &user)?))
}

/// POST /api/auth/refresh
///
/// Exchange a valid refresh token for a new token pair.
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(input): AppJson<RefreshRequest>,
) -> AppResult<Json<TokenResponse>> {
    let claims = validate_token(&input.refresh_token, TokenType::Refresh, &state.config.jwt)
        .map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    ensure_active(&user)?;
    Ok(Json(token_response(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.db, &auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id.clone())))?;
    Ok(Json(UserResponse::from(&user)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a fresh token pair for `user`.
fn token_response(state: &AppState, user: &User) -> AppResult<TokenResponse> {
    let user_id = user.id_hex();
    let jwt = &state.config.jwt;

    let access_token = generate_access_token(&user_id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let refresh_token = generate_refresh_token(&user_id, jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer",
        expires_in: jwt.access_expires_in(),
        user: UserResponse::from(user),
    })
}
