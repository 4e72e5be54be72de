//! Handlers for login, logout, and token refresh.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use booking_core::error::CoreError;
use booking_db::models::user::UserResponse;
use booking_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{IssuedToken, TokenClass};
use crate::auth::password::{equalize_timing, verify_password};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::handlers::users::normalize_email;
use crate::middleware::auth::{find_credential, SESSION_COOKIE};
use crate::response::MessageResponse;
use crate::state::AppState;

/// Same message for unknown email and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token, also set as the `token` cookie.
    pub token: String,
    /// Bearer token for the `Authorization` header.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Response body for `POST /auth/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    /// Lifetime of the new token in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /login
///
/// Authenticate with email + password. Returns a session token (also set as
/// a cookie) and a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let email = normalize_email(&input.email);

    let Some(user) = UserRepo::find_by_email(&state.pool, &email).await? else {
        equalize_timing(&input.password);
        tracing::debug!("Login attempt for unknown email");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    };

    if !verify_password(&input.password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    let session = state.tokens.issue(user.id, TokenClass::Session)?;
    let access = state.tokens.issue(user.id, TokenClass::Access)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(&state.config, &session));
    Ok((
        jar,
        Json(LoginResponse {
            token: session.token,
            access_token: access.token,
            expires_in: access.expires_in,
            user: UserResponse::from(user),
        }),
    ))
}

/// POST /logout
///
/// Tokens are stateless, so logout only clears the session cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    // Always emit the expired cookie, even if the request carried none.
    let mut expired = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    expired.make_removal();
    (
        jar.add(expired),
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// POST /auth/refresh
///
/// Exchange a token within its refresh window for a new one of the same
/// class. A bearer header refreshes the access token; otherwise the session
/// cookie is refreshed and re-set.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    let credential = find_credential(&headers, &jar)?.ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Authentication required".into()))
    })?;

    let issued = state
        .tokens
        .refresh(&credential.token, credential.class)
        .inspect_err(|e| tracing::debug!(class = %credential.class, error = %e, "Refresh rejected"))?;

    tracing::info!(user_id = %issued.claims.sub, class = %credential.class, "Token refreshed");

    let jar = match credential.class {
        TokenClass::Session => jar.add(session_cookie(&state.config, &issued)),
        TokenClass::Access => jar,
    };
    Ok((
        jar,
        Json(RefreshResponse {
            token: issued.token,
            expires_in: issued.expires_in,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the `token` cookie for a session token, living as long as the token.
fn session_cookie(config: &ServerConfig, session: &IssuedToken) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(session.expires_in))
        .build()
}
