//! Token-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use booking_core::error::CoreError;
use booking_core::types::DbId;

use crate::auth::jwt::TokenClass;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "token";

/// A raw token together with the class implied by its transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub class: TokenClass,
}

/// Locate the caller's credential.
///
/// The `Authorization` header wins and must be `Bearer <token>`; it always
/// carries an access token. Without a header the `token` cookie is used as a
/// session token. Returns `Ok(None)` when neither is present.
pub fn find_credential(
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<Option<Credential>, AppError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let token = value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;
        return Ok(Some(Credential {
            token: token.to_string(),
            class: TokenClass::Access,
        }));
    }

    Ok(jar.get(SESSION_COOKIE).map(|cookie| Credential {
        token: cookie.value().to_string(),
        class: TokenClass::Session,
    }))
}

/// Authenticated user resolved from a bearer access token or the session cookie.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's id (from `claims.sub`).
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let credential = find_credential(&parts.headers, &jar)?.ok_or_else(|| {
            tracing::debug!(path = %parts.uri.path(), "Request without credentials");
            AppError::Core(CoreError::Unauthorized("Authentication required".into()))
        })?;

        let user_id = state
            .tokens
            .verify(&credential.token, credential.class)
            .map_err(|e| {
                tracing::debug!(class = %credential.class, error = %e, "Token rejected");
                AppError::Token(e)
            })?;

        Ok(AuthUser { user_id })
    }
}
