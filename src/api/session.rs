//! Per-request authentication context.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::auth::{create_jwt, decode_jwt};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::UserDto;

pub const SESSION_COOKIE: &str = "session";

/// Who is making the request, if anyone.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user: Option<UserDto>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require_user(&self) -> Result<&UserDto, DomainError> {
        self.user.as_ref().ok_or(DomainError::LoginRequired)
    }

    pub fn require_superuser(&self) -> Result<&UserDto, DomainError> {
        let user = self.require_user()?;
        if !user.is_superuser {
            tracing::warn!("User {} denied access to the dashboard", user.id);
            return Err(DomainError::AuthorizationDenied(
                "The dashboard is restricted to administrators.".to_string(),
            ));
        }
        Ok(user)
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = DomainError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, DomainError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .or_else(|| bearer_token(parts));

        let Some(token) = token else {
            return Ok(Session::anonymous());
        };

        // Expired or forged tokens fall back to an anonymous session
        let Some(user_id) = decode_jwt(&token, &state.config.jwt_secret)
            .ok()
            .and_then(|claims| claims.user_id())
        else {
            return Ok(Session::anonymous());
        };

        let user = state.user_repo.find_by_id(user_id).await?;
        Ok(Session { user })
    }
}

/// Start a session for `user_id`.
pub fn sign_in(jar: CookieJar, state: &AppState, user_id: i32) -> Result<CookieJar, DomainError> {
    let token = create_jwt(user_id, &state.config.jwt_secret, state.config.session_hours)
        .map_err(|e| DomainError::Database(format!("session token: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    Ok(jar.add(cookie))
}

pub fn sign_out(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}
