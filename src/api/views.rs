//! View envelopes and flash messages.
//!
//! Pages are returned as `{template, context, messages, user}` JSON for the
//! template layer to render. Flash messages survive one redirect in the
//! `flash` cookie.

use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::session::Session;
use crate::models::UserDto;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

fn decode(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

fn encode(messages: &[FlashMessage]) -> String {
    // Serializing a Vec of plain structs cannot fail
    let bytes = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn flash_cookie(value: String) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Queue a message for the next rendered page.
pub fn push(jar: CookieJar, level: Level, text: impl Into<String>) -> CookieJar {
    let mut messages = jar
        .get(FLASH_COOKIE)
        .map(|c| decode(c.value()))
        .unwrap_or_default();
    messages.push(FlashMessage {
        level,
        text: text.into(),
    });
    jar.add(flash_cookie(encode(&messages)))
}

/// Drain pending messages.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    match jar.get(FLASH_COOKIE).map(|c| decode(c.value())) {
        Some(messages) => (
            jar.remove(Cookie::build(FLASH_COOKIE).path("/")),
            messages,
        ),
        None => (jar, Vec::new()),
    }
}

/// 303 to `to` with a message for the page it lands on.
pub fn redirect_with(
    jar: CookieJar,
    to: &str,
    level: Level,
    text: impl Into<String>,
) -> (CookieJar, Redirect) {
    (push(jar, level, text), Redirect::to(to))
}

/// A page for the template layer.
#[derive(Debug, Clone)]
pub struct View {
    pub template: &'static str,
    pub status: StatusCode,
    pub context: Value,
    pub messages: Vec<FlashMessage>,
    pub user: Option<UserDto>,
}

impl View {
    pub fn new(template: &'static str, context: Value) -> Self {
        Self {
            template,
            status: StatusCode::OK,
            context,
            messages: Vec::new(),
            user: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl IntoResponse for View {
    fn into_response(self) -> Response {
        let body = json!({
            "template": self.template,
            "context": self.context,
            "messages": self.messages,
            "user": self.user,
        });
        let mut response = (self.status, Json(body)).into_response();
        response
            .headers_mut()
            .insert("x-template", HeaderValue::from_static(self.template));
        response
    }
}

/// Render `template` for the current session, consuming pending flash
/// messages.
pub fn render(
    session: &Session,
    jar: CookieJar,
    template: &'static str,
    context: Value,
) -> (CookieJar, View) {
    let (jar, messages) = take(jar);
    let mut view = View::new(template, context);
    view.messages = messages;
    view.user = session.user.clone();
    (jar, view)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_survives_roundtrip() {
        let jar = push(CookieJar::new(), Level::Success, "Saved");
        let jar = push(jar, Level::Error, "But also this");

        let (jar, messages) = take(jar);
        assert_eq!(
            messages,
            vec![
                FlashMessage {
                    level: Level::Success,
                    text: "Saved".to_string(),
                },
                FlashMessage {
                    level: Level::Error,
                    text: "But also this".to_string(),
                },
            ]
        );

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_garbage_cookie_yields_no_messages() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE, "%%%not-base64"));
        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }
}
