use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::session::Session;
use super::views::render;
use crate::domain::DomainError;
use crate::domain::reading::parse_page;
use crate::infrastructure::AppState;
use crate::services::reading_service;

async fn read(
    state: AppState,
    session: Session,
    jar: CookieJar,
    book_id: i32,
    page: Option<String>,
) -> Result<impl IntoResponse, DomainError> {
    let reader = session.require_user()?;
    let view =
        reading_service::open_book(state.db(), reader, book_id, parse_page(page.as_deref())).await?;

    Ok(render(&session, jar, "leer-libro.html", json!(view)))
}

/// `/leer/:id/`: first page
pub async fn read_book(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(book_id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    read(state, session, jar, book_id, None).await
}

pub async fn read_book_page(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path((book_id, page)): Path<(i32, String)>,
) -> Result<impl IntoResponse, DomainError> {
    read(state, session, jar, book_id, Some(page)).await
}
