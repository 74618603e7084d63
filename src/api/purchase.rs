use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::session::Session;
use super::views::{Level, redirect_with, render};
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::services::purchase_service::{self, owns_book};

/// Purchase confirmation page
pub async fn purchase_page(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(book_id): Path<i32>,
) -> Result<Response, DomainError> {
    let user = session.require_user()?;
    let book = state
        .book_repo
        .find_by_id(book_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    if owns_book(state.db(), user.id, book.id).await? {
        return Ok(redirect_with(
            jar,
            &format!("/libro/{}/", book.id),
            Level::Info,
            "You already own this book!",
        )
        .into_response());
    }

    Ok(render(&session, jar, "compra.html", json!({ "book": book })).into_response())
}

pub async fn process_purchase(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(book_id): Path<i32>,
) -> Result<Response, DomainError> {
    let user = session.require_user()?;
    let receipt = purchase_service::purchase(state.db(), user.id, book_id).await?;

    Ok(redirect_with(
        jar,
        "/mis-libros/",
        Level::Success,
        format!(
            "Purchase complete! '{}' has been added to your library.",
            receipt.title
        ),
    )
    .into_response())
}

/// Purchases only happen on POST
pub async fn process_purchase_get() -> Redirect {
    Redirect::to("/")
}
