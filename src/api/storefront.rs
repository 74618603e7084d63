//! Customer-facing catalog and account pages

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use super::session::Session;
use super::views::render;
use crate::domain::search::{Genres, build_filter};
use crate::domain::{CatalogQuery, DomainError};
use crate::infrastructure::AppState;
use crate::models::book::{BookFormat, PublicationState};
use crate::services::library_service;
use crate::services::purchase_service::owns_book;

/// Books shown on the home page
const LATEST_LIMIT: u64 = 4;

pub async fn index(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse, DomainError> {
    let books = state
        .book_repo
        .catalog(CatalogQuery {
            state: Some(PublicationState::Available),
            limit: Some(LATEST_LIMIT),
            ..Default::default()
        })
        .await?;

    Ok(render(&session, jar, "index.html", json!({ "books": books })))
}

pub async fn upcoming(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse, DomainError> {
    let query_for = |format| CatalogQuery {
        state: Some(PublicationState::Upcoming),
        format: Some(format),
        ..Default::default()
    };
    let ebooks = state.book_repo.catalog(query_for(BookFormat::Ebook)).await?;
    let audiobooks = state
        .book_repo
        .catalog(query_for(BookFormat::Audiobook))
        .await?;

    Ok(render(
        &session,
        jar,
        "proximos.html",
        json!({ "ebooks": ebooks, "audiobooks": audiobooks }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BookstoreParams {
    pub genero_id: Option<String>,
}

pub async fn bookstore(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<BookstoreParams>,
) -> Result<impl IntoResponse, DomainError> {
    // Anything that is not an id shows the whole catalog
    let genre_id = params
        .genero_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i32>().ok());

    let books = state
        .book_repo
        .catalog(CatalogQuery {
            state: Some(PublicationState::Available),
            genre_id,
            ..Default::default()
        })
        .await?;
    let genres = state.genre_repo.search(&build_filter::<Genres>(None)).await?;

    let owned_ids = match &session.user {
        Some(user) => library_service::owned_book_ids(state.db(), user.id).await?,
        None => Vec::new(),
    };

    Ok(render(
        &session,
        jar,
        "bookstore.html",
        json!({
            "books": books,
            "genres": genres,
            "owned_book_ids": owned_ids,
            "active_genre_id": genre_id,
        }),
    ))
}

pub async fn book_detail(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let book = state
        .book_repo
        .find_in_state(id, PublicationState::Available)
        .await?
        .ok_or(DomainError::NotFound)?;

    let already_owned = match &session.user {
        Some(user) => owns_book(state.db(), user.id, book.id).await?,
        None => false,
    };

    Ok(render(
        &session,
        jar,
        "libro_detalle.html",
        json!({ "book": book, "already_owned": already_owned }),
    ))
}

pub async fn upcoming_detail(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, DomainError> {
    let book = state
        .book_repo
        .find_in_state(id, PublicationState::Upcoming)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(render(
        &session,
        jar,
        "proximo-detalle.html",
        json!({ "book": book }),
    ))
}

pub async fn account(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse, DomainError> {
    let user = session.require_user()?;
    let owned = library_service::owned_count(state.db(), user.id).await?;

    Ok(render(
        &session,
        jar,
        "cuenta.html",
        json!({ "owned_count": owned }),
    ))
}

pub async fn my_books(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<impl IntoResponse, DomainError> {
    let user = session.require_user()?;
    let ebooks = library_service::owned_books(state.db(), user.id, BookFormat::Ebook).await?;
    let audiobooks =
        library_service::owned_books(state.db(), user.id, BookFormat::Audiobook).await?;

    Ok(render(
        &session,
        jar,
        "mis-libros.html",
        json!({ "ebooks": ebooks, "audiobooks": audiobooks }),
    ))
}
