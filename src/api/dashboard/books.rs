use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde_json::json;

use super::{SearchParams, delete_view, form_view};
use crate::api::forms::BookForm;
use crate::api::session::Session;
use crate::api::views::{Level, redirect_with, render};
use crate::domain::search::{Authors, Books, Genres, build_filter};
use crate::domain::{DomainError, FieldErrors};
use crate::infrastructure::AppState;
use crate::models::author::Author;
use crate::models::genre::Genre;

const LIST_URL: &str = "/dashboard/libros/";

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, DomainError> {
    session.require_superuser()?;

    let filter = build_filter::<Books>(params.q.as_deref());
    let books = state.book_repo.search(&filter).await?;

    Ok(render(
        &session,
        jar,
        "dashboard/ver_libros.html",
        json!({ "books": books, "search_query": params.q }),
    ))
}

/// Genres and authors offered by the form
async fn choices(state: &AppState) -> Result<(Vec<Genre>, Vec<Author>), DomainError> {
    let genres = state.genre_repo.search(&build_filter::<Genres>(None)).await?;
    let authors = state
        .author_repo
        .search(&build_filter::<Authors>(None))
        .await?;
    Ok((genres, authors))
}

fn book_form_view(
    session: &Session,
    jar: CookieJar,
    page_title: String,
    form: &BookForm,
    errors: Option<FieldErrors>,
    (genres, authors): (Vec<Genre>, Vec<Author>),
) -> Response {
    form_view(
        session,
        jar,
        page_title,
        form,
        errors,
        json!({
            "genre_choices": genres,
            "author_choices": authors,
            "state_choices": ["available", "upcoming"],
            "format_choices": ["ebook", "audiobook"],
        }),
    )
}

pub async fn add_form(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let form = BookForm {
        publication_state: "available".to_string(),
        format: "ebook".to_string(),
        ..Default::default()
    };

    Ok(book_form_view(
        &session,
        jar,
        "Add New Book".to_string(),
        &form,
        None,
        choices(&state).await?,
    ))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<BookForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let (genres, authors) = choices(&state).await?;

    match form.validate(&genres, &authors) {
        Ok(input) => {
            state.book_repo.create(input).await?;
            Ok(redirect_with(jar, LIST_URL, Level::Success, "Book added successfully!")
                .into_response())
        }
        Err(errors) => Ok(book_form_view(
            &session,
            jar,
            "Add New Book".to_string(),
            &form,
            Some(errors),
            (genres, authors),
        )),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(book_form_view(
        &session,
        jar,
        format!("Edit Book: {}", book.title),
        &BookForm::from_book(&book),
        None,
        choices(&state).await?,
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
    Form(form): Form<BookForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let (genres, authors) = choices(&state).await?;

    match form.validate(&genres, &authors) {
        Ok(input) => {
            state.book_repo.update(id, input).await?;
            Ok(
                redirect_with(jar, LIST_URL, Level::Success, "Book updated successfully!")
                    .into_response(),
            )
        }
        Err(errors) => Ok(book_form_view(
            &session,
            jar,
            format!("Edit Book: {}", book.title),
            &form,
            Some(errors),
            (genres, authors),
        )),
    }
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(delete_view(&session, jar, "Delete Book", &book, LIST_URL))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    state.book_repo.delete(id).await?;

    Ok(redirect_with(
        jar,
        LIST_URL,
        Level::Success,
        format!("The book '{}' has been deleted.", book.title),
    )
    .into_response())
}
