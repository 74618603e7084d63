use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde_json::json;

use super::{SearchParams, delete_view, form_view};
use crate::api::forms::GenreForm;
use crate::api::session::Session;
use crate::api::views::{Level, redirect_with, render};
use crate::domain::DomainError;
use crate::domain::search::{Genres, build_filter};
use crate::infrastructure::AppState;

const LIST_URL: &str = "/dashboard/generos/";

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, DomainError> {
    session.require_superuser()?;

    let filter = build_filter::<Genres>(params.q.as_deref());
    let genres = state.genre_repo.search(&filter).await?;

    Ok(render(
        &session,
        jar,
        "dashboard/ver_generos.html",
        json!({ "genres": genres, "search_query": params.q }),
    ))
}

pub async fn add_form(session: Session, jar: CookieJar) -> Result<Response, DomainError> {
    session.require_superuser()?;
    Ok(form_view(
        &session,
        jar,
        "Add New Genre".to_string(),
        &GenreForm::default(),
        None,
        json!({}),
    ))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<GenreForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;

    match form.validate() {
        Ok(input) => {
            state.genre_repo.create(input).await?;
            Ok(redirect_with(jar, LIST_URL, Level::Success, "Genre added successfully!")
                .into_response())
        }
        Err(errors) => Ok(form_view(
            &session,
            jar,
            "Add New Genre".to_string(),
            &form,
            Some(errors),
            json!({}),
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
    let genre = state
        .genre_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(form_view(
        &session,
        jar,
        format!("Edit Genre: {}", genre.name),
        &GenreForm::from_genre(&genre),
        None,
        json!({}),
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
    Form(form): Form<GenreForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let genre = state
        .genre_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    match form.validate() {
        Ok(input) => {
            state.genre_repo.update(id, input).await?;
            Ok(
                redirect_with(jar, LIST_URL, Level::Success, "Genre updated successfully!")
                    .into_response(),
            )
        }
        Err(errors) => Ok(form_view(
            &session,
            jar,
            format!("Edit Genre: {}", genre.name),
            &form,
            Some(errors),
            json!({}),
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
    let genre = state
        .genre_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(delete_view(&session, jar, "Delete Genre", &genre, LIST_URL))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let genre = state
        .genre_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    state.genre_repo.delete(id).await?;

    Ok(redirect_with(
        jar,
        LIST_URL,
        Level::Success,
        format!("The genre '{}' has been deleted.", genre.name),
    )
    .into_response())
}
