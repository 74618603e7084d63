use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde_json::json;

use super::{SearchParams, delete_view, form_view};
use crate::api::forms::AuthorForm;
use crate::api::session::Session;
use crate::api::views::{Level, redirect_with, render};
use crate::domain::DomainError;
use crate::domain::search::{Authors, build_filter};
use crate::infrastructure::AppState;

const LIST_URL: &str = "/dashboard/autores/";

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, DomainError> {
    session.require_superuser()?;

    let filter = build_filter::<Authors>(params.q.as_deref());
    let authors = state.author_repo.search(&filter).await?;

    Ok(render(
        &session,
        jar,
        "dashboard/ver_autores.html",
        json!({ "authors": authors, "search_query": params.q }),
    ))
}

pub async fn add_form(session: Session, jar: CookieJar) -> Result<Response, DomainError> {
    session.require_superuser()?;
    Ok(form_view(
        &session,
        jar,
        "Add New Author".to_string(),
        &AuthorForm::default(),
        None,
        json!({}),
    ))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<AuthorForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;

    match form.validate() {
        Ok(input) => {
            state.author_repo.create(input).await?;
            Ok(redirect_with(jar, LIST_URL, Level::Success, "Author added successfully!")
                .into_response())
        }
        Err(errors) => Ok(form_view(
            &session,
            jar,
            "Add New Author".to_string(),
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
    let author = state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(form_view(
        &session,
        jar,
        format!("Edit Author: {}", author.name),
        &AuthorForm::from_author(&author),
        None,
        json!({}),
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
    Form(form): Form<AuthorForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let author = state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    match form.validate() {
        Ok(input) => {
            state.author_repo.update(id, input).await?;
            Ok(
                redirect_with(jar, LIST_URL, Level::Success, "Author updated successfully!")
                    .into_response(),
            )
        }
        Err(errors) => Ok(form_view(
            &session,
            jar,
            format!("Edit Author: {}", author.name),
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
    let author = state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(delete_view(&session, jar, "Delete Author", &author, LIST_URL))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let author = state
        .author_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    state.author_repo.delete(id).await?;

    Ok(redirect_with(
        jar,
        LIST_URL,
        Level::Success,
        format!("The author '{}' has been deleted.", author.name),
    )
    .into_response())
}
