use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde_json::json;

use super::{SearchParams, delete_view, form_view};
use crate::api::forms::{NewUserForm, UserForm};
use crate::api::session::Session;
use crate::api::views::{Level, redirect_with, render};
use crate::domain::DomainError;
use crate::domain::search::{Users, build_filter};
use crate::infrastructure::AppState;
use crate::services::account_service;

const LIST_URL: &str = "/dashboard/usuarios/";

pub async fn list(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, DomainError> {
    session.require_superuser()?;

    let filter = build_filter::<Users>(params.q.as_deref());
    let users = state.user_repo.search(&filter).await?;

    Ok(render(
        &session,
        jar,
        "dashboard/ver_usuarios.html",
        json!({ "users": users, "search_query": params.q }),
    ))
}

pub async fn add_form(session: Session, jar: CookieJar) -> Result<Response, DomainError> {
    session.require_superuser()?;
    Ok(form_view(
        &session,
        jar,
        "Add New User".to_string(),
        &NewUserForm::default(),
        None,
        json!({}),
    ))
}

pub async fn add(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<NewUserForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;

    let account = match form.validate() {
        Ok(account) => account,
        Err(errors) => {
            return Ok(form_view(
                &session,
                jar,
                "Add New User".to_string(),
                &form,
                Some(errors),
                json!({}),
            ));
        }
    };

    match account_service::create_account(state.user_repo.as_ref(), account).await {
        Ok(_) => Ok(
            redirect_with(jar, LIST_URL, Level::Success, "User added successfully!")
                .into_response(),
        ),
        Err(DomainError::Validation(errors)) => Ok(form_view(
            &session,
            jar,
            "Add New User".to_string(),
            &form,
            Some(errors),
            json!({}),
        )),
        Err(e) => Err(e),
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    Ok(form_view(
        &session,
        jar,
        format!("Edit User: {}", user.username),
        &UserForm::from_user(&user),
        None,
        json!({}),
    ))
}

pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
    Form(form): Form<UserForm>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;
    let title = format!("Edit User: {}", user.username);

    let update = match form.validate() {
        Ok(update) => update,
        Err(errors) => {
            return Ok(form_view(
                &session,
                jar,
                title,
                &form,
                Some(errors),
                json!({}),
            ));
        }
    };

    match account_service::update_account(state.user_repo.as_ref(), id, update).await {
        Ok(_) => Ok(
            redirect_with(jar, LIST_URL, Level::Success, "User updated successfully!")
                .into_response(),
        ),
        Err(DomainError::Validation(errors)) => Ok(form_view(
            &session,
            jar,
            title,
            &form,
            Some(errors),
            json!({}),
        )),
        Err(e) => Err(e),
    }
}

pub async fn delete_confirm(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    if user.is_superuser {
        return Ok(protected(jar));
    }

    Ok(delete_view(&session, jar, "Delete User", &user, LIST_URL))
}

pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(id): Path<i32>,
) -> Result<Response, DomainError> {
    session.require_superuser()?;
    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)?;

    match account_service::delete_account(state.user_repo.as_ref(), id).await {
        Ok(()) => Ok(redirect_with(
            jar,
            LIST_URL,
            Level::Success,
            format!("The user '{}' has been deleted.", user.username),
        )
        .into_response()),
        Err(DomainError::AuthorizationDenied(_)) => Ok(protected(jar)),
        Err(e) => Err(e),
    }
}

fn protected(jar: CookieJar) -> Response {
    redirect_with(
        jar,
        LIST_URL,
        Level::Error,
        "You cannot delete a superuser.",
    )
    .into_response()
}
