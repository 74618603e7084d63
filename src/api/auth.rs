use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, cookie::CookieJar};
use serde_json::json;

use super::forms::{LoginForm, RegisterForm};
use super::session::{self, Session};
use super::views::{Level, push, redirect_with, render};
use crate::domain::{DomainError, FieldErrors};
use crate::infrastructure::AppState;
use crate::services::account_service;

fn already_signed_in(jar: CookieJar) -> Response {
    redirect_with(jar, "/mis-libros/", Level::Info, "You are already logged in.").into_response()
}

pub async fn login_page(session: Session, jar: CookieJar) -> Response {
    if session.is_authenticated() {
        return already_signed_in(jar);
    }
    render(&session, jar, "login.html", json!({})).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, DomainError> {
    if session.is_authenticated() {
        return Ok(already_signed_in(jar));
    }

    match account_service::authenticate(state.user_repo.as_ref(), &form.email, &form.password)
        .await?
    {
        Some(user) => {
            let jar = session::sign_in(jar, &state, user.id)?;
            Ok((jar, Redirect::to("/mis-libros/")).into_response())
        }
        None => {
            let jar = push(jar, Level::Error, "Incorrect email or password.");
            let (jar, view) = render(&session, jar, "login.html", json!({ "form": form }));
            Ok((jar, view.with_status(StatusCode::UNPROCESSABLE_ENTITY)).into_response())
        }
    }
}

pub async fn register_page(session: Session, jar: CookieJar) -> Response {
    if session.is_authenticated() {
        return already_signed_in(jar);
    }
    render(&session, jar, "registro.html", json!({})).into_response()
}

fn register_errors(
    session: &Session,
    jar: CookieJar,
    form: &RegisterForm,
    errors: FieldErrors,
) -> Response {
    let (jar, view) = render(
        session,
        jar,
        "registro.html",
        json!({ "form": form, "errors": errors }),
    );
    (jar, view.with_status(StatusCode::UNPROCESSABLE_ENTITY)).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, DomainError> {
    if session.is_authenticated() {
        return Ok(already_signed_in(jar));
    }

    let account = match form.validate() {
        Ok(account) => account,
        Err(errors) => return Ok(register_errors(&session, jar, &form, errors)),
    };

    let user = match account_service::create_account(state.user_repo.as_ref(), account).await {
        Ok(user) => user,
        Err(DomainError::Validation(errors)) => {
            return Ok(register_errors(&session, jar, &form, errors));
        }
        Err(e) => return Err(e),
    };

    let jar = session::sign_in(jar, &state, user.id)?;
    Ok((jar, Redirect::to("/")).into_response())
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (session::sign_out(jar), Redirect::to("/"))
}
