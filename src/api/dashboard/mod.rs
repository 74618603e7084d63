//! Administrative back-office, superusers only.

pub mod authors;
pub mod books;
pub mod genres;
pub mod orders;
pub mod users;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::session::Session;
use super::views::{Level, push, render};
use crate::domain::FieldErrors;
use crate::infrastructure::AppState;

/// `?q=` of the list views
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pedidos/", get(orders::list))
        .route("/libros/", get(books::list))
        .route("/libros/agregar/", get(books::add_form).post(books::add))
        .route("/libros/editar/:id/", get(books::edit_form).post(books::edit))
        .route(
            "/libros/borrar/:id/",
            get(books::delete_confirm).post(books::delete),
        )
        .route("/generos/", get(genres::list))
        .route("/generos/agregar/", get(genres::add_form).post(genres::add))
        .route(
            "/generos/editar/:id/",
            get(genres::edit_form).post(genres::edit),
        )
        .route(
            "/generos/borrar/:id/",
            get(genres::delete_confirm).post(genres::delete),
        )
        .route("/autores/", get(authors::list))
        .route(
            "/autores/agregar/",
            get(authors::add_form).post(authors::add),
        )
        .route(
            "/autores/editar/:id/",
            get(authors::edit_form).post(authors::edit),
        )
        .route(
            "/autores/borrar/:id/",
            get(authors::delete_confirm).post(authors::delete),
        )
        .route("/usuarios/", get(users::list))
        .route("/usuarios/agregar/", get(users::add_form).post(users::add))
        .route(
            "/usuarios/editar/:id/",
            get(users::edit_form).post(users::edit),
        )
        .route(
            "/usuarios/borrar/:id/",
            get(users::delete_confirm).post(users::delete),
        )
}

/// `dashboard/form_generico.html`, with field errors on a failed submit.
pub(crate) fn form_view<F: Serialize>(
    session: &Session,
    jar: CookieJar,
    page_title: String,
    form: &F,
    errors: Option<FieldErrors>,
    extra: Value,
) -> Response {
    let failed = errors.is_some();
    let jar = if failed {
        push(jar, Level::Error, "There was an error. Please review the form.")
    } else {
        jar
    };

    let mut context = json!({
        "page_title": page_title,
        "form": form,
        "errors": errors.unwrap_or_default(),
    });
    if let (Value::Object(target), Value::Object(more)) = (&mut context, extra) {
        target.extend(more);
    }

    let (jar, view) = render(session, jar, "dashboard/form_generico.html", context);
    if failed {
        (jar, view.with_status(StatusCode::UNPROCESSABLE_ENTITY)).into_response()
    } else {
        (jar, view).into_response()
    }
}

/// `dashboard/borrar_generico.html`
pub(crate) fn delete_view<T: Serialize>(
    session: &Session,
    jar: CookieJar,
    page_title: &str,
    object: &T,
    cancel_url: &str,
) -> Response {
    render(
        session,
        jar,
        "dashboard/borrar_generico.html",
        json!({
            "page_title": page_title,
            "object": object,
            "cancel_url": cancel_url,
        }),
    )
    .into_response()
}
