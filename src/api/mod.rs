pub mod auth;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod purchase;
pub mod reading;
pub mod session;
pub mod storefront;
pub mod views;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use views::{Level, View, redirect_with};

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/", get(storefront::index))
        .route("/proximos/", get(storefront::upcoming))
        .route("/bookstore/", get(storefront::bookstore))
        .route("/libro/:id/", get(storefront::book_detail))
        .route("/proximo/:id/", get(storefront::upcoming_detail))
        // Accounts
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/registro/", get(auth::register_page).post(auth::register))
        .route("/logout/", get(auth::logout))
        .route("/cuenta/", get(storefront::account))
        .route("/mis-libros/", get(storefront::my_books))
        // Reading
        .route("/leer/:id/", get(reading::read_book))
        .route("/leer/:id/:pagina/", get(reading::read_book_page))
        // Purchase
        .route("/comprar/:id/", get(purchase::purchase_page))
        .route(
            "/procesar_compra/:id/",
            get(purchase::process_purchase_get).post(purchase::process_purchase),
        )
        // Back-office
        .nest("/dashboard", dashboard::router())
        .with_state(state)
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let jar = CookieJar::new();
        match self {
            DomainError::NotFound => View::new("404.html", json!({}))
                .with_status(StatusCode::NOT_FOUND)
                .into_response(),
            DomainError::Validation(errors) => View::new("422.html", json!({ "errors": errors }))
                .with_status(StatusCode::UNPROCESSABLE_ENTITY)
                .into_response(),
            DomainError::AlreadyOwned => {
                redirect_with(jar, "/mis-libros/", Level::Info, "You already own this book.")
                    .into_response()
            }
            DomainError::PurchaseFailed { book_id, cause } => redirect_with(
                jar,
                &format!("/comprar/{}/", book_id),
                Level::Error,
                format!("There was an error processing your purchase: {}", cause),
            )
            .into_response(),
            DomainError::AuthorizationDenied(reason) => {
                redirect_with(jar, "/", Level::Error, reason).into_response()
            }
            DomainError::LoginRequired => redirect_with(
                jar,
                "/login/",
                Level::Info,
                "Please log in to continue.",
            )
            .into_response(),
            DomainError::Database(cause) => {
                tracing::error!("Request failed: {}", cause);
                View::new("500.html", json!({}))
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
                    .into_response()
            }
        }
    }
}
