use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::SearchParams;
use crate::api::session::Session;
use crate::api::views::render;
use crate::domain::DomainError;
use crate::domain::search::{Orders, build_filter};
use crate::infrastructure::AppState;

/// Read-only order list
pub async fn list(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, DomainError> {
    session.require_superuser()?;

    let filter = build_filter::<Orders>(params.q.as_deref());
    let orders = state.order_repo.search(&filter).await?;

    Ok(render(
        &session,
        jar,
        "dashboard/ver_pedidos.html",
        json!({ "orders": orders, "search_query": params.q }),
    ))
}
