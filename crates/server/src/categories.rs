//! Category endpoints.

use api_types::category::{CategoryCreated, CategoryKind as ApiKind, CategoryNew, CategoryView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::CategoryKind) -> ApiKind {
    match kind {
        engine::CategoryKind::Income => ApiKind::Income,
        engine::CategoryKind::Expense => ApiKind::Expense,
    }
}

fn map_kind_in(kind: ApiKind) -> engine::CategoryKind {
    match kind {
        ApiKind::Income => engine::CategoryKind::Income,
        ApiKind::Expense => engine::CategoryKind::Expense,
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state.engine.list_categories(&user.username).await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|category| CategoryView {
                id: category.id,
                name: category.name,
                color: category.color,
                kind: map_kind(category.kind),
                user_id: category.user_id,
            })
            .collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryCreated>), ServerError> {
    let id = state
        .engine
        .new_category(
            &user.username,
            &payload.name,
            &payload.color,
            map_kind_in(payload.kind),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(CategoryCreated { id })))
}
