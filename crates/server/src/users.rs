//! User endpoints: registration and identity.

use api_types::user::{UserCreated, UserNew, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState};

/// Registers a user. The engine creates their MAIN wallet in the same
/// unit; its id is returned so clients can start posting transactions
/// right away.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserCreated>), ServerError> {
    let main_wallet_id = state
        .engine
        .register(&payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            username: payload.username,
            main_wallet_id,
        }),
    ))
}

pub async fn me(Extension(user): Extension<engine::users::Model>) -> Json<UserView> {
    Json(UserView {
        username: user.username,
    })
}
