//! Wallet endpoints.

use api_types::wallet::{WalletCreated, WalletKind as ApiKind, WalletNew, WalletView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::MoneyMinor;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::WalletKind) -> ApiKind {
    match kind {
        engine::WalletKind::Main => ApiKind::Main,
        engine::WalletKind::Savings => ApiKind::Savings,
        engine::WalletKind::Investment => ApiKind::Investment,
    }
}

fn map_kind_in(kind: ApiKind) -> engine::WalletKind {
    match kind {
        ApiKind::Main => engine::WalletKind::Main,
        ApiKind::Savings => engine::WalletKind::Savings,
        ApiKind::Investment => engine::WalletKind::Investment,
    }
}

fn view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        name: wallet.name,
        kind: map_kind(wallet.kind),
        balance: MoneyMinor::new(wallet.balance_minor).to_string(),
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<WalletView>>, ServerError> {
    let wallets = state.engine.list_wallets(&user.username).await?;
    Ok(Json(wallets.into_iter().map(view).collect()))
}

pub async fn get(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet(&user.username, wallet_id).await?;
    Ok(Json(view(wallet)))
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<WalletNew>,
) -> Result<(StatusCode, Json<WalletCreated>), ServerError> {
    let opening = match payload.opening_balance.as_deref() {
        Some(raw) => raw
            .parse::<MoneyMinor>()
            .map_err(|err| ServerError::Generic(err.to_string()))?,
        None => MoneyMinor::ZERO,
    };

    let id = state
        .engine
        .new_wallet(
            &user.username,
            &payload.name,
            map_kind_in(payload.kind),
            opening.minor(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(WalletCreated { id })))
}

pub async fn delete(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_wallet(&user.username, wallet_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
