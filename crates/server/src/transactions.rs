//! Transaction endpoints, including the wallet-to-wallet transfer.

use api_types::transaction::{
    TransactionListResponse, TransactionNew, TransactionUpdate, TransactionView, TransferCreated,
    TransferNew,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CreateTransactionCmd, MoneyMinor, TransferCmd, UpdateTransactionCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn parse_amount(raw: &str) -> Result<i64, ServerError> {
    let amount = raw
        .parse::<MoneyMinor>()
        .map_err(|err| ServerError::Generic(err.to_string()))?;
    Ok(amount.minor())
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        description: tx.description,
        category_id: tx.category_id,
        amount: MoneyMinor::new(tx.amount_minor).to_string(),
        date: tx.occurred_at,
        wallet_id: tx.wallet_id,
        tag_id: tx.tag_id,
        payee_id: tx.payee_id,
        is_refund: tx.is_refund,
        transfer_id: tx.transfer_id,
    }
}

pub async fn list(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(wallet_id): Path<Uuid>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .list_transactions_for_wallet(&user.username, wallet_id, 50)
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: transactions.into_iter().map(view).collect(),
    }))
}

pub async fn create(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount_minor = parse_amount(&payload.amount)?;

    let mut cmd = CreateTransactionCmd::new(
        user.username,
        payload.wallet_id,
        payload.category_id,
        amount_minor,
        payload.date,
        payload.description,
    );
    if payload.is_refund {
        cmd = cmd.refund();
    }
    if let Some(tag_id) = payload.tag_id {
        cmd = cmd.tag_id(tag_id);
    }
    if let Some(payee_id) = payload.payee_id {
        cmd = cmd.payee_id(payee_id);
    }

    let tx = state.engine.create_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn update(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<TransactionUpdate>,
) -> Result<Json<TransactionView>, ServerError> {
    let mut cmd = UpdateTransactionCmd::new(user.username, transaction_id);
    if let Some(raw) = payload.amount.as_deref() {
        cmd = cmd.amount_minor(parse_amount(raw)?);
    }
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category_id(category_id);
    }
    if let Some(wallet_id) = payload.wallet_id {
        cmd = cmd.wallet_id(wallet_id);
    }
    if let Some(date) = payload.date {
        cmd = cmd.occurred_at(date);
    }
    if let Some(description) = payload.description {
        cmd = cmd.description(description);
    }
    if let Some(is_refund) = payload.is_refund {
        cmd = cmd.is_refund(is_refund);
    }
    cmd.tag_id = payload.tag_id;
    cmd.payee_id = payload.payee_id;

    let tx = state.engine.update_transaction(cmd).await?;
    Ok(Json(view(tx)))
}

pub async fn delete(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Path(transaction_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(&user.username, transaction_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn transfer(
    Extension(user): Extension<engine::users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransferNew>,
) -> Result<(StatusCode, Json<TransferCreated>), ServerError> {
    let amount_minor = parse_amount(&payload.amount)?;

    let (outgoing, incoming) = state
        .engine
        .transfer(TransferCmd::new(
            user.username,
            payload.from_wallet_id,
            payload.to_wallet_id,
            amount_minor,
            payload.date,
            payload.description,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransferCreated {
            outgoing: view(outgoing),
            incoming: view(incoming),
        }),
    ))
}
