//! Wallet-to-wallet transfers.
//!
//! A transfer is one logical operation realized as two transaction
//! rows: an outgoing leg on the source wallet and an incoming leg on
//! the destination, attached to the reserved system categories and
//! correlated by a shared `transfer_id`. Both rows and both balance
//! writes commit as one unit, so money is never created or destroyed
//! by a partial transfer.

use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::{
    CategoryKind, EngineError, INCOMING_TRANSFER, OUTGOING_TRANSFER, ResultEngine, Transaction,
    TransferCmd, adjust,
};

use super::{Engine, balance_overflow, normalize_required_text, with_tx};

impl Engine {
    /// Moves `amount_minor` from one wallet to another.
    ///
    /// Returns the `(outgoing, incoming)` pair of created transactions.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<(Transaction, Transaction)> {
        if cmd.from_wallet_id == cmd.to_wallet_id {
            return Err(EngineError::Validation(
                "from_wallet_id and to_wallet_id must differ".to_string(),
            ));
        }
        if cmd.amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let from_wallet = self
                .require_wallet(&db_tx, &cmd.user_id, cmd.from_wallet_id)
                .await?;
            let to_wallet = self
                .require_wallet(&db_tx, &cmd.user_id, cmd.to_wallet_id)
                .await?;

            let outgoing_category = self
                .transfer_marker(&db_tx, OUTGOING_TRANSFER, CategoryKind::Expense)
                .await?;
            let incoming_category = self
                .transfer_marker(&db_tx, INCOMING_TRANSFER, CategoryKind::Income)
                .await?;

            let transfer_id = Uuid::new_v4();
            let outgoing = Transaction::new(
                cmd.user_id.clone(),
                cmd.from_wallet_id,
                outgoing_category.id,
                cmd.amount_minor,
                cmd.occurred_at,
                description.clone(),
                false,
                None,
                None,
                Some(transfer_id),
            )?;
            let incoming = Transaction::new(
                cmd.user_id.clone(),
                cmd.to_wallet_id,
                incoming_category.id,
                cmd.amount_minor,
                cmd.occurred_at,
                description.clone(),
                false,
                None,
                None,
                Some(transfer_id),
            )?;

            crate::transactions::ActiveModel::from(&outgoing)
                .insert(&db_tx)
                .await?;
            crate::transactions::ActiveModel::from(&incoming)
                .insert(&db_tx)
                .await?;

            let from_balance = adjust(
                from_wallet.balance_minor,
                cmd.amount_minor,
                outgoing_category.kind,
                false,
                false,
            )
            .ok_or_else(balance_overflow)?;
            let to_balance = adjust(
                to_wallet.balance_minor,
                cmd.amount_minor,
                incoming_category.kind,
                false,
                false,
            )
            .ok_or_else(balance_overflow)?;
            self.persist_wallet_balance(&db_tx, cmd.from_wallet_id, from_balance)
                .await?;
            self.persist_wallet_balance(&db_tx, cmd.to_wallet_id, to_balance)
                .await?;

            Ok((outgoing, incoming))
        })
    }
}
