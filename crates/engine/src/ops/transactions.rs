//! Transaction write paths: create, update, delete.
//!
//! Each path is one atomic unit pairing the row mutation with the
//! wallet balance write. The balance is read inside the same unit that
//! rewrites it, so no other writer can interleave between the read and
//! the write.

use sea_orm::{TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CreateTransactionCmd, EngineError, ResultEngine, Transaction, UpdateTransactionCmd, adjust,
};

use super::{Engine, balance_overflow, normalize_required_text, parse_row_uuid, with_tx};

impl Engine {
    /// Creates a transaction and applies its effect to the wallet
    /// balance in one atomic unit.
    pub async fn create_transaction(
        &self,
        cmd: CreateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        if cmd.amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let description = normalize_required_text(&cmd.description, "description")?;

        with_tx!(self, |db_tx| {
            let wallet = self
                .require_wallet(&db_tx, &cmd.user_id, cmd.wallet_id)
                .await?;
            let category = self
                .require_spendable_category(&db_tx, &cmd.user_id, cmd.category_id)
                .await?;
            if let Some(tag_id) = cmd.tag_id {
                self.require_tag(&db_tx, &cmd.user_id, tag_id).await?;
            }
            if let Some(payee_id) = cmd.payee_id {
                self.require_payee(&db_tx, &cmd.user_id, payee_id).await?;
            }

            let tx = Transaction::new(
                cmd.user_id.clone(),
                cmd.wallet_id,
                cmd.category_id,
                cmd.amount_minor,
                cmd.occurred_at,
                description.clone(),
                cmd.is_refund,
                cmd.tag_id,
                cmd.payee_id,
                None,
            )?;
            crate::transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            let new_balance = adjust(
                wallet.balance_minor,
                tx.amount_minor,
                category.kind,
                tx.is_refund,
                false,
            )
            .ok_or_else(balance_overflow)?;
            self.persist_wallet_balance(&db_tx, cmd.wallet_id, new_balance)
                .await?;

            Ok(tx)
        })
    }

    /// Updates a transaction, reversing the old effect and applying the
    /// new one where the effect-relevant fields changed.
    ///
    /// If the wallet itself changes, the reversal goes to the old
    /// wallet and the new effect to the new wallet, both inside the
    /// same unit. Fields left `None` keep their stored value. Transfer
    /// legs are rejected; a transfer can only be deleted as a pair.
    pub async fn update_transaction(
        &self,
        cmd: UpdateTransactionCmd,
    ) -> ResultEngine<Transaction> {
        if let Some(amount_minor) = cmd.amount_minor
            && amount_minor <= 0
        {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let old_model = self
                .require_transaction(&db_tx, &cmd.user_id, cmd.transaction_id)
                .await?;
            if old_model.transfer_id.is_some() {
                return Err(EngineError::Validation(
                    "transfer legs cannot be edited; delete the transfer and recreate it"
                        .to_string(),
                ));
            }

            let old_wallet_id = parse_row_uuid(&old_model.wallet_id, "wallet")?;
            let old_category = self.category_of(&db_tx, &old_model.category_id).await?;

            // Resolve the patched row before touching any balance.
            let new_amount = cmd.amount_minor.unwrap_or(old_model.amount_minor);
            let new_is_refund = cmd.is_refund.unwrap_or(old_model.is_refund);
            let new_wallet_id = cmd.wallet_id.unwrap_or(old_wallet_id);
            let (new_category_id, new_kind) = match cmd.category_id {
                Some(category_id) => {
                    let category = self
                        .require_spendable_category(&db_tx, &cmd.user_id, category_id)
                        .await?;
                    (category_id, category.kind)
                }
                None => (old_category.id, old_category.kind),
            };
            if cmd.wallet_id.is_some() {
                self.require_wallet(&db_tx, &cmd.user_id, new_wallet_id)
                    .await?;
            }
            if let Some(tag_id) = cmd.tag_id {
                self.require_tag(&db_tx, &cmd.user_id, tag_id).await?;
            }
            if let Some(payee_id) = cmd.payee_id {
                self.require_payee(&db_tx, &cmd.user_id, payee_id).await?;
            }
            let new_description = match cmd.description.as_deref() {
                Some(description) => normalize_required_text(description, "description")?,
                None => old_model.description.clone(),
            };
            let new_occurred_at = cmd.occurred_at.unwrap_or(old_model.occurred_at);

            let updated = Transaction {
                id: cmd.transaction_id,
                user_id: cmd.user_id.clone(),
                wallet_id: new_wallet_id,
                category_id: new_category_id,
                amount_minor: new_amount,
                occurred_at: new_occurred_at,
                description: new_description.clone(),
                is_refund: new_is_refund,
                tag_id: cmd.tag_id.or(match &old_model.tag_id {
                    Some(id) => Some(parse_row_uuid(id, "tag")?),
                    None => None,
                }),
                payee_id: cmd.payee_id.or(match &old_model.payee_id {
                    Some(id) => Some(parse_row_uuid(id, "payee")?),
                    None => None,
                }),
                transfer_id: None,
            };
            crate::transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;

            // Balance sync. Skip the write entirely when nothing
            // effect-relevant changed.
            let old_effect_key = (
                old_category.kind,
                old_model.amount_minor,
                old_model.is_refund,
            );
            let new_effect_key = (new_kind, new_amount, new_is_refund);

            if new_wallet_id != old_wallet_id {
                let old_wallet = self
                    .require_wallet(&db_tx, &cmd.user_id, old_wallet_id)
                    .await?;
                let reversed = adjust(
                    old_wallet.balance_minor,
                    old_model.amount_minor,
                    old_category.kind,
                    old_model.is_refund,
                    true,
                )
                .ok_or_else(balance_overflow)?;
                self.persist_wallet_balance(&db_tx, old_wallet_id, reversed)
                    .await?;

                let new_wallet = self
                    .require_wallet(&db_tx, &cmd.user_id, new_wallet_id)
                    .await?;
                let applied = adjust(
                    new_wallet.balance_minor,
                    new_amount,
                    new_kind,
                    new_is_refund,
                    false,
                )
                .ok_or_else(balance_overflow)?;
                self.persist_wallet_balance(&db_tx, new_wallet_id, applied)
                    .await?;
            } else if old_effect_key != new_effect_key {
                let wallet = self
                    .require_wallet(&db_tx, &cmd.user_id, old_wallet_id)
                    .await?;
                let mut balance = adjust(
                    wallet.balance_minor,
                    old_model.amount_minor,
                    old_category.kind,
                    old_model.is_refund,
                    true,
                )
                .ok_or_else(balance_overflow)?;
                balance = adjust(balance, new_amount, new_kind, new_is_refund, false)
                    .ok_or_else(balance_overflow)?;
                self.persist_wallet_balance(&db_tx, old_wallet_id, balance)
                    .await?;
            }

            Ok(updated)
        })
    }

    /// Deletes a transaction and reverses its effect on the owning
    /// wallet.
    ///
    /// Given a transfer leg, deletes BOTH legs and reverses both
    /// wallets in the same unit, so a transfer can never be half
    /// removed.
    pub async fn delete_transaction(
        &self,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self
                .require_transaction(&db_tx, user_id, transaction_id)
                .await?;

            if let Some(transfer_id) = model.transfer_id.as_deref() {
                let legs = crate::transactions::Entity::find()
                    .filter(
                        crate::transactions::Column::TransferId.eq(transfer_id.to_string()),
                    )
                    .all(&db_tx)
                    .await?;
                for leg in legs {
                    self.reverse_and_delete(&db_tx, user_id, &leg).await?;
                }
                return Ok(());
            }

            self.reverse_and_delete(&db_tx, user_id, &model).await?;
            Ok(())
        })
    }

    /// Removes one transaction row and undoes its balance effect.
    /// Always called inside a unit.
    async fn reverse_and_delete(
        &self,
        db_tx: &sea_orm::DatabaseTransaction,
        user_id: &str,
        model: &crate::transactions::Model,
    ) -> ResultEngine<()> {
        let wallet_id = parse_row_uuid(&model.wallet_id, "wallet")?;
        let category = self.category_of(db_tx, &model.category_id).await?;
        let wallet = self.require_wallet(db_tx, user_id, wallet_id).await?;

        crate::transactions::Entity::delete_by_id(model.id.clone())
            .exec(db_tx)
            .await?;

        let reversed = adjust(
            wallet.balance_minor,
            model.amount_minor,
            category.kind,
            model.is_refund,
            true,
        )
        .ok_or_else(balance_overflow)?;
        self.persist_wallet_balance(db_tx, wallet_id, reversed).await
    }
}
