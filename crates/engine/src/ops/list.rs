//! Read surface for the HTTP layer.

use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, Transaction};

use super::{Engine, with_tx};

impl Engine {
    /// Lists recent transactions on a wallet, newest first.
    pub async fn list_transactions_for_wallet(
        &self,
        user_id: &str,
        wallet_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            // Ownership check doubles as existence check.
            self.require_wallet(&db_tx, user_id, wallet_id).await?;

            let models = crate::transactions::Entity::find()
                .filter(crate::transactions::Column::WalletId.eq(wallet_id.to_string()))
                .order_by_desc(crate::transactions::Column::OccurredAt)
                .limit(limit)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Transaction::try_from).collect()
        })
    }
}
