//! Balance recomputation.

use std::collections::HashMap;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, effect_minor};

use super::{Engine, parse_row_uuid, with_tx};

impl Engine {
    /// Recomputes every cached wallet balance of a user from the
    /// transaction history.
    ///
    /// Replays all transactions through the same effect function the
    /// write paths use, starting from each wallet's opening balance,
    /// and rewrites the cached column. Diagnostic/repair surface: in
    /// correct operation this is a no-op.
    pub async fn recompute_balances(&self, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let wallet_models = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::UserId.eq(user_id.to_string()))
                .all(&db_tx)
                .await?;

            let mut balances: HashMap<Uuid, i64> = HashMap::new();
            for model in &wallet_models {
                let id = parse_row_uuid(&model.id, "wallet")?;
                balances.insert(id, model.opening_balance_minor);
            }

            let tx_models = crate::transactions::Entity::find()
                .filter(crate::transactions::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(crate::transactions::Column::OccurredAt)
                .all(&db_tx)
                .await?;

            for tx_model in tx_models {
                let wallet_id = parse_row_uuid(&tx_model.wallet_id, "wallet")?;
                let category = self.category_of(&db_tx, &tx_model.category_id).await?;
                let balance = balances.get_mut(&wallet_id).ok_or_else(|| {
                    EngineError::Consistency(
                        "transaction references a missing wallet".to_string(),
                    )
                })?;
                let delta =
                    effect_minor(category.kind, tx_model.is_refund, tx_model.amount_minor);
                *balance = balance.checked_add(delta).ok_or_else(|| {
                    EngineError::Consistency(
                        "replayed wallet balance overflows i64".to_string(),
                    )
                })?;
            }

            for (wallet_id, balance_minor) in balances {
                self.persist_wallet_balance(&db_tx, wallet_id, balance_minor)
                    .await?;
            }

            Ok(())
        })
    }
}
