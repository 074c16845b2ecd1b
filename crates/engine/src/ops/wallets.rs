//! Wallet operations.

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Wallet, WalletKind};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Returns a wallet snapshot, including the cached balance.
    pub async fn wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet(&db_tx, user_id, wallet_id).await?;
            Wallet::try_from(model)
        })
    }

    /// Lists all wallets of a user, ordered by name.
    pub async fn list_wallets(&self, user_id: &str) -> ResultEngine<Vec<Wallet>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let models = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(crate::wallets::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Wallet::try_from).collect()
        })
    }

    /// Adds a savings or investment wallet.
    ///
    /// The MAIN wallet is created once at registration and cannot be
    /// added again. Names are unique per user, case-insensitively. A
    /// non-zero opening balance becomes the wallet's starting point;
    /// the balance invariant sums transaction effects on top of it.
    pub async fn new_wallet(
        &self,
        user_id: &str,
        name: &str,
        kind: WalletKind,
        opening_balance_minor: i64,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "wallet name")?;
        if kind == WalletKind::Main {
            return Err(EngineError::Validation(
                "a user has exactly one main wallet, created at registration".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let exists = crate::wallets::Entity::find()
                .filter(crate::wallets::Column::UserId.eq(user_id.to_string()))
                .filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name.clone()));
            }

            let wallet = Wallet::new(
                user_id.to_string(),
                name.clone(),
                kind,
                opening_balance_minor,
            );
            let wallet_id = wallet.id;
            crate::wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            Ok(wallet_id)
        })
    }

    /// Deletes a wallet.
    ///
    /// Only permitted while the wallet has no transactions; a wallet
    /// with history must keep its ledger.
    pub async fn delete_wallet(&self, user_id: &str, wallet_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_wallet(&db_tx, user_id, wallet_id).await?;

            let has_transactions = crate::transactions::Entity::find()
                .filter(crate::transactions::Column::WalletId.eq(wallet_id.to_string()))
                .one(&db_tx)
                .await?
                .is_some();
            if has_transactions {
                return Err(EngineError::Validation(
                    "wallet has transactions and cannot be deleted".to_string(),
                ));
            }

            crate::wallets::Entity::delete_by_id(model.id.clone())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
