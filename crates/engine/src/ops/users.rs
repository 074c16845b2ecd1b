//! User registration.

use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Wallet, WalletKind};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Registers a user and creates their MAIN wallet (balance 0) in
    /// one unit.
    ///
    /// Returns the id of the created wallet.
    pub async fn register(&self, username: &str, password: &str) -> ResultEngine<uuid::Uuid> {
        let username = normalize_required_text(username, "username")?;
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let exists = crate::users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(username.clone()));
            }

            let user = crate::users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
            };
            user.insert(&db_tx).await?;

            let wallet = Wallet::new(username.clone(), "Main".to_string(), WalletKind::Main, 0);
            let wallet_id = wallet.id;
            crate::wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;

            Ok(wallet_id)
        })
    }
}
