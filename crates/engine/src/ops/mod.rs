//! Engine service: every operation that reads or mutates the ledger.
//!
//! Write operations run inside [`with_tx!`] so the transaction row and
//! the wallet balance commit or roll back as one unit. The engine holds
//! no state besides the connection handle; serialization of concurrent
//! writers is delegated to the storage layer (sqlite has a single
//! writer; a busy handle is retried once, then surfaced as
//! [`EngineError::Conflict`]).

use sea_orm::{DatabaseConnection, DatabaseTransaction, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{Category, CategoryKind, EngineError, ResultEngine};

mod balances;
mod categories;
mod list;
mod transactions;
mod transfers;
mod users;
mod wallets;

/// Runs a block inside a DB transaction, committing on success and
/// rolling back on error.
///
/// The block is evaluated in its own async scope, so `?` inside it
/// lands here instead of leaving the enclosing function. A busy/locked
/// sqlite handle aborts the attempt; the whole block is re-run once,
/// and a second busy failure is reported as [`EngineError::Conflict`].
/// The block must therefore not move values out of its environment.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let mut retried = false;
        loop {
            let $tx = $self.database.begin().await?;
            let result: crate::ResultEngine<_> = async { $body }.await;
            match result {
                Ok(value) => match $tx.commit().await {
                    Ok(()) => break Ok(value),
                    Err(err) if crate::error::is_busy(&err) => {
                        if retried {
                            break Err(crate::EngineError::Conflict(
                                "storage busy, concurrent writer won".to_string(),
                            ));
                        }
                        retried = true;
                    }
                    Err(err) => break Err(crate::EngineError::from(err)),
                },
                Err(crate::EngineError::Database(err)) if crate::error::is_busy(&err) => {
                    drop($tx);
                    if retried {
                        break Err(crate::EngineError::Conflict(
                            "storage busy, concurrent writer won".to_string(),
                        ));
                    }
                    retried = true;
                }
                Err(err) => break Err(err),
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) async fn require_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<crate::users::Model> {
        crate::users::Entity::find_by_id(user_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Loads a wallet, checking it belongs to `user_id`.
    pub(crate) async fn require_wallet(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        wallet_id: Uuid,
    ) -> ResultEngine<crate::wallets::Model> {
        crate::wallets::Entity::find_by_id(wallet_id.to_string())
            .filter(crate::wallets::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))
    }

    /// Loads a category visible to `user_id` (owned or system).
    pub(crate) async fn require_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let model = crate::categories::Entity::find_by_id(category_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        if model
            .user_id
            .as_deref()
            .is_some_and(|owner| owner != user_id)
        {
            return Err(EngineError::KeyNotFound("category not exists".to_string()));
        }
        Category::try_from(model)
    }

    /// Like [`Self::require_category`], but rejects the reserved
    /// transfer markers, which only the transfer operation may attach.
    pub(crate) async fn require_spendable_category(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<Category> {
        let category = self.require_category(db_tx, user_id, category_id).await?;
        if category.is_transfer_marker() {
            return Err(EngineError::Validation(
                "transfer categories cannot be used directly".to_string(),
            ));
        }
        Ok(category)
    }

    /// Loads the category referenced by an existing transaction row.
    ///
    /// Missing here means the schema's foreign keys were bypassed, so
    /// it aborts the unit as a consistency break instead of a 404.
    pub(crate) async fn category_of(
        &self,
        db_tx: &DatabaseTransaction,
        category_id: &str,
    ) -> ResultEngine<Category> {
        let model = crate::categories::Entity::find_by_id(category_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| {
                EngineError::Consistency("transaction references a missing category".to_string())
            })?;
        Category::try_from(model)
    }

    /// Loads a transaction, checking it belongs to `user_id`.
    pub(crate) async fn require_transaction(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        transaction_id: Uuid,
    ) -> ResultEngine<crate::transactions::Model> {
        let model = crate::transactions::Entity::find_by_id(transaction_id.to_string())
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        if model.user_id != user_id {
            return Err(EngineError::KeyNotFound(
                "transaction not exists".to_string(),
            ));
        }
        Ok(model)
    }

    pub(crate) async fn require_tag(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        tag_id: Uuid,
    ) -> ResultEngine<crate::tags::Model> {
        crate::tags::Entity::find_by_id(tag_id.to_string())
            .filter(crate::tags::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("tag not exists".to_string()))
    }

    pub(crate) async fn require_payee(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: &str,
        payee_id: Uuid,
    ) -> ResultEngine<crate::payees::Model> {
        crate::payees::Entity::find_by_id(payee_id.to_string())
            .filter(crate::payees::Column::UserId.eq(user_id.to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("payee not exists".to_string()))
    }

    /// Looks up one of the two seeded transfer markers by reserved
    /// name. These rows are created by the initial migration; their
    /// absence is a consistency break, not a user error.
    pub(crate) async fn transfer_marker(
        &self,
        db_tx: &DatabaseTransaction,
        name: &str,
        kind: CategoryKind,
    ) -> ResultEngine<Category> {
        let model = crate::categories::Entity::find()
            .filter(crate::categories::Column::UserId.is_null())
            .filter(crate::categories::Column::Name.eq(name.to_string()))
            .filter(crate::categories::Column::Kind.eq(kind.as_str().to_string()))
            .one(db_tx)
            .await?
            .ok_or_else(|| {
                EngineError::Consistency(format!("system category {name} is missing"))
            })?;
        Category::try_from(model)
    }

    /// Persists a wallet's cached balance. Only ledger operations call
    /// this, always inside the unit that wrote the transaction rows.
    pub(crate) async fn persist_wallet_balance(
        &self,
        db_tx: &DatabaseTransaction,
        wallet_id: Uuid,
        balance_minor: i64,
    ) -> ResultEngine<()> {
        let wallet_model = crate::wallets::ActiveModel {
            id: sea_orm::ActiveValue::Set(wallet_id.to_string()),
            balance_minor: sea_orm::ActiveValue::Set(balance_minor),
            ..Default::default()
        };
        wallet_model.update(db_tx).await?;
        Ok(())
    }
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_row_uuid(value: &str, what: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::Consistency(format!("invalid {what} id")))
}

pub(crate) fn balance_overflow() -> EngineError {
    EngineError::Validation("wallet balance would overflow".to_string())
}

/// The builder for `Engine`.
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database.
    #[must_use]
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`.
    #[must_use]
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
        }
    }
}
