//! Wallet primitives.
//!
//! A wallet is a representation of a real spending account, a savings
//! pot or an investment account. Its `balance_minor` column is cached
//! and derived: only the engine's ledger operations may write it, and
//! at any quiescent point it equals the opening balance plus the sum of
//! all transaction effects.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    /// The spending wallet created at registration; one per user.
    Main,
    Savings,
    Investment,
}

impl WalletKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Savings => "savings",
            Self::Investment => "investment",
        }
    }
}

impl TryFrom<&str> for WalletKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "main" => Ok(Self::Main),
            "savings" => Ok(Self::Savings),
            "investment" => Ok(Self::Investment),
            other => Err(EngineError::Validation(format!(
                "invalid wallet kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Stable identifier, generated once and persisted so the wallet
    /// can be renamed without breaking references.
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub kind: WalletKind,
    /// Cached balance in minor units. Derived; never written outside
    /// the engine's ledger operations.
    pub balance_minor: i64,
    /// Balance the wallet started with; the invariant sums transaction
    /// effects on top of this.
    pub opening_balance_minor: i64,
}

impl Wallet {
    pub fn new(user_id: String, name: String, kind: WalletKind, opening_balance_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            balance_minor: opening_balance_minor,
            opening_balance_minor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: String,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Username",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            opening_balance_minor: ActiveValue::Set(value.opening_balance_minor),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Consistency("invalid wallet id".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            kind: WalletKind::try_from(model.kind.as_str())?,
            balance_minor: model.balance_minor,
            opening_balance_minor: model.opening_balance_minor,
        })
    }
}
