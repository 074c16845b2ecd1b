//! Transaction primitives.
//!
//! A transaction is a single dated monetary event affecting one wallet
//! through one category. `amount_minor` is always a positive magnitude;
//! the sign of its effect is derived from the category kind and the
//! refund flag, never stored.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    /// Positive magnitude in minor units.
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    /// Refunds credit the wallet regardless of the category kind.
    pub is_refund: bool,
    pub tag_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
    /// Both legs of a transfer share one generated id, so the pair can
    /// be displayed and deleted together.
    pub transfer_id: Option<Uuid>,
}

impl Transaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: String,
        wallet_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        description: String,
        is_refund: bool,
        tag_id: Option<Uuid>,
        payee_id: Option<Uuid>,
        transfer_id: Option<Uuid>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::Validation(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            wallet_id,
            category_id,
            amount_minor,
            occurred_at,
            description,
            is_refund,
            tag_id,
            payee_id,
            transfer_id,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub wallet_id: String,
    pub category_id: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub description: String,
    pub is_refund: bool,
    pub tag_id: Option<String>,
    pub payee_id: Option<String>,
    pub transfer_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Categories,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            user_id: ActiveValue::Set(tx.user_id.clone()),
            wallet_id: ActiveValue::Set(tx.wallet_id.to_string()),
            category_id: ActiveValue::Set(tx.category_id.to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            is_refund: ActiveValue::Set(tx.is_refund),
            tag_id: ActiveValue::Set(tx.tag_id.map(|id| id.to_string())),
            payee_id: ActiveValue::Set(tx.payee_id.map(|id| id.to_string())),
            transfer_id: ActiveValue::Set(tx.transfer_id.map(|id| id.to_string())),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let parse = |value: &str, what: &str| {
            Uuid::parse_str(value)
                .map_err(|_| EngineError::Consistency(format!("invalid {what} id")))
        };
        Ok(Self {
            id: parse(&model.id, "transaction")?,
            user_id: model.user_id,
            wallet_id: parse(&model.wallet_id, "wallet")?,
            category_id: parse(&model.category_id, "category")?,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            description: model.description,
            is_refund: model.is_refund,
            tag_id: match model.tag_id {
                Some(id) => Some(parse(&id, "tag")?),
                None => None,
            },
            payee_id: match model.payee_id {
                Some(id) => Some(parse(&id, "payee")?),
                None => None,
            },
            transfer_id: match model.transfer_id {
                Some(id) => Some(parse(&id, "transfer")?),
                None => None,
            },
        })
    }
}
