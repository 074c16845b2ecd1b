//! Category primitives.
//!
//! A category classifies a transaction as income or expense; the
//! category's kind is what decides the sign of the transaction's effect
//! on a wallet balance. Rows with a NULL `user_id` are system-defined
//! and shared by every user.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Reserved system category marking the outgoing leg of a transfer.
pub const OUTGOING_TRANSFER: &str = "OUTGOING_TRANSFER";
/// Reserved system category marking the incoming leg of a transfer.
pub const INCOMING_TRANSFER: &str = "INCOMING_TRANSFER";

/// Closed set of category kinds.
///
/// Kept a two-variant enum on purpose: the balance-effect table in
/// [`crate::effect`] matches on it exhaustively, so a new kind cannot
/// be added without the compiler pointing at every place that must
/// decide its sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::Consistency(format!(
                "invalid category kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    /// Owning user, or `None` for system-defined categories.
    pub user_id: Option<String>,
    pub name: String,
    pub color: String,
    pub kind: CategoryKind,
}

impl Category {
    pub fn new(user_id: Option<String>, name: String, color: String, kind: CategoryKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            color,
            kind,
        }
    }

    /// Whether this row is one of the two reserved transfer markers.
    ///
    /// Transfer markers are never selectable for regular transactions;
    /// only the transfer operation attaches them.
    #[must_use]
    pub fn is_transfer_marker(&self) -> bool {
        self.user_id.is_none()
            && (self.name == OUTGOING_TRANSFER || self.name == INCOMING_TRANSFER)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub color: String,
    pub kind: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.clone()),
            name: ActiveValue::Set(value.name.clone()),
            color: ActiveValue::Set(value.color.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: Uuid::parse_str(&model.id)
                .map_err(|_| EngineError::Consistency("invalid category id".to_string()))?,
            user_id: model.user_id,
            name: model.name,
            color: model.color,
            kind: CategoryKind::try_from(model.kind.as_str())?,
        })
    }
}
