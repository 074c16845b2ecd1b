//! Category, tag and payee operations.
//!
//! Categories come in two flavours: system rows (NULL user) shared by
//! everyone, and user-owned rows. The two reserved transfer markers are
//! system rows that never show up in listings and cannot be attached to
//! regular transactions.

use sea_orm::{ActiveValue, Condition, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryKind, EngineError, INCOMING_TRANSFER, OUTGOING_TRANSFER, ResultEngine,
};

use super::{Engine, normalize_required_text, with_tx};

impl Engine {
    /// Lists the categories a user can attach to transactions: their
    /// own plus the system-predefined ones, without the transfer
    /// markers.
    pub async fn list_categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let models = crate::categories::Entity::find()
                .filter(
                    Condition::any()
                        .add(crate::categories::Column::UserId.eq(user_id.to_string()))
                        .add(crate::categories::Column::UserId.is_null()),
                )
                .filter(
                    crate::categories::Column::Name
                        .is_not_in([OUTGOING_TRANSFER, INCOMING_TRANSFER]),
                )
                .order_by_asc(crate::categories::Column::Name)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Category::try_from).collect()
        })
    }

    /// Creates a user-owned category.
    pub async fn new_category(
        &self,
        user_id: &str,
        name: &str,
        color: &str,
        kind: CategoryKind,
    ) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "category name")?;
        if name == OUTGOING_TRANSFER || name == INCOMING_TRANSFER {
            return Err(EngineError::Validation(format!(
                "{name} is a reserved category name"
            )));
        }

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let exists = crate::categories::Entity::find()
                .filter(crate::categories::Column::UserId.eq(user_id.to_string()))
                .filter(crate::categories::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name.clone()));
            }

            let category = Category::new(
                Some(user_id.to_string()),
                name.clone(),
                color.to_string(),
                kind,
            );
            let category_id = category.id;
            crate::categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;

            Ok(category_id)
        })
    }

    /// Creates a user-owned tag.
    pub async fn new_tag(&self, user_id: &str, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "tag name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let id = Uuid::new_v4();
            let tag = crate::tags::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.clone()),
            };
            tag.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Creates a user-owned payee.
    pub async fn new_payee(&self, user_id: &str, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_text(name, "payee name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let id = Uuid::new_v4();
            let payee = crate::payees::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name.clone()),
            };
            payee.insert(&db_tx).await?;
            Ok(id)
        })
    }
}
