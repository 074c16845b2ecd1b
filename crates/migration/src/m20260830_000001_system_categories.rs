//! Seeds the system categories (NULL `user_id`).
//!
//! Two kinds of rows:
//! - the reserved transfer markers `OUTGOING_TRANSFER` and
//!   `INCOMING_TRANSFER`, which only the transfer operation attaches
//!   and listings never show;
//! - a small set of default categories every user sees alongside their
//!   own.

use sea_orm::{ConnectionTrait, DbErr, Statement};
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    Color,
    Kind,
}

/// (name, color, kind) of every seeded row.
const SYSTEM_CATEGORIES: &[(&str, &str, &str)] = &[
    ("OUTGOING_TRANSFER", "#9e9e9e", "expense"),
    ("INCOMING_TRANSFER", "#9e9e9e", "income"),
    ("Salary", "#4caf50", "income"),
    ("Groceries", "#ff9800", "expense"),
    ("Rent", "#795548", "expense"),
    ("Leisure", "#2196f3", "expense"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        for (name, color, kind) in SYSTEM_CATEGORIES {
            let exists = db
                .query_one(Statement::from_string(
                    backend,
                    format!(
                        "SELECT 1 FROM categories WHERE user_id IS NULL AND name = '{name}' LIMIT 1;"
                    ),
                ))
                .await?
                .is_some();
            if exists {
                continue;
            }

            let stmt = Query::insert()
                .into_table(Categories::Table)
                .columns([
                    Categories::Id,
                    Categories::UserId,
                    Categories::Name,
                    Categories::Color,
                    Categories::Kind,
                ])
                .values_panic([
                    Uuid::new_v4().to_string().into(),
                    None::<String>.into(),
                    (*name).into(),
                    (*color).into(),
                    (*kind).into(),
                ])
                .to_owned();

            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        db.execute(Statement::from_string(
            backend,
            "DELETE FROM categories WHERE user_id IS NULL;".to_string(),
        ))
        .await?;

        Ok(())
    }
}
