//! Request/response bodies shared between the server and its clients.
//!
//! JSON field names are camelCase. Monetary amounts travel as decimal
//! strings (`"75.50"`); the server parses them into minor units, so
//! floats never appear on the wire or in the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserNew {
        pub username: String,
        pub password: String,
    }

    /// Response for registration: the id of the MAIN wallet created
    /// alongside the user.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserCreated {
        pub username: String,
        pub main_wallet_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub username: String,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum WalletKind {
        Main,
        Savings,
        Investment,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletNew {
        pub name: String,
        pub kind: WalletKind,
        /// Decimal string, e.g. `"1000.00"`. Defaults to zero.
        pub opening_balance: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletView {
        pub id: Uuid,
        pub name: String,
        pub kind: WalletKind,
        /// Decimal string, e.g. `"1124.50"`.
        pub balance: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletCreated {
        pub id: Uuid,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryNew {
        pub name: String,
        pub color: String,
        pub kind: CategoryKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub color: String,
        pub kind: CategoryKind,
        /// `None` for system-predefined categories.
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryCreated {
        pub id: Uuid,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionNew {
        pub description: String,
        pub category_id: Uuid,
        /// Decimal string, e.g. `"75.50"`. Magnitude only; the category
        /// kind decides the sign.
        pub amount: String,
        pub date: DateTime<Utc>,
        pub wallet_id: Uuid,
        pub tag_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        #[serde(default)]
        pub is_refund: bool,
    }

    /// Partial update; absent fields keep their stored value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionUpdate {
        pub description: Option<String>,
        pub category_id: Option<Uuid>,
        pub amount: Option<String>,
        pub date: Option<DateTime<Utc>>,
        pub wallet_id: Option<Uuid>,
        pub tag_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        pub is_refund: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionView {
        pub id: Uuid,
        pub description: String,
        pub category_id: Uuid,
        pub amount: String,
        pub date: DateTime<Utc>,
        pub wallet_id: Uuid,
        pub tag_id: Option<Uuid>,
        pub payee_id: Option<Uuid>,
        pub is_refund: bool,
        /// Shared by both legs of a transfer, `None` otherwise.
        pub transfer_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferNew {
        pub from_wallet_id: Uuid,
        pub to_wallet_id: Uuid,
        pub amount: String,
        pub date: DateTime<Utc>,
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferCreated {
        pub outgoing: TransactionView,
        pub incoming: TransactionView,
    }
}
