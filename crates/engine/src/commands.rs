//! Command structs for engine write operations.
//!
//! These types group parameters for the ledger write paths, keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create a transaction on a wallet.
#[derive(Clone, Debug)]
pub struct CreateTransactionCmd {
    pub user_id: String,
    pub wallet_id: Uuid,
    pub category_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub is_refund: bool,
    pub tag_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
}

impl CreateTransactionCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        wallet_id: Uuid,
        category_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            wallet_id,
            category_id,
            amount_minor,
            occurred_at,
            description: description.into(),
            is_refund: false,
            tag_id: None,
            payee_id: None,
        }
    }

    #[must_use]
    pub fn refund(mut self) -> Self {
        self.is_refund = true;
        self
    }

    #[must_use]
    pub fn tag_id(mut self, tag_id: Uuid) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    #[must_use]
    pub fn payee_id(mut self, payee_id: Uuid) -> Self {
        self.payee_id = Some(payee_id);
        self
    }
}

/// Update an existing transaction.
///
/// `None` fields keep the stored value. Transfer legs cannot be
/// updated through this command; delete the transfer instead.
#[derive(Clone, Debug)]
pub struct UpdateTransactionCmd {
    pub user_id: String,
    pub transaction_id: Uuid,
    pub wallet_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub is_refund: Option<bool>,
    pub tag_id: Option<Uuid>,
    pub payee_id: Option<Uuid>,
}

impl UpdateTransactionCmd {
    #[must_use]
    pub fn new(user_id: impl Into<String>, transaction_id: Uuid) -> Self {
        Self {
            user_id: user_id.into(),
            transaction_id,
            wallet_id: None,
            category_id: None,
            amount_minor: None,
            occurred_at: None,
            description: None,
            is_refund: None,
            tag_id: None,
            payee_id: None,
        }
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn is_refund(mut self, is_refund: bool) -> Self {
        self.is_refund = Some(is_refund);
        self
    }
}

/// Move money between two wallets of the same user.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub user_id: String,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        from_wallet_id: Uuid,
        to_wallet_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            from_wallet_id,
            to_wallet_id,
            amount_minor,
            occurred_at,
            description: description.into(),
        }
    }
}
