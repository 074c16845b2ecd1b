//! Ledger engine for the wallet/transaction core.
//!
//! The engine owns every write path that touches a wallet's cached
//! balance: transaction create/update/delete and wallet-to-wallet
//! transfers. Each of those runs as a single database transaction so
//! the transaction row and the balance column can never diverge.

pub use categories::{Category, CategoryKind, INCOMING_TRANSFER, OUTGOING_TRANSFER};
pub use commands::{CreateTransactionCmd, TransferCmd, UpdateTransactionCmd};
pub use effect::{adjust, effect_minor};
pub use error::EngineError;
pub use money::MoneyMinor;
pub use ops::{Engine, EngineBuilder};
pub use transactions::Transaction;
pub use wallets::{Wallet, WalletKind};

pub mod categories;
mod commands;
mod effect;
mod error;
mod money;
mod ops;
pub mod payees;
pub mod tags;
pub mod transactions;
pub mod users;
pub mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
