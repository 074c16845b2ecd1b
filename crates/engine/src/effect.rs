//! Pure balance-effect arithmetic.
//!
//! The single place that decides how a transaction moves a wallet
//! balance. Every write path (create, update, delete, transfer) goes
//! through [`adjust`], so the sign rules live in exactly one function
//! and the update/delete paths can undo an effect by running the same
//! computation in reverse.

use crate::CategoryKind;

/// Signed effect a transaction has on its wallet balance, in minor
/// units.
///
/// Refunds always credit the wallet, regardless of the category kind;
/// otherwise income credits and expense debits.
#[must_use]
pub fn effect_minor(kind: CategoryKind, is_refund: bool, amount_minor: i64) -> i64 {
    if is_refund {
        return amount_minor;
    }
    match kind {
        CategoryKind::Income => amount_minor,
        CategoryKind::Expense => -amount_minor,
    }
}

/// Applies (or, with `reverse`, undoes) a transaction's effect on a
/// balance.
///
/// Pure and deterministic: no I/O, integer minor-unit arithmetic only.
/// Returns `None` when the resulting balance would not fit in an `i64`.
#[must_use]
pub fn adjust(
    balance_minor: i64,
    amount_minor: i64,
    kind: CategoryKind,
    is_refund: bool,
    reverse: bool,
) -> Option<i64> {
    let delta = effect_minor(kind, is_refund, amount_minor);
    if reverse {
        balance_minor.checked_sub(delta)
    } else {
        balance_minor.checked_add(delta)
    }
}
