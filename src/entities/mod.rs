//! sea-orm entities backing the ledger and its collaborators.

pub mod category;
pub mod product;
pub mod supplier;
pub mod transaction;
pub mod user;

pub use transaction::{TransactionStatus, TransactionType};
pub use user::UserRole;

use rust_decimal::Decimal;

/// Fractional digits kept for prices and ledger totals.
pub const MONEY_SCALE: u32 = 4;

/// Brings a stored amount back to its four-place value.
///
/// SQLite hands decimals back through `f64`, so `12.5` can surface with
/// trailing binary noise; amounts are bounded well inside `f64`'s exact range,
/// so rounding recovers the written value.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}
