use crate::transaction::TransactionKind;
use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an operation on a [`Ledger`](crate::Ledger) was refused.
///
/// None of these are fatal. A rejected operation never leaves the ledger partially mutated, so
/// the caller can show the message and prompt again.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The amount is not a number, is not finite, or is not greater than zero once rounded to
    /// cents.
    #[error("please enter a valid amount greater than 0")]
    InvalidAmount,

    /// A single deposit is above the per-transaction ceiling.
    #[error("maximum deposit amount is ${cap:.2} per transaction")]
    ExceedsPerTransactionCap { cap: Decimal },

    /// The cumulative deposits or withdrawals of the current calendar day would go over the
    /// daily limit. `remaining` is the headroom left for today.
    #[error(
        "daily {noun} limit exceeded, you can {kind} up to ${remaining:.2} more today",
        noun = .kind.noun()
    )]
    ExceedsDailyLimit {
        kind: TransactionKind,
        remaining: Decimal,
    },

    /// A withdrawal is larger than the current balance.
    #[error("insufficient funds for this withdrawal")]
    InsufficientFunds,

    /// A withdrawal would leave less than the minimum balance on the account.
    #[error("account must maintain a minimum balance of ${min_balance:.2}")]
    BelowMinimumBalance { min_balance: Decimal },

    /// A limit setting is not usable. Daily limits and the per-deposit cap must be positive, the
    /// minimum balance must not be negative.
    #[error("invalid {setting} setting: {value}")]
    InvalidPolicy {
        setting: &'static str,
        value: Decimal,
    },

    /// A persisted snapshot could not be parsed.
    #[error("error loading saved data: {0}")]
    CorruptState(#[source] serde_json::Error),

    /// An imported document lacks the minimal `balance` / `transactions` shape.
    #[error("error importing data: {0}")]
    InvalidImportFormat(String),

    #[error("invalid contact message: {0}")]
    InvalidContactMessage(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn daily_limit_message_names_the_limit() {
        let err = LedgerError::ExceedsDailyLimit { kind: TransactionKind::Withdraw, remaining: dec!(250) };
        assert_eq!(
            err.to_string(),
            "daily withdrawal limit exceeded, you can withdraw up to $250.00 more today"
        );

        let err = LedgerError::ExceedsDailyLimit { kind: TransactionKind::Deposit, remaining: dec!(0.5) };
        assert_eq!(
            err.to_string(),
            "daily deposit limit exceeded, you can deposit up to $0.50 more today"
        );
    }
}
