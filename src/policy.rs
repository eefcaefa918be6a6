use crate::error::LedgerError::InvalidPolicy;
use crate::error::LedgerResult;
use crate::money::round_cents;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::warn;

/// Limits governing deposit and withdrawal behavior.
///
/// Every field falls back to its default independently when missing from a persisted snapshot.
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Cap on the sum of all deposits within one calendar day.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub daily_deposit_limit: Decimal,

    /// Cap on the sum of all withdrawals within one calendar day.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub daily_withdrawal_limit: Decimal,

    /// Balance that must remain after any withdrawal.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub min_balance: Decimal,

    /// Cap on a single deposit.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub max_deposit_per_transaction: Decimal,

    /// Inactivity timeout in seconds. Advisory for front ends; the engine never reads it.
    pub session_timeout: u64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            daily_deposit_limit: dec!(25000),
            daily_withdrawal_limit: dec!(5000),
            min_balance: dec!(10),
            max_deposit_per_transaction: dec!(10000),
            session_timeout: 1800,
        }
    }
}

impl Policy {
    /// Rounds every amount to cents and checks that the limits are usable.
    ///
    /// Daily limits and the per-deposit cap must be positive, the minimum balance must not be
    /// negative.
    pub fn validate(self) -> LedgerResult<Self> {
        Ok(Self {
            daily_deposit_limit: positive("dailyDepositLimit", self.daily_deposit_limit)?,
            daily_withdrawal_limit: positive("dailyWithdrawalLimit", self.daily_withdrawal_limit)?,
            min_balance: non_negative("minBalance", self.min_balance)?,
            max_deposit_per_transaction: positive(
                "maxDepositPerTransaction",
                self.max_deposit_per_transaction,
            )?,
            session_timeout: self.session_timeout,
        })
    }
}

type Check = fn(&'static str, Decimal) -> LedgerResult<Decimal>;

fn positive(setting: &'static str, value: Decimal) -> LedgerResult<Decimal> {
    let value = round_cents(value);
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(InvalidPolicy { setting, value })
    }
}

fn non_negative(setting: &'static str, value: Decimal) -> LedgerResult<Decimal> {
    let value = round_cents(value);
    if value >= Decimal::ZERO {
        Ok(value)
    } else {
        Err(InvalidPolicy { setting, value })
    }
}

/// A partial policy as found in snapshots and imports. Present fields override a base policy.
#[derive(serde::Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PolicyOverrides {
    daily_deposit_limit: Option<Decimal>,
    daily_withdrawal_limit: Option<Decimal>,
    min_balance: Option<Decimal>,
    max_deposit_per_transaction: Option<Decimal>,
    session_timeout: Option<u64>,
}

impl PolicyOverrides {
    /// Overrides `base` with the present fields. Fails if the result is not a valid policy.
    pub(crate) fn apply_to(self, base: &Policy) -> LedgerResult<Policy> {
        Policy {
            daily_deposit_limit: self.daily_deposit_limit.unwrap_or(base.daily_deposit_limit),
            daily_withdrawal_limit: self.daily_withdrawal_limit.unwrap_or(base.daily_withdrawal_limit),
            min_balance: self.min_balance.unwrap_or(base.min_balance),
            max_deposit_per_transaction: self
                .max_deposit_per_transaction
                .unwrap_or(base.max_deposit_per_transaction),
            session_timeout: self.session_timeout.unwrap_or(base.session_timeout),
        }
        .validate()
    }

    /// Overrides `base` with the present fields, skipping any that are invalid.
    ///
    /// `base` is expected to be valid already.
    pub(crate) fn apply_leniently(self, base: &Policy) -> Policy {
        fn pick(setting: &'static str, value: Option<Decimal>, check: Check, fallback: Decimal) -> Decimal {
            match value.map(|value| check(setting, value)) {
                Some(Ok(value)) => value,
                Some(Err(err)) => {
                    warn!(error = %err, "ignoring saved setting");
                    fallback
                }
                None => fallback,
            }
        }

        Policy {
            daily_deposit_limit: pick(
                "dailyDepositLimit",
                self.daily_deposit_limit,
                positive,
                base.daily_deposit_limit,
            ),
            daily_withdrawal_limit: pick(
                "dailyWithdrawalLimit",
                self.daily_withdrawal_limit,
                positive,
                base.daily_withdrawal_limit,
            ),
            min_balance: pick("minBalance", self.min_balance, non_negative, base.min_balance),
            max_deposit_per_transaction: pick(
                "maxDepositPerTransaction",
                self.max_deposit_per_transaction,
                positive,
                base.max_deposit_per_transaction,
            ),
            session_timeout: self.session_timeout.unwrap_or(base.session_timeout),
        }
    }
}
