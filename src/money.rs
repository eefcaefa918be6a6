//! Currency arithmetic helpers.
//!
//! Every currency value the ledger stores or compares is rounded to cents immediately after it is
//! produced, so that drift never accumulates across long transaction logs.

use crate::error::LedgerError::InvalidAmount;
use crate::error::LedgerResult;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Number of fractional digits kept for currency values.
pub const CENT_DIGITS: u32 = 2;

/// Rounds `value` to cents, half away from zero.
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CENT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

/// Parses user input into a raw amount the same way a text box would be read.
///
/// Input that isn't a number yields `NaN`, which [`normalize_amount`] then rejects.
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Validates a raw amount and rounds it to cents.
///
/// A valid amount is finite and strictly positive, both before and after rounding.
pub fn normalize_amount(amount: f64) -> LedgerResult<Decimal> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(InvalidAmount);
    }
    let amount = Decimal::from_f64(amount).map(round_cents).ok_or(InvalidAmount)?;
    if amount <= Decimal::ZERO {
        return Err(InvalidAmount);
    }
    Ok(amount)
}
