//! Statistics derived from the transaction log.
//!
//! Nothing in here is stored on the ledger. Every figure is recomputed from the log on request,
//! so it can never drift from it.
use crate::ledger::Ledger;
use crate::money::round_cents;
use crate::transaction::{Transaction, TransactionKind};
use chrono::{DateTime, Datelike, Local, TimeZone};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Aggregates over the transactions of one calendar month.
#[derive(serde::Serialize, Debug, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_deposits: Decimal,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_withdrawals: Decimal,

    /// Deposits minus withdrawals.
    #[serde(rename = "totalAmount", serialize_with = "rust_decimal::serde::float::serialize")]
    pub net: Decimal,

    /// Mean amount over all transactions of the month, 0 if there are none.
    #[serde(rename = "averageTransaction", serialize_with = "rust_decimal::serde::float::serialize")]
    pub average_amount: Decimal,

    /// Largest single amount of the month, 0 if there are none.
    #[serde(rename = "largestTransaction", serialize_with = "rust_decimal::serde::float::serialize")]
    pub largest_amount: Decimal,

    pub deposit_count: usize,

    pub withdrawal_count: usize,
}

/// Totals over the whole transaction log.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Summary {
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub net: Decimal,
}

/// How much of today's limits has been used.
#[derive(Debug, PartialEq, Clone)]
pub struct DailyUsage {
    pub deposited: Decimal,
    pub withdrawn: Decimal,
    pub deposit_headroom: Decimal,
    pub withdrawal_headroom: Decimal,

    /// Share of the daily deposit limit used, in percent, capped at 100.
    pub deposit_usage: Decimal,

    /// Share of the daily withdrawal limit used, in percent, capped at 100.
    pub withdrawal_usage: Decimal,

    /// Largest withdrawal the minimum balance allows, ignoring the daily limit.
    pub max_withdrawal: Decimal,
}

impl MonthlyStats {
    fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: Iterator<Item=&'a Transaction>,
    {
        let mut stats = Self::default();
        let mut total = Decimal::ZERO;
        let mut count = 0usize;
        for transaction in transactions {
            match transaction.kind() {
                TransactionKind::Deposit => {
                    stats.total_deposits += transaction.amount();
                    stats.deposit_count += 1;
                }
                TransactionKind::Withdraw => {
                    stats.total_withdrawals += transaction.amount();
                    stats.withdrawal_count += 1;
                }
            }
            stats.largest_amount = stats.largest_amount.max(transaction.amount());
            total += transaction.amount();
            count += 1;
        }

        stats.total_deposits = round_cents(stats.total_deposits);
        stats.total_withdrawals = round_cents(stats.total_withdrawals);
        stats.net = round_cents(stats.total_deposits - stats.total_withdrawals);
        if count > 0 {
            stats.average_amount = round_cents(total / Decimal::from(count));
        }
        stats
    }
}

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return dec!(100);
    }
    round_cents(part / whole * dec!(100)).min(dec!(100))
}

impl Ledger {
    /// Total number of transactions in the log.
    pub fn total_transactions(&self) -> usize {
        self.transactions().len()
    }

    /// Statistics for the current month. See [`monthly_stats_at`](Self::monthly_stats_at).
    pub fn monthly_stats(&self) -> MonthlyStats {
        self.monthly_stats_at(&Local::now())
    }

    /// Statistics for the calendar month of `now`, evaluated in `now`'s time zone.
    pub fn monthly_stats_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> MonthlyStats {
        let zone = now.timezone();
        let (year, month) = (now.year(), now.month());
        MonthlyStats::from_transactions(self.transactions().iter().filter(|transaction| {
            let date = transaction.date().with_timezone(&zone);
            date.year() == year && date.month() == month
        }))
    }

    /// Totals over the whole log.
    pub fn summary(&self) -> Summary {
        let sum_of = |kind: TransactionKind| {
            round_cents(
                self.transactions()
                    .iter()
                    .filter(|transaction| transaction.kind() == kind)
                    .map(Transaction::amount)
                    .sum(),
            )
        };
        let total_deposits = sum_of(TransactionKind::Deposit);
        let total_withdrawals = sum_of(TransactionKind::Withdraw);
        Summary {
            total_deposits,
            total_withdrawals,
            net: round_cents(total_deposits - total_withdrawals),
        }
    }

    /// Usage of the daily limits on the calendar day of `now`.
    pub fn daily_usage_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DailyUsage {
        let policy = self.policy();
        let deposited = self.today_deposits(now);
        let withdrawn = self.today_withdrawals(now);
        DailyUsage {
            deposited,
            withdrawn,
            deposit_headroom: self.daily_headroom(TransactionKind::Deposit, now),
            withdrawal_headroom: self.daily_headroom(TransactionKind::Withdraw, now),
            deposit_usage: percent_of(deposited, policy.daily_deposit_limit),
            withdrawal_usage: percent_of(withdrawn, policy.daily_withdrawal_limit),
            max_withdrawal: round_cents(self.balance() - policy.min_balance).max(Decimal::ZERO),
        }
    }
}
