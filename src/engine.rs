//! Validation and application of balance-changing operations.
//!
//! Every check runs before the ledger is touched, so a rejected operation leaves it exactly as it
//! was. When several checks fail at once, the first one in this order wins:
//!
//! * deposits: invalid amount, per-transaction cap, daily limit
//! * withdrawals: invalid amount, insufficient funds, daily limit, minimum balance
use crate::error::LedgerError::{
    BelowMinimumBalance, ExceedsDailyLimit, ExceedsPerTransactionCap, InsufficientFunds,
};
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::money::{normalize_amount, round_cents};
use crate::transaction::{Transaction, TransactionKind};
use chrono::{DateTime, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

impl Ledger {
    /// Deposits `amount` now. See [`deposit_at`](Self::deposit_at).
    pub fn deposit(&mut self, amount: f64, description: Option<&str>) -> LedgerResult<&Transaction> {
        self.deposit_at(amount, description, Local::now())
    }

    /// Withdraws `amount` now. See [`withdraw_at`](Self::withdraw_at).
    pub fn withdraw(&mut self, amount: f64, description: Option<&str>) -> LedgerResult<&Transaction> {
        self.withdraw_at(amount, description, Local::now())
    }

    /// Deposits `amount` as of `now` and returns the recorded transaction.
    ///
    /// The amount is rounded to cents before it is checked against the per-transaction cap and
    /// the daily deposit limit of `now`'s calendar day.
    pub fn deposit_at<Tz: TimeZone>(
        &mut self,
        amount: f64,
        description: Option<&str>,
        now: DateTime<Tz>,
    ) -> LedgerResult<&Transaction> {
        let amount = normalize_amount(amount).inspect_err(|err| {
            warn!(amount, error = ?err, "rejected deposit");
        })?;
        self.check_deposit(amount, &now).inspect_err(|err| {
            warn!(amount = %amount, error = ?err, "rejected deposit");
        })?;

        let balance_after = round_cents(self.balance() + amount);
        Ok(self.commit(TransactionKind::Deposit, amount, description, now, balance_after))
    }

    /// Withdraws `amount` as of `now` and returns the recorded transaction.
    ///
    /// The amount is rounded to cents before it is checked against the balance, the daily
    /// withdrawal limit of `now`'s calendar day and the minimum balance.
    pub fn withdraw_at<Tz: TimeZone>(
        &mut self,
        amount: f64,
        description: Option<&str>,
        now: DateTime<Tz>,
    ) -> LedgerResult<&Transaction> {
        let amount = normalize_amount(amount).inspect_err(|err| {
            warn!(amount, error = ?err, "rejected withdrawal");
        })?;
        self.check_withdrawal(amount, &now).inspect_err(|err| {
            warn!(amount = %amount, error = ?err, "rejected withdrawal");
        })?;

        let balance_after = round_cents(self.balance() - amount);
        Ok(self.commit(TransactionKind::Withdraw, amount, description, now, balance_after))
    }

    /// Sum of today's deposits, "today" being the calendar day of `now` in its own time zone.
    pub fn today_deposits<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Decimal {
        self.sum_on_day(TransactionKind::Deposit, now)
    }

    /// Sum of today's withdrawals, "today" being the calendar day of `now` in its own time zone.
    pub fn today_withdrawals<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Decimal {
        self.sum_on_day(TransactionKind::Withdraw, now)
    }

    /// Remaining amount that can still be deposited or withdrawn today.
    pub fn daily_headroom<Tz: TimeZone>(&self, kind: TransactionKind, now: &DateTime<Tz>) -> Decimal {
        let limit = match kind {
            TransactionKind::Deposit => self.policy().daily_deposit_limit,
            TransactionKind::Withdraw => self.policy().daily_withdrawal_limit,
        };
        round_cents(limit - self.sum_on_day(kind, now))
    }

    fn check_deposit<Tz: TimeZone>(&self, amount: Decimal, now: &DateTime<Tz>) -> LedgerResult<()> {
        let policy = self.policy();
        if amount > policy.max_deposit_per_transaction {
            return Err(ExceedsPerTransactionCap { cap: policy.max_deposit_per_transaction });
        }
        if round_cents(self.today_deposits(now) + amount) > policy.daily_deposit_limit {
            return Err(ExceedsDailyLimit {
                kind: TransactionKind::Deposit,
                remaining: self.daily_headroom(TransactionKind::Deposit, now),
            });
        }
        Ok(())
    }

    fn check_withdrawal<Tz: TimeZone>(&self, amount: Decimal, now: &DateTime<Tz>) -> LedgerResult<()> {
        let policy = self.policy();
        if amount > self.balance() {
            return Err(InsufficientFunds);
        }
        if round_cents(self.today_withdrawals(now) + amount) > policy.daily_withdrawal_limit {
            return Err(ExceedsDailyLimit {
                kind: TransactionKind::Withdraw,
                remaining: self.daily_headroom(TransactionKind::Withdraw, now),
            });
        }
        if round_cents(self.balance() - amount) < policy.min_balance {
            return Err(BelowMinimumBalance { min_balance: policy.min_balance });
        }
        Ok(())
    }

    fn commit<Tz: TimeZone>(
        &mut self,
        kind: TransactionKind,
        amount: Decimal,
        description: Option<&str>,
        now: DateTime<Tz>,
        balance_after: Decimal,
    ) -> &Transaction {
        let id = self.next_id(&now);
        let description = description
            .map(str::trim)
            .filter(|description| !description.is_empty())
            .unwrap_or(kind.default_description());
        let transaction = Transaction::new(
            id,
            kind,
            amount,
            description,
            now.with_timezone(&Utc),
            balance_after,
        );
        debug!(
            transaction.id = %id,
            kind = %kind,
            amount = %amount,
            balance = %balance_after,
            "recorded transaction",
        );
        self.record(transaction)
    }

    fn sum_on_day<Tz: TimeZone>(&self, kind: TransactionKind, now: &DateTime<Tz>) -> Decimal {
        let today = now.date_naive();
        let zone = now.timezone();
        let total = self
            .transactions()
            .iter()
            .filter(|transaction| transaction.kind() == kind)
            .filter(|transaction| transaction.date().with_timezone(&zone).date_naive() == today)
            .map(Transaction::amount)
            .sum::<Decimal>();
        round_cents(total)
    }
}

#[cfg(test)]
mod test_deposits {
    use crate::error::LedgerError;
    use crate::ledger::test_utils::transaction;
    use crate::ledger::Ledger;
    use crate::policy::Policy;
    use crate::transaction::TransactionKind;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap()
    }

    #[test]
    fn deposit_affects_balance() {
        let mut ledger = Ledger::default();

        let result = ledger.deposit_at(500.0, Some("Paycheck"), now());
        let transaction = result.expect("Expected deposit to succeed").clone();
        assert_eq!(transaction.amount(), dec!(500));
        assert_eq!(transaction.balance_after(), dec!(500));
        assert_eq!(transaction.description(), "Paycheck");
        assert_eq!(transaction.kind(), TransactionKind::Deposit);
        assert_eq!(transaction.date(), now());
        assert_eq!(ledger.balance(), dec!(500));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn deposit_without_description_uses_default() {
        let mut ledger = Ledger::default();
        for description in [None, Some(""), Some("   ")] {
            let result = ledger.deposit_at(1.0, description, now());
            let transaction = result.expect("Expected deposit to succeed");
            assert_eq!(transaction.description(), "Deposit");
        }
    }

    #[test]
    fn deposits_accumulate_without_drift() {
        let mut ledger = Ledger::default();
        for _ in 0..10 {
            ledger.deposit_at(0.1, None, now()).expect("Expected deposit to succeed");
        }
        assert_eq!(ledger.balance(), dec!(1.00));

        let net: rust_decimal::Decimal = ledger.transactions().iter().map(|t| t.signed_amount()).sum();
        assert_eq!(ledger.balance(), net, "Expected balance to equal the sum of the log");
    }

    #[test]
    fn mixed_sequence_keeps_log_and_balance_in_step() {
        let mut ledger = Ledger::default();
        let deposits = [0.01, 19.99, 333.335, 1000.0, 0.1, 2.675];
        for amount in deposits {
            ledger.deposit_at(amount, None, now()).expect("Expected deposit to succeed");
        }
        ledger.withdraw_at(12.34, None, now()).expect("Expected withdrawal to succeed");
        ledger.withdraw_at(100.0, None, now()).expect("Expected withdrawal to succeed");

        let mut running = rust_decimal::Decimal::ZERO;
        for transaction in ledger.transactions().iter().rev() {
            assert!(transaction.amount().scale() <= 2, "Expected whole cents: {}", transaction.amount());
            running += transaction.signed_amount();
            assert_eq!(transaction.balance_after(), running, "Expected running balance to match the log");
        }
        assert_eq!(ledger.balance(), running, "Expected balance to equal the sum of the log");
        assert_eq!(ledger.transactions().len(), deposits.len() + 2);
    }

    #[test]
    fn deposit_with_invalid_value_fails() {
        let mut ledger = Ledger::default();

        let invalid_values = [0.0, -1.0, 0.004, f64::NAN, f64::INFINITY];
        for invalid_value in invalid_values {
            let result = ledger.deposit_at(invalid_value, None, now());
            assert!(
                matches!(result, Err(LedgerError::InvalidAmount)),
                "Expected deposit with invalid value to fail: {:?}: {:?}", invalid_value, result
            );
        }
        assert_eq!(ledger, Ledger::default(), "Expected rejected deposits to leave ledger untouched");
    }

    #[test]
    fn deposit_is_capped_per_transaction_after_rounding() {
        let mut ledger = Ledger::default();

        let result = ledger.deposit_at(10000.004, None, now());
        let transaction = result.expect("Expected deposit rounding to the cap to succeed");
        assert_eq!(transaction.amount(), dec!(10000.00));

        let result = ledger.deposit_at(10000.01, None, now());
        assert!(
            matches!(result, Err(LedgerError::ExceedsPerTransactionCap { cap }) if cap == dec!(10000)),
            "Expected deposit above the cap to fail: {:?}", result
        );
        assert_eq!(ledger.balance(), dec!(10000));
    }

    #[test]
    fn deposit_over_daily_limit_reports_headroom() {
        let mut ledger = Ledger::default();
        ledger.deposit_at(10000.0, None, now()).expect("Test setup: deposit failed");
        ledger.deposit_at(10000.0, None, now()).expect("Test setup: deposit failed");

        let result = ledger.deposit_at(5000.01, None, now());
        assert!(
            matches!(
                result,
                Err(LedgerError::ExceedsDailyLimit { kind: TransactionKind::Deposit, remaining })
                    if remaining == dec!(5000)
            ),
            "Expected deposit over the daily limit to fail: {:?}", result
        );

        let result = ledger.deposit_at(5000.0, None, now());
        assert!(result.is_ok(), "Expected deposit up to the daily limit to succeed: {:?}", result);
        assert_eq!(ledger.today_deposits(&now()), dec!(25000));
    }

    #[test]
    fn per_transaction_cap_precedes_daily_limit() {
        let policy = Policy { daily_deposit_limit: dec!(100), ..Policy::default() };
        let mut ledger = Ledger::new(dec!(0), policy).expect("Test setup: invalid policy");

        let result = ledger.deposit_at(20000.0, None, now());
        assert!(
            matches!(result, Err(LedgerError::ExceedsPerTransactionCap { .. })),
            "Expected per-transaction cap to be reported first: {:?}", result
        );
    }

    #[test]
    fn daily_limit_resets_at_midnight() {
        let policy = Policy {
            daily_deposit_limit: dec!(10000),
            ..Policy::default()
        };
        let mut ledger = Ledger::new(dec!(0), policy).expect("Test setup: invalid policy");
        let late = Utc.with_ymd_and_hms(2024, 6, 10, 23, 59, 0).unwrap();
        let next_morning = Utc.with_ymd_and_hms(2024, 6, 11, 0, 1, 0).unwrap();

        let result = ledger.deposit_at(10000.0, None, late);
        assert!(result.is_ok(), "Expected first deposit of the day to succeed: {:?}", result);

        let result = ledger.deposit_at(10000.0, None, late);
        assert!(
            matches!(result, Err(LedgerError::ExceedsDailyLimit { .. })),
            "Expected repeat deposit on the same day to fail: {:?}", result
        );

        let result = ledger.deposit_at(10000.0, None, next_morning);
        assert!(result.is_ok(), "Expected deposit on the next day to succeed: {:?}", result);
        assert_eq!(ledger.balance(), dec!(20000));
    }

    #[test]
    fn today_is_a_calendar_day_in_local_time() {
        let mut ledger = Ledger::default();
        // 22:00 UTC on June 9th is already June 10th at UTC+3.
        let yesterday_utc = Utc.with_ymd_and_hms(2024, 6, 9, 22, 0, 0).unwrap();
        ledger.record(transaction(1, TransactionKind::Deposit, dec!(70), yesterday_utc, dec!(70)));
        // Within the last 24 hours, but on the previous calendar day.
        let earlier = now() - Duration::hours(20);
        ledger.record(transaction(2, TransactionKind::Deposit, dec!(30), earlier, dec!(100)));

        let zone = chrono::FixedOffset::east_opt(3 * 3600).unwrap();
        assert_eq!(ledger.today_deposits(&now()), dec!(0));
        assert_eq!(ledger.today_deposits(&now().with_timezone(&zone)), dec!(70));
        assert_eq!(ledger.today_withdrawals(&now()), dec!(0));
    }
}

#[cfg(test)]
mod test_withdrawals {
    use crate::error::LedgerError;
    use crate::ledger::Ledger;
    use crate::policy::Policy;
    use crate::transaction::TransactionKind;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap()
    }

    #[test_log::test]
    fn withdrawal_affects_balance() {
        let mut ledger = Ledger::with_balance(dec!(1000));

        let result = ledger.withdraw_at(249.25, Some("Grocery Shopping"), now());
        let transaction = result.expect("Expected withdrawal to succeed").clone();
        assert_eq!(transaction.kind(), TransactionKind::Withdraw);
        assert_eq!(transaction.balance_after(), dec!(750.75));
        assert_eq!(ledger.balance(), dec!(750.75));
        assert_eq!(ledger.latest(), Some(&transaction));
    }

    #[test]
    fn withdrawal_without_description_uses_default() {
        let mut ledger = Ledger::with_balance(dec!(100));
        let result = ledger.withdraw_at(1.0, None, now());
        let transaction = result.expect("Expected withdrawal to succeed");
        assert_eq!(transaction.description(), "Withdrawal");
    }

    #[test]
    fn withdraw_with_invalid_value_fails() {
        let mut ledger = Ledger::with_balance(dec!(100));

        let invalid_values = [0.0, -5.0, f64::NAN, f64::NEG_INFINITY];
        for invalid_value in invalid_values {
            let result = ledger.withdraw_at(invalid_value, None, now());
            assert!(
                matches!(result, Err(LedgerError::InvalidAmount)),
                "Expected withdrawal with invalid value to fail: {:?}: {:?}", invalid_value, result
            );
        }
        assert_eq!(ledger.balance(), dec!(100));
    }

    #[test_log::test]
    fn withdraw_with_insufficient_funds_fails() {
        let mut ledger = Ledger::default();
        ledger.deposit_at(500.0, Some("Paycheck"), now()).expect("Test setup: deposit failed");

        let result = ledger.withdraw_at(600.0, None, now());
        assert!(
            matches!(result, Err(LedgerError::InsufficientFunds)),
            "Expected withdrawal exceeding the balance to fail: {:?}", result
        );
        assert_eq!(ledger.balance(), dec!(500));
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn minimum_balance_boundary() {
        let mut ledger = Ledger::with_balance(dec!(1000));

        let result = ledger.withdraw_at(990.01, None, now());
        assert!(
            matches!(result, Err(LedgerError::BelowMinimumBalance { min_balance }) if min_balance == dec!(10)),
            "Expected withdrawal below the minimum balance to fail: {:?}", result
        );

        let result = ledger.withdraw_at(990.0, None, now());
        assert!(result.is_ok(), "Expected withdrawal leaving exactly the minimum to succeed: {:?}", result);
        assert_eq!(ledger.balance(), dec!(10));
    }

    #[test]
    fn minimum_balance_holds_after_every_withdrawal() {
        let mut ledger = Ledger::with_balance(dec!(1000));
        for amount in [300.0, 300.0, 300.0, 300.0, 89.99, 0.01, 0.01] {
            let before = ledger.balance();
            match ledger.withdraw_at(amount, None, now()) {
                Ok(_) => assert!(
                    ledger.balance() >= ledger.policy().min_balance,
                    "Expected balance to stay above the minimum: {}", ledger.balance()
                ),
                Err(_) => assert_eq!(ledger.balance(), before),
            }
        }
        assert_eq!(ledger.balance(), dec!(10));
    }

    #[test]
    fn withdrawal_over_daily_limit_reports_headroom() {
        let mut ledger = Ledger::with_balance(dec!(20000));
        ledger.withdraw_at(4000.0, None, now()).expect("Test setup: withdrawal failed");

        let result = ledger.withdraw_at(1500.0, None, now());
        assert!(
            matches!(
                result,
                Err(LedgerError::ExceedsDailyLimit { kind: TransactionKind::Withdraw, remaining })
                    if remaining == dec!(1000)
            ),
            "Expected withdrawal over the daily limit to fail: {:?}", result
        );
        assert_eq!(ledger.daily_headroom(TransactionKind::Withdraw, &now()), dec!(1000));
    }

    #[test]
    fn rejections_follow_precedence() {
        // Over the balance, the daily limit and the minimum balance at once.
        let mut ledger = Ledger::with_balance(dec!(6000));
        let result = ledger.withdraw_at(7000.0, None, now());
        assert!(
            matches!(result, Err(LedgerError::InsufficientFunds)),
            "Expected insufficient funds to win: {:?}", result
        );

        // Over the daily limit and the minimum balance.
        let policy = Policy { daily_withdrawal_limit: dec!(100), ..Policy::default() };
        let mut ledger = Ledger::new(dec!(150), policy).expect("Test setup: invalid policy");
        let result = ledger.withdraw_at(145.0, None, now());
        assert!(
            matches!(result, Err(LedgerError::ExceedsDailyLimit { .. })),
            "Expected daily limit to win over minimum balance: {:?}", result
        );
    }
}
