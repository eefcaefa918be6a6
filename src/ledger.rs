use crate::contact::ContactMessage;
use crate::error::LedgerResult;
use crate::money::round_cents;
use crate::policy::Policy;
use crate::transaction::{Transaction, TransactionID, TransactionKind};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Balance of a freshly seeded ledger.
pub const SEED_BALANCE: Decimal = dec!(1250.75);

/// Number of transactions in a freshly seeded ledger.
pub const SEED_TRANSACTIONS: usize = 3;

/// The single account of the ledger: its balance, its transaction log and the policy governing
/// it.
///
/// The balance always equals the `balance_after` of the newest transaction, or the baseline
/// balance when the log is empty. The log is ordered newest first by insertion.
///
/// The ledger is mutated only through the engine operations ([`deposit`](Self::deposit),
/// [`withdraw`](Self::withdraw)) and the bulk operations defined here.
#[derive(Debug, PartialEq, Clone)]
pub struct Ledger {
    balance: Decimal,
    transactions: Vec<Transaction>,
    contact_messages: Vec<ContactMessage>,
    policy: Policy,
}

impl Ledger {
    /// Creates an empty ledger. Fails if `policy` is not valid.
    pub fn new(balance: Decimal, policy: Policy) -> LedgerResult<Self> {
        Ok(Self {
            balance: round_cents(balance),
            transactions: Vec::new(),
            contact_messages: Vec::new(),
            policy: policy.validate()?,
        })
    }

    pub(crate) fn from_parts(
        balance: Decimal,
        transactions: Vec<Transaction>,
        contact_messages: Vec<ContactMessage>,
        policy: Policy,
    ) -> Self {
        Self { balance, transactions, contact_messages, policy }
    }

    /// Creates the demo ledger used on first run and on reset.
    ///
    /// Three transactions are dated three, two and one day(s) before `now`.
    pub fn seed_demo<Tz: TimeZone>(now: DateTime<Tz>) -> Self {
        let now = now.with_timezone(&Utc);
        let days_ago = |days: i64| now - Duration::days(days);
        let seed = |days: i64, kind, amount, description: &str, balance_after| {
            let date = days_ago(days);
            Transaction::new(
                TransactionID(date.timestamp_millis()),
                kind,
                amount,
                description,
                date,
                balance_after,
            )
        };

        let transactions = vec![
            seed(1, TransactionKind::Withdraw, dec!(249.25), "Grocery Shopping", dec!(1250.75)),
            seed(2, TransactionKind::Deposit, dec!(500), "Paycheck", dec!(1500)),
            seed(3, TransactionKind::Deposit, dec!(1000), "Initial Deposit", dec!(1000)),
        ];
        let message_date = days_ago(4);
        let contact_messages = vec![ContactMessage {
            id: message_date.timestamp_millis(),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            subject: "General Inquiry".into(),
            message: "I have a question about my account.".into(),
            date: message_date,
        }];

        debug!(balance = %SEED_BALANCE, "seeded demo ledger");
        Self::from_parts(SEED_BALANCE, transactions, contact_messages, Policy::default())
    }

    /// Returns the current balance.
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Returns the transaction log, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Returns the contact messages, newest first.
    pub fn contact_messages(&self) -> &[ContactMessage] {
        &self.contact_messages
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Replaces the policy, rounding its amounts to cents. Already recorded transactions are not
    /// re-validated.
    pub fn set_policy(&mut self, policy: Policy) -> LedgerResult<()> {
        self.policy = policy.validate()?;
        Ok(())
    }

    /// Returns the most recently inserted transaction.
    pub fn latest(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    /// Returns the ID for a transaction created at `now`.
    ///
    /// IDs follow the creation time but are strictly increasing in insertion order, even if the
    /// clock stood still or went backwards.
    pub(crate) fn next_id<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TransactionID {
        let candidate = now.timestamp_millis();
        match self.transactions.iter().map(Transaction::id).max() {
            Some(TransactionID(newest)) if newest >= candidate => TransactionID(newest + 1),
            _ => TransactionID(candidate),
        }
    }

    /// Records a transaction that has already been validated and commits its balance.
    pub(crate) fn record(&mut self, transaction: Transaction) -> &Transaction {
        self.balance = transaction.balance_after();
        self.transactions.insert(0, transaction);
        &self.transactions[0]
    }

    pub(crate) fn add_contact_message(&mut self, message: ContactMessage) {
        self.contact_messages.insert(0, message);
    }

    /// Replaces everything with a freshly seeded demo ledger.
    pub fn reset_to_demo<Tz: TimeZone>(&mut self, now: DateTime<Tz>) {
        *self = Self::seed_demo(now);
    }

    /// Drops everything but the three oldest transactions, i.e. the seeded demo transactions, and
    /// resets the balance to the seed baseline.
    ///
    /// If the retained transactions were not seeded, the balance follows the newest retained
    /// `balance_after` so that it keeps matching the log.
    pub fn clear_history(&mut self) {
        let keep_from = self.transactions.len().saturating_sub(SEED_TRANSACTIONS);
        self.transactions.drain(..keep_from);
        self.balance = self
            .transactions
            .first()
            .map_or(SEED_BALANCE, Transaction::balance_after);
        debug!(balance = %self.balance, retained = self.transactions.len(), "cleared transaction history");
    }

    pub fn clear_messages(&mut self) {
        self.contact_messages.clear();
    }

    /// Lists transactions of the given kind in the given order.
    pub fn list(&self, filter: TransactionFilter, order: SortOrder) -> Vec<&Transaction> {
        let mut transactions = self
            .transactions
            .iter()
            .filter(|transaction| filter.matches(transaction))
            .collect::<Vec<_>>();
        match order {
            SortOrder::Newest => transactions.sort_by(|a, b| b.date().cmp(&a.date())),
            SortOrder::Oldest => transactions.sort_by_key(|transaction| transaction.date()),
            SortOrder::AmountHigh => transactions.sort_by(|a, b| b.amount().cmp(&a.amount())),
            SortOrder::AmountLow => transactions.sort_by_key(|transaction| transaction.amount()),
        }
        transactions
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum TransactionFilter {
    #[default]
    All,
    Deposits,
    Withdrawals,
}

impl TransactionFilter {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionFilter::All => true,
            TransactionFilter::Deposits => transaction.is_deposit(),
            TransactionFilter::Withdrawals => transaction.is_withdrawal(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    AmountHigh,
    AmountLow,
}
