use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt::{Display, Formatter};

/// A transaction ID derived from its creation instant, in milliseconds since the Unix epoch.
///
/// IDs only order and label transactions; they carry no meaning beyond that.
#[derive(serde::Serialize, serde::Deserialize, Debug, Eq, PartialEq, Ord, PartialOrd, Clone, Copy, Hash)]
#[serde(transparent)]
pub struct TransactionID(pub i64);

impl Display for TransactionID {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Eq, PartialEq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Funds added to the account, increasing its balance.
    Deposit,

    /// Funds removed from the account, reducing its balance.
    Withdraw,
}

impl TransactionKind {
    /// The description used when the caller doesn't provide one.
    pub fn default_description(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdraw => "Withdrawal",
        }
    }

    pub fn noun(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdrawal",
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
        };
        write!(f, "{}", kind)
    }
}

/// A single deposit or withdrawal on the ledger.
///
/// Transactions are immutable once recorded. `balance_after` is the balance immediately following
/// this transaction, snapshotted when it was created and never recomputed.
#[derive(serde::Serialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: TransactionID,

    #[serde(rename = "type")]
    kind: TransactionKind,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    amount: Decimal,

    description: String,

    date: DateTime<Utc>,

    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    balance_after: Decimal,
}

impl Transaction {
    pub fn new(
        id: TransactionID,
        kind: TransactionKind,
        amount: Decimal,
        description: impl Into<String>,
        date: DateTime<Utc>,
        balance_after: Decimal,
    ) -> Self {
        Self { id, kind, amount, description: description.into(), date, balance_after }
    }

    pub fn id(&self) -> TransactionID {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    pub fn is_deposit(&self) -> bool {
        self.kind == TransactionKind::Deposit
    }

    pub fn is_withdrawal(&self) -> bool {
        self.kind == TransactionKind::Withdraw
    }

    /// The signed effect this transaction had on the balance.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdraw => -self.amount,
        }
    }
}
