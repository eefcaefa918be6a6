//! The persisted JSON representation of a [`Ledger`].
//!
//! A snapshot looks like this:
//!
//! ```json
//! {
//!   "balance": 1250.75,
//!   "transactions": [
//!     {"id": 1718000000000, "type": "withdraw", "amount": 249.25, "description": "Grocery Shopping",
//!      "date": "2024-06-10T06:13:20Z", "balanceAfter": 1250.75}
//!   ],
//!   "contactMessages": [],
//!   "settings": {"dailyDepositLimit": 25000.0, "minBalance": 10.0},
//!   "stats": {"totalTransactions": 1, "monthlyStats": {}}
//! }
//! ```
//!
//! Loading is lenient: every top-level field falls back to its default on its own, whether it is
//! missing or `null`. Invalid settings are skipped one by one. The `stats` block is never trusted
//! but recomputed from the transactions.
use crate::contact::ContactMessage;
use crate::error::LedgerError::{CorruptState, InvalidImportFormat};
use crate::error::LedgerResult;
use crate::ledger::Ledger;
use crate::money::round_cents;
use crate::policy::{Policy, PolicyOverrides};
use crate::stats::MonthlyStats;
use crate::transaction::{Transaction, TransactionID, TransactionKind};
use chrono::{DateTime, Local, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

#[derive(serde::Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct Snapshot {
    #[serde(deserialize_with = "null_as_default")]
    balance: Decimal,

    #[serde(deserialize_with = "null_as_default")]
    transactions: Vec<TransactionRecord>,

    #[serde(deserialize_with = "null_as_default")]
    contact_messages: Vec<ContactMessage>,

    #[serde(deserialize_with = "null_as_default")]
    settings: PolicyOverrides,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TransactionRecord {
    id: Option<i64>,

    #[serde(rename = "type")]
    kind: TransactionKind,

    amount: Decimal,

    description: Option<String>,

    date: DateTime<Utc>,

    #[serde(alias = "balance")]
    balance_after: Decimal,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        let id = record.id.unwrap_or_else(|| record.date.timestamp_millis());
        let description = record
            .description
            .unwrap_or_else(|| record.kind.default_description().into());
        Transaction::new(
            TransactionID(id),
            record.kind,
            round_cents(record.amount),
            description,
            record.date,
            round_cents(record.balance_after),
        )
    }
}

impl Snapshot {
    fn into_ledger(self, policy: Policy) -> Ledger {
        Ledger::from_parts(
            round_cents(self.balance),
            self.transactions.into_iter().map(Transaction::from).collect(),
            self.contact_messages,
            policy,
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    balance: Decimal,
    transactions: &'a [Transaction],
    contact_messages: &'a [ContactMessage],
    settings: &'a Policy,
    stats: StatsCache,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsCache {
    total_transactions: usize,
    monthly_stats: MonthlyStats,
}

/// Parses a persisted snapshot.
///
/// Missing or `null` fields fall back to their defaults individually, as do invalid settings.
/// Anything that isn't understood results in [`CorruptState`].
pub fn try_load(raw: &str) -> LedgerResult<Ledger> {
    let mut snapshot = serde_json::from_str::<Snapshot>(raw).map_err(CorruptState)?;
    let policy = std::mem::take(&mut snapshot.settings).apply_leniently(&Policy::default());
    Ok(snapshot.into_ledger(policy))
}

/// Loads a ledger from persisted state. See [`load_at`].
pub fn load(raw: Option<&str>) -> Ledger {
    load_at(raw, Local::now())
}

/// Loads a ledger from persisted state, falling back to the demo ledger seeded at `now`.
///
/// Never fails: without prior state, or if the state is corrupt, the demo ledger is returned.
pub fn load_at<Tz: TimeZone>(raw: Option<&str>, now: DateTime<Tz>) -> Ledger {
    let Some(raw) = raw else {
        debug!("no saved data, creating initial demo data");
        return Ledger::seed_demo(now);
    };
    match try_load(raw) {
        Ok(ledger) => {
            debug!(transactions = ledger.total_transactions(), "loaded saved data");
            ledger
        }
        Err(err) => {
            warn!(error = %err, "error loading saved data, resetting to defaults");
            Ledger::seed_demo(now)
        }
    }
}

/// Serializes `ledger` into a snapshot, together with freshly computed statistics.
pub fn serialize(ledger: &Ledger) -> serde_json::Result<String> {
    serialize_at(ledger, &Local::now())
}

/// Serializes `ledger`, computing the statistics cache for the month of `now`.
pub fn serialize_at<Tz: TimeZone>(ledger: &Ledger, now: &DateTime<Tz>) -> serde_json::Result<String> {
    let snapshot = SnapshotRef {
        balance: ledger.balance(),
        transactions: ledger.transactions(),
        contact_messages: ledger.contact_messages(),
        settings: ledger.policy(),
        stats: StatsCache {
            total_transactions: ledger.total_transactions(),
            monthly_stats: ledger.monthly_stats_at(now),
        },
    };
    serde_json::to_string_pretty(&snapshot)
}

/// Replaces `ledger` wholesale with an imported snapshot.
///
/// The document needs at least a numeric `balance` and a `transactions` array. Settings present
/// in the document override the current policy; absent ones keep their current value, and invalid
/// ones reject the import. On error the ledger is left untouched.
pub fn replace(ledger: &mut Ledger, raw: &str) -> LedgerResult<()> {
    let document = serde_json::from_str::<serde_json::Value>(raw)
        .map_err(|err| InvalidImportFormat(err.to_string()))?;

    let has_balance = document.get("balance").is_some_and(serde_json::Value::is_number);
    let has_transactions = document.get("transactions").is_some_and(serde_json::Value::is_array);
    if !has_balance || !has_transactions {
        return Err(InvalidImportFormat("expected a numeric balance and a list of transactions".into()));
    }

    let mut snapshot = serde_json::from_value::<Snapshot>(document)
        .map_err(|err| InvalidImportFormat(err.to_string()))?;
    let policy = std::mem::take(&mut snapshot.settings).apply_to(ledger.policy())?;
    let imported = snapshot.into_ledger(policy);
    debug!(
        balance = %imported.balance(),
        transactions = imported.total_transactions(),
        "imported data",
    );
    *ledger = imported;
    Ok(())
}
