use crate::contact::{ContactForm, ContactMessage};
use crate::error::LedgerResult;
use crate::exporters::csv::{CsvExportResult, CsvWriter};
use crate::ledger::{Ledger, SortOrder, TransactionFilter};
use crate::policy::Policy;
use crate::snapshot;
use crate::stats::{DailyUsage, MonthlyStats, Summary};
use crate::storage::Storage;
use crate::transaction::Transaction;
use chrono::{Local, Utc};
use rust_decimal::Decimal;
use std::io;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Failure to persist the ledger.
#[derive(Error, Debug)]
pub enum SessionError<E>
where
    E: std::error::Error + 'static,
{
    #[error("error accessing storage: {0}")]
    Storage(#[source] E),

    #[error("error serializing data: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// The operations a front end calls on the ledger.
///
/// A session owns the ledger and its storage. Every successful mutation is persisted right away;
/// a failed save is logged and does not undo the mutation.
pub struct Session<S>
where
    S: Storage,
{
    ledger: Ledger,
    storage: S,
}

impl<S> Session<S>
where
    S: Storage,
{
    /// Opens a session on whatever `storage` holds.
    ///
    /// Unreadable or corrupt state is replaced by demo data, which is saved immediately.
    pub fn open(storage: S) -> Self {
        let raw = storage.read().unwrap_or_else(|err| {
            error!(error = %err, "error reading saved data");
            None
        });
        let restored = raw.as_deref().and_then(|raw| {
            snapshot::try_load(raw)
                .inspect_err(|err| warn!(error = %err, "error loading saved data, resetting to defaults"))
                .ok()
        });

        match restored {
            Some(ledger) => Self { ledger, storage },
            None => {
                let mut session = Self { ledger: Ledger::seed_demo(Local::now()), storage };
                session.persist();
                session
            }
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn balance(&self) -> Decimal {
        self.ledger.balance()
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.ledger.transactions()
    }

    pub fn list(&self, filter: TransactionFilter, order: SortOrder) -> Vec<&Transaction> {
        self.ledger.list(filter, order)
    }

    pub fn contact_messages(&self) -> &[ContactMessage] {
        self.ledger.contact_messages()
    }

    pub fn monthly_stats(&self) -> MonthlyStats {
        self.ledger.monthly_stats()
    }

    pub fn summary(&self) -> Summary {
        self.ledger.summary()
    }

    pub fn daily_usage(&self) -> DailyUsage {
        self.ledger.daily_usage_at(&Local::now())
    }

    pub fn deposit(&mut self, amount: f64, description: Option<&str>) -> LedgerResult<Transaction> {
        let transaction = self.ledger.deposit(amount, description)?.clone();
        self.persist();
        Ok(transaction)
    }

    pub fn withdraw(&mut self, amount: f64, description: Option<&str>) -> LedgerResult<Transaction> {
        let transaction = self.ledger.withdraw(amount, description)?.clone();
        self.persist();
        Ok(transaction)
    }

    /// Wipes the stored data and starts over with demo data.
    pub fn reset_to_demo(&mut self) {
        if let Err(err) = self.storage.remove() {
            error!(error = %err, "error removing saved data");
        }
        self.ledger.reset_to_demo(Local::now());
        self.persist();
    }

    pub fn clear_history(&mut self) {
        self.ledger.clear_history();
        self.persist();
    }

    pub fn clear_messages(&mut self) {
        self.ledger.clear_messages();
        self.persist();
    }

    pub fn set_policy(&mut self, policy: Policy) -> LedgerResult<()> {
        self.ledger.set_policy(policy).inspect_err(|err| {
            warn!(error = %err, "rejected settings");
        })?;
        self.persist();
        Ok(())
    }

    pub fn submit_message(&mut self, form: ContactForm) -> LedgerResult<ContactMessage> {
        let message = form.submit(Utc::now())?;
        self.ledger.add_contact_message(message.clone());
        self.persist();
        Ok(message)
    }

    /// Replaces the ledger with an imported snapshot.
    pub fn import(&mut self, raw: &str) -> LedgerResult<()> {
        snapshot::replace(&mut self.ledger, raw).inspect_err(|err| {
            warn!(error = %err, "rejected import");
        })?;
        self.persist();
        Ok(())
    }

    /// Writes the transaction log as CSV, in display order.
    pub fn export_csv<W: io::Write>(&self, output: W) -> CsvExportResult<()> {
        CsvWriter::new(output).serialize(self.ledger.transactions().iter())
    }

    /// Serializes the ledger and writes it to storage.
    pub fn save(&mut self) -> Result<(), SessionError<S::Error>> {
        let raw = snapshot::serialize(&self.ledger)?;
        self.storage.write(&raw).map_err(SessionError::Storage)?;
        debug!("saved data");
        Ok(())
    }

    fn persist(&mut self) {
        if let Err(err) = self.save() {
            error!(error = %err, "error saving data");
        }
    }
}
