//! Exports of the transaction log into formats readable outside of the ledger.
pub mod csv;
