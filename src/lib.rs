// #![deny(clippy::missing_errors_doc)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::missing_assert_message)]

pub mod contact;
pub mod engine;
pub mod error;
pub mod exporters;
pub mod ledger;
pub mod money;
pub mod policy;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod storage;
pub mod transaction;

pub use error::{LedgerError, LedgerResult};
pub use ledger::Ledger;
pub use policy::Policy;
pub use transaction::{Transaction, TransactionID, TransactionKind};
