//! Ledger module containing reference data, account management and
//! transaction processing

pub mod account;
pub mod book;
pub mod reference;
pub mod transaction;

pub use account::*;
pub use book::*;
pub use reference::*;
pub use transaction::*;
