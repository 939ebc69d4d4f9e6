//! # Money Core
//!
//! Personal finance bookkeeping with bank statement reconciliation.
//!
//! ## Features
//!
//! - **Double-entry records**: every transaction debits one account and credits another
//! - **Reference data**: categories, currencies and contacts
//! - **Statement reconciliation**: match bank statement lines to recorded transactions
//!   by direction and date, then mark them checked
//! - **Reports**: incomes and expenses grouped by category, account and contact
//! - **Storage abstraction**: trait-based storage with an in-memory cache implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use money_core::{utils::MemoryStorage, MoneyBook, MoneyResult, Statement, StatementRecordBuilder};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! # #[tokio::main]
//! # async fn main() -> MoneyResult<()> {
//! let book = MoneyBook::new(MemoryStorage::new());
//! // ... create categories, accounts and transactions ...
//!
//! let record = StatementRecordBuilder::new()
//!     .actual(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .execution(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap())
//!     .amount("-100,00")
//!     .build(&book.list_currencies().await?);
//! let mut statement = Statement::new("4081 7810", BigDecimal::from(0), vec![record]);
//!
//! if let Some(account) = book.select_statement_account(&statement).await? {
//!     book.reconcile_statement(&mut statement, &account, false).await?;
//!     for record in &statement.records {
//!         println!("{} matched {}", record.amount(), record.transactions().len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::{ReconcileSettings, Settings};
pub use ledger::*;
pub use reconciliation::*;
pub use reports::*;
pub use traits::*;
pub use types::*;

// Re-export transaction filters for convenience
pub use ledger::transaction::filters;
