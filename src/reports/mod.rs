//! Reports built from cached ledger data

pub mod incomes_expenses;

pub use incomes_expenses::*;
