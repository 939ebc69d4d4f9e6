//! Matching of statement records to ledger transactions
//!
//! Matching is deliberately loose: a transaction matches a record when it
//! moves money in the direction given by the sign of the statement amount and
//! falls on one of the record's dates. Amounts are not compared, so one
//! statement line may correspond to several transactions and vice versa.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates::DateWindowMatcher;
use super::statement::{Statement, StatementRecord};
use crate::types::{Account, Transaction};

/// Side of the transaction the reconciled account must be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Money left the account: the account is debited
    Outflow,
    /// Money arrived: the account is credited
    Inflow,
}

impl Direction {
    /// Negative amounts are outflows, zero and positive are inflows
    pub fn of(amount: &BigDecimal) -> Self {
        if *amount < BigDecimal::from(0) {
            Direction::Outflow
        } else {
            Direction::Inflow
        }
    }
}

/// Predicate selecting transactions that plausibly correspond to one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementReconciler {
    account_uuid: Uuid,
    direction: Direction,
    dates: DateWindowMatcher,
}

impl StatementReconciler {
    pub fn new(account: &Account, record: &StatementRecord, ignore_execution_date: bool) -> Self {
        Self {
            account_uuid: account.uuid,
            direction: Direction::of(record.amount_decimal()),
            dates: DateWindowMatcher::new(record.actual(), record.execution(), ignore_execution_date),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let side = match self.direction {
            Direction::Outflow => transaction.account_debited_uuid,
            Direction::Inflow => transaction.account_credited_uuid,
        };
        side == self.account_uuid && self.dates.matches(transaction.date)
    }

    /// The predicate as a closure, for filtering transaction views
    pub fn predicate(self) -> impl Fn(&Transaction) -> bool {
        move |t| self.matches(t)
    }

    /// Matching transactions, in input order
    pub fn find_matches<'a, I>(&self, transactions: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}

/// Attach the matching transactions to a single record
pub fn reconcile_record(
    account: &Account,
    record: &mut StatementRecord,
    transactions: &[Transaction],
    ignore_execution_date: bool,
) {
    let matches = StatementReconciler::new(account, record, ignore_execution_date).find_matches(transactions);
    record.set_transactions(matches);
}

/// Reconcile every record of a statement, newest records first
pub fn reconcile_statement(
    account: &Account,
    statement: &mut Statement,
    transactions: &[Transaction],
    ignore_execution_date: bool,
) {
    for record in statement.records.iter_mut() {
        reconcile_record(account, record, transactions, ignore_execution_date);
    }
    statement.records.sort_by(|a, b| b.actual().cmp(&a.actual()));

    tracing::debug!(
        account = %account.uuid,
        records = statement.records.len(),
        matched = statement.records.iter().filter(|r| r.is_matched()).count(),
        ignore_execution_date,
        "statement reconciled"
    );
}

/// Overview of a reconciled statement against an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    pub account_uuid: Uuid,
    /// Records with at least one matched transaction
    pub matched_records: usize,
    /// Records with no matched transaction
    pub unmatched_records: usize,
    /// Records whose matched transactions are all checked
    pub checked_records: usize,
    /// Closing balance reported by the bank
    pub statement_balance: BigDecimal,
    /// Balance recorded in the ledger
    pub account_balance: BigDecimal,
    /// Statement balance minus account balance
    pub difference: BigDecimal,
}

impl StatementSummary {
    pub fn new(account: &Account, statement: &Statement, account_balance: BigDecimal) -> Self {
        let matched_records = statement.records.iter().filter(|r| r.is_matched()).count();
        Self {
            account_uuid: account.uuid,
            matched_records,
            unmatched_records: statement.records.len() - matched_records,
            checked_records: statement.records.iter().filter(|r| r.is_fully_checked()).count(),
            difference: &statement.balance - &account_balance,
            statement_balance: statement.balance.clone(),
            account_balance,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.difference == BigDecimal::from(0)
    }
}
