//! Bank statements and their records
//!
//! Records come from external statement parsers. They are transient: the
//! matched transactions attached to each record are recomputed whenever the
//! statement, the selected account or the cached transactions change.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

use super::amount;
use crate::types::{Currency, Transaction};

/// One line of a bank statement
///
/// Only built through [`StatementRecordBuilder`], which keeps the decimal
/// amounts in line with their normalized text.
#[derive(Debug, Clone, Serialize)]
pub struct StatementRecord {
    actual: Option<NaiveDate>,
    execution: Option<NaiveDate>,
    description: String,
    counterparty: String,
    place: String,
    country: String,
    currency: String,
    currency_uuid: Option<Uuid>,
    amount: String,
    account_currency: String,
    account_currency_uuid: Option<Uuid>,
    account_amount: String,
    amount_decimal: BigDecimal,
    account_amount_decimal: BigDecimal,
    #[serde(skip)]
    transactions: Vec<Transaction>,
}

impl StatementRecord {
    /// Date the operation happened
    pub fn actual(&self) -> Option<NaiveDate> {
        self.actual
    }

    /// Date the bank executed the operation, defaults to the actual date
    pub fn execution(&self) -> Option<NaiveDate> {
        self.execution
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Operation currency as printed on the statement
    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn currency_uuid(&self) -> Option<Uuid> {
        self.currency_uuid
    }

    /// Normalized amount text
    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn account_currency(&self) -> &str {
        &self.account_currency
    }

    pub fn account_currency_uuid(&self) -> Option<Uuid> {
        self.account_currency_uuid
    }

    /// Normalized amount text in the account currency
    pub fn account_amount(&self) -> &str {
        &self.account_amount
    }

    /// Signed operation amount with two fractional digits
    pub fn amount_decimal(&self) -> &BigDecimal {
        &self.amount_decimal
    }

    /// Signed account-currency amount with two fractional digits
    pub fn account_amount_decimal(&self) -> &BigDecimal {
        &self.account_amount_decimal
    }

    /// Transactions matched to this record by the last reconciliation
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn set_transactions(&mut self, transactions: Vec<Transaction>) {
        self.transactions = transactions;
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// At least one transaction matched
    pub fn is_matched(&self) -> bool {
        !self.transactions.is_empty()
    }

    /// Every matched transaction is checked
    pub fn is_fully_checked(&self) -> bool {
        self.is_matched() && self.transactions.iter().all(|t| t.checked)
    }
}

impl PartialEq for StatementRecord {
    fn eq(&self, other: &Self) -> bool {
        self.actual == other.actual
            && self.execution == other.execution
            && self.description == other.description
            && self.counterparty == other.counterparty
            && self.place == other.place
            && self.country == other.country
            && self.currency == other.currency
            && self.amount == other.amount
            && self.account_currency == other.account_currency
            && self.account_amount == other.account_amount
    }
}

impl Eq for StatementRecord {}

impl Hash for StatementRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.actual.hash(state);
        self.execution.hash(state);
        self.description.hash(state);
        self.counterparty.hash(state);
        self.place.hash(state);
        self.country.hash(state);
        self.currency.hash(state);
        self.amount.hash(state);
        self.account_currency.hash(state);
        self.account_amount.hash(state);
    }
}

/// Builder used by statement parsers
#[derive(Debug, Clone, Default)]
pub struct StatementRecordBuilder {
    actual: Option<NaiveDate>,
    execution: Option<NaiveDate>,
    description: String,
    counterparty: String,
    place: String,
    country: String,
    currency: String,
    amount: Option<String>,
    account_currency: Option<String>,
    account_amount: Option<String>,
}

impl StatementRecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actual(mut self, date: NaiveDate) -> Self {
        self.actual = Some(date);
        self
    }

    pub fn execution(mut self, date: NaiveDate) -> Self {
        self.execution = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn counterparty(mut self, counterparty: impl Into<String>) -> Self {
        self.counterparty = counterparty.into();
        self
    }

    pub fn place(mut self, place: impl Into<String>) -> Self {
        self.place = place.into();
        self
    }

    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn account_currency(mut self, currency: impl Into<String>) -> Self {
        self.account_currency = Some(currency.into());
        self
    }

    pub fn account_amount(mut self, amount: impl Into<String>) -> Self {
        self.account_amount = Some(amount.into());
        self
    }

    /// Build the record, resolving currency names against `currencies`
    ///
    /// Missing execution date, account currency and account amount fall back
    /// to the actual date, the operation currency and the operation amount.
    pub fn build(self, currencies: &[Currency]) -> StatementRecord {
        let resolve = |name: &str| {
            currencies
                .iter()
                .find(|c| !name.is_empty() && c.matches_name(name))
                .map(|c| c.uuid)
        };

        let amount_text = self.amount.as_deref().map(amount::normalize_text).unwrap_or_default();
        let account_amount_text = self
            .account_amount
            .as_deref()
            .map(amount::normalize_text)
            .unwrap_or_else(|| amount_text.clone());
        let account_currency = self.account_currency.unwrap_or_else(|| self.currency.clone());

        StatementRecord {
            actual: self.actual,
            execution: self.execution.or(self.actual),
            currency_uuid: resolve(&self.currency),
            account_currency_uuid: resolve(&account_currency),
            amount_decimal: amount::normalize(Some(&amount_text)),
            account_amount_decimal: amount::normalize(Some(&account_amount_text)),
            amount: amount_text,
            account_amount: account_amount_text,
            account_currency,
            description: self.description,
            counterparty: self.counterparty,
            place: self.place,
            country: self.country,
            currency: self.currency,
            transactions: Vec::new(),
        }
    }
}

/// Parsed bank statement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    /// Account number the statement was issued for, may be empty
    pub account_number: String,
    /// Closing balance reported by the bank
    pub balance: BigDecimal,
    pub records: Vec<StatementRecord>,
}

impl Statement {
    pub fn new(account_number: impl Into<String>, balance: BigDecimal, records: Vec<StatementRecord>) -> Self {
        Self {
            account_number: account_number.into(),
            balance,
            records,
        }
    }

    /// Drop every matched transaction
    pub fn clear_matches(&mut self) {
        self.records.iter_mut().for_each(StatementRecord::clear_transactions);
    }
}
