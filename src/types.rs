//! Core types and data structures for the money manager

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub(crate) fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// Category types used to group accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryType {
    /// Bank accounts, cards and cash
    BanksAndCash,
    /// Loans and other debts
    Debts,
    /// Investment portfolios
    Portfolio,
    /// Property and other assets
    Assets,
    /// Income sources
    Incomes,
    /// Expense targets
    Expenses,
    /// Opening balances
    Startup,
}

impl CategoryType {
    pub const ALL: [CategoryType; 7] = [
        CategoryType::BanksAndCash,
        CategoryType::Debts,
        CategoryType::Portfolio,
        CategoryType::Assets,
        CategoryType::Incomes,
        CategoryType::Expenses,
        CategoryType::Startup,
    ];

    /// Stable numeric identifier used by storage backends
    pub fn id(&self) -> i32 {
        match self {
            CategoryType::BanksAndCash => 1,
            CategoryType::Debts => 2,
            CategoryType::Portfolio => 3,
            CategoryType::Assets => 4,
            CategoryType::Incomes => 5,
            CategoryType::Expenses => 6,
            CategoryType::Startup => 7,
        }
    }

    /// Resolve a category type from its numeric identifier
    pub fn from_id(id: i32) -> MoneyResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.id() == id)
            .ok_or_else(|| MoneyError::Validation(format!("Unknown category type id {}", id)))
    }

    /// Only bank/cash and debt accounts receive bank statements
    pub fn is_statement_eligible(&self) -> bool {
        matches!(self, CategoryType::BanksAndCash | CategoryType::Debts)
    }
}

/// Kind of a ledger transaction, informational only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransactionType {
    CardPayment,
    CashPurchase,
    Cheque,
    Withdrawal,
    Deposit,
    Transfer,
    Interest,
    Dividend,
    DirectBilling,
    Fee,
    Income,
    Purchase,
    Sale,
    Refund,
    #[default]
    Undefined,
}

/// Kind of a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContactType {
    #[default]
    Personal,
    Client,
    Supplier,
    Employee,
    Employer,
    Service,
}

/// Grouping of accounts of a single type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier for the category
    pub uuid: Uuid,
    /// Human-readable name
    pub name: String,
    /// Free-form comment
    pub comment: String,
    /// Type shared by every account in this category
    pub category_type: CategoryType,
    /// When the category was created
    pub created_at: NaiveDateTime,
    /// When the category was last updated
    pub updated_at: NaiveDateTime,
}

impl Category {
    /// Create a new category with a fresh identifier
    pub fn new(name: impl Into<String>, comment: impl Into<String>, category_type: CategoryType) -> Self {
        let now = now();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            comment: comment.into(),
            category_type,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Currency definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub uuid: Uuid,
    /// Short symbol, e.g. "USD"
    pub symbol: String,
    /// Long description, e.g. "US Dollar"
    pub description: String,
    /// Symbol used when formatting amounts, e.g. "$"
    pub format_symbol: String,
    /// Whether the format symbol goes before the amount
    pub symbol_before: bool,
    /// Whether thousands separators are shown
    pub show_separator: bool,
    /// Whether this is the default currency
    pub is_default: bool,
    /// Exchange rate against the default currency
    pub rate: BigDecimal,
    /// Rate direction, 1 multiplies and -1 divides
    pub direction: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Currency {
    /// Create a new non-default currency with rate 1
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        let now = now();
        Self {
            uuid: Uuid::new_v4(),
            symbol: symbol.into(),
            description: description.into(),
            format_symbol: String::new(),
            symbol_before: false,
            show_separator: false,
            is_default: false,
            rate: BigDecimal::from(1),
            direction: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark this currency as the default one
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Case-insensitive match against the symbol or the description
    pub fn matches_name(&self, name: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(name)
            || self.description.to_lowercase() == name.to_lowercase()
    }
}

/// Counterparty of transactions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Contact {
    pub uuid: Uuid,
    pub name: String,
    pub contact_type: ContactType,
    pub phone: String,
    pub mobile: String,
    pub email: String,
    pub web: String,
    pub comment: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub zip: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Contact {
    /// Create a new personal contact with only a name
    pub fn new(name: impl Into<String>) -> Self {
        let now = now();
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            ..Default::default()
        }
    }
}

/// Named ledger bucket
///
/// Accounts are never edited in place: use
/// [`AccountBuilder`](crate::ledger::AccountBuilder) seeded from the existing
/// value, which carries the identifier forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier for the account
    pub uuid: Uuid,
    /// Human-readable account name
    pub name: String,
    /// Free-form comment
    pub comment: String,
    /// Bank account number as printed on statements
    pub account_number: String,
    /// Balance before the first recorded transaction
    pub opening_balance: BigDecimal,
    /// Credit limit added to the available balance
    pub account_limit: BigDecimal,
    /// Exchange rate used for conversion into the default currency
    pub currency_rate: BigDecimal,
    /// Type of the account, same as its category type
    pub account_type: CategoryType,
    /// Category the account belongs to
    pub category_uuid: Uuid,
    /// Currency of the account, if any
    pub currency_uuid: Option<Uuid>,
    /// Disabled accounts are hidden from statement selection
    pub enabled: bool,
    /// Interest rate
    pub interest: BigDecimal,
    /// Date the account was closed
    pub closing_date: Option<NaiveDate>,
    /// Card number attached to the account
    pub card_number: String,
    /// Cached sum of all transactions
    pub total: BigDecimal,
    /// Cached sum of unchecked transactions
    pub total_waiting: BigDecimal,
    /// When the account was created
    pub created_at: NaiveDateTime,
    /// When the account was last updated
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Account number with all spaces removed
    pub fn account_number_no_spaces(&self) -> String {
        self.account_number.replace(' ', "")
    }

    /// Opening balance plus limit plus the cached total
    pub fn balance(&self) -> BigDecimal {
        &self.opening_balance + &self.account_limit + &self.total
    }
}

/// Double-entry movement from the debited account to the credited account
///
/// Built through [`TransactionBuilder`](crate::ledger::TransactionBuilder);
/// edits produce a new value with the same `uuid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, stable across edits
    pub uuid: Uuid,
    /// Amount leaving the debited account
    pub amount: BigDecimal,
    /// Amount arriving at the credited account, differs on currency conversion
    pub credit_amount: BigDecimal,
    /// Calendar date of the transaction
    pub date: NaiveDate,
    pub transaction_type: TransactionType,
    pub comment: String,
    /// Confirmed against a bank statement
    pub checked: bool,
    pub account_debited_uuid: Uuid,
    pub account_credited_uuid: Uuid,
    pub account_debited_type: CategoryType,
    pub account_credited_type: CategoryType,
    pub account_debited_category_uuid: Uuid,
    pub account_credited_category_uuid: Uuid,
    pub contact_uuid: Option<Uuid>,
    pub invoice_number: String,
    /// Parent of a detail (split) transaction
    pub parent_uuid: Option<Uuid>,
    /// Whether this transaction has detail transactions
    pub detailed: bool,
    /// Date the transaction appeared on a statement
    pub statement_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Transaction {
    /// Amount signed from the point of view of the debited side
    ///
    /// Transfers between accounts of the same type and income receipts keep
    /// their sign; everything else is an outflow.
    pub fn signed_amount(&self) -> BigDecimal {
        if self.account_credited_type != self.account_debited_type
            && self.account_debited_type != CategoryType::Incomes
        {
            -self.amount.clone()
        } else {
            self.amount.clone()
        }
    }

    /// Whether either side of the transaction is the given account
    pub fn touches_account(&self, account_uuid: Uuid) -> bool {
        self.account_debited_uuid == account_uuid || self.account_credited_uuid == account_uuid
    }

    /// Whether this is a detail (split) transaction
    pub fn is_detail(&self) -> bool {
        self.parent_uuid.is_some()
    }

    /// Copy with the checked flag set
    pub fn check(&self, checked: bool) -> Self {
        Self {
            checked,
            updated_at: now(),
            ..self.clone()
        }
    }

    /// Copy attached to another parent
    pub fn with_parent(&self, parent_uuid: Option<Uuid>) -> Self {
        Self {
            parent_uuid,
            updated_at: now(),
            ..self.clone()
        }
    }
}

/// Errors that can occur in the money manager
#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),
    #[error("Currency not found: {0}")]
    CurrencyNotFound(Uuid),
    #[error("Contact not found: {0}")]
    ContactNotFound(Uuid),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for money manager operations
pub type MoneyResult<T> = Result<T, MoneyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_type_ids_round_trip() {
        for t in CategoryType::ALL {
            assert_eq!(CategoryType::from_id(t.id()).unwrap(), t);
        }
        assert!(CategoryType::from_id(42).is_err());
    }

    #[test]
    fn test_statement_eligible_types() {
        assert!(CategoryType::BanksAndCash.is_statement_eligible());
        assert!(CategoryType::Debts.is_statement_eligible());
        assert!(!CategoryType::Expenses.is_statement_eligible());
        assert!(!CategoryType::Portfolio.is_statement_eligible());
    }

    #[test]
    fn test_currency_matches_name() {
        let usd = Currency::new("USD", "US Dollar");
        assert!(usd.matches_name("usd"));
        assert!(usd.matches_name("us dollar"));
        assert!(!usd.matches_name("EUR"));
    }
}
