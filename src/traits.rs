//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::types::*;

/// Storage abstraction for the money manager
///
/// The core works against any backend (SQL database, XML file, in-memory
/// cache) that implements these methods. Listing methods return records in a
/// stable order: accounts, categories, currencies and contacts by name,
/// transactions by date then creation time.
#[async_trait]
pub trait MoneyStorage: Send + Sync {
    // Categories
    async fn save_category(&mut self, category: &Category) -> MoneyResult<()>;
    async fn get_category(&self, uuid: Uuid) -> MoneyResult<Option<Category>>;
    async fn list_categories(&self, category_type: Option<CategoryType>) -> MoneyResult<Vec<Category>>;
    async fn update_category(&mut self, category: &Category) -> MoneyResult<()>;
    async fn delete_category(&mut self, uuid: Uuid) -> MoneyResult<()>;

    // Currencies
    async fn save_currency(&mut self, currency: &Currency) -> MoneyResult<()>;
    async fn get_currency(&self, uuid: Uuid) -> MoneyResult<Option<Currency>>;
    async fn list_currencies(&self) -> MoneyResult<Vec<Currency>>;
    async fn update_currency(&mut self, currency: &Currency) -> MoneyResult<()>;
    async fn delete_currency(&mut self, uuid: Uuid) -> MoneyResult<()>;

    // Contacts
    async fn save_contact(&mut self, contact: &Contact) -> MoneyResult<()>;
    async fn get_contact(&self, uuid: Uuid) -> MoneyResult<Option<Contact>>;
    async fn list_contacts(&self) -> MoneyResult<Vec<Contact>>;
    async fn update_contact(&mut self, contact: &Contact) -> MoneyResult<()>;
    async fn delete_contact(&mut self, uuid: Uuid) -> MoneyResult<()>;

    // Accounts
    async fn save_account(&mut self, account: &Account) -> MoneyResult<()>;
    async fn get_account(&self, uuid: Uuid) -> MoneyResult<Option<Account>>;
    async fn list_accounts(&self, account_type: Option<CategoryType>) -> MoneyResult<Vec<Account>>;
    async fn update_account(&mut self, account: &Account) -> MoneyResult<()>;
    async fn delete_account(&mut self, uuid: Uuid) -> MoneyResult<()>;

    // Transactions
    async fn save_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()>;
    async fn get_transaction(&self, uuid: Uuid) -> MoneyResult<Option<Transaction>>;

    /// List all transactions within an optional inclusive date range
    async fn list_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>>;

    /// List transactions debiting or crediting the account
    async fn get_account_transactions(
        &self,
        account_uuid: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>>;

    async fn update_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()>;

    /// Replace several existing transactions at once
    ///
    /// Fails without changes when any of them is unknown.
    async fn update_transactions(&mut self, transactions: &[Transaction]) -> MoneyResult<()>;

    async fn delete_transaction(&mut self, uuid: Uuid) -> MoneyResult<()>;
}

/// Trait for implementing custom account validation rules
pub trait AccountValidator: Send + Sync {
    /// Validate an account before saving
    fn validate_account(&self, account: &Account) -> MoneyResult<()>;
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a transaction before saving
    fn validate_transaction(&self, transaction: &Transaction) -> MoneyResult<()>;
}

/// Default account validator with basic rules
pub struct DefaultAccountValidator;

impl AccountValidator for DefaultAccountValidator {
    fn validate_account(&self, account: &Account) -> MoneyResult<()> {
        if account.name.trim().is_empty() {
            return Err(MoneyError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Default transaction validator
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> MoneyResult<()> {
        if transaction.amount < bigdecimal::BigDecimal::from(0) {
            return Err(MoneyError::InvalidTransaction(
                "Transaction amount cannot be negative".to_string(),
            ));
        }

        if transaction.parent_uuid == Some(transaction.uuid) {
            return Err(MoneyError::InvalidTransaction(
                "Transaction cannot be its own parent".to_string(),
            ));
        }

        Ok(())
    }
}
