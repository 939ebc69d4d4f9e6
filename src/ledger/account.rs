//! Account management functionality

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Account manager for handling account operations
pub struct AccountManager<S: MoneyStorage> {
    pub(crate) storage: S,
    validator: Box<dyn AccountValidator>,
}

impl<S: MoneyStorage> AccountManager<S> {
    /// Create a new account manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultAccountValidator),
        }
    }

    /// Create a new account manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn AccountValidator>) -> Self {
        Self { storage, validator }
    }

    async fn validate_references(&self, account: &Account) -> MoneyResult<()> {
        let category = self
            .storage
            .get_category(account.category_uuid)
            .await?
            .ok_or(MoneyError::CategoryNotFound(account.category_uuid))?;

        if category.category_type != account.account_type {
            return Err(MoneyError::Validation(format!(
                "Account type {:?} does not match category '{}' of type {:?}",
                account.account_type, category.name, category.category_type
            )));
        }

        if let Some(currency_uuid) = account.currency_uuid {
            if self.storage.get_currency(currency_uuid).await?.is_none() {
                return Err(MoneyError::CurrencyNotFound(currency_uuid));
            }
        }

        Ok(())
    }

    /// Store a new account
    pub async fn create_account(&mut self, account: &Account) -> MoneyResult<()> {
        self.validator.validate_account(account)?;
        self.validate_references(account).await?;

        if self.storage.get_account(account.uuid).await?.is_some() {
            return Err(MoneyError::Validation(format!(
                "Account with ID '{}' already exists",
                account.uuid
            )));
        }

        tracing::debug!(uuid = %account.uuid, name = %account.name, "creating account");
        self.storage.save_account(account).await
    }

    /// Get an account by ID
    pub async fn get_account(&self, uuid: Uuid) -> MoneyResult<Option<Account>> {
        self.storage.get_account(uuid).await
    }

    /// Get an account by ID, returning an error if not found
    pub async fn get_account_required(&self, uuid: Uuid) -> MoneyResult<Account> {
        self.storage
            .get_account(uuid)
            .await?
            .ok_or(MoneyError::AccountNotFound(uuid))
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> MoneyResult<Vec<Account>> {
        self.storage.list_accounts(None).await
    }

    /// List accounts by type
    pub async fn list_accounts_by_type(&self, account_type: CategoryType) -> MoneyResult<Vec<Account>> {
        self.storage.list_accounts(Some(account_type)).await
    }

    /// List accounts of a category
    pub async fn list_accounts_by_category(&self, category_uuid: Uuid) -> MoneyResult<Vec<Account>> {
        Ok(self
            .list_accounts()
            .await?
            .into_iter()
            .filter(|a| a.category_uuid == category_uuid)
            .collect())
    }

    /// Enabled account whose number, spaces removed, equals `number`
    pub async fn account_by_number(&self, number: &str) -> MoneyResult<Option<Account>> {
        let number = number.replace(' ', "");
        Ok(self
            .list_accounts()
            .await?
            .into_iter()
            .filter(|a| a.enabled)
            .find(|a| a.account_number_no_spaces() == number))
    }

    /// Replace an account with a rebuilt copy carrying the same uuid
    pub async fn update_account(&mut self, account: &Account) -> MoneyResult<()> {
        self.validator.validate_account(account)?;
        self.get_account_required(account.uuid).await?;
        self.validate_references(account).await?;

        self.storage.update_account(account).await
    }

    /// Enable or disable an account
    pub async fn enable_account(&mut self, uuid: Uuid, enabled: bool) -> MoneyResult<Account> {
        let account = AccountBuilder::from(&self.get_account_required(uuid).await?)
            .enabled(enabled)
            .build()?;
        self.storage.update_account(&account).await?;
        Ok(account)
    }

    /// Delete an account that no transaction references
    pub async fn delete_account(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.get_account_required(uuid).await?;

        let references = self
            .storage
            .get_account_transactions(uuid, None, None)
            .await?
            .len();
        if references > 0 {
            return Err(MoneyError::Validation(format!(
                "Account '{}' is referenced by {} transaction(s)",
                uuid, references
            )));
        }

        tracing::debug!(%uuid, "deleting account");
        self.storage.delete_account(uuid).await
    }
}

/// Builder for new accounts and for edited copies of existing ones
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    uuid: Option<Uuid>,
    name: String,
    comment: String,
    account_number: String,
    opening_balance: BigDecimal,
    account_limit: BigDecimal,
    currency_rate: BigDecimal,
    account_type: CategoryType,
    category_uuid: Uuid,
    currency_uuid: Option<Uuid>,
    enabled: bool,
    interest: BigDecimal,
    closing_date: Option<NaiveDate>,
    card_number: String,
    total: BigDecimal,
    total_waiting: BigDecimal,
    created_at: Option<chrono::NaiveDateTime>,
}

impl From<&Account> for AccountBuilder {
    fn from(a: &Account) -> Self {
        Self {
            uuid: Some(a.uuid),
            name: a.name.clone(),
            comment: a.comment.clone(),
            account_number: a.account_number.clone(),
            opening_balance: a.opening_balance.clone(),
            account_limit: a.account_limit.clone(),
            currency_rate: a.currency_rate.clone(),
            account_type: a.account_type,
            category_uuid: a.category_uuid,
            currency_uuid: a.currency_uuid,
            enabled: a.enabled,
            interest: a.interest.clone(),
            closing_date: a.closing_date,
            card_number: a.card_number.clone(),
            total: a.total.clone(),
            total_waiting: a.total_waiting.clone(),
            created_at: Some(a.created_at),
        }
    }
}

impl AccountBuilder {
    /// Start a builder for an enabled account with zero balances
    pub fn new(name: impl Into<String>, account_type: CategoryType, category_uuid: Uuid) -> Self {
        Self {
            uuid: None,
            name: name.into(),
            comment: String::new(),
            account_number: String::new(),
            opening_balance: BigDecimal::from(0),
            account_limit: BigDecimal::from(0),
            currency_rate: BigDecimal::from(1),
            account_type,
            category_uuid,
            currency_uuid: None,
            enabled: true,
            interest: BigDecimal::from(0),
            closing_date: None,
            card_number: String::new(),
            total: BigDecimal::from(0),
            total_waiting: BigDecimal::from(0),
            created_at: None,
        }
    }

    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn account_number(mut self, account_number: impl Into<String>) -> Self {
        self.account_number = account_number.into();
        self
    }

    pub fn opening_balance(mut self, amount: BigDecimal) -> Self {
        self.opening_balance = amount;
        self
    }

    pub fn account_limit(mut self, amount: BigDecimal) -> Self {
        self.account_limit = amount;
        self
    }

    pub fn currency_rate(mut self, rate: BigDecimal) -> Self {
        self.currency_rate = rate;
        self
    }

    pub fn currency(mut self, currency_uuid: Option<Uuid>) -> Self {
        self.currency_uuid = currency_uuid;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn interest(mut self, interest: BigDecimal) -> Self {
        self.interest = interest;
        self
    }

    pub fn closing_date(mut self, closing_date: Option<NaiveDate>) -> Self {
        self.closing_date = closing_date;
        self
    }

    pub fn card_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = card_number.into();
        self
    }

    /// Cached totals, normally set by the balance refresh
    pub fn totals(mut self, total: BigDecimal, total_waiting: BigDecimal) -> Self {
        self.total = total;
        self.total_waiting = total_waiting;
        self
    }

    /// Build the account
    pub fn build(self) -> MoneyResult<Account> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(MoneyError::Validation(
                "Account name cannot be empty".to_string(),
            ));
        }

        let now = now();
        Ok(Account {
            uuid: self.uuid.unwrap_or_else(Uuid::new_v4),
            name,
            comment: self.comment.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            opening_balance: self.opening_balance,
            account_limit: self.account_limit,
            currency_rate: self.currency_rate,
            account_type: self.account_type,
            category_uuid: self.category_uuid,
            currency_uuid: self.currency_uuid,
            enabled: self.enabled,
            interest: self.interest,
            closing_date: self.closing_date,
            card_number: self.card_number.trim().to_string(),
            total: self.total,
            total_waiting: self.total_waiting,
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    async fn manager_with_category() -> (AccountManager<MemoryStorage>, Category) {
        let mut storage = MemoryStorage::new();
        let category = Category::new("Banks", "", CategoryType::BanksAndCash);
        storage.save_category(&category).await.unwrap();
        (AccountManager::new(storage), category)
    }

    #[test]
    fn test_builder_rejects_blank_name() {
        assert!(AccountBuilder::new("  ", CategoryType::BanksAndCash, Uuid::new_v4())
            .build()
            .is_err());
    }

    #[test]
    fn test_account_number_and_balance() {
        let account = AccountBuilder::new("Card", CategoryType::BanksAndCash, Uuid::new_v4())
            .account_number("4081 7810 0000")
            .opening_balance(BigDecimal::from(10))
            .account_limit(BigDecimal::from(5))
            .totals(BigDecimal::from(1), BigDecimal::from(0))
            .build()
            .unwrap();

        assert_eq!(account.account_number_no_spaces(), "408178100000");
        assert_eq!(account.balance(), BigDecimal::from(16));
    }

    #[tokio::test]
    async fn test_create_requires_matching_category() {
        let (mut manager, category) = manager_with_category().await;

        let wrong_type = AccountBuilder::new("Salary", CategoryType::Incomes, category.uuid)
            .build()
            .unwrap();
        assert!(manager.create_account(&wrong_type).await.is_err());

        let unknown = AccountBuilder::new("Bank", CategoryType::BanksAndCash, Uuid::new_v4())
            .build()
            .unwrap();
        assert!(matches!(
            manager.create_account(&unknown).await,
            Err(MoneyError::CategoryNotFound(_))
        ));

        let ok = AccountBuilder::new("Bank", CategoryType::BanksAndCash, category.uuid)
            .build()
            .unwrap();
        manager.create_account(&ok).await.unwrap();
        assert!(manager.create_account(&ok).await.is_err());
    }

    #[tokio::test]
    async fn test_enable_and_lookup_by_number() {
        let (mut manager, category) = manager_with_category().await;
        let account = AccountBuilder::new("Bank", CategoryType::BanksAndCash, category.uuid)
            .account_number("40817 810")
            .build()
            .unwrap();
        manager.create_account(&account).await.unwrap();

        assert!(manager.account_by_number("40817810").await.unwrap().is_some());

        let disabled = manager.enable_account(account.uuid, false).await.unwrap();
        assert_eq!(disabled.uuid, account.uuid);
        assert!(manager.account_by_number("40817810").await.unwrap().is_none());
    }
}
