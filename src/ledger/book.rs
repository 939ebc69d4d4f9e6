//! Main orchestrator that coordinates reference data, accounts, transactions
//! and statement reconciliation

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::transaction::filters;
use crate::ledger::{AccountBuilder, AccountManager, ReferenceDataManager, TransactionManager};
use crate::reconciliation::{self, Statement, StatementRecord, StatementSummary};
use crate::reports::IncomesExpensesReport;
use crate::traits::*;
use crate::types::*;

/// Money book over a storage backend
pub struct MoneyBook<S: MoneyStorage> {
    reference_manager: ReferenceDataManager<S>,
    account_manager: AccountManager<S>,
    transaction_manager: TransactionManager<S>,
}

impl<S: MoneyStorage + Clone> MoneyBook<S> {
    /// Create a new book with the given storage backend
    pub fn new(storage: S) -> Self {
        Self {
            reference_manager: ReferenceDataManager::new(storage.clone()),
            account_manager: AccountManager::new(storage.clone()),
            transaction_manager: TransactionManager::new(storage),
        }
    }

    /// Create a new book with custom validators
    pub fn with_validators(
        storage: S,
        account_validator: Box<dyn AccountValidator>,
        transaction_validator: Box<dyn TransactionValidator>,
    ) -> Self {
        Self {
            reference_manager: ReferenceDataManager::new(storage.clone()),
            account_manager: AccountManager::with_validator(storage.clone(), account_validator),
            transaction_manager: TransactionManager::with_validator(storage, transaction_validator),
        }
    }

    // Reference data

    pub async fn create_category(&mut self, category: &Category) -> MoneyResult<()> {
        self.reference_manager.create_category(category).await
    }

    pub async fn get_category(&self, uuid: Uuid) -> MoneyResult<Option<Category>> {
        self.reference_manager.get_category(uuid).await
    }

    pub async fn list_categories(&self, category_type: Option<CategoryType>) -> MoneyResult<Vec<Category>> {
        self.reference_manager.list_categories(category_type).await
    }

    pub async fn update_category(&mut self, category: &Category) -> MoneyResult<()> {
        self.reference_manager.update_category(category).await
    }

    pub async fn delete_category(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.reference_manager.delete_category(uuid).await
    }

    pub async fn create_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        self.reference_manager.create_currency(currency).await
    }

    pub async fn get_currency(&self, uuid: Uuid) -> MoneyResult<Option<Currency>> {
        self.reference_manager.get_currency(uuid).await
    }

    pub async fn list_currencies(&self) -> MoneyResult<Vec<Currency>> {
        self.reference_manager.list_currencies().await
    }

    pub async fn default_currency(&self) -> MoneyResult<Option<Currency>> {
        self.reference_manager.default_currency().await
    }

    pub async fn update_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        self.reference_manager.update_currency(currency).await
    }

    pub async fn delete_currency(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.reference_manager.delete_currency(uuid).await
    }

    pub async fn create_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        self.reference_manager.create_contact(contact).await
    }

    pub async fn get_contact(&self, uuid: Uuid) -> MoneyResult<Option<Contact>> {
        self.reference_manager.get_contact(uuid).await
    }

    pub async fn list_contacts(&self) -> MoneyResult<Vec<Contact>> {
        self.reference_manager.list_contacts().await
    }

    pub async fn update_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        self.reference_manager.update_contact(contact).await
    }

    pub async fn delete_contact(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.reference_manager.delete_contact(uuid).await
    }

    // Account operations

    /// Create a new account
    pub async fn create_account(&mut self, account: &Account) -> MoneyResult<()> {
        self.account_manager.create_account(account).await
    }

    /// Get an account by ID
    pub async fn get_account(&self, uuid: Uuid) -> MoneyResult<Option<Account>> {
        self.account_manager.get_account(uuid).await
    }

    /// List all accounts
    pub async fn list_accounts(&self) -> MoneyResult<Vec<Account>> {
        self.account_manager.list_accounts().await
    }

    /// List accounts by type
    pub async fn list_accounts_by_type(&self, account_type: CategoryType) -> MoneyResult<Vec<Account>> {
        self.account_manager.list_accounts_by_type(account_type).await
    }

    pub async fn list_accounts_by_category(&self, category_uuid: Uuid) -> MoneyResult<Vec<Account>> {
        self.account_manager.list_accounts_by_category(category_uuid).await
    }

    /// Update an account
    pub async fn update_account(&mut self, account: &Account) -> MoneyResult<()> {
        self.account_manager.update_account(account).await
    }

    pub async fn enable_account(&mut self, uuid: Uuid, enabled: bool) -> MoneyResult<Account> {
        self.account_manager.enable_account(uuid, enabled).await
    }

    /// Delete an account
    pub async fn delete_account(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.account_manager.delete_account(uuid).await
    }

    // Transaction operations

    /// Record a new transaction
    pub async fn add_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        self.transaction_manager.add_transaction(transaction).await
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, uuid: Uuid) -> MoneyResult<Option<Transaction>> {
        self.transaction_manager.get_transaction(uuid).await
    }

    /// Get all transactions within a date range
    pub async fn list_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        self.transaction_manager.list_transactions(start_date, end_date).await
    }

    /// Get transactions for a specific account
    pub async fn get_account_transactions(
        &self,
        account_uuid: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        self.transaction_manager
            .get_account_transactions(account_uuid, start_date, end_date)
            .await
    }

    pub async fn transaction_details(&self, parent_uuid: Uuid) -> MoneyResult<Vec<Transaction>> {
        self.transaction_manager.transaction_details(parent_uuid).await
    }

    /// Update a transaction
    pub async fn update_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        self.transaction_manager.update_transaction(transaction).await
    }

    /// Delete a transaction and its details
    pub async fn delete_transaction(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.transaction_manager.delete_transaction(uuid).await
    }

    pub async fn check_transactions(
        &mut self,
        transactions: &[Transaction],
        checked: bool,
    ) -> MoneyResult<Vec<Transaction>> {
        self.transaction_manager.check_transactions(transactions, checked).await
    }

    // Balances

    /// Balance of an account over its stored transactions accepted by `filter`
    pub async fn calculate_balance<F>(
        &self,
        account: &Account,
        include_opening: bool,
        filter: F,
    ) -> MoneyResult<BigDecimal>
    where
        F: Fn(&Transaction) -> bool,
    {
        let transactions = self.get_account_transactions(account.uuid, None, None).await?;
        Ok(crate::ledger::transaction::calculate_balance(
            account,
            &transactions,
            include_opening,
            filter,
        ))
    }

    /// Recompute and store the cached totals of an account
    ///
    /// `total` covers every transaction, `total_waiting` only unchecked ones.
    pub async fn refresh_account_totals(&mut self, uuid: Uuid) -> MoneyResult<Account> {
        let account = self.account_manager.get_account_required(uuid).await?;
        let total = self.calculate_balance(&account, false, |_| true).await?;
        let waiting = self.calculate_balance(&account, false, filters::unchecked()).await?;

        let account = AccountBuilder::from(&account).totals(total, waiting).build()?;
        self.account_manager.storage.update_account(&account).await?;

        tracing::trace!(%uuid, total = %account.total, waiting = %account.total_waiting, "account totals refreshed");
        Ok(account)
    }

    // Statements

    /// Enabled accounts a statement can be reconciled against, sorted by name
    pub async fn statement_accounts(&self) -> MoneyResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .list_accounts()
            .await?
            .into_iter()
            .filter(|a| a.enabled && a.account_type.is_statement_eligible())
            .collect();
        accounts.sort_by_key(|a| a.name.to_lowercase());
        Ok(accounts)
    }

    /// Account a statement belongs to
    ///
    /// The account whose number matches the statement's wins, otherwise the
    /// first eligible account is proposed.
    pub async fn select_statement_account(&self, statement: &Statement) -> MoneyResult<Option<Account>> {
        if !statement.account_number.trim().is_empty() {
            if let Some(account) = self.account_manager.account_by_number(&statement.account_number).await? {
                return Ok(Some(account));
            }
            tracing::debug!(number = %statement.account_number, "no account for statement number");
        }
        Ok(self.statement_accounts().await?.into_iter().next())
    }

    /// Attach matching transactions of `account` to every statement record
    pub async fn reconcile_statement(
        &self,
        statement: &mut Statement,
        account: &Account,
        ignore_execution_date: bool,
    ) -> MoneyResult<()> {
        let transactions = self.get_account_transactions(account.uuid, None, None).await?;
        reconciliation::reconcile_statement(account, statement, &transactions, ignore_execution_date);
        Ok(())
    }

    /// Mark the transactions matched to a record checked or unchecked
    ///
    /// The record keeps the stored copies.
    pub async fn check_statement_record(
        &mut self,
        record: &mut StatementRecord,
        checked: bool,
    ) -> MoneyResult<Vec<Transaction>> {
        let updated = self.check_transactions(record.transactions(), checked).await?;
        record.set_transactions(updated.clone());
        Ok(updated)
    }

    /// Compare a reconciled statement with the account's balance
    pub async fn statement_summary(&self, account: &Account, statement: &Statement) -> MoneyResult<StatementSummary> {
        let balance = self.calculate_balance(account, true, |_| true).await?;
        Ok(StatementSummary::new(account, statement, balance))
    }

    // Reports

    /// Incomes and expenses of the transactions accepted by `filter`
    pub async fn incomes_and_expenses<F>(&self, filter: F) -> MoneyResult<IncomesExpensesReport>
    where
        F: Fn(&Transaction) -> bool,
    {
        let categories = self.list_categories(None).await?;
        let accounts = self.list_accounts().await?;
        let contacts = self.list_contacts().await?;
        let transactions = self.list_transactions(None, None).await?;

        Ok(IncomesExpensesReport::build(
            &categories,
            &accounts,
            &contacts,
            &transactions,
            filter,
        ))
    }
}
