//! Transaction processing and management

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Transaction manager for handling transaction operations
pub struct TransactionManager<S: MoneyStorage> {
    pub(crate) storage: S,
    validator: Box<dyn TransactionValidator>,
}

impl<S: MoneyStorage> TransactionManager<S> {
    /// Create a new transaction manager
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Create a new transaction manager with custom validator
    pub fn with_validator(storage: S, validator: Box<dyn TransactionValidator>) -> Self {
        Self { storage, validator }
    }

    async fn ensure_accounts_exist(&self, transaction: &Transaction) -> MoneyResult<()> {
        for uuid in [
            transaction.account_debited_uuid,
            transaction.account_credited_uuid,
        ] {
            if self.storage.get_account(uuid).await?.is_none() {
                return Err(MoneyError::AccountNotFound(uuid));
            }
        }
        Ok(())
    }

    /// Record a new transaction
    pub async fn add_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        self.validator.validate_transaction(transaction)?;
        self.ensure_accounts_exist(transaction).await?;

        if let Some(parent_uuid) = transaction.parent_uuid {
            if self.storage.get_transaction(parent_uuid).await?.is_none() {
                return Err(MoneyError::TransactionNotFound(parent_uuid));
            }
        }

        tracing::debug!(uuid = %transaction.uuid, date = %transaction.date, "adding transaction");
        self.storage.save_transaction(transaction).await
    }

    /// Get a transaction by ID
    pub async fn get_transaction(&self, uuid: Uuid) -> MoneyResult<Option<Transaction>> {
        self.storage.get_transaction(uuid).await
    }

    /// Get a transaction by ID, returning an error if not found
    pub async fn get_transaction_required(&self, uuid: Uuid) -> MoneyResult<Transaction> {
        self.storage
            .get_transaction(uuid)
            .await?
            .ok_or(MoneyError::TransactionNotFound(uuid))
    }

    /// Get all transactions within a date range
    pub async fn list_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        self.storage.list_transactions(start_date, end_date).await
    }

    /// Get transactions for a specific account
    pub async fn get_account_transactions(
        &self,
        account_uuid: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        self.storage
            .get_account_transactions(account_uuid, start_date, end_date)
            .await
    }

    /// Detail transactions of a split parent
    pub async fn transaction_details(&self, parent_uuid: Uuid) -> MoneyResult<Vec<Transaction>> {
        Ok(self
            .storage
            .list_transactions(None, None)
            .await?
            .into_iter()
            .filter(|t| t.parent_uuid == Some(parent_uuid))
            .collect())
    }

    /// Replace a stored transaction with a rebuilt copy carrying the same uuid
    pub async fn update_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        self.get_transaction_required(transaction.uuid).await?;
        self.validator.validate_transaction(transaction)?;
        self.ensure_accounts_exist(transaction).await?;

        tracing::debug!(uuid = %transaction.uuid, "updating transaction");
        self.storage.update_transaction(transaction).await
    }

    /// Delete a transaction together with its detail transactions
    pub async fn delete_transaction(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.get_transaction_required(uuid).await?;

        for detail in self.transaction_details(uuid).await? {
            self.storage.delete_transaction(detail.uuid).await?;
        }

        tracing::debug!(%uuid, "deleting transaction");
        self.storage.delete_transaction(uuid).await
    }

    /// Set the checked flag on every given transaction
    ///
    /// The flag is applied to the stored copy, so edits made after
    /// `transactions` were read are kept. Rows already in the requested state
    /// are left untouched. Returns the current stored copies.
    pub async fn check_transactions(
        &mut self,
        transactions: &[Transaction],
        checked: bool,
    ) -> MoneyResult<Vec<Transaction>> {
        let mut current = Vec::with_capacity(transactions.len());
        let mut changed = Vec::new();
        for t in transactions {
            let stored = self.get_transaction_required(t.uuid).await?;
            if stored.checked == checked {
                current.push(stored);
            } else {
                let updated = stored.check(checked);
                changed.push(updated.clone());
                current.push(updated);
            }
        }

        if !changed.is_empty() {
            self.storage.update_transactions(&changed).await?;
        }
        tracing::debug!(count = changed.len(), skipped = current.len() - changed.len(), checked, "checked transactions");
        Ok(current)
    }
}

/// Builder for new transactions and for edited copies of existing ones
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    uuid: Option<Uuid>,
    amount: BigDecimal,
    credit_amount: Option<BigDecimal>,
    date: Option<NaiveDate>,
    transaction_type: TransactionType,
    comment: String,
    checked: bool,
    debited: Option<(Uuid, CategoryType, Uuid)>,
    credited: Option<(Uuid, CategoryType, Uuid)>,
    contact_uuid: Option<Uuid>,
    invoice_number: String,
    parent_uuid: Option<Uuid>,
    detailed: bool,
    statement_date: Option<NaiveDate>,
    created_at: Option<chrono::NaiveDateTime>,
}

impl From<&Transaction> for TransactionBuilder {
    fn from(t: &Transaction) -> Self {
        Self {
            uuid: Some(t.uuid),
            amount: t.amount.clone(),
            credit_amount: Some(t.credit_amount.clone()),
            date: Some(t.date),
            transaction_type: t.transaction_type,
            comment: t.comment.clone(),
            checked: t.checked,
            debited: Some((
                t.account_debited_uuid,
                t.account_debited_type,
                t.account_debited_category_uuid,
            )),
            credited: Some((
                t.account_credited_uuid,
                t.account_credited_type,
                t.account_credited_category_uuid,
            )),
            contact_uuid: t.contact_uuid,
            invoice_number: t.invoice_number.clone(),
            parent_uuid: t.parent_uuid,
            detailed: t.detailed,
            statement_date: Some(t.statement_date),
            created_at: Some(t.created_at),
        }
    }
}

impl TransactionBuilder {
    /// Start an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uuid(mut self, uuid: Uuid) -> Self {
        self.uuid = Some(uuid);
        self
    }

    pub fn amount(mut self, amount: BigDecimal) -> Self {
        self.amount = amount;
        self
    }

    /// Amount arriving at the credited side, defaults to `amount`
    pub fn credit_amount(mut self, amount: BigDecimal) -> Self {
        self.credit_amount = Some(amount);
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn transaction_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Set the debited side from raw identifiers
    pub fn account_debited(mut self, uuid: Uuid, account_type: CategoryType, category_uuid: Uuid) -> Self {
        self.debited = Some((uuid, account_type, category_uuid));
        self
    }

    /// Set the credited side from raw identifiers
    pub fn account_credited(mut self, uuid: Uuid, account_type: CategoryType, category_uuid: Uuid) -> Self {
        self.credited = Some((uuid, account_type, category_uuid));
        self
    }

    /// Money leaves this account
    pub fn debit_account(self, account: &Account) -> Self {
        self.account_debited(account.uuid, account.account_type, account.category_uuid)
    }

    /// Money arrives at this account
    pub fn credit_account(self, account: &Account) -> Self {
        self.account_credited(account.uuid, account.account_type, account.category_uuid)
    }

    pub fn contact(mut self, contact_uuid: Option<Uuid>) -> Self {
        self.contact_uuid = contact_uuid;
        self
    }

    pub fn invoice_number(mut self, invoice_number: impl Into<String>) -> Self {
        self.invoice_number = invoice_number.into();
        self
    }

    pub fn parent(mut self, parent_uuid: Option<Uuid>) -> Self {
        self.parent_uuid = parent_uuid;
        self
    }

    pub fn detailed(mut self, detailed: bool) -> Self {
        self.detailed = detailed;
        self
    }

    pub fn statement_date(mut self, statement_date: NaiveDate) -> Self {
        self.statement_date = Some(statement_date);
        self
    }

    /// Build the transaction
    pub fn build(self) -> MoneyResult<Transaction> {
        let date = self
            .date
            .ok_or_else(|| MoneyError::InvalidTransaction("Transaction date is required".to_string()))?;
        let (debited_uuid, debited_type, debited_category) = self.debited.ok_or_else(|| {
            MoneyError::InvalidTransaction("Debited account is required".to_string())
        })?;
        let (credited_uuid, credited_type, credited_category) = self.credited.ok_or_else(|| {
            MoneyError::InvalidTransaction("Credited account is required".to_string())
        })?;

        if self.amount < BigDecimal::from(0) {
            return Err(MoneyError::InvalidTransaction(
                "Transaction amount cannot be negative".to_string(),
            ));
        }

        let now = now();
        Ok(Transaction {
            uuid: self.uuid.unwrap_or_else(Uuid::new_v4),
            credit_amount: self.credit_amount.unwrap_or_else(|| self.amount.clone()),
            amount: self.amount,
            date,
            transaction_type: self.transaction_type,
            comment: self.comment.trim().to_string(),
            checked: self.checked,
            account_debited_uuid: debited_uuid,
            account_credited_uuid: credited_uuid,
            account_debited_type: debited_type,
            account_credited_type: credited_type,
            account_debited_category_uuid: debited_category,
            account_credited_category_uuid: credited_category,
            contact_uuid: self.contact_uuid,
            invoice_number: self.invoice_number.trim().to_string(),
            parent_uuid: self.parent_uuid,
            detailed: self.detailed,
            statement_date: self.statement_date.unwrap_or(date),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        })
    }
}

/// Balance of an account over the given transactions
///
/// Detail transactions are skipped since their parent already carries the
/// amount. Credits to the account add, debits subtract. With
/// `include_opening` the opening balance and the limit are the starting point.
pub fn calculate_balance<'a, I, F>(
    account: &Account,
    transactions: I,
    include_opening: bool,
    filter: F,
) -> BigDecimal
where
    I: IntoIterator<Item = &'a Transaction>,
    F: Fn(&Transaction) -> bool,
{
    let initial = if include_opening {
        &account.opening_balance + &account.account_limit
    } else {
        BigDecimal::from(0)
    };

    transactions
        .into_iter()
        .filter(|t| t.touches_account(account.uuid))
        .filter(|t| !t.is_detail())
        .filter(|t| filter(t))
        .fold(initial, |sum, t| {
            if t.account_credited_uuid == account.uuid {
                sum + &t.credit_amount
            } else {
                sum - &t.amount
            }
        })
}

/// Reusable transaction predicates
pub mod filters {
    use chrono::{Datelike, Days, Months};

    use super::*;

    /// Transactions touching the account on either side
    pub fn by_account(uuid: Uuid) -> impl Fn(&Transaction) -> bool {
        move |t| t.touches_account(uuid)
    }

    /// Transactions touching an account of the category on either side
    pub fn by_category(uuid: Uuid) -> impl Fn(&Transaction) -> bool {
        move |t| t.account_debited_category_uuid == uuid || t.account_credited_category_uuid == uuid
    }

    /// Transactions touching an account of the given type on either side
    pub fn by_category_type(category_type: CategoryType) -> impl Fn(&Transaction) -> bool {
        move |t| t.account_debited_type == category_type || t.account_credited_type == category_type
    }

    pub fn by_year(year: i32) -> impl Fn(&Transaction) -> bool {
        move |t| t.date.year() == year
    }

    pub fn by_month(year: i32, month: u32) -> impl Fn(&Transaction) -> bool {
        move |t| t.date.year() == year && t.date.month() == month
    }

    /// Inclusive date range
    pub fn by_dates(from: NaiveDate, to: NaiveDate) -> impl Fn(&Transaction) -> bool {
        move |t| t.date >= from && t.date <= to
    }

    pub fn by_contact(uuid: Uuid) -> impl Fn(&Transaction) -> bool {
        move |t| t.contact_uuid == Some(uuid)
    }

    pub fn unchecked() -> impl Fn(&Transaction) -> bool {
        |t| !t.checked
    }

    /// Relative period evaluated against an explicit current date
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Period {
        All,
        CurrentYear,
        CurrentMonth,
        CurrentWeek,
        LastYear,
        LastQuarter,
        LastMonth,
    }

    impl Period {
        pub fn matches(&self, transaction: &Transaction, today: NaiveDate) -> bool {
            let date = transaction.date;
            let since = |from: Option<NaiveDate>| {
                date >= from.unwrap_or(NaiveDate::MIN) && date <= today
            };

            match self {
                Period::All => true,
                Period::CurrentYear => date.year() == today.year(),
                Period::CurrentMonth => date.year() == today.year() && date.month() == today.month(),
                Period::CurrentWeek => since(
                    today.checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday()))),
                ),
                Period::LastYear => since(today.checked_sub_months(Months::new(12))),
                Period::LastQuarter => since(today.checked_sub_months(Months::new(3))),
                Period::LastMonth => since(today.checked_sub_months(Months::new(1))),
            }
        }

        pub fn predicate(self, today: NaiveDate) -> impl Fn(&Transaction) -> bool {
            move |t| self.matches(t, today)
        }
    }
}
