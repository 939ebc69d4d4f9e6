//! In-memory data cache
//!
//! Holds every record kind in memory and notifies subscribers about each
//! change, so views can re-query (for example re-run statement matching)
//! whenever the cached data moves.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

/// Kind of a cached record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Category,
    Currency,
    Contact,
    Account,
    Transaction,
}

/// Change notification published by [`MemoryStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Added(RecordKind, Uuid),
    Updated(RecordKind, Uuid),
    Removed(RecordKind, Uuid),
    Cleared,
}

type Table<T> = Arc<RwLock<HashMap<Uuid, T>>>;

/// In-memory storage implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    categories: Table<Category>,
    currencies: Table<Currency>,
    contacts: Table<Contact>,
    accounts: Table<Account>,
    transactions: Table<Transaction>,
    subscribers: Arc<Mutex<Vec<Sender<CacheEvent>>>>,
}

fn read<T>(lock: &RwLock<T>) -> MoneyResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|e| MoneyError::Storage(format!("cache lock poisoned: {}", e)))
}

fn write<T>(lock: &RwLock<T>) -> MoneyResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|e| MoneyError::Storage(format!("cache lock poisoned: {}", e)))
}

fn insert_new<T: Clone>(table: &Table<T>, uuid: Uuid, record: &T) -> MoneyResult<()> {
    let mut table = write(table)?;
    if table.contains_key(&uuid) {
        return Err(MoneyError::Validation(format!(
            "Record with ID '{}' already exists",
            uuid
        )));
    }
    table.insert(uuid, record.clone());
    Ok(())
}

fn replace_existing<T: Clone>(
    table: &Table<T>,
    uuid: Uuid,
    record: &T,
    not_found: fn(Uuid) -> MoneyError,
) -> MoneyResult<()> {
    let mut table = write(table)?;
    match table.get_mut(&uuid) {
        Some(existing) => {
            *existing = record.clone();
            Ok(())
        }
        None => Err(not_found(uuid)),
    }
}

fn remove_existing<T>(
    table: &Table<T>,
    uuid: Uuid,
    not_found: fn(Uuid) -> MoneyError,
) -> MoneyResult<()> {
    write(table)?
        .remove(&uuid)
        .map(|_| ())
        .ok_or_else(|| not_found(uuid))
}

fn get_cloned<T: Clone>(table: &Table<T>, uuid: Uuid) -> MoneyResult<Option<T>> {
    Ok(read(table)?.get(&uuid).cloned())
}

fn in_range(date: NaiveDate, start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> bool {
    start_date.is_none_or(|start| date >= start) && end_date.is_none_or(|end| date <= end)
}

fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.uuid.cmp(&b.uuid))
    });
}

impl MemoryStorage {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to change notifications
    ///
    /// Dropping the receiver unsubscribes on the next published event.
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        let (tx, rx) = mpsc::channel();
        match self.subscribers.lock() {
            Ok(mut subscribers) => subscribers.push(tx),
            Err(e) => tracing::warn!("subscriber list poisoned, subscription ignored: {}", e),
        }
        rx
    }

    /// Remove every record
    pub fn clear(&self) -> MoneyResult<()> {
        write(&self.categories)?.clear();
        write(&self.currencies)?.clear();
        write(&self.contacts)?.clear();
        write(&self.accounts)?.clear();
        write(&self.transactions)?.clear();
        self.publish(CacheEvent::Cleared);
        Ok(())
    }

    /// Number of cached transactions
    pub fn transaction_count(&self) -> MoneyResult<usize> {
        Ok(read(&self.transactions)?.len())
    }

    fn publish(&self, event: CacheEvent) {
        tracing::trace!(?event, "cache changed");
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}

#[async_trait]
impl MoneyStorage for MemoryStorage {
    async fn save_category(&mut self, category: &Category) -> MoneyResult<()> {
        insert_new(&self.categories, category.uuid, category)?;
        self.publish(CacheEvent::Added(RecordKind::Category, category.uuid));
        Ok(())
    }

    async fn get_category(&self, uuid: Uuid) -> MoneyResult<Option<Category>> {
        get_cloned(&self.categories, uuid)
    }

    async fn list_categories(&self, category_type: Option<CategoryType>) -> MoneyResult<Vec<Category>> {
        let mut categories: Vec<Category> = read(&self.categories)?
            .values()
            .filter(|c| category_type.is_none_or(|t| c.category_type == t))
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.name.to_lowercase());
        Ok(categories)
    }

    async fn update_category(&mut self, category: &Category) -> MoneyResult<()> {
        replace_existing(
            &self.categories,
            category.uuid,
            category,
            MoneyError::CategoryNotFound,
        )?;
        self.publish(CacheEvent::Updated(RecordKind::Category, category.uuid));
        Ok(())
    }

    async fn delete_category(&mut self, uuid: Uuid) -> MoneyResult<()> {
        remove_existing(&self.categories, uuid, MoneyError::CategoryNotFound)?;
        self.publish(CacheEvent::Removed(RecordKind::Category, uuid));
        Ok(())
    }

    async fn save_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        insert_new(&self.currencies, currency.uuid, currency)?;
        self.publish(CacheEvent::Added(RecordKind::Currency, currency.uuid));
        Ok(())
    }

    async fn get_currency(&self, uuid: Uuid) -> MoneyResult<Option<Currency>> {
        get_cloned(&self.currencies, uuid)
    }

    async fn list_currencies(&self) -> MoneyResult<Vec<Currency>> {
        let mut currencies: Vec<Currency> = read(&self.currencies)?.values().cloned().collect();
        currencies.sort_by_key(|c| c.symbol.to_lowercase());
        Ok(currencies)
    }

    async fn update_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        replace_existing(
            &self.currencies,
            currency.uuid,
            currency,
            MoneyError::CurrencyNotFound,
        )?;
        self.publish(CacheEvent::Updated(RecordKind::Currency, currency.uuid));
        Ok(())
    }

    async fn delete_currency(&mut self, uuid: Uuid) -> MoneyResult<()> {
        remove_existing(&self.currencies, uuid, MoneyError::CurrencyNotFound)?;
        self.publish(CacheEvent::Removed(RecordKind::Currency, uuid));
        Ok(())
    }

    async fn save_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        insert_new(&self.contacts, contact.uuid, contact)?;
        self.publish(CacheEvent::Added(RecordKind::Contact, contact.uuid));
        Ok(())
    }

    async fn get_contact(&self, uuid: Uuid) -> MoneyResult<Option<Contact>> {
        get_cloned(&self.contacts, uuid)
    }

    async fn list_contacts(&self) -> MoneyResult<Vec<Contact>> {
        let mut contacts: Vec<Contact> = read(&self.contacts)?.values().cloned().collect();
        contacts.sort_by_key(|c| c.name.to_lowercase());
        Ok(contacts)
    }

    async fn update_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        replace_existing(
            &self.contacts,
            contact.uuid,
            contact,
            MoneyError::ContactNotFound,
        )?;
        self.publish(CacheEvent::Updated(RecordKind::Contact, contact.uuid));
        Ok(())
    }

    async fn delete_contact(&mut self, uuid: Uuid) -> MoneyResult<()> {
        remove_existing(&self.contacts, uuid, MoneyError::ContactNotFound)?;
        self.publish(CacheEvent::Removed(RecordKind::Contact, uuid));
        Ok(())
    }

    async fn save_account(&mut self, account: &Account) -> MoneyResult<()> {
        insert_new(&self.accounts, account.uuid, account)?;
        self.publish(CacheEvent::Added(RecordKind::Account, account.uuid));
        Ok(())
    }

    async fn get_account(&self, uuid: Uuid) -> MoneyResult<Option<Account>> {
        get_cloned(&self.accounts, uuid)
    }

    async fn list_accounts(&self, account_type: Option<CategoryType>) -> MoneyResult<Vec<Account>> {
        let mut accounts: Vec<Account> = read(&self.accounts)?
            .values()
            .filter(|a| account_type.is_none_or(|t| a.account_type == t))
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.name.to_lowercase());
        Ok(accounts)
    }

    async fn update_account(&mut self, account: &Account) -> MoneyResult<()> {
        replace_existing(
            &self.accounts,
            account.uuid,
            account,
            MoneyError::AccountNotFound,
        )?;
        self.publish(CacheEvent::Updated(RecordKind::Account, account.uuid));
        Ok(())
    }

    async fn delete_account(&mut self, uuid: Uuid) -> MoneyResult<()> {
        remove_existing(&self.accounts, uuid, MoneyError::AccountNotFound)?;
        self.publish(CacheEvent::Removed(RecordKind::Account, uuid));
        Ok(())
    }

    async fn save_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        insert_new(&self.transactions, transaction.uuid, transaction)?;
        self.publish(CacheEvent::Added(RecordKind::Transaction, transaction.uuid));
        Ok(())
    }

    async fn get_transaction(&self, uuid: Uuid) -> MoneyResult<Option<Transaction>> {
        get_cloned(&self.transactions, uuid)
    }

    async fn list_transactions(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = read(&self.transactions)?
            .values()
            .filter(|t| in_range(t.date, start_date, end_date))
            .cloned()
            .collect();
        sort_transactions(&mut transactions);
        Ok(transactions)
    }

    async fn get_account_transactions(
        &self,
        account_uuid: Uuid,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> MoneyResult<Vec<Transaction>> {
        let mut transactions: Vec<Transaction> = read(&self.transactions)?
            .values()
            .filter(|t| t.touches_account(account_uuid))
            .filter(|t| in_range(t.date, start_date, end_date))
            .cloned()
            .collect();
        sort_transactions(&mut transactions);
        Ok(transactions)
    }

    async fn update_transaction(&mut self, transaction: &Transaction) -> MoneyResult<()> {
        replace_existing(
            &self.transactions,
            transaction.uuid,
            transaction,
            MoneyError::TransactionNotFound,
        )?;
        self.publish(CacheEvent::Updated(RecordKind::Transaction, transaction.uuid));
        Ok(())
    }

    async fn update_transactions(&mut self, transactions: &[Transaction]) -> MoneyResult<()> {
        {
            let mut table = write(&self.transactions)?;
            if let Some(missing) = transactions.iter().find(|t| !table.contains_key(&t.uuid)) {
                return Err(MoneyError::TransactionNotFound(missing.uuid));
            }
            for transaction in transactions {
                table.insert(transaction.uuid, transaction.clone());
            }
        }

        for transaction in transactions {
            self.publish(CacheEvent::Updated(RecordKind::Transaction, transaction.uuid));
        }
        Ok(())
    }

    async fn delete_transaction(&mut self, uuid: Uuid) -> MoneyResult<()> {
        remove_existing(&self.transactions, uuid, MoneyError::TransactionNotFound)?;
        self.publish(CacheEvent::Removed(RecordKind::Transaction, uuid));
        Ok(())
    }
}
