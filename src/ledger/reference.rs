//! Categories, currencies and contacts

use uuid::Uuid;

use crate::traits::*;
use crate::types::*;

fn require_name(kind: &str, name: &str) -> MoneyResult<()> {
    if name.trim().is_empty() {
        return Err(MoneyError::Validation(format!("{} name cannot be empty", kind)));
    }
    Ok(())
}

/// Manager for the reference records accounts and transactions point to
pub struct ReferenceDataManager<S: MoneyStorage> {
    pub(crate) storage: S,
}

impl<S: MoneyStorage> ReferenceDataManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    // Categories

    pub async fn create_category(&mut self, category: &Category) -> MoneyResult<()> {
        require_name("Category", &category.name)?;
        self.storage.save_category(category).await
    }

    pub async fn get_category(&self, uuid: Uuid) -> MoneyResult<Option<Category>> {
        self.storage.get_category(uuid).await
    }

    pub async fn list_categories(&self, category_type: Option<CategoryType>) -> MoneyResult<Vec<Category>> {
        self.storage.list_categories(category_type).await
    }

    /// Update a category; its type is fixed once accounts use it
    pub async fn update_category(&mut self, category: &Category) -> MoneyResult<()> {
        require_name("Category", &category.name)?;
        let existing = self
            .storage
            .get_category(category.uuid)
            .await?
            .ok_or(MoneyError::CategoryNotFound(category.uuid))?;

        if existing.category_type != category.category_type && self.category_in_use(category.uuid).await? {
            return Err(MoneyError::Validation(format!(
                "Category '{}' has accounts, its type cannot change",
                existing.name
            )));
        }

        self.storage.update_category(category).await
    }

    pub async fn delete_category(&mut self, uuid: Uuid) -> MoneyResult<()> {
        if self.category_in_use(uuid).await? {
            return Err(MoneyError::Validation(format!(
                "Category '{}' has accounts",
                uuid
            )));
        }
        tracing::debug!(%uuid, "deleting category");
        self.storage.delete_category(uuid).await
    }

    async fn category_in_use(&self, uuid: Uuid) -> MoneyResult<bool> {
        Ok(self
            .storage
            .list_accounts(None)
            .await?
            .iter()
            .any(|a| a.category_uuid == uuid))
    }

    // Currencies

    pub async fn create_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        require_name("Currency", &currency.symbol)?;
        self.storage.save_currency(currency).await
    }

    pub async fn get_currency(&self, uuid: Uuid) -> MoneyResult<Option<Currency>> {
        self.storage.get_currency(uuid).await
    }

    pub async fn list_currencies(&self) -> MoneyResult<Vec<Currency>> {
        self.storage.list_currencies().await
    }

    /// First currency flagged as default
    pub async fn default_currency(&self) -> MoneyResult<Option<Currency>> {
        Ok(self
            .storage
            .list_currencies()
            .await?
            .into_iter()
            .find(|c| c.is_default))
    }

    pub async fn update_currency(&mut self, currency: &Currency) -> MoneyResult<()> {
        require_name("Currency", &currency.symbol)?;
        self.storage.update_currency(currency).await
    }

    pub async fn delete_currency(&mut self, uuid: Uuid) -> MoneyResult<()> {
        let in_use = self
            .storage
            .list_accounts(None)
            .await?
            .iter()
            .any(|a| a.currency_uuid == Some(uuid));
        if in_use {
            return Err(MoneyError::Validation(format!(
                "Currency '{}' is used by accounts",
                uuid
            )));
        }
        tracing::debug!(%uuid, "deleting currency");
        self.storage.delete_currency(uuid).await
    }

    // Contacts

    pub async fn create_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        require_name("Contact", &contact.name)?;
        self.storage.save_contact(contact).await
    }

    pub async fn get_contact(&self, uuid: Uuid) -> MoneyResult<Option<Contact>> {
        self.storage.get_contact(uuid).await
    }

    pub async fn list_contacts(&self) -> MoneyResult<Vec<Contact>> {
        self.storage.list_contacts().await
    }

    pub async fn update_contact(&mut self, contact: &Contact) -> MoneyResult<()> {
        require_name("Contact", &contact.name)?;
        self.storage.update_contact(contact).await
    }

    pub async fn delete_contact(&mut self, uuid: Uuid) -> MoneyResult<()> {
        self.storage.delete_contact(uuid).await
    }
}
