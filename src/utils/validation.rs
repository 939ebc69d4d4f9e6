//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal) -> MoneyResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(MoneyError::Validation(
            "Amount cannot be negative".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that a record name is present and not too long
pub fn validate_name(kind: &str, name: &str) -> MoneyResult<()> {
    if name.trim().is_empty() {
        return Err(MoneyError::Validation(format!(
            "{} name cannot be empty",
            kind
        )));
    }

    if name.chars().count() > 100 {
        return Err(MoneyError::Validation(format!(
            "{} name cannot exceed 100 characters",
            kind
        )));
    }

    Ok(())
}

/// Validate a bank account number as printed on statements
///
/// Empty is allowed. Otherwise only alphanumerics, spaces and dashes.
pub fn validate_account_number(number: &str) -> MoneyResult<()> {
    if !number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-')
    {
        return Err(MoneyError::Validation(format!(
            "Account number '{}' can only contain letters, digits, spaces and dashes",
            number
        )));
    }

    Ok(())
}

/// Validate a free-form comment
pub fn validate_comment(comment: &str) -> MoneyResult<()> {
    if comment.chars().count() > 500 {
        return Err(MoneyError::Validation(
            "Comment cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Stricter transaction validator
pub struct EnhancedTransactionValidator;

impl TransactionValidator for EnhancedTransactionValidator {
    fn validate_transaction(&self, transaction: &Transaction) -> MoneyResult<()> {
        DefaultTransactionValidator.validate_transaction(transaction)?;

        validate_non_negative_amount(&transaction.credit_amount)?;
        validate_comment(&transaction.comment)?;

        if transaction.account_debited_uuid == transaction.account_credited_uuid {
            return Err(MoneyError::InvalidTransaction(format!(
                "Account '{}' cannot be debited and credited in the same transaction",
                transaction.account_debited_uuid
            )));
        }

        Ok(())
    }
}

/// Stricter account validator
pub struct EnhancedAccountValidator;

impl AccountValidator for EnhancedAccountValidator {
    fn validate_account(&self, account: &Account) -> MoneyResult<()> {
        validate_name("Account", &account.name)?;
        validate_account_number(&account.account_number)?;
        validate_comment(&account.comment)?;

        if account.currency_rate <= BigDecimal::from(0) {
            return Err(MoneyError::Validation(
                "Currency rate must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountBuilder, TransactionBuilder};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn account(name: &str) -> Account {
        AccountBuilder::new(name, CategoryType::BanksAndCash, Uuid::new_v4())
            .account_number("DE89 3704-0044")
            .build()
            .unwrap()
    }

    #[test]
    fn test_account_rules() {
        assert!(EnhancedAccountValidator.validate_account(&account("Card")).is_ok());

        let bad_number = AccountBuilder::from(&account("Card"))
            .account_number("12/34")
            .build()
            .unwrap();
        assert!(EnhancedAccountValidator.validate_account(&bad_number).is_err());

        let zero_rate = AccountBuilder::from(&account("Card"))
            .currency_rate(BigDecimal::from(0))
            .build()
            .unwrap();
        assert!(EnhancedAccountValidator.validate_account(&zero_rate).is_err());

        assert!(validate_name("Account", &"x".repeat(101)).is_err());
    }

    #[test]
    fn test_same_account_on_both_sides_rejected() {
        let card = account("Card");
        let transfer = TransactionBuilder::new()
            .date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .amount(BigDecimal::from(5))
            .debit_account(&card)
            .credit_account(&card)
            .build()
            .unwrap();

        assert!(DefaultTransactionValidator.validate_transaction(&transfer).is_ok());
        assert!(matches!(
            EnhancedTransactionValidator.validate_transaction(&transfer),
            Err(MoneyError::InvalidTransaction(_))
        ));
    }
}
