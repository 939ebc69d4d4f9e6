//! Reconcile a small bank statement against an in-memory book

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use money_core::{
    utils::MemoryStorage, AccountBuilder, Category, CategoryType, MoneyBook, MoneyResult, Settings,
    Statement, StatementRecordBuilder, TransactionBuilder,
};
use std::path::Path;
use std::str::FromStr;

#[tokio::main]
async fn main() -> MoneyResult<()> {
    let settings = Settings::load(Path::new("money-settings.json"))?;
    let mut book = MoneyBook::new(MemoryStorage::new());

    let banks = Category::new("Banks", "", CategoryType::BanksAndCash);
    let food = Category::new("Food", "", CategoryType::Expenses);
    book.create_category(&banks).await?;
    book.create_category(&food).await?;

    let card = AccountBuilder::new("Card", CategoryType::BanksAndCash, banks.uuid)
        .account_number("4081 7810")
        .opening_balance(BigDecimal::from(500))
        .build()?;
    let groceries = AccountBuilder::new("Groceries", CategoryType::Expenses, food.uuid).build()?;
    book.create_account(&card).await?;
    book.create_account(&groceries).await?;

    let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap_or_default();
    for (on, amount) in [(3, "42.10"), (7, "18.00")] {
        let transaction = TransactionBuilder::new()
            .date(day(on))
            .amount(BigDecimal::from_str(amount).unwrap_or_default())
            .debit_account(&card)
            .credit_account(&groceries)
            .build()?;
        book.add_transaction(&transaction).await?;
    }

    let records = vec![
        StatementRecordBuilder::new()
            .actual(day(1))
            .execution(day(3))
            .description("SUPERMARKET")
            .amount("-42,10")
            .build(&[]),
        StatementRecordBuilder::new()
            .actual(day(8))
            .description("BAKERY")
            .amount("-18,00")
            .build(&[]),
    ];
    let mut statement = Statement::new("40817810", BigDecimal::from_str("439.90").unwrap_or_default(), records);

    let Some(account) = book.select_statement_account(&statement).await? else {
        println!("No account to reconcile against");
        return Ok(());
    };
    book.reconcile_statement(&mut statement, &account, settings.reconciliation.ignore_execution_date)
        .await?;

    for record in statement.records.iter_mut() {
        let matched = record.transactions().len();
        println!(
            "{:<12} {:>10} matched {}",
            record.description(),
            record.amount(),
            matched
        );
        if matched > 0 {
            book.check_statement_record(record, true).await?;
        }
    }

    let account = book.refresh_account_totals(account.uuid).await?;
    let summary = book.statement_summary(&account, &statement).await?;
    println!(
        "statement {} ledger {} difference {}",
        summary.statement_balance, summary.account_balance, summary.difference
    );

    Ok(())
}
