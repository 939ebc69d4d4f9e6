//! Integration tests for money-core

use money_core::{
    filters::{self, Period},
    utils::{CacheEvent, EnhancedAccountValidator, EnhancedTransactionValidator, MemoryStorage, RecordKind},
    Account, AccountBuilder, Category, CategoryType, Contact, Currency, MoneyBook, MoneyError,
    Settings, Statement, StatementRecordBuilder, TransactionBuilder,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::str::FromStr;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn amount(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

struct Book {
    book: MoneyBook<MemoryStorage>,
    card: Account,
    cash: Account,
    groceries: Account,
    employer: Account,
    usd: Currency,
}

async fn standard_book(storage: MemoryStorage) -> Book {
    let mut book = MoneyBook::new(storage);

    let usd = Currency::new("USD", "US Dollar").as_default();
    book.create_currency(&usd).await.unwrap();

    let banks = Category::new("Banks", "", CategoryType::BanksAndCash);
    let food = Category::new("Food", "", CategoryType::Expenses);
    let salary = Category::new("Salary", "", CategoryType::Incomes);
    for category in [&banks, &food, &salary] {
        book.create_category(category).await.unwrap();
    }

    let card = AccountBuilder::new("Visa card", CategoryType::BanksAndCash, banks.uuid)
        .account_number("4081 7810 0001")
        .opening_balance(amount("1000"))
        .currency(Some(usd.uuid))
        .build()
        .unwrap();
    let cash = AccountBuilder::new("cash", CategoryType::BanksAndCash, banks.uuid)
        .build()
        .unwrap();
    let groceries = AccountBuilder::new("Groceries", CategoryType::Expenses, food.uuid)
        .build()
        .unwrap();
    let employer = AccountBuilder::new("ACME", CategoryType::Incomes, salary.uuid)
        .build()
        .unwrap();
    for account in [&card, &cash, &groceries, &employer] {
        book.create_account(account).await.unwrap();
    }

    Book {
        book,
        card,
        cash,
        groceries,
        employer,
        usd,
    }
}

#[tokio::test]
async fn test_complete_statement_workflow() {
    let mut b = standard_book(MemoryStorage::new()).await;
    let market = Contact::new("Corner market");
    b.book.create_contact(&market).await.unwrap();

    let purchase = TransactionBuilder::new()
        .date(date(2024, 3, 3))
        .amount(amount("100"))
        .debit_account(&b.card)
        .credit_account(&b.groceries)
        .contact(Some(market.uuid))
        .build()
        .unwrap();
    let wrong_day = TransactionBuilder::new()
        .date(date(2024, 3, 2))
        .amount(amount("100"))
        .debit_account(&b.card)
        .credit_account(&b.groceries)
        .build()
        .unwrap();
    let salary = TransactionBuilder::new()
        .date(date(2024, 3, 5))
        .amount(amount("2500"))
        .debit_account(&b.employer)
        .credit_account(&b.card)
        .build()
        .unwrap();
    for t in [&purchase, &wrong_day, &salary] {
        b.book.add_transaction(t).await.unwrap();
    }

    let currencies = b.book.list_currencies().await.unwrap();
    let records = vec![
        StatementRecordBuilder::new()
            .actual(date(2024, 3, 1))
            .execution(date(2024, 3, 3))
            .description("CORNER MARKET")
            .currency("usd")
            .amount("-100,00")
            .build(&currencies),
        StatementRecordBuilder::new()
            .actual(date(2024, 3, 5))
            .description("SALARY")
            .currency("US Dollar")
            .amount("2\u{a0}500.00")
            .build(&currencies),
    ];
    let mut statement = Statement::new("408178100001", amount("3300"), records);
    assert_eq!(statement.records[1].currency_uuid(), Some(b.usd.uuid));

    let account = b
        .book
        .select_statement_account(&statement)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.uuid, b.card.uuid);

    let settings = Settings::default();
    b.book
        .reconcile_statement(&mut statement, &account, settings.reconciliation.ignore_execution_date)
        .await
        .unwrap();

    // Newest record first
    assert_eq!(statement.records[0].description(), "SALARY");
    assert_eq!(statement.records[0].transactions()[0].uuid, salary.uuid);
    let purchase_record = &statement.records[1];
    assert_eq!(purchase_record.transactions().len(), 1);
    assert_eq!(purchase_record.transactions()[0].uuid, purchase.uuid);

    for record in statement.records.iter_mut() {
        b.book.check_statement_record(record, true).await.unwrap();
    }
    assert!(statement.records.iter().all(|r| r.is_fully_checked()));
    assert!(!b.book.get_transaction(wrong_day.uuid).await.unwrap().unwrap().checked);

    let card = b.book.refresh_account_totals(b.card.uuid).await.unwrap();
    assert_eq!(card.total, amount("2300"));
    assert_eq!(card.total_waiting, amount("-100"));

    let summary = b.book.statement_summary(&card, &statement).await.unwrap();
    assert_eq!(summary.matched_records, 2);
    assert_eq!(summary.unmatched_records, 0);
    assert_eq!(summary.checked_records, 2);
    assert!(summary.is_balanced());
}

#[tokio::test]
async fn test_execution_date_window() {
    let mut b = standard_book(MemoryStorage::new()).await;
    let on_execution = TransactionBuilder::new()
        .date(date(2024, 3, 3))
        .amount(amount("100"))
        .debit_account(&b.card)
        .credit_account(&b.groceries)
        .build()
        .unwrap();
    let refund = TransactionBuilder::new()
        .date(date(2024, 3, 3))
        .amount(amount("100"))
        .debit_account(&b.groceries)
        .credit_account(&b.card)
        .build()
        .unwrap();
    b.book.add_transaction(&on_execution).await.unwrap();
    b.book.add_transaction(&refund).await.unwrap();

    let record = |value: &str| {
        StatementRecordBuilder::new()
            .actual(date(2024, 3, 1))
            .execution(date(2024, 3, 3))
            .amount(value)
            .build(&[])
    };
    let card = b.card.clone();

    let mut statement = Statement::new("", amount("0"), vec![record("-100.00")]);
    b.book.reconcile_statement(&mut statement, &card, false).await.unwrap();
    let matched: Vec<_> = statement.records[0].transactions().iter().map(|t| t.uuid).collect();
    assert_eq!(matched, vec![on_execution.uuid]);

    b.book.reconcile_statement(&mut statement, &card, true).await.unwrap();
    assert!(!statement.records[0].is_matched());

    let mut inflow = Statement::new("", amount("0"), vec![record("50.00")]);
    b.book.reconcile_statement(&mut inflow, &card, false).await.unwrap();
    let matched: Vec<_> = inflow.records[0].transactions().iter().map(|t| t.uuid).collect();
    assert_eq!(matched, vec![refund.uuid]);
}

#[tokio::test]
async fn test_statement_account_fallback() {
    let mut b = standard_book(MemoryStorage::new()).await;

    let statement = Statement::new("0000", amount("0"), Vec::new());
    let proposed = b.book.select_statement_account(&statement).await.unwrap().unwrap();
    assert_eq!(proposed.uuid, b.cash.uuid);

    b.book.enable_account(b.cash.uuid, false).await.unwrap();
    b.book.enable_account(b.card.uuid, false).await.unwrap();
    assert!(b.book.select_statement_account(&statement).await.unwrap().is_none());

    let by_number = Statement::new("4081 78100001", amount("0"), Vec::new());
    assert!(b.book.select_statement_account(&by_number).await.unwrap().is_none());
}

#[tokio::test]
async fn test_transaction_validation() {
    let mut book = MoneyBook::with_validators(
        MemoryStorage::new(),
        Box::new(EnhancedAccountValidator),
        Box::new(EnhancedTransactionValidator),
    );
    let banks = Category::new("Banks", "", CategoryType::BanksAndCash);
    book.create_category(&banks).await.unwrap();

    let card = AccountBuilder::new("Card", CategoryType::BanksAndCash, banks.uuid)
        .build()
        .unwrap();
    book.create_account(&card).await.unwrap();

    let bad_number = AccountBuilder::new("Savings", CategoryType::BanksAndCash, banks.uuid)
        .account_number("12/34")
        .build()
        .unwrap();
    assert!(matches!(
        book.create_account(&bad_number).await,
        Err(MoneyError::Validation(_))
    ));

    let wrong_type = AccountBuilder::new("Loan", CategoryType::Debts, banks.uuid)
        .build()
        .unwrap();
    assert!(book.create_account(&wrong_type).await.is_err());

    let to_itself = TransactionBuilder::new()
        .date(date(2024, 1, 1))
        .amount(amount("10"))
        .debit_account(&card)
        .credit_account(&card)
        .build()
        .unwrap();
    assert!(matches!(
        book.add_transaction(&to_itself).await,
        Err(MoneyError::InvalidTransaction(_))
    ));

    let missing_side = TransactionBuilder::new()
        .date(date(2024, 1, 1))
        .amount(amount("10"))
        .debit_account(&card)
        .build();
    assert!(missing_side.is_err());
}

#[tokio::test]
async fn test_deletion_rules() {
    let mut b = standard_book(MemoryStorage::new()).await;

    let parent = TransactionBuilder::new()
        .date(date(2024, 2, 1))
        .amount(amount("30"))
        .debit_account(&b.card)
        .credit_account(&b.groceries)
        .detailed(true)
        .build()
        .unwrap();
    let detail = TransactionBuilder::new()
        .date(date(2024, 2, 1))
        .amount(amount("10"))
        .debit_account(&b.card)
        .credit_account(&b.groceries)
        .parent(Some(parent.uuid))
        .build()
        .unwrap();
    b.book.add_transaction(&parent).await.unwrap();
    b.book.add_transaction(&detail).await.unwrap();

    // Details never count twice
    let balance = b.book.calculate_balance(&b.card, false, |_| true).await.unwrap();
    assert_eq!(balance, amount("-30"));

    assert!(b.book.delete_account(b.groceries.uuid).await.is_err());

    b.book.delete_transaction(parent.uuid).await.unwrap();
    assert!(b.book.get_transaction(detail.uuid).await.unwrap().is_none());
    assert!(b.book.list_transactions(None, None).await.unwrap().is_empty());

    b.book.delete_account(b.groceries.uuid).await.unwrap();
    assert!(b.book.get_account(b.groceries.uuid).await.unwrap().is_none());
}

#[tokio::test]
async fn test_incomes_and_expenses_report() {
    let mut b = standard_book(MemoryStorage::new()).await;
    let today = date(2024, 3, 20);

    let entries = [
        (date(2024, 3, 2), &b.employer, &b.card, "1500.005"),
        (date(2024, 3, 10), &b.card, &b.groceries, "120.50"),
        (date(2024, 3, 12), &b.cash, &b.groceries, "9.495"),
        (date(2023, 12, 30), &b.card, &b.groceries, "999"),
    ];
    for (on, from, to, value) in entries {
        let t = TransactionBuilder::new()
            .date(on)
            .amount(amount(value))
            .debit_account(from)
            .credit_account(to)
            .build()
            .unwrap();
        b.book.add_transaction(&t).await.unwrap();
    }

    let report = b
        .book
        .incomes_and_expenses(Period::CurrentMonth.predicate(today))
        .await
        .unwrap();

    assert_eq!(report.income_total(), amount("1500.01"));
    assert_eq!(report.expense_total(), amount("130.00"));
    assert_eq!(report.balance(), amount("1370.01"));

    let food = report.expenses.child("Food").unwrap();
    assert_eq!(food.child("Groceries").unwrap().amount, amount("129.995"));
    assert_eq!(report.incomes.child("Salary").unwrap().children[0].name, "ACME");

    let last_year = b
        .book
        .incomes_and_expenses(filters::by_year(2023))
        .await
        .unwrap();
    assert_eq!(last_year.expense_total(), amount("999"));
    assert!(last_year.incomes.children.is_empty());
}

#[tokio::test]
async fn test_memory_storage_events() {
    let storage = MemoryStorage::new();
    let events = storage.subscribe();
    let b = standard_book(storage.clone()).await;

    let received: Vec<CacheEvent> = events.try_iter().collect();
    assert!(received.contains(&CacheEvent::Added(RecordKind::Currency, b.usd.uuid)));
    assert!(received.contains(&CacheEvent::Added(RecordKind::Account, b.card.uuid)));

    storage.clear().unwrap();
    assert_eq!(events.try_recv().unwrap(), CacheEvent::Cleared);
    assert!(b.book.list_accounts().await.unwrap().is_empty());
}
