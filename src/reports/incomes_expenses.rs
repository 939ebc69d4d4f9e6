//! Incomes and expenses aggregation
//!
//! Transactions are grouped into a tree: category, then account, then
//! contact. Expenses are grouped by the credited side (where the money went),
//! incomes by the debited side (where it came from).

use bigdecimal::{BigDecimal, RoundingMode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::reconciliation::amount::AMOUNT_SCALE;
use crate::types::*;

/// Named node of the report tree with the summed amount below it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    pub name: String,
    pub amount: BigDecimal,
    pub children: Vec<ReportNode>,
}

impl ReportNode {
    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&ReportNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Sorted by lowercase name; grouped by exact name and identifier
type GroupKey = (String, String, Option<Uuid>);

#[derive(Default)]
struct Group {
    name: String,
    amount: BigDecimal,
    children: BTreeMap<GroupKey, Group>,
}

impl Group {
    fn add(&mut self, path: &[(String, Option<Uuid>)], amount: &BigDecimal) {
        self.amount += amount;
        if let Some(((name, uuid), rest)) = path.split_first() {
            self.children
                .entry((name.to_lowercase(), name.clone(), *uuid))
                .or_insert_with(|| Group {
                    name: name.clone(),
                    ..Group::default()
                })
                .add(rest, amount);
        }
    }

    fn into_node(self) -> ReportNode {
        ReportNode {
            name: self.name,
            amount: self.amount,
            children: self.children.into_values().map(Group::into_node).collect(),
        }
    }
}

struct Lookup<'a> {
    categories: HashMap<Uuid, &'a Category>,
    accounts: HashMap<Uuid, &'a Account>,
    contacts: HashMap<Uuid, &'a Contact>,
}

/// Income and expense trees for a set of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomesExpensesReport {
    pub incomes: ReportNode,
    pub expenses: ReportNode,
}

impl IncomesExpensesReport {
    /// Build both trees from the transactions accepted by `filter`
    pub fn build<F>(
        categories: &[Category],
        accounts: &[Account],
        contacts: &[Contact],
        transactions: &[Transaction],
        filter: F,
    ) -> Self
    where
        F: Fn(&Transaction) -> bool,
    {
        let lookup = Lookup {
            categories: categories.iter().map(|c| (c.uuid, c)).collect(),
            accounts: accounts.iter().map(|a| (a.uuid, a)).collect(),
            contacts: contacts.iter().map(|c| (c.uuid, c)).collect(),
        };
        let selected: Vec<&Transaction> = transactions.iter().filter(|t| filter(t)).collect();

        Self {
            incomes: build_tree("Incomes", CategoryType::Incomes, &lookup, &selected),
            expenses: build_tree("Expenses", CategoryType::Expenses, &lookup, &selected),
        }
    }

    pub fn income_total(&self) -> BigDecimal {
        self.incomes.amount.with_scale_round(AMOUNT_SCALE, RoundingMode::HalfUp)
    }

    pub fn expense_total(&self) -> BigDecimal {
        self.expenses.amount.with_scale_round(AMOUNT_SCALE, RoundingMode::HalfUp)
    }

    /// Incomes minus expenses
    pub fn balance(&self) -> BigDecimal {
        (&self.incomes.amount - &self.expenses.amount).with_scale_round(AMOUNT_SCALE, RoundingMode::HalfUp)
    }
}

fn build_tree(
    title: &str,
    kind: CategoryType,
    lookup: &Lookup<'_>,
    transactions: &[&Transaction],
) -> ReportNode {
    let mut root = Group {
        name: title.to_string(),
        ..Group::default()
    };

    for t in transactions {
        let (category_uuid, account_uuid) = match kind {
            CategoryType::Expenses => (t.account_credited_category_uuid, t.account_credited_uuid),
            _ => (t.account_debited_category_uuid, t.account_debited_uuid),
        };

        let Some(category) = lookup.categories.get(&category_uuid) else {
            tracing::warn!(transaction = %t.uuid, category = %category_uuid, "unknown category, skipped");
            continue;
        };
        if category.category_type != kind {
            continue;
        }
        let Some(account) = lookup.accounts.get(&account_uuid) else {
            tracing::warn!(transaction = %t.uuid, account = %account_uuid, "unknown account, skipped");
            continue;
        };
        let contact_name = t
            .contact_uuid
            .and_then(|uuid| lookup.contacts.get(&uuid))
            .map(|c| c.name.clone())
            .unwrap_or_default();

        root.add(
            &[
                (category.name.clone(), Some(category.uuid)),
                (account.name.clone(), Some(account.uuid)),
                (contact_name, None),
            ],
            &t.amount,
        );
    }

    root.into_node()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{AccountBuilder, TransactionBuilder};
    use chrono::NaiveDate;
    use std::str::FromStr;

    struct Fixture {
        categories: Vec<Category>,
        accounts: Vec<Account>,
        contacts: Vec<Contact>,
    }

    fn fixture() -> Fixture {
        let banks = Category::new("Banks", "", CategoryType::BanksAndCash);
        let food = Category::new("Food", "", CategoryType::Expenses);
        let auto = Category::new("Auto", "", CategoryType::Expenses);
        let salary = Category::new("Salary", "", CategoryType::Incomes);

        let account = |name: &str, c: &Category| {
            AccountBuilder::new(name, c.category_type, c.uuid).build().unwrap()
        };
        let accounts = vec![
            account("Card", &banks),
            account("Groceries", &food),
            account("Fuel", &auto),
            account("Employer", &salary),
        ];

        Fixture {
            categories: vec![banks, food, auto, salary],
            accounts,
            contacts: vec![Contact::new("Market")],
        }
    }

    fn pay(from: &Account, to: &Account, amount: &str, contact: Option<Uuid>) -> Transaction {
        TransactionBuilder::new()
            .date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .amount(BigDecimal::from_str(amount).unwrap())
            .debit_account(from)
            .credit_account(to)
            .contact(contact)
            .build()
            .unwrap()
    }

    #[test]
    fn test_tree_grouping_and_totals() {
        let f = fixture();
        let (card, groceries, fuel, employer) =
            (&f.accounts[0], &f.accounts[1], &f.accounts[2], &f.accounts[3]);
        let market = f.contacts[0].uuid;

        let transactions = vec![
            pay(card, groceries, "10.005", Some(market)),
            pay(card, groceries, "5", None),
            pay(card, fuel, "40", None),
            pay(employer, card, "100", None),
        ];

        let report = IncomesExpensesReport::build(
            &f.categories,
            &f.accounts,
            &f.contacts,
            &transactions,
            |_| true,
        );

        let names: Vec<&str> = report.expenses.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Auto", "Food"]);

        let food = report.expenses.child("Food").unwrap();
        let groceries_node = food.child("Groceries").unwrap();
        assert_eq!(groceries_node.children.len(), 2);
        assert_eq!(groceries_node.children[0].name, "");
        assert_eq!(groceries_node.child("Market").unwrap().amount, BigDecimal::from_str("10.005").unwrap());

        assert_eq!(report.expense_total().to_string(), "55.01");
        assert_eq!(report.income_total().to_string(), "100.00");
        assert_eq!(report.balance().to_string(), "45.00");
        assert_eq!(report.incomes.child("Salary").unwrap().child("Employer").unwrap().amount, BigDecimal::from(100));
    }

    #[test]
    fn test_filter_and_transfers_excluded() {
        let f = fixture();
        let card = &f.accounts[0];
        let groceries = &f.accounts[1];
        let transfer = pay(card, card, "1", None);
        let spent = pay(card, groceries, "2", None);

        let report = IncomesExpensesReport::build(
            &f.categories,
            &f.accounts,
            &f.contacts,
            &[transfer, spent.clone()],
            |t| t.uuid != spent.uuid,
        );

        assert!(report.expenses.children.is_empty());
        assert!(report.incomes.children.is_empty());
        assert_eq!(report.balance(), BigDecimal::from(0));
    }

    #[test]
    fn test_contacts_grouped_by_exact_name() {
        let mut f = fixture();
        let lower = Contact::new("market");
        f.contacts.push(lower.clone());
        let (card, groceries) = (&f.accounts[0], &f.accounts[1]);
        let upper = f.contacts[0].uuid;

        let transactions = vec![
            pay(card, groceries, "1", Some(upper)),
            pay(card, groceries, "2", Some(lower.uuid)),
        ];
        let report = IncomesExpensesReport::build(
            &f.categories,
            &f.accounts,
            &f.contacts,
            &transactions,
            |_| true,
        );

        let node = report.expenses.child("Food").unwrap().child("Groceries").unwrap();
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.child("Market").unwrap().amount, BigDecimal::from(1));
        assert_eq!(node.child("market").unwrap().amount, BigDecimal::from(2));
    }
}
