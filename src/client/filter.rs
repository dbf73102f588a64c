//! Filtering and sorting for the transaction table.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Transaction, client::dates::parse_transaction_date};

/// The direction the table is sorted by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    #[default]
    Desc,
}

/// The filters that can be applied to the transaction table.
///
/// The default filter keeps everything and sorts newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Free text matched against the amount, category, description and reference.
    pub search: String,
    /// Only keep transactions in exactly this category.
    pub category: Option<String>,
    /// Only keep transactions on or after this date.
    pub start_date: Option<Date>,
    /// Only keep transactions on or before this date.
    pub end_date: Option<Date>,
    /// The sort direction.
    pub sort_order: SortOrder,
}

impl ExpenseFilter {
    /// Whether `transaction` passes every filter.
    ///
    /// A transaction with an unreadable date fails any date bound.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.matches_search(transaction)
            && self
                .category
                .as_ref()
                .is_none_or(|category| *category == transaction.category)
            && self.matches_dates(parse_transaction_date(&transaction.date))
    }

    fn matches_search(&self, transaction: &Transaction) -> bool {
        let query = self.search.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        transaction.amount.to_string().contains(&query)
            || transaction.category.to_lowercase().contains(&query)
            || transaction.description.to_lowercase().contains(&query)
            || transaction
                .reference
                .as_ref()
                .is_some_and(|reference| reference.to_lowercase().contains(&query))
    }

    fn matches_dates(&self, date: Option<Date>) -> bool {
        if self.start_date.is_none() && self.end_date.is_none() {
            return true;
        }

        let Some(date) = date else {
            return false;
        };

        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
    }

    /// The transactions that pass the filter, sorted by date.
    ///
    /// Transactions with equal dates keep their original order, and
    /// unreadable dates sort last in either direction.
    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut kept: Vec<(Option<Date>, &Transaction)> = transactions
            .iter()
            .filter(|transaction| self.matches(transaction))
            .map(|transaction| (parse_transaction_date(&transaction.date), transaction))
            .collect();

        kept.sort_by(|(left, _), (right, _)| match (left, right) {
            (Some(left), Some(right)) => match self.sort_order {
                SortOrder::Asc => left.cmp(right),
                SortOrder::Desc => right.cmp(left),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });

        kept.into_iter()
            .map(|(_, transaction)| transaction.clone())
            .collect()
    }
}

/// The transactions shown in the table along with their total.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredTransactions {
    /// The filtered and sorted transactions.
    pub transactions: Vec<Transaction>,
    /// The sum of the filtered amounts.
    pub total: f64,
}

/// Apply `filter` to `transactions` and total the result.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &ExpenseFilter,
) -> FilteredTransactions {
    let transactions = filter.apply(transactions);
    let total = transactions.iter().map(|transaction| transaction.amount).sum();

    FilteredTransactions {
        transactions,
        total,
    }
}
