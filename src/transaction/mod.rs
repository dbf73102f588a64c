//! Transaction management for the expense tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The `TransactionForm` request body shared by the create and edit routes
//! - Database functions for storing, querying, and managing transactions
//! - Route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod list_endpoint;

pub use core::{
    Transaction, TransactionBuilder, create_transaction, create_transaction_table,
    list_transactions,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::{AmountInput, TransactionForm};
pub use list_endpoint::list_transactions_endpoint;

#[cfg(test)]
pub use core::{count_transactions, get_transaction};
