//! The client-side data layer.
//!
//! [ClientSession] and [TransactionSnapshot] hold what a front end shows, and
//! are kept current through the [SessionApi] and [TransactionApi] seams,
//! normally backed by [HttpSessionApi]. The [aggregation] and [filter]
//! modules turn a list of transactions into dashboard figures and table rows.

pub mod aggregation;
mod api;
mod dates;
pub mod filter;
mod session;

pub use aggregation::{Dashboard, TimeWindow};
pub use api::{ClientError, HttpSessionApi, SessionApi, TransactionApi};
pub use dates::parse_transaction_date;
pub use filter::{ExpenseFilter, SortOrder};
pub use session::{ClientSession, SessionView, TransactionSnapshot};
