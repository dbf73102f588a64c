//! Client-side state for the logged in user and their transactions.

use time::Date;

use crate::{
    Transaction, UserData,
    client::{
        aggregation::{Dashboard, TimeWindow},
        api::{SessionApi, TransactionApi},
        filter::{ExpenseFilter, FilteredTransactions, filter_transactions},
    },
};

/// Whether the client is logged in, and as whom.
///
/// The session starts anonymous and is brought up to date with
/// [ClientSession::refresh].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientSession {
    is_logged_in: bool,
    user: Option<UserData>,
}

/// A read-only view of a [ClientSession].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionView<'a> {
    /// Whether the backend accepted the session.
    pub is_logged_in: bool,
    /// The user's data, if it could be loaded.
    pub user: Option<&'a UserData>,
}

impl ClientSession {
    /// An anonymous session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and refresh it straight away.
    pub async fn bootstrap(api: &impl SessionApi) -> Self {
        let mut session = Self::new();
        session.refresh(api).await;
        session
    }

    /// The current state of the session.
    pub fn read(&self) -> SessionView<'_> {
        SessionView {
            is_logged_in: self.is_logged_in,
            user: self.user.as_ref(),
        }
    }

    /// Ask the backend whether the session is still valid.
    ///
    /// If the auth check fails the session becomes anonymous. Otherwise the
    /// user's data is fetched, and if that fails the session stays logged in
    /// without user data.
    pub async fn refresh(&mut self, api: &impl SessionApi) {
        if let Err(error) = api.auth_state().await {
            tracing::debug!("Auth check failed, session is anonymous: {error}");
            self.log_out();
            return;
        }

        self.is_logged_in = true;
        self.user = match api.user_data().await {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::warn!("Could not load user data: {error}");
                None
            }
        };
    }

    /// Forget the logged in user.
    pub fn log_out(&mut self) {
        self.is_logged_in = false;
        self.user = None;
    }
}

/// The current user's transactions as last loaded from the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionSnapshot {
    transactions: Vec<Transaction>,
    error: Option<String>,
}

impl TransactionSnapshot {
    /// The message kept when the transactions could not be loaded.
    pub const LOAD_FAILED: &'static str = "Failed to load transactions";

    /// Load the transactions.
    ///
    /// A failed load gives an empty snapshot with an error message, never
    /// stale data.
    pub async fn load(api: &impl TransactionApi) -> Self {
        match api.list_transactions().await {
            Ok(transactions) => Self {
                transactions,
                error: None,
            },
            Err(error) => {
                tracing::warn!("{}: {error}", Self::LOAD_FAILED);
                Self {
                    transactions: Vec::new(),
                    error: Some(Self::LOAD_FAILED.to_owned()),
                }
            }
        }
    }

    /// The loaded transactions, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Why the last load failed, if it did.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Summarise the snapshot for `window` ending on `today`.
    pub fn dashboard(&self, window: TimeWindow, today: Date) -> Dashboard {
        Dashboard::new(&self.transactions, window, today)
    }

    /// Apply the table filter to the snapshot.
    pub fn filtered(&self, filter: &ExpenseFilter) -> FilteredTransactions {
        filter_transactions(&self.transactions, filter)
    }
}
