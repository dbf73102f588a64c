//! Spending summaries for the dashboard.
//!
//! Everything here is a pure function of the transactions and the current
//! date, so callers decide what "today" means, e.g. with
//! [local_today](crate::local_today).

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, Weekday};

use crate::{Transaction, client::dates::parse_transaction_date};

/// The colours assigned to categories, by position.
pub const PALETTE: [&str; 6] = [
    "#6366f1", "#8b5cf6", "#ec4899", "#f43f5e", "#f97316", "#eab308",
];

/// The span of time a summary covers, ending today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeWindow {
    /// Every transaction, including those with unreadable dates.
    #[default]
    #[serde(rename = "all")]
    All,
    /// Transactions dated today.
    #[serde(rename = "today")]
    Today,
    /// The last 7 days.
    #[serde(rename = "week")]
    Week,
    /// The last 14 days.
    #[serde(rename = "2weeks")]
    TwoWeeks,
    /// The last 21 days.
    #[serde(rename = "3weeks")]
    ThreeWeeks,
    /// Since the same day last month.
    #[serde(rename = "month")]
    Month,
    /// Since the same day two months ago.
    #[serde(rename = "2months")]
    TwoMonths,
    /// Since the same day three months ago.
    #[serde(rename = "3months")]
    ThreeMonths,
    /// Since the same day six months ago.
    #[serde(rename = "6months")]
    SixMonths,
    /// Since the first of January.
    #[serde(rename = "year")]
    Year,
}

impl TimeWindow {
    /// The earliest date included in the window, or `None` for [TimeWindow::All].
    pub fn cutoff(self, today: Date) -> Option<Date> {
        let cutoff = match self {
            TimeWindow::All => return None,
            TimeWindow::Today => Some(today),
            TimeWindow::Week => today.checked_sub(Duration::days(7)),
            TimeWindow::TwoWeeks => today.checked_sub(Duration::days(14)),
            TimeWindow::ThreeWeeks => today.checked_sub(Duration::days(21)),
            TimeWindow::Month => months_before(today, 1),
            TimeWindow::TwoMonths => months_before(today, 2),
            TimeWindow::ThreeMonths => months_before(today, 3),
            TimeWindow::SixMonths => months_before(today, 6),
            TimeWindow::Year => Date::from_calendar_date(today.year(), Month::January, 1).ok(),
        };

        Some(cutoff.unwrap_or(Date::MIN))
    }

    /// Whether a transaction dated `date` falls inside the window.
    ///
    /// Unreadable dates are only inside [TimeWindow::All].
    pub fn contains(self, date: Option<Date>, today: Date) -> bool {
        match (self, date) {
            (TimeWindow::All, _) => true,
            (_, None) => false,
            (TimeWindow::Today, Some(date)) => date == today,
            (window, Some(date)) => window.cutoff(today).is_none_or(|cutoff| date >= cutoff),
        }
    }
}

/// Step back whole calendar months, clamping the day to the end of the month.
///
/// For example, one month before 31 March is 28 (or 29) February.
fn months_before(date: Date, months: i32) -> Option<Date> {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months;
    let year = index.div_euclid(12);
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;

    // Every month has at least 28 days.
    (28..=date.day().max(28))
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day.min(date.day())).ok())
}

/// The transactions that fall inside `window`, in their original order.
pub fn filter_by_window(
    transactions: &[Transaction],
    window: TimeWindow,
    today: Date,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| window.contains(parse_transaction_date(&transaction.date), today))
        .cloned()
        .collect()
}

/// The sum of the transaction amounts.
pub fn total_spent(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|transaction| transaction.amount).sum()
}

/// How much was spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category name as entered on the transactions.
    pub name: String,
    /// The sum of the amounts in the category.
    pub value: f64,
    /// The number of transactions in the category.
    pub count: usize,
    /// The category's share of all spending, from 0 to 100.
    pub percentage: f64,
    /// The display colour taken from [PALETTE].
    pub color: &'static str,
}

impl CategoryTotal {
    /// The percentage rounded to one decimal place, e.g. "33.3".
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

/// Group spending by category, in the order each category first appears.
///
/// Percentages are zero when nothing was spent.
pub fn totals_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions {
        match totals
            .iter_mut()
            .find(|total| total.name == transaction.category)
        {
            Some(total) => {
                total.value += transaction.amount;
                total.count += 1;
            }
            None => totals.push(CategoryTotal {
                name: transaction.category.clone(),
                value: transaction.amount,
                count: 1,
                percentage: 0.0,
                color: PALETTE[totals.len() % PALETTE.len()],
            }),
        }
    }

    let grand_total = total_spent(transactions);
    if grand_total != 0.0 {
        for total in &mut totals {
            total.percentage = total.value / grand_total * 100.0;
        }
    }

    totals
}

/// How much was spent on one day of the week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekdayTotal {
    /// The day of the week.
    pub weekday: Weekday,
    /// The sum of the amounts spent on that day.
    pub value: f64,
}

impl WeekdayTotal {
    /// The English name of the day, e.g. "Monday".
    pub fn name(&self) -> String {
        self.weekday.to_string()
    }
}

/// Group spending by day of the week, in the order each day first appears.
///
/// Transactions with unreadable dates are left out.
pub fn totals_by_weekday(transactions: &[Transaction]) -> Vec<WeekdayTotal> {
    let mut totals: Vec<WeekdayTotal> = Vec::new();

    for transaction in transactions {
        let Some(weekday) = parse_transaction_date(&transaction.date).map(|date| date.weekday())
        else {
            continue;
        };

        match totals.iter_mut().find(|total| total.weekday == weekday) {
            Some(total) => total.value += transaction.amount,
            None => totals.push(WeekdayTotal {
                weekday,
                value: transaction.amount,
            }),
        }
    }

    totals
}

/// The figures shown on the dashboard for one time window.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    /// The window the figures cover.
    pub window: TimeWindow,
    /// The transactions inside the window.
    pub transactions: Vec<Transaction>,
    /// The total spent inside the window.
    pub total_spent: f64,
    /// Spending per category.
    pub categories: Vec<CategoryTotal>,
    /// Spending per day of the week.
    pub weekdays: Vec<WeekdayTotal>,
}

impl Dashboard {
    /// Summarise `transactions` for `window` ending on `today`.
    pub fn new(transactions: &[Transaction], window: TimeWindow, today: Date) -> Self {
        let transactions = filter_by_window(transactions, window, today);

        Self {
            window,
            total_spent: total_spent(&transactions),
            categories: totals_by_category(&transactions),
            weekdays: totals_by_weekday(&transactions),
            transactions,
        }
    }

    /// The number of transactions inside the window.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }
}

#[cfg(test)]
mod aggregation_tests {
    use time::{Weekday, macros::date};

    use crate::{Transaction, TransactionId, UserID};

    use super::{
        Dashboard, PALETTE, TimeWindow, filter_by_window, months_before, totals_by_category,
        totals_by_weekday,
    };

    fn transaction(id: TransactionId, amount: f64, category: &str, date: &str) -> Transaction {
        Transaction {
            id,
            user_id: UserID::new(1),
            amount,
            category: category.to_owned(),
            reference: None,
            description: format!("transaction {id}"),
            date: date.to_owned(),
        }
    }

    fn ids(transactions: &[Transaction]) -> Vec<TransactionId> {
        transactions.iter().map(|transaction| transaction.id).collect()
    }

    #[test]
    fn month_arithmetic_clamps_to_month_end() {
        assert_eq!(months_before(date!(2025 - 03 - 31), 1), Some(date!(2025 - 02 - 28)));
        assert_eq!(months_before(date!(2024 - 03 - 31), 1), Some(date!(2024 - 02 - 29)));
        assert_eq!(months_before(date!(2025 - 01 - 15), 2), Some(date!(2024 - 11 - 15)));
        assert_eq!(months_before(date!(2025 - 08 - 31), 6), Some(date!(2025 - 02 - 28)));
    }

    #[test]
    fn window_cutoffs() {
        let today = date!(2025 - 06 - 15);

        assert_eq!(TimeWindow::All.cutoff(today), None);
        assert_eq!(TimeWindow::Today.cutoff(today), Some(today));
        assert_eq!(TimeWindow::Week.cutoff(today), Some(date!(2025 - 06 - 08)));
        assert_eq!(TimeWindow::TwoWeeks.cutoff(today), Some(date!(2025 - 06 - 01)));
        assert_eq!(TimeWindow::ThreeWeeks.cutoff(today), Some(date!(2025 - 05 - 25)));
        assert_eq!(TimeWindow::Month.cutoff(today), Some(date!(2025 - 05 - 15)));
        assert_eq!(TimeWindow::ThreeMonths.cutoff(today), Some(date!(2025 - 03 - 15)));
        assert_eq!(TimeWindow::SixMonths.cutoff(today), Some(date!(2024 - 12 - 15)));
        assert_eq!(TimeWindow::Year.cutoff(today), Some(date!(2025 - 01 - 01)));
    }

    #[test]
    fn window_names_match_client_values() {
        assert_eq!(
            serde_json::from_str::<TimeWindow>(r#""2weeks""#).unwrap(),
            TimeWindow::TwoWeeks
        );
        assert_eq!(
            serde_json::to_string(&TimeWindow::SixMonths).unwrap(),
            r#""6months""#
        );
    }

    #[test]
    fn week_window_includes_cutoff_day() {
        let today = date!(2025 - 06 - 15);
        let transactions = [
            transaction(1, 10.0, "Food", "2025-06-08"),
            transaction(2, 10.0, "Food", "2025-06-07"),
            transaction(3, 10.0, "Food", "2025-06-15"),
        ];

        let got = filter_by_window(&transactions, TimeWindow::Week, today);

        assert_eq!(ids(&got), [1, 3]);
    }

    #[test]
    fn today_window_only_keeps_today() {
        let today = date!(2025 - 06 - 15);
        let transactions = [
            transaction(1, 10.0, "Food", "2025-06-15"),
            transaction(2, 10.0, "Food", "2025-06-14"),
            transaction(3, 10.0, "Food", "2025-06-16"),
        ];

        let got = filter_by_window(&transactions, TimeWindow::Today, today);

        assert_eq!(ids(&got), [1]);
    }

    #[test]
    fn unreadable_dates_only_in_all_window() {
        let today = date!(2025 - 06 - 15);
        let transactions = [
            transaction(1, 10.0, "Food", "not a date"),
            transaction(2, 10.0, "Food", "2025-06-15"),
        ];

        assert_eq!(ids(&filter_by_window(&transactions, TimeWindow::All, today)), [1, 2]);
        assert_eq!(ids(&filter_by_window(&transactions, TimeWindow::Year, today)), [2]);
    }

    #[test]
    fn category_totals_keep_first_seen_order() {
        let transactions = [
            transaction(1, 30.0, "Food", "2025-06-01"),
            transaction(2, 10.0, "Transport", "2025-06-02"),
            transaction(3, 20.0, "Food", "2025-06-03"),
            transaction(4, 40.0, "Bills", "2025-06-04"),
        ];

        let got = totals_by_category(&transactions);

        let names: Vec<_> = got.iter().map(|total| total.name.as_str()).collect();
        assert_eq!(names, ["Food", "Transport", "Bills"]);
        assert_eq!(got[0].value, 50.0);
        assert_eq!(got[0].count, 2);
        assert_eq!(got[0].percentage, 50.0);
        assert_eq!(got[1].percentage_label(), "10.0");
        assert_eq!(got[2].color, PALETTE[2]);
    }

    #[test]
    fn category_shares_sum_to_one_hundred() {
        let transactions = [
            transaction(1, 12.34, "Food", "2025-06-01"),
            transaction(2, 56.78, "Transport", "2025-06-02"),
            transaction(3, 9.1, "Bills", "2025-06-03"),
        ];

        let sum: f64 = totals_by_category(&transactions)
            .iter()
            .map(|total| total.percentage)
            .sum();

        assert!((sum - 100.0).abs() < 1e-9, "got {sum}");
    }

    #[test]
    fn palette_wraps_around() {
        let transactions: Vec<_> = (0..8)
            .map(|i| transaction(i, 1.0, &format!("category {i}"), "2025-06-01"))
            .collect();

        let got = totals_by_category(&transactions);

        assert_eq!(got[6].color, PALETTE[0]);
        assert_eq!(got[7].color, PALETTE[1]);
    }

    #[test]
    fn weekday_totals_skip_unreadable_dates() {
        let transactions = [
            // Sunday
            transaction(1, 5.0, "Food", "2025-06-15"),
            // Monday
            transaction(2, 7.0, "Food", "2025-06-16T08:00:00Z"),
            transaction(3, 3.0, "Food", "2025-06-22"),
            transaction(4, 100.0, "Food", "garbage"),
        ];

        let got = totals_by_weekday(&transactions);

        assert_eq!(got.len(), 2);
        assert_eq!(got[0].weekday, Weekday::Sunday);
        assert_eq!(got[0].value, 8.0);
        assert_eq!(got[1].name(), "Monday");
        assert_eq!(got[1].value, 7.0);
    }

    #[test]
    fn dashboard_summarises_window() {
        let today = date!(2025 - 06 - 15);
        let transactions = [
            transaction(1, 20.0, "Food", "2025-06-14"),
            transaction(2, 30.0, "Transport", "2025-06-10"),
            transaction(3, 1000.0, "Rent", "2025-01-01"),
        ];

        let dashboard = Dashboard::new(&transactions, TimeWindow::Week, today);

        assert_eq!(dashboard.transaction_count(), 2);
        assert_eq!(dashboard.total_spent, 50.0);
        assert_eq!(dashboard.categories.len(), 2);
        assert_eq!(dashboard.categories[1].percentage, 60.0);
        assert_eq!(dashboard.weekdays.len(), 2);
    }

    #[test]
    fn empty_dashboard_has_zero_percentages() {
        let transactions = [transaction(1, 0.0, "Food", "2025-06-14")];

        let dashboard = Dashboard::new(&transactions, TimeWindow::All, date!(2025 - 06 - 15));

        assert_eq!(dashboard.total_spent, 0.0);
        assert_eq!(dashboard.categories[0].percentage, 0.0);
    }
}
