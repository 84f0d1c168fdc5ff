use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use crate::error::AppError;

/// Identifies one calendar month, rendered as `YYYY-MM`
///
/// Month keys partition ledger documents in the store, so ordering follows
/// calendar order (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Creates a month key, rejecting months outside 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given instant (UTC)
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// The calendar month immediately before this one
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The trailing `count` months ending at (and including) this one, oldest first
    pub fn trailing(&self, count: u32) -> Vec<MonthKey> {
        let mut months = Vec::with_capacity(count as usize);
        let mut cursor = *self;
        for _ in 0..count {
            months.push(cursor);
            cursor = cursor.previous();
        }
        months.reverse();
        months
    }

    /// Whether the instant falls inside this calendar month (UTC)
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        Self::from_datetime(at) == *self
    }
}

impl Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("Invalid month key '{}', expected YYYY-MM", s));

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthKey {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}

/// Whether an expense came from a subscription billing or a one-off entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Subscription,
    Monthly,
}

impl Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseType::Subscription => write!(f, "subscription"),
            ExpenseType::Monthly => write!(f, "monthly"),
        }
    }
}

/// A recurring charge, keyed by platform name within a ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub platform: String,
    pub price: f64,
    /// Free-form contract period ("monthly", "yearly"); informational only
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub services: String,
    pub next_billing_date: DateTime<Utc>,
}

/// A charge recorded in a month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub name: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
}

impl Expense {
    /// Billing charge generated for a subscription at the given instant
    pub fn billed(subscription: &Subscription, at: DateTime<Utc>) -> Self {
        Self {
            name: subscription.platform.clone(),
            price: subscription.price,
            date: at,
            expense_type: ExpenseType::Subscription,
        }
    }
}

/// Per-user, per-month financial record stored at
/// `users/{user}/financialReports/{YYYY-MM}`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    /// Monthly spending ceiling; `0` means unset
    #[serde(default)]
    pub budget_limit: f64,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
    #[serde(default)]
    pub monthly_expenses: Vec<Expense>,
}

impl LedgerRecord {
    pub fn has_budget(&self) -> bool {
        self.budget_limit > 0.0
    }

    pub fn has_subscription(&self, platform: &str) -> bool {
        self.subscriptions.iter().any(|s| s.platform == platform)
    }

    pub fn total_expenses(&self) -> f64 {
        self.monthly_expenses.iter().map(|e| e.price).sum()
    }

    /// Spending exceeds a budget that has actually been set
    pub fn is_over_budget(&self) -> bool {
        self.has_budget() && self.total_expenses() > self.budget_limit
    }
}
