use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::{
    db::{read_document, DocumentPath, DocumentStore},
    error::{AppError, AppResult},
    models::{ExpenseType, LedgerRecord, MonthKey},
    services::ledger::already_billed,
};

/// Longest window the history report accepts
pub const MAX_HISTORY_MONTHS: u32 = 24;

/// One expense in the history view, tagged with its month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub month: MonthKey,
    pub name: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    /// Derived from a subscription's billing date rather than read from the ledger
    pub projected: bool,
}

/// Per-month sums for chart rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub subscription: f64,
    pub monthly: f64,
    pub total: f64,
}

/// Sums by expense type across the whole window
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TypeTotals {
    pub subscription: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryReport {
    /// Newest first
    pub entries: Vec<HistoryEntry>,
    /// Every month in the window, oldest first; months without a ledger are zero
    pub by_month: Vec<MonthTotal>,
    pub by_type: TypeTotals,
}

/// Entries contributed by one month's record
///
/// Persisted expenses are taken verbatim. A subscription whose billing date
/// falls in the month adds a projected charge only when no charge for that
/// platform was recorded in the same month.
fn month_entries(month: MonthKey, record: &LedgerRecord) -> Vec<HistoryEntry> {
    let recorded = record.monthly_expenses.iter().map(|e| HistoryEntry {
        month,
        name: e.name.clone(),
        price: e.price,
        date: e.date,
        expense_type: e.expense_type,
        projected: false,
    });

    let projected = record
        .subscriptions
        .iter()
        .filter(|s| month.contains(s.next_billing_date))
        .filter(|s| !already_billed(record, &s.platform, month))
        .map(|s| HistoryEntry {
            month,
            name: s.platform.clone(),
            price: s.price,
            date: s.next_billing_date,
            expense_type: ExpenseType::Subscription,
            projected: true,
        });

    recorded.chain(projected).collect()
}

fn summarize(months: &[MonthKey], mut entries: Vec<HistoryEntry>) -> HistoryReport {
    let mut by_type = TypeTotals::default();
    let by_month = months
        .iter()
        .map(|&month| {
            let mut total = MonthTotal {
                month,
                subscription: 0.0,
                monthly: 0.0,
                total: 0.0,
            };
            for entry in entries.iter().filter(|e| e.month == month) {
                match entry.expense_type {
                    ExpenseType::Subscription => total.subscription += entry.price,
                    ExpenseType::Monthly => total.monthly += entry.price,
                }
                total.total += entry.price;
            }
            by_type.subscription += total.subscription;
            by_type.monthly += total.monthly;
            total
        })
        .collect();

    entries.sort_by(|a, b| b.date.cmp(&a.date));

    HistoryReport {
        entries,
        by_month,
        by_type,
    }
}

/// Aggregates the trailing `month_count` months ending at the month of `now`
///
/// Records are read as stored: no budget inheritance or rollover is applied,
/// and nothing is written. A month without a record contributes no entries.
pub async fn aggregate_history(
    store: Arc<dyn DocumentStore>,
    user_id: &str,
    now: DateTime<Utc>,
    month_count: u32,
) -> AppResult<HistoryReport> {
    if month_count == 0 || month_count > MAX_HISTORY_MONTHS {
        return Err(AppError::InvalidInput(format!(
            "months must be between 1 and {}",
            MAX_HISTORY_MONTHS
        )));
    }

    let months = MonthKey::from_datetime(now).trailing(month_count);

    let mut tasks = JoinSet::new();
    for &month in &months {
        let path = DocumentPath::financial_report(user_id, month)?;
        let store = store.clone();
        tasks.spawn(async move {
            let record: Option<LedgerRecord> = read_document(store.as_ref(), &path).await?;
            Ok::<_, AppError>((month, record))
        });
    }

    let mut entries = Vec::new();
    let mut found = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (month, record) = joined.map_err(|e| AppError::Internal(e.to_string()))??;
        if let Some(record) = record {
            found += 1;
            entries.extend(month_entries(month, &record));
        }
    }

    tracing::debug!(
        user_id = %user_id,
        months = month_count,
        found = found,
        entries = entries.len(),
        "Aggregated ledger history"
    );

    Ok(summarize(&months, entries))
}
