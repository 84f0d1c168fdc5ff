use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    clock::{shift_months, Clock},
    db::{read_document, write_document, DocumentPath, DocumentStore},
    error::{AppError, AppResult},
    models::{BudgetLimit, Expense, ExpenseType, LedgerRecord, MonthKey, NewExpense, Subscription},
};

/// A ledger record together with the month it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerMonth {
    pub month: MonthKey,
    #[serde(flatten)]
    pub record: LedgerRecord,
}

/// Whether a subscription charge for `platform` is already recorded in `month`
pub(crate) fn already_billed(record: &LedgerRecord, platform: &str, month: MonthKey) -> bool {
    record.monthly_expenses.iter().any(|e| {
        e.expense_type == ExpenseType::Subscription && e.name == platform && month.contains(e.date)
    })
}

/// Computes, persists and rolls forward per-user monthly financial records
pub struct MonthlyLedger {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl MonthlyLedger {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn read_month(&self, user_id: &str, month: MonthKey) -> AppResult<Option<LedgerRecord>> {
        let path = DocumentPath::financial_report(user_id, month)?;
        read_document(self.store.as_ref(), &path).await
    }

    async fn write_month(&self, user_id: &str, ledger: &LedgerMonth) -> AppResult<()> {
        let path = DocumentPath::financial_report(user_id, ledger.month)?;
        write_document(self.store.as_ref(), &path, &ledger.record).await?;
        tracing::debug!(
            user_id = %user_id,
            month = %ledger.month,
            subscriptions = ledger.record.subscriptions.len(),
            expenses = ledger.record.monthly_expenses.len(),
            "Ledger persisted"
        );
        Ok(())
    }

    /// Loads the current month's record, creating or completing it from the
    /// preceding month when needed
    ///
    /// - Existing record with a budget: returned as stored.
    /// - Existing record without a budget: the preceding month's budget is
    ///   inherited (or `0`) and the record is written back.
    /// - No record: a new one is built from the preceding month, carrying its
    ///   budget and its subscriptions with every `next_billing_date` reset to
    ///   now, and no expenses. It is persisted before being returned.
    ///
    /// A missing preceding month is not an error; it contributes nothing.
    pub async fn load_current_month(&self, user_id: &str) -> AppResult<LedgerMonth> {
        self.load_month_at(user_id, self.clock.now()).await
    }

    async fn load_month_at(&self, user_id: &str, now: DateTime<Utc>) -> AppResult<LedgerMonth> {
        let month = MonthKey::from_datetime(now);

        match self.read_month(user_id, month).await? {
            Some(record) if record.has_budget() => {
                tracing::debug!(user_id = %user_id, month = %month, "Ledger loaded");
                Ok(LedgerMonth { month, record })
            }
            Some(mut record) => {
                let previous = self.read_month(user_id, month.previous()).await?;
                record.budget_limit = previous.map(|p| p.budget_limit).unwrap_or(0.0);

                tracing::info!(
                    user_id = %user_id,
                    month = %month,
                    budget_limit = record.budget_limit,
                    "Inherited budget limit from previous month"
                );

                let ledger = LedgerMonth { month, record };
                self.write_month(user_id, &ledger).await?;
                Ok(ledger)
            }
            None => {
                let previous = self
                    .read_month(user_id, month.previous())
                    .await?
                    .unwrap_or_default();

                let subscriptions = previous
                    .subscriptions
                    .into_iter()
                    .map(|sub| Subscription {
                        next_billing_date: now,
                        ..sub
                    })
                    .collect::<Vec<_>>();

                tracing::info!(
                    user_id = %user_id,
                    month = %month,
                    budget_limit = previous.budget_limit,
                    carried_subscriptions = subscriptions.len(),
                    "Creating ledger for new month"
                );

                let ledger = LedgerMonth {
                    month,
                    record: LedgerRecord {
                        budget_limit: previous.budget_limit,
                        subscriptions,
                        monthly_expenses: Vec::new(),
                    },
                };
                self.write_month(user_id, &ledger).await?;
                Ok(ledger)
            }
        }
    }

    /// Bills every subscription due in the ledger's own month
    ///
    /// A due subscription gets an expense dated now and its `next_billing_date`
    /// advanced by one calendar month. When its charge is already recorded in
    /// this month, only the date advances. The record is persisted when any
    /// subscription was due.
    pub async fn apply_billing_rollover(
        &self,
        user_id: &str,
        ledger: LedgerMonth,
    ) -> AppResult<LedgerMonth> {
        self.rollover_at(user_id, ledger, self.clock.now()).await
    }

    async fn rollover_at(
        &self,
        user_id: &str,
        mut ledger: LedgerMonth,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerMonth> {
        let month = ledger.month;

        let mut billed = Vec::new();
        let mut advanced = 0usize;

        for index in 0..ledger.record.subscriptions.len() {
            let sub = &ledger.record.subscriptions[index];
            if !month.contains(sub.next_billing_date) {
                continue;
            }

            if !already_billed(&ledger.record, &sub.platform, month) {
                billed.push(Expense::billed(sub, now));
            }

            let next = shift_months(sub.next_billing_date, 1).ok_or_else(|| {
                AppError::Internal(format!(
                    "Billing date out of range for '{}': {}",
                    sub.platform, sub.next_billing_date
                ))
            })?;
            ledger.record.subscriptions[index].next_billing_date = next;
            advanced += 1;
        }

        if advanced == 0 {
            return Ok(ledger);
        }

        tracing::info!(
            user_id = %user_id,
            month = %month,
            billed = billed.len(),
            advanced = advanced,
            "Applied subscription billing rollover"
        );

        ledger.record.monthly_expenses.extend(billed);
        self.write_month(user_id, &ledger).await?;
        Ok(ledger)
    }

    /// Loads the current month and applies the billing rollover
    ///
    /// Both steps see the same instant, so a request straddling midnight at a
    /// month end stays within one month.
    pub async fn open_current_month(&self, user_id: &str) -> AppResult<LedgerMonth> {
        let now = self.clock.now();
        let ledger = self.load_month_at(user_id, now).await?;
        self.rollover_at(user_id, ledger, now).await
    }

    /// Records a validated expense and persists the record
    ///
    /// A subscription is added with `next_billing_date = now` together with
    /// its first charge. Platforms are unique within a record.
    pub async fn add_expense(
        &self,
        user_id: &str,
        mut ledger: LedgerMonth,
        expense: NewExpense,
    ) -> AppResult<LedgerMonth> {
        let now = self.clock.now();

        match expense {
            NewExpense::Subscription {
                platform,
                price,
                period,
                services,
            } => {
                if ledger.record.has_subscription(&platform) {
                    return Err(AppError::Conflict(format!(
                        "Subscription '{}' is already active",
                        platform
                    )));
                }

                let subscription = Subscription {
                    platform,
                    price: price.value(),
                    period,
                    services,
                    next_billing_date: now,
                };
                ledger
                    .record
                    .monthly_expenses
                    .push(Expense::billed(&subscription, now));

                tracing::info!(
                    user_id = %user_id,
                    platform = %subscription.platform,
                    price = subscription.price,
                    "Subscription added"
                );
                ledger.record.subscriptions.push(subscription);
            }
            NewExpense::Monthly { name, price } => {
                tracing::info!(user_id = %user_id, name = %name, price = %price, "Expense added");
                ledger.record.monthly_expenses.push(Expense {
                    name,
                    price: price.value(),
                    date: now,
                    expense_type: ExpenseType::Monthly,
                });
            }
        }

        self.write_month(user_id, &ledger).await?;
        Ok(ledger)
    }

    /// Removes the subscription for `platform` and persists immediately
    ///
    /// Expenses already recorded for it stay in place.
    pub async fn cancel_subscription(
        &self,
        user_id: &str,
        mut ledger: LedgerMonth,
        platform: &str,
    ) -> AppResult<LedgerMonth> {
        let before = ledger.record.subscriptions.len();
        ledger.record.subscriptions.retain(|s| s.platform != platform);

        if ledger.record.subscriptions.len() == before {
            return Err(AppError::NotFound(format!(
                "No active subscription for '{}'",
                platform
            )));
        }

        tracing::info!(user_id = %user_id, platform = %platform, "Subscription cancelled");

        self.write_month(user_id, &ledger).await?;
        Ok(ledger)
    }

    /// Replaces the budget limit in memory; see [`MonthlyLedger::commit`]
    pub fn set_budget_limit(&self, mut ledger: LedgerMonth, limit: BudgetLimit) -> LedgerMonth {
        ledger.record.budget_limit = limit.value();
        ledger
    }

    /// Persists the record as-is (the explicit commit of a budget edit)
    pub async fn commit(&self, user_id: &str, ledger: &LedgerMonth) -> AppResult<()> {
        tracing::info!(
            user_id = %user_id,
            month = %ledger.month,
            budget_limit = ledger.record.budget_limit,
            "Committing ledger"
        );
        self.write_month(user_id, ledger).await
    }

    /// Current instant according to the injected clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        db::{store::MockDocumentStore, MemoryDocumentStore},
        models::{Price, RawAmount},
    };
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 0, 0).unwrap()
    }

    fn month(y: i32, m: u32) -> MonthKey {
        MonthKey::new(y, m).unwrap()
    }

    fn netflix(next_billing_date: DateTime<Utc>) -> Subscription {
        Subscription {
            platform: "Netflix".to_string(),
            price: 10.0,
            period: "monthly".to_string(),
            services: String::new(),
            next_billing_date,
        }
    }

    fn price(v: f64) -> Price {
        Price::parse(&RawAmount::Number(v)).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryDocumentStore>,
        clock: Arc<FixedClock>,
        ledger: MonthlyLedger,
    }

    fn fixture(now: DateTime<Utc>) -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let clock = Arc::new(FixedClock::new(now));
        let ledger = MonthlyLedger::new(store.clone(), clock.clone());
        Fixture {
            store,
            clock,
            ledger,
        }
    }

    async fn seed(store: &MemoryDocumentStore, user: &str, key: MonthKey, record: &LedgerRecord) {
        let path = DocumentPath::financial_report(user, key).unwrap();
        write_document(store, &path, record).await.unwrap();
    }

    async fn stored(store: &MemoryDocumentStore, user: &str, key: MonthKey) -> Option<LedgerRecord> {
        let path = DocumentPath::financial_report(user, key).unwrap();
        read_document(store, &path).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_load_without_history_persists_empty_record() {
        let fx = fixture(at(2024, 3, 15));

        let ledger = fx.ledger.load_current_month("u1").await.unwrap();

        assert_eq!(ledger.month, month(2024, 3));
        assert_eq!(ledger.record, LedgerRecord::default());
        assert_eq!(
            stored(&fx.store, "u1", month(2024, 3)).await,
            Some(LedgerRecord::default())
        );
    }

    #[tokio::test]
    async fn test_new_month_inherits_budget_and_reanchors_subscriptions() {
        let fx = fixture(at(2024, 3, 10));
        seed(
            &fx.store,
            "u1",
            month(2024, 2),
            &LedgerRecord {
                budget_limit: 100.0,
                subscriptions: vec![netflix(at(2024, 2, 5))],
                monthly_expenses: vec![Expense::billed(&netflix(at(2024, 2, 5)), at(2024, 2, 5))],
            },
        )
        .await;

        let ledger = fx.ledger.load_current_month("u1").await.unwrap();

        assert_eq!(ledger.record.budget_limit, 100.0);
        assert!(ledger.record.monthly_expenses.is_empty());
        assert_eq!(ledger.record.subscriptions.len(), 1);
        assert_eq!(ledger.record.subscriptions[0].platform, "Netflix");
        assert_eq!(ledger.record.subscriptions[0].next_billing_date, at(2024, 3, 10));
        assert_eq!(stored(&fx.store, "u1", month(2024, 3)).await, Some(ledger.record));
    }

    #[tokio::test]
    async fn test_existing_record_without_budget_inherits_previous_budget() {
        let fx = fixture(at(2024, 3, 10));
        seed(
            &fx.store,
            "u1",
            month(2024, 2),
            &LedgerRecord {
                budget_limit: 250.0,
                ..Default::default()
            },
        )
        .await;
        let expense = Expense {
            name: "Cinema".to_string(),
            price: 30.0,
            date: at(2024, 3, 2),
            expense_type: ExpenseType::Monthly,
        };
        seed(
            &fx.store,
            "u1",
            month(2024, 3),
            &LedgerRecord {
                budget_limit: 0.0,
                subscriptions: vec![],
                monthly_expenses: vec![expense.clone()],
            },
        )
        .await;

        let ledger = fx.ledger.load_current_month("u1").await.unwrap();

        assert_eq!(ledger.record.budget_limit, 250.0);
        assert_eq!(ledger.record.monthly_expenses, vec![expense]);
        assert_eq!(
            stored(&fx.store, "u1", month(2024, 3)).await.unwrap().budget_limit,
            250.0
        );
    }

    #[tokio::test]
    async fn test_existing_record_with_budget_is_returned_as_is() {
        let fx = fixture(at(2024, 3, 10));
        let record = LedgerRecord {
            budget_limit: 80.0,
            subscriptions: vec![netflix(at(2024, 4, 1))],
            monthly_expenses: vec![],
        };
        seed(&fx.store, "u1", month(2024, 3), &record).await;

        let ledger = fx.ledger.load_current_month("u1").await.unwrap();
        assert_eq!(ledger.record, record);
    }

    #[tokio::test]
    async fn test_load_twice_is_stable_within_month() {
        let fx = fixture(at(2024, 3, 10));
        seed(
            &fx.store,
            "u1",
            month(2024, 2),
            &LedgerRecord {
                budget_limit: 100.0,
                subscriptions: vec![netflix(at(2024, 2, 5))],
                monthly_expenses: vec![],
            },
        )
        .await;

        let first = fx.ledger.load_current_month("u1").await.unwrap();
        fx.clock.set(at(2024, 3, 20));
        let second = fx.ledger.load_current_month("u1").await.unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_rollover_bills_due_subscription_and_advances_date() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord {
                budget_limit: 100.0,
                subscriptions: vec![
                    netflix(at(2024, 3, 5)),
                    Subscription {
                        platform: "HBO".to_string(),
                        next_billing_date: at(2024, 4, 2),
                        ..netflix(at(2024, 4, 2))
                    },
                ],
                monthly_expenses: vec![],
            },
        };

        let ledger = fx.ledger.apply_billing_rollover("u1", ledger).await.unwrap();

        assert_eq!(ledger.record.monthly_expenses.len(), 1);
        let charge = &ledger.record.monthly_expenses[0];
        assert_eq!(charge.name, "Netflix");
        assert_eq!(charge.price, 10.0);
        assert_eq!(charge.date, at(2024, 3, 10));
        assert_eq!(charge.expense_type, ExpenseType::Subscription);

        assert_eq!(ledger.record.subscriptions[0].next_billing_date, at(2024, 4, 5));
        assert_eq!(ledger.record.subscriptions[1].next_billing_date, at(2024, 4, 2));
        assert_eq!(stored(&fx.store, "u1", month(2024, 3)).await, Some(ledger.record));
    }

    #[tokio::test]
    async fn test_rollover_clamps_to_month_end() {
        let fx = fixture(at(2024, 1, 31));
        let ledger = LedgerMonth {
            month: month(2024, 1),
            record: LedgerRecord {
                subscriptions: vec![netflix(at(2024, 1, 31))],
                ..Default::default()
            },
        };

        let ledger = fx.ledger.apply_billing_rollover("u1", ledger).await.unwrap();
        assert_eq!(ledger.record.subscriptions[0].next_billing_date, at(2024, 2, 29));
    }

    /// Returns each queued instant once, then keeps returning the last one
    struct SteppingClock {
        instants: std::sync::Mutex<Vec<DateTime<Utc>>>,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut instants = self.instants.lock().unwrap();
            if instants.len() > 1 {
                instants.remove(0)
            } else {
                instants[0]
            }
        }
    }

    #[tokio::test]
    async fn test_open_across_month_end_stays_in_one_month() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed(
            &store,
            "u1",
            month(2024, 3),
            &LedgerRecord {
                budget_limit: 100.0,
                subscriptions: vec![netflix(at(2024, 4, 5))],
                monthly_expenses: vec![],
            },
        )
        .await;
        let clock = Arc::new(SteppingClock {
            instants: std::sync::Mutex::new(vec![
                Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
                Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            ]),
        });
        let ledger = MonthlyLedger::new(store.clone(), clock);

        let opened = ledger.open_current_month("u1").await.unwrap();

        assert_eq!(opened.month, month(2024, 3));
        assert!(opened.record.monthly_expenses.is_empty());
        assert_eq!(opened.record.subscriptions[0].next_billing_date, at(2024, 4, 5));
        assert!(stored(&store, "u1", month(2024, 4)).await.is_none());
    }

    #[tokio::test]
    async fn test_rollover_uses_the_ledger_month() {
        // Clock already in April, ledger still March
        let fx = fixture(at(2024, 4, 1));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord {
                subscriptions: vec![netflix(at(2024, 4, 5))],
                ..Default::default()
            },
        };

        let after = fx.ledger.apply_billing_rollover("u1", ledger.clone()).await.unwrap();
        assert_eq!(after, ledger);
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rollover_with_nothing_due_does_not_write() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord {
                subscriptions: vec![netflix(at(2024, 4, 5))],
                ..Default::default()
            },
        };

        let after = fx.ledger.apply_billing_rollover("u1", ledger.clone()).await.unwrap();
        assert_eq!(after, ledger);
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_open_new_month_bills_carried_subscription_once() {
        let fx = fixture(at(2024, 3, 10));
        seed(
            &fx.store,
            "u1",
            month(2024, 2),
            &LedgerRecord {
                budget_limit: 100.0,
                subscriptions: vec![netflix(at(2024, 2, 5))],
                monthly_expenses: vec![],
            },
        )
        .await;

        let first = fx.ledger.open_current_month("u1").await.unwrap();
        let second = fx.ledger.open_current_month("u1").await.unwrap();

        assert_eq!(first.record.monthly_expenses.len(), 1);
        assert_eq!(first.record.subscriptions[0].next_billing_date, at(2024, 4, 10));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_newly_added_subscription_is_not_billed_twice() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = fx.ledger.load_current_month("u1").await.unwrap();
        let ledger = fx
            .ledger
            .add_expense(
                "u1",
                ledger,
                NewExpense::Subscription {
                    platform: "Netflix".to_string(),
                    price: price(10.0),
                    period: "monthly".to_string(),
                    services: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(ledger.record.monthly_expenses.len(), 1);

        let reopened = fx.ledger.open_current_month("u1").await.unwrap();
        assert_eq!(reopened.record.monthly_expenses.len(), 1);
        assert_eq!(reopened.record.subscriptions[0].next_billing_date, at(2024, 4, 10));
    }

    #[tokio::test]
    async fn test_add_monthly_expense_persists() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = fx.ledger.load_current_month("u1").await.unwrap();

        let ledger = fx
            .ledger
            .add_expense(
                "u1",
                ledger,
                NewExpense::Monthly {
                    name: "Cinema".to_string(),
                    price: price(42.5),
                },
            )
            .await
            .unwrap();

        let record = stored(&fx.store, "u1", month(2024, 3)).await.unwrap();
        assert_eq!(record, ledger.record);
        assert_eq!(record.monthly_expenses[0].expense_type, ExpenseType::Monthly);
        assert_eq!(record.total_expenses(), 42.5);
        assert!(record.subscriptions.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_platform_is_rejected() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord {
                subscriptions: vec![netflix(at(2024, 4, 1))],
                ..Default::default()
            },
        };

        let result = fx
            .ledger
            .add_expense(
                "u1",
                ledger,
                NewExpense::Subscription {
                    platform: "Netflix".to_string(),
                    price: price(12.0),
                    period: String::new(),
                    services: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(fx.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_cancel_keeps_recorded_expenses() {
        let fx = fixture(at(2024, 3, 10));
        let charge = Expense::billed(&netflix(at(2024, 3, 1)), at(2024, 3, 1));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord {
                budget_limit: 50.0,
                subscriptions: vec![netflix(at(2024, 4, 1))],
                monthly_expenses: vec![charge.clone()],
            },
        };

        let ledger = fx.ledger.cancel_subscription("u1", ledger, "Netflix").await.unwrap();

        assert!(ledger.record.subscriptions.is_empty());
        assert_eq!(ledger.record.monthly_expenses, vec![charge]);
        assert_eq!(stored(&fx.store, "u1", month(2024, 3)).await, Some(ledger.record));
    }

    #[tokio::test]
    async fn test_cancel_unknown_platform_is_not_found() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = LedgerMonth {
            month: month(2024, 3),
            record: LedgerRecord::default(),
        };

        let result = fx.ledger.cancel_subscription("u1", ledger, "Hulu").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_budget_limit_only_persists_on_commit() {
        let fx = fixture(at(2024, 3, 10));
        let ledger = fx.ledger.load_current_month("u1").await.unwrap();

        let limit = BudgetLimit::parse(&RawAmount::Text("300".to_string())).unwrap();
        let ledger = fx.ledger.set_budget_limit(ledger, limit);
        assert_eq!(
            stored(&fx.store, "u1", month(2024, 3)).await.unwrap().budget_limit,
            0.0
        );

        fx.ledger.commit("u1", &ledger).await.unwrap();
        assert_eq!(
            stored(&fx.store, "u1", month(2024, 3)).await.unwrap().budget_limit,
            300.0
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_| Err(AppError::StoreUnavailable("connection refused".to_string())));
        store.expect_set().never();

        let ledger = MonthlyLedger::new(Arc::new(store), Arc::new(FixedClock::new(at(2024, 3, 10))));
        let result = ledger.load_current_month("u1").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_write_failure_on_create_propagates() {
        let mut store = MockDocumentStore::new();
        store.expect_get().times(2).returning(|_| Ok(None));
        store
            .expect_set()
            .times(1)
            .returning(|_, _| Err(AppError::StoreUnavailable("timeout".to_string())));

        let ledger = MonthlyLedger::new(Arc::new(store), Arc::new(FixedClock::new(at(2024, 3, 10))));
        let result = ledger.load_current_month("u1").await;

        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }
}
