use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{BudgetLimit, NewExpense, NewExpenseRequest, RawAmount},
    services::{aggregate_history, HistoryReport, LedgerMonth},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct LedgerSummary {
    pub total_expenses: f64,
    pub over_budget: bool,
}

/// Ledger as returned to clients
#[derive(Debug, Serialize)]
pub struct LedgerView {
    #[serde(flatten)]
    pub ledger: LedgerMonth,
    pub summary: LedgerSummary,
}

impl From<LedgerMonth> for LedgerView {
    fn from(ledger: LedgerMonth) -> Self {
        let summary = LedgerSummary {
            total_expenses: ledger.record.total_expenses(),
            over_budget: ledger.record.is_over_budget(),
        };
        Self { ledger, summary }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRequest {
    pub budget_limit: RawAmount,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    months: Option<u32>,
}

/// Current month's ledger, created or rolled forward as needed
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<LedgerView>> {
    let ledger = state.ledger.open_current_month(&user_id).await?;
    Ok(Json(ledger.into()))
}

pub async fn add_expense(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<NewExpenseRequest>,
) -> AppResult<(StatusCode, Json<LedgerView>)> {
    let expense = NewExpense::try_from(request)?;
    let ledger = state.ledger.open_current_month(&user_id).await?;
    let ledger = state.ledger.add_expense(&user_id, ledger, expense).await?;
    Ok((StatusCode::CREATED, Json(ledger.into())))
}

pub async fn cancel_subscription(
    State(state): State<AppState>,
    Path((user_id, platform)): Path<(String, String)>,
) -> AppResult<Json<LedgerView>> {
    let ledger = state.ledger.open_current_month(&user_id).await?;
    let ledger = state
        .ledger
        .cancel_subscription(&user_id, ledger, &platform)
        .await?;
    Ok(Json(ledger.into()))
}

/// Sets and commits the budget limit in one step
pub async fn set_budget(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(request): Json<BudgetRequest>,
) -> AppResult<Json<LedgerView>> {
    let limit = BudgetLimit::parse(&request.budget_limit)?;
    let ledger = state.ledger.open_current_month(&user_id).await?;
    let ledger = state.ledger.set_budget_limit(ledger, limit);
    state.ledger.commit(&user_id, &ledger).await?;
    Ok(Json(ledger.into()))
}

pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<Json<HistoryReport>> {
    let months = params.months.unwrap_or(state.history_months);
    let report = aggregate_history(state.store.clone(), &user_id, state.clock.now(), months).await?;
    Ok(Json(report))
}
