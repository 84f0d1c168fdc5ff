mod input;
mod ledger;
mod recommendation;
mod watched;

pub use input::{BudgetLimit, ExpenseKind, NewExpense, NewExpenseRequest, Price, RawAmount};
pub use ledger::{Expense, ExpenseType, LedgerRecord, MonthKey, Subscription};
pub use recommendation::{
    Candidate, DiscoverItem, IndividualRecommendation, RecommendPayload, RecommendationRequest,
    Recommendations,
};
pub use watched::{
    ConsumptionStats, GenreCount, MediaType, WatchedItem, WatchlistItem, WeekdayCount,
};
