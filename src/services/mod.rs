pub mod habits;
pub mod history;
pub mod ledger;
pub mod recommendations;
pub mod watched;
pub mod watchlist;

pub use habits::consumption_stats;
pub use history::{aggregate_history, HistoryReport, MAX_HISTORY_MONTHS};
pub use ledger::{LedgerMonth, MonthlyLedger};
pub use recommendations::{HttpRecommender, RecommendationService, Recommender};
pub use watched::{get_watched, list_watched, record_watched, remove_watched};
pub use watchlist::{add_to_watchlist, get_watchlist_item, list_watchlist, remove_from_watchlist};
