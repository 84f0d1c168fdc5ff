use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt::Display;

use crate::{
    error::{AppError, AppResult},
    models::MonthKey,
};

/// Location of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentPath {
    FinancialReport { user_id: String, month: MonthKey },
    Watched { user_id: String, item_id: String },
    Watchlist { user_id: String, item_id: String },
}

/// A group of documents that can be listed together
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collection {
    Watched(String),
    Watchlist(String),
}

/// Rejects identifiers that would escape their path segment or act as a
/// glob when the path is used as a key pattern
pub fn check_segment(value: &str, what: &str) -> AppResult<()> {
    if value.is_empty() {
        return Err(AppError::InvalidInput(format!("{} must not be empty", what)));
    }
    if value.chars().any(|c| matches!(c, '/' | '*' | '?' | '[' | ']' | '\\') || c.is_control()) {
        return Err(AppError::InvalidInput(format!(
            "{} contains reserved characters: '{}'",
            what, value
        )));
    }
    Ok(())
}

impl DocumentPath {
    pub fn financial_report(user_id: &str, month: MonthKey) -> AppResult<Self> {
        check_segment(user_id, "user id")?;
        Ok(DocumentPath::FinancialReport {
            user_id: user_id.to_string(),
            month,
        })
    }

    pub fn watched(user_id: &str, item_id: &str) -> AppResult<Self> {
        check_segment(user_id, "user id")?;
        check_segment(item_id, "item id")?;
        Ok(DocumentPath::Watched {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
        })
    }

    pub fn watchlist(user_id: &str, item_id: &str) -> AppResult<Self> {
        check_segment(user_id, "user id")?;
        check_segment(item_id, "item id")?;
        Ok(DocumentPath::Watchlist {
            user_id: user_id.to_string(),
            item_id: item_id.to_string(),
        })
    }

    /// The listable collection this document belongs to, if any
    pub fn collection(&self) -> Option<Collection> {
        match self {
            DocumentPath::FinancialReport { .. } => None,
            DocumentPath::Watched { user_id, .. } => Some(Collection::Watched(user_id.clone())),
            DocumentPath::Watchlist { user_id, .. } => {
                Some(Collection::Watchlist(user_id.clone()))
            }
        }
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentPath::FinancialReport { user_id, month } => {
                write!(f, "users/{}/financialReports/{}", user_id, month)
            }
            DocumentPath::Watched { user_id, item_id } => {
                write!(f, "users/{}/watched/{}", user_id, item_id)
            }
            DocumentPath::Watchlist { user_id, item_id } => {
                write!(f, "users/{}/watchlist/{}", user_id, item_id)
            }
        }
    }
}

impl Collection {
    pub fn watched(user_id: &str) -> AppResult<Self> {
        check_segment(user_id, "user id")?;
        Ok(Collection::Watched(user_id.to_string()))
    }

    pub fn watchlist(user_id: &str) -> AppResult<Self> {
        check_segment(user_id, "user id")?;
        Ok(Collection::Watchlist(user_id.to_string()))
    }
}

impl Display for Collection {
    /// Key prefix shared by every document in the collection
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Watched(user_id) => write!(f, "users/{}/watched/", user_id),
            Collection::Watchlist(user_id) => write!(f, "users/{}/watchlist/", user_id),
        }
    }
}

/// Keyed document storage with whole-document overwrite semantics
///
/// A missing document is `Ok(None)`, never an error. Backend failures surface
/// as [`AppError::StoreUnavailable`] so callers can offer a manual retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document
    async fn get(&self, path: &DocumentPath) -> AppResult<Option<Value>>;

    /// Replace a document (last write wins)
    async fn set(&self, path: &DocumentPath, document: Value) -> AppResult<()>;

    /// Remove a document; `false` when there was nothing to remove
    async fn delete(&self, path: &DocumentPath) -> AppResult<bool>;

    /// Fetch every document in a collection, in no particular order
    async fn list(&self, collection: &Collection) -> AppResult<Vec<Value>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Reads and deserializes a document
pub async fn read_document<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &DocumentPath,
) -> AppResult<Option<T>> {
    match store.get(path).await? {
        Some(value) => {
            let doc = serde_json::from_value(value).map_err(|e| {
                tracing::error!(path = %path, error = %e, "Stored document is malformed");
                AppError::Internal(format!("Malformed document at {}: {}", path, e))
            })?;
            Ok(Some(doc))
        }
        None => Ok(None),
    }
}

/// Lists and deserializes a collection; malformed documents are skipped with a warning
pub async fn list_documents<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &Collection,
) -> AppResult<Vec<T>> {
    let documents = store.list(collection).await?;
    let total = documents.len();

    let parsed: Vec<T> = documents
        .into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(collection = %collection, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect();

    tracing::debug!(
        collection = %collection,
        total = total,
        parsed = parsed.len(),
        "Collection listed"
    );

    Ok(parsed)
}

/// Serializes and writes a document
pub async fn write_document<T: Serialize>(
    store: &dyn DocumentStore,
    path: &DocumentPath,
    value: &T,
) -> AppResult<()> {
    let doc = serde_json::to_value(value)
        .map_err(|e| AppError::Internal(format!("Document serialization error: {}", e)))?;
    store.set(path, doc).await
}
