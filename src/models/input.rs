use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::error::{AppError, AppResult};

/// An amount as it arrives from a client: either a JSON number or form text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
}

fn parse_amount(raw: &RawAmount, field: &str) -> AppResult<f64> {
    let value = match raw {
        RawAmount::Number(n) => *n,
        RawAmount::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(AppError::InvalidInput(format!("{} is required", field)));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| AppError::InvalidInput(format!("{} must be a number, got '{}'", field, trimmed)))?
        }
    };

    if !value.is_finite() {
        return Err(AppError::InvalidInput(format!("{} must be a finite number", field)));
    }
    if value < 0.0 {
        return Err(AppError::InvalidInput(format!("{} must not be negative", field)));
    }

    Ok(value)
}

/// A validated, finite, non-negative price
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Price(f64);

impl Price {
    pub fn parse(raw: &RawAmount) -> AppResult<Self> {
        parse_amount(raw, "price").map(Price)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated budget ceiling; zero means "unset"
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct BudgetLimit(f64);

impl BudgetLimit {
    pub fn parse(raw: &RawAmount) -> AppResult<Self> {
        parse_amount(raw, "budget limit").map(BudgetLimit)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

/// Which kind of entry the expense form is submitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseKind {
    Subscription,
    Monthly,
}

/// Raw expense form as submitted by a client
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpenseRequest {
    pub kind: ExpenseKind,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub price: RawAmount,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub services: Option<String>,
}

/// A validated expense ready to be applied to a ledger
#[derive(Debug, Clone, PartialEq)]
pub enum NewExpense {
    Subscription {
        platform: String,
        price: Price,
        period: String,
        services: String,
    },
    Monthly {
        name: String,
        price: Price,
    },
}

fn required_text(value: Option<&str>, field: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::InvalidInput(format!("{} is required", field))),
    }
}

impl TryFrom<NewExpenseRequest> for NewExpense {
    type Error = AppError;

    fn try_from(request: NewExpenseRequest) -> Result<Self, Self::Error> {
        let price = Price::parse(&request.price)?;

        match request.kind {
            ExpenseKind::Subscription => Ok(NewExpense::Subscription {
                platform: required_text(request.platform.as_deref(), "platform")?,
                price,
                period: request.period.unwrap_or_default().trim().to_string(),
                services: request.services.unwrap_or_default().trim().to_string(),
            }),
            ExpenseKind::Monthly => Ok(NewExpense::Monthly {
                name: required_text(request.name.as_deref(), "name")?,
                price,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawAmount {
        RawAmount::Text(s.to_string())
    }

    #[test]
    fn test_price_parses_text_and_numbers() {
        assert_eq!(Price::parse(&text(" 12.5 ")).unwrap().value(), 12.5);
        assert_eq!(Price::parse(&RawAmount::Number(3.0)).unwrap().value(), 3.0);
        assert_eq!(Price::parse(&text("0")).unwrap().value(), 0.0);
    }

    #[test]
    fn test_price_rejects_non_numeric() {
        let err = Price::parse(&text("abc")).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[test]
    fn test_price_rejects_nan_and_infinity_text() {
        assert!(Price::parse(&text("NaN")).is_err());
        assert!(Price::parse(&text("inf")).is_err());
    }

    #[test]
    fn test_price_rejects_negative_and_empty() {
        assert!(Price::parse(&text("-1")).is_err());
        assert!(Price::parse(&text("   ")).is_err());
    }

    #[test]
    fn test_budget_limit_allows_zero() {
        assert_eq!(BudgetLimit::parse(&text("0")).unwrap().value(), 0.0);
        assert!(BudgetLimit::parse(&RawAmount::Number(-5.0)).is_err());
    }

    #[test]
    fn test_request_deserializes_string_or_number_price() {
        let from_text: NewExpenseRequest = serde_json::from_value(serde_json::json!({
            "kind": "monthly", "name": "Cinema", "price": "25"
        }))
        .unwrap();
        let from_number: NewExpenseRequest = serde_json::from_value(serde_json::json!({
            "kind": "monthly", "name": "Cinema", "price": 25
        }))
        .unwrap();

        assert_eq!(
            NewExpense::try_from(from_text).unwrap(),
            NewExpense::try_from(from_number).unwrap()
        );
    }

    #[test]
    fn test_subscription_requires_platform() {
        let request = NewExpenseRequest {
            kind: ExpenseKind::Subscription,
            platform: Some("  ".to_string()),
            name: None,
            price: text("10"),
            period: None,
            services: None,
        };
        assert!(matches!(
            NewExpense::try_from(request),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_subscription_trims_fields() {
        let request = NewExpenseRequest {
            kind: ExpenseKind::Subscription,
            platform: Some(" Netflix ".to_string()),
            name: None,
            price: text("10"),
            period: Some("monthly".to_string()),
            services: None,
        };
        let expected = NewExpense::Subscription {
            platform: "Netflix".to_string(),
            price: Price(10.0),
            period: "monthly".to_string(),
            services: String::new(),
        };
        assert_eq!(NewExpense::try_from(request).unwrap(), expected);
    }
}
