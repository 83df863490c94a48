use async_trait::async_trait;
use serde_json::{json, Value};

use super::registry::Toolkit;
use super::{required_f64, required_i64};
use crate::errors::{AgentError, AgentResult};
use crate::models::content::Content;
use crate::models::tool::{Tool, ToolCall};

/// Pure arithmetic over trip costs. Input validation happens here, at the
/// tool boundary, so bad numbers come back as recoverable errors.
pub struct Calculator;

impl Calculator {
    pub fn multiply(a: f64, b: f64) -> f64 {
        a * b
    }

    pub fn total(costs: &[f64]) -> f64 {
        costs.iter().sum()
    }

    pub fn daily_budget(total: f64, days: i64) -> AgentResult<f64> {
        if days <= 0 {
            return Err(AgentError::InvalidParameters(
                "days must be greater than zero".to_string(),
            ));
        }
        Ok(total / days as f64)
    }
}

pub struct ExpenseToolkit {
    tools: Vec<Tool>,
}

impl Default for ExpenseToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseToolkit {
    pub fn new() -> Self {
        let tools = vec![
            Tool::new(
                "estimate_total_hotel_cost",
                "Calculate the total hotel cost from a per-night price and a number of nights.",
                json!({
                    "type": "object",
                    "properties": {
                        "price_per_night": {"type": "number", "description": "Cost per night"},
                        "total_days": {"type": "integer", "description": "Total number of nights"}
                    },
                    "required": ["price_per_night", "total_days"]
                }),
            ),
            Tool::new(
                "calculate_total_expense",
                "Calculate the total expense of the trip from a list of individual costs.",
                json!({
                    "type": "object",
                    "properties": {
                        "costs": {
                            "type": "array",
                            "items": {"type": "number"},
                            "description": "List of individual costs"
                        }
                    },
                    "required": ["costs"]
                }),
            ),
            Tool::new(
                "calculate_daily_expense_budget",
                "Calculate the daily expense budget from the total trip cost and the number of days.",
                json!({
                    "type": "object",
                    "properties": {
                        "total_cost": {"type": "number", "description": "Total trip cost"},
                        "days": {"type": "integer", "description": "Number of days, must be positive"}
                    },
                    "required": ["total_cost", "days"]
                }),
            ),
        ];
        Self { tools }
    }

    fn costs_argument(args: &Value) -> AgentResult<Vec<f64>> {
        let costs = args
            .get("costs")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::InvalidParameters("costs must be a list of numbers".to_string())
            })?;

        costs
            .iter()
            .map(|cost| match cost {
                Value::Number(n) => n.as_f64().ok_or_else(|| {
                    AgentError::InvalidParameters("costs must be a list of numbers".to_string())
                }),
                Value::String(s) => s.parse::<f64>().map_err(|_| {
                    AgentError::InvalidParameters(format!("invalid cost value '{}'", s))
                }),
                _ => Err(AgentError::InvalidParameters(
                    "costs must be a list of numbers".to_string(),
                )),
            })
            .collect()
    }
}

#[async_trait]
impl Toolkit for ExpenseToolkit {
    fn name(&self) -> &str {
        "expenses"
    }

    fn tools(&self) -> &[Tool] {
        &self.tools
    }

    async fn call(&self, tool_call: ToolCall) -> AgentResult<Vec<Content>> {
        let result = match tool_call.name.as_str() {
            "estimate_total_hotel_cost" => {
                let price = required_f64(&tool_call.arguments, "price_per_night")?;
                let days = required_i64(&tool_call.arguments, "total_days")?;
                Calculator::multiply(price, days as f64)
            }
            "calculate_total_expense" => {
                let costs = Self::costs_argument(&tool_call.arguments)?;
                Calculator::total(&costs)
            }
            "calculate_daily_expense_budget" => {
                let total = required_f64(&tool_call.arguments, "total_cost")?;
                let days = required_i64(&tool_call.arguments, "days")?;
                Calculator::daily_budget(total, days)?
            }
            _ => return Err(AgentError::ToolNotFound(tool_call.name)),
        };

        Ok(vec![Content::text(format!("{}", result))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hotel_cost() {
        let toolkit = ExpenseToolkit::new();
        let result = toolkit
            .call(ToolCall::new(
                "estimate_total_hotel_cost",
                json!({"price_per_night": 120.0, "total_days": 5}),
            ))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("600"));
    }

    #[tokio::test]
    async fn test_total_expense() {
        let toolkit = ExpenseToolkit::new();
        let result = toolkit
            .call(ToolCall::new(
                "calculate_total_expense",
                json!({"costs": [600.0, 250.5, 149.5]}),
            ))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("1000"));
    }

    #[tokio::test]
    async fn test_daily_budget() {
        let toolkit = ExpenseToolkit::new();
        let result = toolkit
            .call(ToolCall::new(
                "calculate_daily_expense_budget",
                json!({"total_cost": 300.0, "days": 5}),
            ))
            .await
            .unwrap();
        assert_eq!(result[0].as_text(), Some("60"));
    }

    #[tokio::test]
    async fn test_zero_days_rejected() {
        let toolkit = ExpenseToolkit::new();
        let err = toolkit
            .call(ToolCall::new(
                "calculate_daily_expense_budget",
                json!({"total_cost": 300.0, "days": 0}),
            ))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AgentError::InvalidParameters("days must be greater than zero".to_string())
        );
    }

    #[tokio::test]
    async fn test_non_numeric_costs_rejected() {
        let toolkit = ExpenseToolkit::new();
        let err = toolkit
            .call(ToolCall::new(
                "calculate_total_expense",
                json!({"costs": [100.0, "a lot"]}),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }

    #[test]
    fn test_costs_accept_numeric_strings() {
        let costs =
            ExpenseToolkit::costs_argument(&json!({"costs": ["100.5", 99.5]})).unwrap();
        assert_eq!(costs, vec![100.5, 99.5]);
    }
}
