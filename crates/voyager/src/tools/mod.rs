pub mod currency;
pub mod expenses;
pub mod math;
pub mod places;
pub mod registry;
pub mod weather;

use serde_json::Value;

use crate::errors::{AgentError, AgentResult};

/// Pull a required string argument out of a tool call.
pub(crate) fn required_str(args: &Value, key: &str) -> AgentResult<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(String::from)
        .ok_or_else(|| AgentError::InvalidParameters(format!("missing string argument '{}'", key)))
}

/// Pull a required number argument, coercing numeric strings the way the
/// model sometimes sends them.
pub(crate) fn required_f64(args: &Value, key: &str) -> AgentResult<f64> {
    let value = args
        .get(key)
        .ok_or_else(|| AgentError::InvalidParameters(format!("missing number argument '{}'", key)))?;

    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            AgentError::InvalidParameters(format!("argument '{}' is not a valid number", key))
        }),
        Value::String(s) => s.parse::<f64>().map_err(|_| {
            AgentError::InvalidParameters(format!(
                "argument '{}' must be a number, got '{}'",
                key, s
            ))
        }),
        _ => Err(AgentError::InvalidParameters(format!(
            "argument '{}' must be a number",
            key
        ))),
    }
}

pub(crate) fn required_i64(args: &Value, key: &str) -> AgentResult<i64> {
    let value = args
        .get(key)
        .ok_or_else(|| AgentError::InvalidParameters(format!("missing integer argument '{}'", key)))?;

    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            AgentError::InvalidParameters(format!("argument '{}' is not a valid integer", key))
        }),
        Value::String(s) => s.parse::<i64>().map_err(|_| {
            AgentError::InvalidParameters(format!(
                "argument '{}' must be an integer, got '{}'",
                key, s
            ))
        }),
        _ => Err(AgentError::InvalidParameters(format!(
            "argument '{}' must be an integer",
            key
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_str() {
        let args = json!({"city": "Goa"});
        assert_eq!(required_str(&args, "city").unwrap(), "Goa");
        assert!(required_str(&args, "place").is_err());
    }

    #[test]
    fn test_required_f64_coerces_strings() {
        let args = json!({"amount": "120.5", "days": 4});
        assert_eq!(required_f64(&args, "amount").unwrap(), 120.5);
        assert_eq!(required_f64(&args, "days").unwrap(), 4.0);
        assert!(required_f64(&args, "missing").is_err());
    }

    #[test]
    fn test_required_i64_rejects_garbage() {
        let args = json!({"days": "soon"});
        let err = required_i64(&args, "days").unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }
}
