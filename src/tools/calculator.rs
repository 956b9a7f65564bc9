use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Adds two integers. The minimal example tool: `{"a": 2, "b": 3}` -> `"5"`.
pub struct Adder;

#[async_trait]
impl Tool for Adder {
    fn name(&self) -> &str {
        "adder"
    }

    fn description(&self) -> &str {
        "Add two numbers together"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "integer",
                    "description": "The first number to add"
                },
                "b": {
                    "type": "integer",
                    "description": "The second number to add"
                }
            },
            "required": ["a", "b"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        if let (Some(a), Some(b)) = (args["a"].as_i64(), args["b"].as_i64()) {
            return a
                .checked_add(b)
                .map(|sum| sum.to_string())
                .ok_or_else(|| AppError::ToolExecution("integer overflow".to_string()));
        }
        let a = number_arg(&args, "a")?;
        let b = number_arg(&args, "b")?;
        Ok(format_number(a + b))
    }
}

/// Four-function calculator.
pub struct Calculator;

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic arithmetic operations"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The operation to apply"
                },
                "a": { "type": "number", "description": "Left operand" },
                "b": { "type": "number", "description": "Right operand" }
            },
            "required": ["operation", "a", "b"]
        })
    }

    async fn execute(&self, args: Value) -> Result<String> {
        let op = args["operation"]
            .as_str()
            .ok_or_else(|| AppError::InvalidInput("Missing 'operation' parameter".to_string()))?;
        let a = number_arg(&args, "a")?;
        let b = number_arg(&args, "b")?;

        let result = match op {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" if b == 0.0 => {
                return Err(AppError::ToolExecution("division by zero".to_string()))
            }
            "divide" => a / b,
            other => {
                return Err(AppError::InvalidInput(format!(
                    "Unknown operation '{}'",
                    other
                )))
            }
        };

        Ok(format_number(result))
    }
}

fn number_arg(args: &Value, key: &str) -> Result<f64> {
    args.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| AppError::InvalidInput(format!("Missing or non-numeric '{}' parameter", key)))
}

/// Whole numbers print without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
