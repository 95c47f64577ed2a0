//! Loosely typed tool parameters.
//!
//! Agents send numbers as JSON numbers or as strings, so both are accepted.

use serde_json::Value;

use crate::session::Difficulty;

/// Errors from reading tool parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolInputError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    #[error("Parameter {name} must be {expected}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
    },
}

/// Read-only view over a tool call's JSON arguments.
#[derive(Debug, Clone, Copy)]
pub struct ToolInput<'a> {
    args: &'a Value,
}

impl<'a> ToolInput<'a> {
    #[must_use]
    pub fn new(args: &'a Value) -> Self {
        Self { args }
    }

    fn get(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name).filter(|v| !v.is_null())
    }

    /// Optional non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a non-negative integer.
    pub fn u32(&self, name: &'static str) -> Result<Option<u32>, ToolInputError> {
        let invalid = ToolInputError::Invalid {
            name,
            expected: "a non-negative whole number",
        };
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let whole = n as u32;
                Ok(Some(whole))
            }
            _ => Err(invalid),
        }
    }

    /// Required non-negative integer.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or not a non-negative integer.
    pub fn required_u32(&self, name: &'static str) -> Result<u32, ToolInputError> {
        self.u32(name)?.ok_or(ToolInputError::Missing(name))
    }

    /// Optional number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a finite number.
    pub fn f64(&self, name: &'static str) -> Result<Option<f64>, ToolInputError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        number
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or(ToolInputError::Invalid {
                name,
                expected: "a number",
            })
    }

    /// Required number.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or not a finite number.
    pub fn required_f64(&self, name: &'static str) -> Result<f64, ToolInputError> {
        self.f64(name)?.ok_or(ToolInputError::Missing(name))
    }

    /// Optional non-empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a string.
    pub fn string(&self, name: &'static str) -> Result<Option<String>, ToolInputError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(_) => Err(ToolInputError::Invalid {
                name,
                expected: "text",
            }),
        }
    }

    /// Required non-empty string.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing, empty or not a string.
    pub fn required_string(&self, name: &'static str) -> Result<String, ToolInputError> {
        self.string(name)?.ok_or(ToolInputError::Missing(name))
    }

    /// Optional difficulty rating.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is present but not a known rating.
    pub fn difficulty(&self, name: &'static str) -> Result<Option<Difficulty>, ToolInputError> {
        let Some(text) = self.string(name)? else {
            return Ok(None);
        };
        Difficulty::parse(&text)
            .map(Some)
            .ok_or(ToolInputError::Invalid {
                name,
                expected: "one of easy, medium, hard, impossible",
            })
    }
}
