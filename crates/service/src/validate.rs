//! Field validation shared by the auth and message workflows.
//!
//! Failures aggregate into a [`FieldErrors`] map (field name to a list of
//! messages) which serializes directly as the 422 response body.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use models::user::MaritalStatus;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 255;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Ordered field -> messages map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for msg in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, msg)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Run a rule over a required field, recording missing/invalid outcomes.
/// Returns the accepted value so callers can collect validated input.
pub fn required(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    rule: impl Fn(&str) -> Result<(), String>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => match rule(v) {
            Ok(()) => Some(v.to_string()),
            Err(msg) => {
                errors.add(field, msg);
                None
            }
        },
        _ => {
            errors.add(field, format!("The {} field is required.", field.replace('_', " ")));
            None
        }
    }
}

pub fn validate_name(v: &str) -> Result<(), String> {
    if v.chars().count() > MAX_NAME_LEN {
        return Err(format!("The name must not be greater than {} characters.", MAX_NAME_LEN));
    }
    Ok(())
}

pub fn validate_email(v: &str) -> Result<(), String> {
    if v.chars().count() > MAX_EMAIL_LEN {
        return Err(format!("The email must not be greater than {} characters.", MAX_EMAIL_LEN));
    }
    let well_formed = match v.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !v.contains(char::is_whitespace)
        }
        None => false,
    };
    if !well_formed {
        return Err("The email must be a valid email address.".to_string());
    }
    Ok(())
}

pub fn validate_password(v: &str) -> Result<(), String> {
    if v.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!("The password must be at least {} characters.", MIN_PASSWORD_LEN));
    }
    Ok(())
}

pub fn validate_address(_v: &str) -> Result<(), String> {
    Ok(())
}

pub fn validate_body(_v: &str) -> Result<(), String> {
    Ok(())
}

/// Coerce a JSON value into a boolean: accepts booleans, 0/1, and the usual
/// true/false word forms clients send for checkbox-style fields.
pub fn coerce_gender(v: &serde_json::Value) -> Result<bool, String> {
    match v {
        serde_json::Value::Bool(b) => Ok(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err("The gender field must be true or false.".to_string()),
        },
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(true),
            "0" | "false" | "off" | "no" => Ok(false),
            _ => Err("The gender field must be true or false.".to_string()),
        },
        _ => Err("The gender field must be true or false.".to_string()),
    }
}

pub fn parse_marital_status(v: &str) -> Result<MaritalStatus, String> {
    MaritalStatus::parse(v.trim())
        .ok_or_else(|| "The selected marital status is invalid.".to_string())
}
