//! Form field validation
//!
//! Errors are grouped per field as a map of rule name to message, the shape
//! the error list component renders.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Validation failures of one form field, keyed by rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    pub types: BTreeMap<String, String>,
}

impl FieldErrors {
    pub fn single(rule: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(rule, message);
        errors
    }

    pub fn add(&mut self, rule: &str, message: impl Into<String>) {
        self.types.insert(rule.to_string(), message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.types.values().map(String::as_str)
    }
}

/// Parse amount text typed by the user
///
/// Accepts `.` or `,` as the decimal separator. Anything that is not a plain
/// decimal number yields `None`.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        trimmed.replacen(',', ".", 1)
    };
    if !normalized
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.' || c == '-' || c == '+')
    {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Money field rules: required, numeric, positive, two decimals, upper bound
pub fn validate_amount(text: &str, max_amount: u64) -> Result<Decimal, FieldErrors> {
    if text.trim().is_empty() {
        return Err(FieldErrors::single("required", "Ingresá un monto"));
    }
    let Some(amount) = parse_amount(text) else {
        return Err(FieldErrors::single("pattern", "Ingresá un monto válido"));
    };

    let mut errors = FieldErrors::default();
    if amount <= Decimal::ZERO {
        errors.add("min", "El monto debe ser mayor a 0");
    }
    if amount.normalize().scale() > 2 {
        errors.add("decimals", "El monto admite hasta 2 decimales");
    }
    if amount > Decimal::from(max_amount) {
        errors.add("max", format!("El monto no puede superar {}", max_amount));
    }

    if errors.is_empty() {
        Ok(amount)
    } else {
        Err(errors)
    }
}

/// Destination field rule: non-empty after trimming
pub fn validate_destination(text: &str) -> Result<String, FieldErrors> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(FieldErrors::single("required", "Ingresá un CVU o alias"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("150"), Some(Decimal::from(150)));
        assert_eq!(parse_amount(" 10.5 "), Decimal::from_str("10.5").ok());
        assert_eq!(parse_amount("10,5"), Decimal::from_str("10.5").ok());
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("12abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("1e5"), None);
    }

    #[test]
    fn test_validate_amount_ok() {
        assert_eq!(validate_amount("250.75", 1000).unwrap(), Decimal::from_str("250.75").unwrap());
        assert_eq!(validate_amount("1000", 1000), Ok(Decimal::from(1000)));
        assert_eq!(validate_amount("12.50", 1000).unwrap(), Decimal::from_str("12.5").unwrap());
    }

    #[test]
    fn test_validate_amount_rules() {
        let errors = validate_amount("", 1000).unwrap_err();
        assert!(errors.types.contains_key("required"));

        let errors = validate_amount("diez", 1000).unwrap_err();
        assert!(errors.types.contains_key("pattern"));

        let errors = validate_amount("-1.555", 1000).unwrap_err();
        assert!(errors.types.contains_key("min"));
        assert!(errors.types.contains_key("decimals"));
        assert_eq!(errors.messages().count(), 2);

        let errors = validate_amount("1000.01", 1000).unwrap_err();
        assert!(errors.types.contains_key("max"));
    }

    #[test]
    fn test_validate_destination() {
        assert_eq!(validate_destination("  ana.pago "), Ok("ana.pago".to_string()));
        assert!(validate_destination("   ").is_err());
    }
}
