//! Result validation before a scan is stored
//!
//! Problems come back as a field-to-message map so the UI can show them
//! next to the form inputs. Level is informational and never checked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::OcrResult;
use crate::config::TextLimits;

/// Validated fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Cp,
    Hp,
}

/// Field to message. Empty when the result is valid.
pub type ValidationErrors = BTreeMap<Field, String>;

pub fn validate_result(result: &OcrResult, limits: &TextLimits) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match result.name.as_deref().map(str::trim) {
        None | Some("") => {
            errors.insert(Field::Name, "Name is required".to_string());
        }
        Some(name) if name.chars().count() > limits.max_name_len => {
            errors.insert(
                Field::Name,
                format!("Name must be at most {} characters", limits.max_name_len),
            );
        }
        Some(_) => {}
    }

    if let Some(message) = check_range("CP", result.cp, limits.max_cp) {
        errors.insert(Field::Cp, message);
    }
    if let Some(message) = check_range("HP", result.hp, limits.max_hp) {
        errors.insert(Field::Hp, message);
    }

    errors
}

fn check_range(label: &str, value: Option<u32>, max: u32) -> Option<String> {
    match value {
        None => Some(format!("{} is required", label)),
        Some(v) if v == 0 || v > max => Some(format!("{} must be between 1 and {}", label, max)),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> OcrResult {
        OcrResult {
            name: Some("pikachu".to_string()),
            cp: Some(1200),
            hp: Some(80),
            iv: None,
            level: None,
            level_method: None,
        }
    }

    #[test]
    fn test_valid_result() {
        assert!(validate_result(&valid(), &TextLimits::default()).is_empty());
    }

    #[test]
    fn test_zero_cp() {
        let result = OcrResult {
            cp: Some(0),
            ..valid()
        };
        let errors = validate_result(&result, &TextLimits::default());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&Field::Cp], "CP must be between 1 and 9999");
    }

    #[test]
    fn test_empty_name() {
        let result = OcrResult {
            name: Some(String::new()),
            ..valid()
        };
        let errors = validate_result(&result, &TextLimits::default());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&Field::Name], "Name is required");
    }

    #[test]
    fn test_long_name() {
        let result = OcrResult {
            name: Some("x".repeat(51)),
            ..valid()
        };
        let errors = validate_result(&result, &TextLimits::default());
        assert!(errors.contains_key(&Field::Name));
    }

    #[test]
    fn test_missing_fields() {
        let result = OcrResult {
            name: None,
            cp: None,
            hp: Some(1000),
            ..valid()
        };
        let errors = validate_result(&result, &TextLimits::default());

        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec![Field::Name, Field::Cp, Field::Hp]
        );
        assert_eq!(errors[&Field::Cp], "CP is required");
    }

    #[test]
    fn test_errors_serialize_by_field_name() {
        let result = OcrResult {
            hp: None,
            ..valid()
        };
        let errors = validate_result(&result, &TextLimits::default());
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"hp":"HP is required"}"#);
    }
}
