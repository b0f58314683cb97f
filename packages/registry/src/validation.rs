use pagesmith_model::Props;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// JSON value shape a rule can demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ValueType::String => value.is_string(),
            ValueType::Number => value.is_number(),
            ValueType::Boolean => value.is_boolean(),
            ValueType::Array => value.is_array(),
            ValueType::Object => value.is_object(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        })
    }
}

/// Constraints on one prop key
///
/// `min`/`max` bound numeric values only; a non-numeric value is left to the
/// `type` rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl ValidationRule {
    pub fn typed(value_type: ValueType) -> Self {
        Self {
            value_type: Some(value_type),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Check one prop value; `None` means the key is absent
    pub fn check(&self, field: &str, value: Option<&Value>) -> Result<(), ValidationError> {
        let value = match value {
            None | Some(Value::Null) if self.required => {
                return Err(ValidationError::new(field, Constraint::Required));
            }
            None | Some(Value::Null) => return Ok(()),
            Some(value) => value,
        };

        if let Some(value_type) = self.value_type {
            if !value_type.matches(value) {
                return Err(ValidationError::new(field, Constraint::Type(value_type)));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    return Err(ValidationError::new(field, Constraint::Min(min)));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    return Err(ValidationError::new(field, Constraint::Max(max)));
                }
            }
        }

        Ok(())
    }
}

/// The rule a field broke
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Constraint {
    Required,
    Type(ValueType),
    Min(f64),
    Max(f64),
    MinItems(usize),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => write!(f, "is required"),
            Constraint::Type(t) => write!(f, "must be of type {}", t),
            Constraint::Min(n) => write!(f, "must be at least {}", n),
            Constraint::Max(n) => write!(f, "must be at most {}", n),
            Constraint::MinItems(n) => write!(f, "requires at least {} items", n),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Property {field} {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            field: field.into(),
            constraint,
        }
    }
}

/// Check a prop bag against every rule, in key order; the first violation wins
pub fn validate_props(props: &Props, rules: &BTreeMap<String, ValidationRule>) -> Result<(), ValidationError> {
    for (field, rule) in rules {
        rule.check(field, props.get(field))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagesmith_model::props;
    use serde_json::json;

    fn rules() -> BTreeMap<String, ValidationRule> {
        let mut rules = BTreeMap::new();
        rules.insert("title".to_string(), ValidationRule::typed(ValueType::String).required());
        rules.insert(
            "columns".to_string(),
            ValidationRule::typed(ValueType::Number).range(Some(1.0), Some(6.0)),
        );
        rules
    }

    #[test]
    fn test_valid_props_pass() {
        let bag = props(json!({ "title": "Hello", "columns": 3, "extra": [1, 2] }));
        assert!(validate_props(&bag, &rules()).is_ok());
    }

    #[test]
    fn test_required_field() {
        let err = validate_props(&props(json!({ "columns": 3 })), &rules()).unwrap_err();
        assert_eq!(err, ValidationError::new("title", Constraint::Required));
        assert_eq!(err.to_string(), "Property title is required");

        let err = validate_props(&props(json!({ "title": null })), &rules()).unwrap_err();
        assert_eq!(err.constraint, Constraint::Required);
    }

    #[test]
    fn test_type_and_range() {
        let err = validate_props(&props(json!({ "title": 42 })), &rules()).unwrap_err();
        assert_eq!(err.constraint, Constraint::Type(ValueType::String));

        let err = validate_props(&props(json!({ "title": "x", "columns": 9 })), &rules()).unwrap_err();
        assert_eq!(err, ValidationError::new("columns", Constraint::Max(6.0)));
        assert_eq!(err.to_string(), "Property columns must be at most 6");

        let err = validate_props(&props(json!({ "title": "x", "columns": 0 })), &rules()).unwrap_err();
        assert_eq!(err.constraint, Constraint::Min(1.0));
    }

    #[test]
    fn test_optional_absent_key_is_skipped() {
        let rule = ValidationRule::typed(ValueType::Array);
        assert!(rule.check("services", None).is_ok());
        assert!(rule.check("services", Some(&json!("nope"))).is_err());
    }
}
