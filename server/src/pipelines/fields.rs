use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Storage backends a pipeline input path may point at.
pub const STORAGE_PREFIXES: &[&str] = &["s3://", "/data/", "/mnt/", "gs://", "https://"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Reads typed fields out of a parameter object, collecting every violation
/// instead of stopping at the first one. Unknown keys are ignored.
pub(crate) struct FieldReader<'a> {
    params: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(params: &'a Map<String, Value>) -> Self {
        Self {
            params,
            errors: Vec::new(),
        }
    }

    pub(crate) fn required<T: DeserializeOwned>(&mut self, field: &str) -> Option<T> {
        match self.params.get(field) {
            None | Some(Value::Null) => {
                self.errors.push(FieldError::new(field, "field required"));
                None
            }
            Some(value) => self.parse(field, value),
        }
    }

    pub(crate) fn optional<T: DeserializeOwned>(&mut self, field: &str) -> Option<T> {
        match self.params.get(field) {
            None | Some(Value::Null) => None,
            Some(value) => self.parse(field, value),
        }
    }

    fn parse<T: DeserializeOwned>(&mut self, field: &str, value: &Value) -> Option<T> {
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.errors.push(FieldError::new(field, e.to_string()));
                None
            }
        }
    }

    pub(crate) fn check_range(&mut self, field: &str, value: Option<i64>, range: RangeInclusive<i64>) {
        if let Some(v) = value {
            if !range.contains(&v) {
                self.errors.push(FieldError::new(
                    field,
                    format!(
                        "must be between {} and {}, got {v}",
                        range.start(),
                        range.end()
                    ),
                ));
            }
        }
    }

    pub(crate) fn check_min(&mut self, field: &str, value: Option<i64>, min: i64) {
        if let Some(v) = value {
            if v < min {
                self.errors
                    .push(FieldError::new(field, format!("must be at least {min}, got {v}")));
            }
        }
    }

    pub(crate) fn check_storage_path(&mut self, field: &str, path: Option<&str>) {
        if let Some(path) = path {
            if !STORAGE_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
                self.errors.push(FieldError::new(
                    field,
                    format!(
                        "File path must start with one of: {}",
                        STORAGE_PREFIXES.join(", ")
                    ),
                ));
            }
        }
    }

    pub(crate) fn check_not_empty(&mut self, field: &str, value: Option<&str>) {
        if let Some(v) = value {
            if v.trim().is_empty() {
                self.errors.push(FieldError::new(field, "must not be empty"));
            }
        }
    }

    pub(crate) fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}
