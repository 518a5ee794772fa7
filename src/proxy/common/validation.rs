// Request input validation
// Collects every violation per field before reporting, never stops at the first one

use serde_json::{Map, Value};

use super::envelope::FieldErrors;

/// Length constraint for string fields, counted in characters
#[derive(Debug, Clone, Copy)]
pub enum Length {
    Max(usize),
    Exact(usize),
}

pub struct Validator<'a> {
    input: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Validator<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            errors: FieldErrors::new(),
        }
    }

    fn reject(&mut self, field: &str, message: String) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message);
    }

    /// Present, non-blank input value. Blank strings count as missing.
    fn present(&self, field: &str) -> Option<&'a Value> {
        match self.input.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(v) => Some(v),
        }
    }

    fn check_string(&mut self, field: &str, value: &Value, length: Length) -> Option<String> {
        let Some(s) = value.as_str() else {
            self.reject(field, format!("The {} field must be a string.", field));
            return None;
        };

        let s = s.trim();
        let count = s.chars().count();
        match length {
            Length::Max(max) if count > max => {
                self.reject(
                    field,
                    format!("The {} field must not be greater than {} characters.", field, max),
                );
                None
            }
            Length::Exact(size) if count != size => {
                self.reject(field, format!("The {} field must be {} characters.", field, size));
                None
            }
            _ => Some(s.to_string()),
        }
    }

    pub fn required_string(&mut self, field: &str, length: Length) -> Option<String> {
        match self.present(field) {
            Some(value) => self.check_string(field, value, length),
            None => {
                self.reject(field, format!("The {} field is required.", field));
                None
            }
        }
    }

    /// Absent values yield `Some(None)`; `None` means the field failed validation
    pub fn optional_string(&mut self, field: &str, length: Length) -> Option<Option<String>> {
        match self.present(field) {
            Some(value) => self.check_string(field, value, length).map(Some),
            None => Some(None),
        }
    }

    pub fn required_object(&mut self, field: &str) -> Option<Map<String, Value>> {
        match self.present(field) {
            Some(Value::Object(map)) if !map.is_empty() => Some(map.clone()),
            Some(_) => {
                self.reject(field, format!("The {} field must be a non-empty object.", field));
                None
            }
            None => {
                self.reject(field, format!("The {} field is required.", field));
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
