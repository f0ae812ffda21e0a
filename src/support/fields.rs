use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_STRING: &str = "Not a valid string.";

// Longer integer strings are rejected without parsing.
const MAX_INTEGER_STRING_LENGTH: usize = 1000;

/// Messages per field name, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

/// Reads typed fields out of a JSON object, collecting an error for every
/// field that is missing or invalid instead of stopping at the first one.
pub struct FieldReader<'a> {
    data: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a Map<String, Value>) -> Self {
        Self {
            data,
            errors: FieldErrors::default(),
        }
    }

    fn required(&mut self, field: &'static str) -> Option<&'a Value> {
        match self.data.get(field) {
            None => {
                self.errors.add(field, REQUIRED);
                None
            }
            Some(Value::Null) => {
                self.errors.add(field, NOT_NULL);
                None
            }
            Some(v) => Some(v),
        }
    }

    pub fn integer(&mut self, field: &'static str) -> Option<i64> {
        let value = self.required(field)?;

        match parse_integer(value) {
            Some(v) => Some(v),
            None => {
                self.errors.add(field, INVALID_INTEGER);
                None
            }
        }
    }

    pub fn integer_in(&mut self, field: &'static str, min: i64, max: i64) -> Option<i64> {
        let v = self.integer(field)?;

        if v < min {
            self.errors.add(field, format!("Ensure this value is greater than or equal to {}.", min));
            return None;
        }
        if v > max {
            self.errors.add(field, format!("Ensure this value is less than or equal to {}.", max));
            return None;
        }

        Some(v)
    }

    /// A trimmed, non-blank string of at most `max_length` characters.
    /// Numbers are accepted and converted to their decimal text.
    pub fn string(&mut self, field: &'static str, max_length: usize) -> Option<String> {
        let value = self.required(field)?;

        let v = match value {
            Value::String(s) => s.trim().to_owned(),
            Value::Number(n) => n.to_string(),
            _ => {
                self.errors.add(field, INVALID_STRING);
                return None;
            }
        };

        if v.is_empty() {
            self.errors.add(field, NOT_BLANK);
            return None;
        }
        if v.chars().count() > max_length {
            self.errors.add(field, format!("Ensure this field has no more than {} characters.", max_length));
            return None;
        }

        Some(v)
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                return Some(v);
            }
            let f = n.as_f64()?;
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                Some(f as i64)
            } else {
                None
            }
        }
        Value::String(s) => {
            if s.len() > MAX_INTEGER_STRING_LENGTH {
                return None;
            }
            // "20", " 20 " and "20.000" are all 20.
            let s = s.trim();
            let s = match s.split_once('.') {
                Some((int, zeros)) if zeros.chars().all(|c| c == '0') => int,
                _ => s,
            };
            s.parse::<i64>().ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn integers_accept_numeric_text_and_whole_floats() {
        let data = object(json!({"a": 20, "b": "21", "c": " 22 ", "d": 23.0, "e": "24.00"}));
        let mut fields = FieldReader::new(&data);

        assert_eq!(fields.integer("a"), Some(20));
        assert_eq!(fields.integer("b"), Some(21));
        assert_eq!(fields.integer("c"), Some(22));
        assert_eq!(fields.integer("d"), Some(23));
        assert_eq!(fields.integer("e"), Some(24));
        assert!(fields.into_errors().is_empty());
    }

    #[test]
    fn integers_reject_everything_else() {
        let data = object(json!({"a": "prr", "b": 1.5, "c": true, "d": [1], "e": "1.50"}));
        let mut fields = FieldReader::new(&data);

        for field in ["a", "b", "c", "d", "e"] {
            assert_eq!(fields.integer(field), None, "{}", field);
        }

        let errors = fields.into_errors();
        for field in ["a", "b", "c", "d", "e"] {
            assert_eq!(errors.get(field), Some(&[INVALID_INTEGER.to_owned()][..]));
        }
    }

    #[test]
    fn missing_and_null_fields_are_reported() {
        let data = object(json!({"b": null}));
        let mut fields = FieldReader::new(&data);

        assert_eq!(fields.integer("a"), None);
        assert_eq!(fields.string("b", 10), None);

        let errors = fields.into_errors();
        assert_eq!(errors.get("a"), Some(&[REQUIRED.to_owned()][..]));
        assert_eq!(errors.get("b"), Some(&[NOT_NULL.to_owned()][..]));
    }

    #[test]
    fn integer_bounds() {
        let data = object(json!({"low": 0, "high": 11, "ok": 10}));
        let mut fields = FieldReader::new(&data);

        assert_eq!(fields.integer_in("low", 1, 10), None);
        assert_eq!(fields.integer_in("high", 1, 10), None);
        assert_eq!(fields.integer_in("ok", 1, 10), Some(10));

        let errors = fields.into_errors();
        assert_eq!(errors.get("low"), Some(&["Ensure this value is greater than or equal to 1.".to_owned()][..]));
        assert_eq!(errors.get("high"), Some(&["Ensure this value is less than or equal to 10.".to_owned()][..]));
    }

    #[test]
    fn strings_are_trimmed_and_bounded() {
        let data = object(json!({
            "padded": "  Survey  ",
            "number": 12,
            "blank": "   ",
            "long": "abcdef",
            "flag": false,
        }));
        let mut fields = FieldReader::new(&data);

        assert_eq!(fields.string("padded", 6).as_deref(), Some("Survey"));
        assert_eq!(fields.string("number", 5).as_deref(), Some("12"));
        assert_eq!(fields.string("blank", 5), None);
        assert_eq!(fields.string("long", 5), None);
        assert_eq!(fields.string("flag", 5), None);

        let errors = fields.into_errors();
        assert_eq!(errors.get("padded"), None);
        assert_eq!(errors.get("long"), Some(&["Ensure this field has no more than 5 characters.".to_owned()][..]));
        assert_eq!(errors.get("blank"), Some(&[NOT_BLANK.to_owned()][..]));
        assert_eq!(errors.get("flag"), Some(&[INVALID_STRING.to_owned()][..]));
    }
}
