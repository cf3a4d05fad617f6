//! The data mapping placeholders are resolved against.
//!
//! Values are JSON. How a value is read depends on the placeholder kind:
//! text placeholders accept anything and coerce it to a string, while
//! lists, tables and image keys must have the matching shape. A `null`
//! value is the same as an absent one.

use crate::common::error::{Error, Result};
use serde_json::{Map, Value};

/// Values for a rendering pass, keyed by placeholder name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateData {
    values: Map<String, Value>,
}

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON object.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self {
            values: serde_json::from_str(json)?,
        })
    }

    /// Parse a JSON object from a reader.
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(Self {
            values: serde_json::from_reader(reader)?,
        })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`TemplateData::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// The raw value, `None` when absent or `null`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Value for a text or choice placeholder; absent values are empty.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(text_form).unwrap_or_default()
    }

    /// Items for a list placeholder.
    ///
    /// `Ok(None)` when absent. Blank and whitespace-only items are dropped,
    /// surviving items keep their text as written.
    pub fn list(&self, name: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(invalid(name, "a list of scalars"));
        };

        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if item.is_null() {
                continue;
            }
            let text = scalar_form(item).ok_or_else(|| invalid(name, "a list of scalars"))?;
            if !text.trim().is_empty() {
                out.push(text);
            }
        }
        Ok(Some(out))
    }

    /// Storage key for an image or scrape placeholder.
    pub fn image_key(&self, name: &str) -> Result<Option<&str>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(key)) if key.trim().is_empty() => Ok(None),
            Some(Value::String(key)) => Ok(Some(key.as_str())),
            Some(_) => Err(invalid(name, "a storage key string")),
        }
    }

    /// Rows for a table placeholder.
    pub fn table(&self, name: &str) -> Result<Option<Vec<Vec<String>>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let Value::Array(rows) = value else {
            return Err(invalid(name, "a two-dimensional array of scalars"));
        };

        rows.iter()
            .map(|row| match row {
                Value::Array(cells) => cells
                    .iter()
                    .map(|cell| {
                        if cell.is_null() {
                            Some(String::new())
                        } else {
                            scalar_form(cell)
                        }
                    })
                    .collect::<Option<Vec<_>>>(),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Some)
            .ok_or_else(|| invalid(name, "a two-dimensional array of scalars"))
    }
}

impl From<Map<String, Value>> for TemplateData {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for TemplateData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

fn invalid(name: &str, expected: &'static str) -> Error {
    Error::InvalidPlaceholderData {
        name: name.to_string(),
        expected,
    }
}

/// String form of a scalar; `None` for arrays, objects and `null`.
fn scalar_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// String form of any value in text context.
fn text_form(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|v| !v.is_null())
            .map(text_form)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
        Value::Null => String::new(),
        scalar => scalar_form(scalar).unwrap_or_default(),
    }
}
