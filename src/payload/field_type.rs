use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The JSON type of a documented field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Array,
    Boolean,
    Object,
    Number,
    Null,
    String,
    /// The field has different types in different places of the payload.
    Varies,
}

impl FieldType {
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Null => FieldType::Null,
            Value::Bool(_) => FieldType::Boolean,
            Value::Number(_) => FieldType::Number,
            Value::String(_) => FieldType::String,
            Value::Array(_) => FieldType::Array,
            Value::Object(_) => FieldType::Object,
        }
    }

    /// The common type of `values`, or [`FieldType::Varies`] when they differ.
    /// `None` for an empty iterator.
    pub fn common<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<FieldType> {
        let mut common = None;
        for value in values {
            let ty = FieldType::of(value);
            match common {
                None => common = Some(ty),
                Some(existing) if existing != ty => return Some(FieldType::Varies),
                Some(_) => {}
            }
        }
        common
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Array => "Array",
            FieldType::Boolean => "Boolean",
            FieldType::Object => "Object",
            FieldType::Number => "Number",
            FieldType::Null => "Null",
            FieldType::String => "String",
            FieldType::Varies => "Varies",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
