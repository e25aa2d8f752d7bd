//! Record schema descriptions
//!
//! A [`Schema`] lists the fields a structured response must carry: name,
//! semantic type, description, and whether it is required. It renders to a
//! JSON Schema document for the model and validates decoded JSON before it is
//! handed to serde, so the model gets field-level error messages on repair.

use serde_json::{Map, Value, json};
use thiserror::Error;

/// Why a response did not match its schema
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no JSON object found in the response")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{path}' should be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("could not decode {schema}: {message}")]
    Decode { schema: String, message: String },
}

/// Semantic type of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Integer,
    Number,
    Boolean,
    List(Box<FieldKind>),
    Object(Schema),
}

impl FieldKind {
    /// A list of `item`
    pub fn list(item: FieldKind) -> Self {
        FieldKind::List(Box::new(item))
    }

    fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "a string",
            FieldKind::Integer => "an integer",
            FieldKind::Number => "a number",
            FieldKind::Boolean => "a boolean",
            FieldKind::List(_) => "an array",
            FieldKind::Object(_) => "an object",
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            FieldKind::String => json!({"type": "string"}),
            FieldKind::Integer => json!({"type": "integer"}),
            FieldKind::Number => json!({"type": "number"}),
            FieldKind::Boolean => json!({"type": "boolean"}),
            FieldKind::List(item) => json!({"type": "array", "items": item.json_schema()}),
            FieldKind::Object(schema) => schema.to_json_schema(),
        }
    }

    fn check(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        match (self, value) {
            (FieldKind::String, Value::String(_)) => Ok(()),
            (FieldKind::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
            (FieldKind::Number, Value::Number(_)) => Ok(()),
            (FieldKind::Boolean, Value::Bool(_)) => Ok(()),
            (FieldKind::List(item), Value::Array(items)) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, v)| item.check(v, &format!("{path}[{i}]"))),
            (FieldKind::Object(schema), Value::Object(_)) => schema.check_at(value, path),
            _ => Err(ValidationError::WrongType {
                path: path.to_string(),
                expected: self.type_name(),
                found: json_type_name(value),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(n) if n.is_f64() => "a number",
        Value::Number(_) => "an integer",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One named field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub kind: FieldKind,
    pub description: String,
    pub required: bool,
}

/// Description of a record a response must decode into
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub title: String,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
        }
    }

    /// Add a required field
    pub fn required(self, name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        self.field(name, kind, description, true)
    }

    /// Add an optional field
    pub fn optional(self, name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        self.field(name, kind, description, false)
    }

    fn field(mut self, name: impl Into<String>, kind: FieldKind, description: impl Into<String>, required: bool) -> Self {
        self.fields.push(Field {
            name: name.into(),
            kind,
            description: description.into(),
            required,
        });
        self
    }

    /// Render as a JSON Schema object
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = field.kind.json_schema();
            if !field.description.is_empty() {
                property["description"] = json!(field.description);
            }
            properties.insert(field.name.clone(), property);
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "title": self.title,
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check a decoded value against this schema
    ///
    /// Required fields must be present and non-null; present fields must have
    /// the declared type. Unknown fields are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        self.check_at(value, "")
    }

    fn check_at(&self, value: &Value, path: &str) -> Result<(), ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::WrongType {
                path: if path.is_empty() { self.title.clone() } else { path.to_string() },
                expected: "an object",
                found: json_type_name(value),
            });
        };

        for field in &self.fields {
            let field_path = if path.is_empty() {
                field.name.clone()
            } else {
                format!("{path}.{}", field.name)
            };

            match map.get(&field.name) {
                None | Some(Value::Null) if field.required => {
                    return Err(ValidationError::MissingField(field_path));
                }
                None | Some(Value::Null) => {}
                Some(v) => field.kind.check(v, &field_path)?,
            }
        }
        Ok(())
    }
}
