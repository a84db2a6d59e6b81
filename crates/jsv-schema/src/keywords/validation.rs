//! Value assertions: `type`, `const`, `enum`, `required`.
//!
//! None of these wrap sub-schemas, so they register nothing and every
//! pointer into them resolves to [`Resolved::Terminal`].

use std::fmt;

use jsv_core::{invalid_value_string, Pointer, RunContext};
use serde_json::Value;

use crate::compiler::{json_type, Compiler};
use crate::error::SchemaError;
use crate::keyword::{Keyword, Resolved};
use crate::schema_registry::SchemaRegistry;
use crate::state::ValidationState;

// ---------------------------------------------------------------------------
// type
// ---------------------------------------------------------------------------

/// A JSON type name accepted by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean,
    /// Any object.
    Object,
    /// Any array.
    Array,
    /// Any number.
    Number,
    /// A number without a fractional part (`1.0` included).
    Integer,
    /// Any string.
    String,
}

impl PrimitiveType {
    /// Parse a type name.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "null" => Self::Null,
            "boolean" => Self::Boolean,
            "object" => Self::Object,
            "array" => Self::Array,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "string" => Self::String,
            _ => return None,
        })
    }

    /// The type name as written in schemas.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }

    /// True if `value` is of this type.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Null, Value::Null)
            | (Self::Boolean, Value::Bool(_))
            | (Self::Object, Value::Object(_))
            | (Self::Array, Value::Array(_))
            | (Self::Number, Value::Number(_))
            | (Self::String, Value::String(_)) => true,
            (Self::Integer, Value::Number(n)) => {
                n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
            }
            _ => false,
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `type`: the instance must be of one of the listed types.
#[derive(Debug, Default, Clone)]
pub struct Type {
    types: Vec<PrimitiveType>,
}

impl Type {
    /// The accepted types.
    pub fn types(&self) -> &[PrimitiveType] {
        &self.types
    }

    fn describe(&self) -> String {
        match self.types.as_slice() {
            [single] => single.to_string(),
            many => {
                let names: Vec<&str> = many.iter().map(|t| t.as_str()).collect();
                format!("one of: {}", names.join(", "))
            }
        }
    }
}

impl Keyword for Type {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, location: &Pointer) -> Result<(), SchemaError> {
        let names: Vec<&str> = match raw {
            Value::String(name) => vec![name.as_str()],
            Value::Array(items) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    item.as_str().ok_or_else(|| {
                        SchemaError::invalid_keyword("type", location, "type names must be strings")
                    })
                })
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(SchemaError::invalid_keyword(
                    "type",
                    location,
                    "expected a type name or a non-empty array of type names",
                ))
            }
        };

        self.types = names
            .into_iter()
            .map(|name| {
                PrimitiveType::parse(name).ok_or_else(|| {
                    SchemaError::invalid_keyword("type", location, format!("unknown type '{name}'"))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        if ctx.is_done() || self.types.iter().any(|t| t.matches(data)) {
            return;
        }
        state.add_error(
            data,
            format!("type should be {}, got {}", self.describe(), json_type(data)),
        );
    }

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}

// ---------------------------------------------------------------------------
// const / enum
// ---------------------------------------------------------------------------

/// JSON equality: numbers compare by value, so `1` equals `1.0`.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (x.as_u64(), y.as_u64()) {
                (Some(x), Some(y)) => x == y,
                _ => x.as_f64() == y.as_f64(),
            },
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|other| json_equal(v, other)))
        }
        _ => a == b,
    }
}

/// `const`: the instance must equal one value.
#[derive(Debug, Default, Clone)]
pub struct Const {
    value: Value,
}

impl Keyword for Const {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, _: &Pointer) -> Result<(), SchemaError> {
        self.value = raw.clone();
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        if ctx.is_done() || json_equal(&self.value, data) {
            return;
        }
        state.add_error(
            data,
            format!("must equal {}", invalid_value_string(&self.value)),
        );
    }

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}

/// `enum`: the instance must equal one of the listed values.
#[derive(Debug, Default, Clone)]
pub struct Enum {
    values: Vec<Value>,
}

impl Keyword for Enum {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, location: &Pointer) -> Result<(), SchemaError> {
        let values = raw
            .as_array()
            .ok_or_else(|| SchemaError::invalid_keyword("enum", location, "expected an array"))?;
        self.values = values.clone();
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        if ctx.is_done() || self.values.iter().any(|v| json_equal(v, data)) {
            return;
        }
        state.add_error(
            data,
            format!("should be one of {}", invalid_value_string(&self.values)),
        );
    }

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}

// ---------------------------------------------------------------------------
// required
// ---------------------------------------------------------------------------

/// `required`: an object instance must have every listed property.
/// Non-objects pass.
#[derive(Debug, Default, Clone)]
pub struct Required {
    names: Vec<String>,
}

impl Keyword for Required {
    fn load(&mut self, raw: &Value, _: &Compiler<'_>, location: &Pointer) -> Result<(), SchemaError> {
        let invalid = || SchemaError::invalid_keyword("required", location, "expected an array of strings");
        self.names = raw
            .as_array()
            .ok_or_else(invalid)?
            .iter()
            .map(|name| name.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    fn validate_keyword(&self, ctx: &RunContext, state: &mut ValidationState, data: &Value) {
        let Value::Object(members) = data else {
            return;
        };
        for name in &self.names {
            if ctx.is_done() {
                return;
            }
            if !members.contains_key(name) {
                state.add_error(data, format!("\"{name}\" value is required"));
            }
        }
    }

    fn register(&self, _: &str, _: &mut SchemaRegistry) {}

    fn resolve(&self, _: &Pointer, _: &str) -> Resolved {
        Resolved::Terminal
    }
}
