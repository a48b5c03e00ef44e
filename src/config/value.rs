//! Setting values and path-based access into a settings table

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A settings table. Keys are unique per level.
pub type Table = BTreeMap<String, Value>;

/// A single node of the settings tree.
///
/// Serializes untagged so a `Table` writes out as plain TOML.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    Array(Vec<Value>),
    Table(Table),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Table(t) => write!(f, "{{{} keys}}", t.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Table> for Value {
    fn from(v: Table) -> Self {
        Value::Table(v)
    }
}

impl From<toml::Value> for Value {
    fn from(v: toml::Value) -> Self {
        match v {
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::String(s) => Value::Str(s),
            toml::Value::Datetime(d) => Value::Str(d.to_string()),
            toml::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            toml::Value::Table(t) => Value::Table(table_from_toml(t)),
        }
    }
}

pub fn table_from_toml(t: toml::Table) -> Table {
    t.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

/// Walk `path` from `root`. Any missing segment, or a non-table in the
/// middle of the path, yields `None`. An empty path yields `None`.
pub fn lookup<'a>(root: &'a Table, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut node = root;
    for key in parents {
        node = node.get(*key)?.as_table()?;
    }
    node.get(*last)
}

/// Assign `value` at `path`, creating missing intermediate tables.
///
/// A non-table found in the middle of the path is replaced by a table.
/// Returns the previous value at the final key, if any. `path` must not be empty.
pub fn assign(root: &mut Table, path: &[&str], value: Value) -> Option<Value> {
    let (last, parents) = path.split_last()?;
    let mut node = root;
    for key in parents {
        let slot = node
            .entry((*key).to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !matches!(slot, Value::Table(_)) {
            *slot = Value::Table(Table::new());
        }
        let Value::Table(next) = slot else {
            return None;
        };
        node = next;
    }
    node.insert((*last).to_string(), value)
}
