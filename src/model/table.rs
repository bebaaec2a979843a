//! Column-oriented tables produced by topology flattening.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// One cell of a [`Table`].
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Zero-based row index.
    Index(usize),
    Float(f64),
    Text(String),
    /// Opaque member identifier.
    Id(u64),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Index(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
            Value::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Named column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

/// Ordered set of equally long named columns.
///
/// Serializes as a map from column name to value list, keeping column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column.
    ///
    /// All columns of a table have the same length.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        debug_assert!(
            self.columns.first().is_none_or(|c| c.values.len() == values.len()),
            "column length mismatch"
        );
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        (index < self.row_count()).then(|| self.columns.iter().map(|c| &c.values[index]).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for column in &self.columns {
            map.serialize_entry(&column.name, &column.values)?;
        }
        map.end()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<&str> = self.column_names().collect();
        writeln!(f, "{}", header.join("\t"))?;
        for index in 0..self.row_count() {
            let cells: Vec<String> = self.columns.iter().map(|c| c.values[index].to_string()).collect();
            writeln!(f, "{}", cells.join("\t"))?;
        }
        Ok(())
    }
}
