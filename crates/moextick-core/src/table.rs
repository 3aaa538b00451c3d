//! Decoding of ISS tabular JSON.
//!
//! An ISS response is an object of named blocks, each shaped as
//! `{"columns": [..], "data": [[..], ..]}`. Rows are exposed as a
//! `column -> value` mapping with typed accessors.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::Date;

use crate::domain::coerce;
use crate::MoexError;

/// Parsed ISS response body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssDocument {
    blocks: Map<String, Value>,
}

impl IssDocument {
    pub fn parse(body: &str) -> Result<Self, MoexError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|error| MoexError::decode(format!("ISS response is not valid JSON: {error}")))?;
        match value {
            Value::Object(blocks) => Ok(Self { blocks }),
            _ => Err(MoexError::decode("ISS response is not a JSON object")),
        }
    }

    /// Returns the named block; a missing or `null` block is an empty table.
    pub fn table(&self, name: &str) -> Result<IssTable, MoexError> {
        let Some(block) = self.blocks.get(name).filter(|block| !block.is_null()) else {
            return Ok(IssTable::empty());
        };

        let raw = RawTable::deserialize(block).map_err(|error| {
            MoexError::decode(format!("ISS block '{name}' is not a columns/data table: {error}"))
        })?;
        Ok(IssTable {
            columns: raw.columns,
            data: raw.data,
        })
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }
}

#[derive(Deserialize)]
struct RawTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IssTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl IssTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.data
            .iter()
            .map(|cells| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(cells.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// One ISS row keyed by column name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: BTreeMap<String, Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(coerce::text)
    }

    pub fn decimal(&self, column: &str) -> Option<Decimal> {
        self.get(column).and_then(coerce::decimal)
    }

    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(coerce::int)
    }

    pub fn date(&self, column: &str) -> Option<Date> {
        self.get(column).and_then(coerce::date)
    }

    pub fn flag(&self, column: &str) -> Option<bool> {
        self.get(column).and_then(coerce::flag)
    }

    /// Trading board code (`BOARDID`).
    pub fn board_id(&self) -> Option<String> {
        self.text("BOARDID")
    }

    /// First column in `columns` holding a decimal value.
    pub fn first_decimal(&self, columns: &[&str]) -> Option<Decimal> {
        columns.iter().find_map(|column| self.decimal(column))
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
