use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::InstrumentKind;
use crate::table::Row;
use crate::ValidationError;

/// One hit of the ISS `/securities.json` search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub secid: String,
    pub shortname: String,
    pub name: Option<String>,
    pub isin: Option<String>,
    pub regnumber: Option<String>,
    pub instrument_type: Option<String>,
    pub group: Option<String>,
    pub is_traded: Option<bool>,
    pub primary_boardid: Option<String>,
    pub marketprice_boardid: Option<String>,
    pub emitent_id: Option<i64>,
    pub emitent_title: Option<String>,
    pub emitent_inn: Option<String>,
}

impl SearchResult {
    /// Requires `secid` and `shortname`; everything else is optional.
    pub fn from_row(row: &Row) -> Result<Self, ValidationError> {
        Ok(Self {
            secid: row
                .text("secid")
                .ok_or(ValidationError::MissingField { field: "secid" })?,
            shortname: row
                .text("shortname")
                .ok_or(ValidationError::MissingField { field: "shortname" })?,
            name: row.text("name"),
            isin: row.text("isin"),
            regnumber: row.text("regnumber"),
            instrument_type: row.text("type"),
            group: row.text("group"),
            is_traded: row.flag("is_traded"),
            primary_boardid: row.text("primary_boardid"),
            marketprice_boardid: row.text("marketprice_boardid"),
            emitent_id: row.int("emitent_id"),
            emitent_title: row.text("emitent_title"),
            emitent_inn: row.text("emitent_inn"),
        })
    }

    pub fn kind(&self) -> InstrumentKind {
        InstrumentKind::from_group(self.group.as_deref())
    }
}

impl Display for SearchResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} | {}", self.kind(), self.secid, self.shortname)?;
        if let Some(emitent_title) = &self.emitent_title {
            write!(f, " | {emitent_title}")?;
        }
        match self.is_traded {
            Some(true) => f.write_str(" | traded"),
            Some(false) => f.write_str(" | not traded"),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: serde_json::Value) -> Row {
        value
            .as_object()
            .map(|object| object.clone().into_iter().collect())
            .unwrap_or_default()
    }

    #[test]
    fn builds_from_lowercase_search_columns() {
        let result = SearchResult::from_row(&row(json!({
            "secid": "SBER", "shortname": "Сбербанк", "group": "stock_shares",
            "is_traded": 1, "emitent_id": 1199, "emitent_title": "ПАО Сбербанк"
        })))
        .expect("search result");

        assert_eq!(result.kind(), InstrumentKind::Share);
        assert_eq!(result.emitent_id, Some(1199));
        assert_eq!(
            result.to_string(),
            "Share SBER | Сбербанк | ПАО Сбербанк | traded"
        );
    }

    #[test]
    fn rows_without_identifier_are_rejected() {
        let err = SearchResult::from_row(&row(json!({"shortname": "x"}))).expect_err("no secid");
        assert_eq!(err, ValidationError::MissingField { field: "secid" });
    }
}
