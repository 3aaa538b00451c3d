use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::table::Row;
use crate::ValidationError;

/// Marketdata columns that count as live share trading.
pub const SHARE_PRICE_COLUMNS: &[&str] = &["LAST", "WAPRICE", "OPEN", "HIGH", "LOW"];

/// Share record built from the `securities` row of the selected board and
/// its `marketdata` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub sec_id: String,
    pub short_name: Option<String>,
    pub sec_name: Option<String>,
    pub isin: Option<String>,
    pub reg_number: Option<String>,
    pub board_id: Option<String>,
    pub board_name: Option<String>,

    pub last_price: Option<Decimal>,
    pub open_price: Option<Decimal>,
    pub high_price: Option<Decimal>,
    pub low_price: Option<Decimal>,
    pub prev_price: Option<Decimal>,

    pub currency_id: Option<String>,
    pub min_step: Option<Decimal>,
    pub decimals: Option<i64>,
    #[serde(default, with = "super::iso_date::option")]
    pub settle_date: Option<Date>,

    pub lot_size: Option<i64>,
    pub face_value: Option<Decimal>,
    pub issue_size: Option<i64>,

    pub status: Option<String>,
    pub list_level: Option<i64>,
    pub sec_type: Option<String>,
    pub sector_id: Option<String>,
    pub market_code: Option<String>,
    pub instr_id: Option<String>,
}

impl Share {
    /// Builds a share from its reference row and, when trading, its
    /// marketdata row. `last_price` falls back from `LAST` to `WAPRICE`.
    pub fn from_rows(security: &Row, market: Option<&Row>) -> Result<Self, ValidationError> {
        let sec_id = security
            .text("SECID")
            .ok_or(ValidationError::MissingField { field: "SECID" })?;
        let market_price = |columns: &[&str]| market.and_then(|row| row.first_decimal(columns));

        Ok(Self {
            sec_id,
            short_name: security.text("SHORTNAME"),
            sec_name: security.text("SECNAME"),
            isin: security.text("ISIN"),
            reg_number: security.text("REGNUMBER"),
            board_id: security.board_id(),
            board_name: security.text("BOARDNAME"),
            last_price: market_price(&["LAST", "WAPRICE"]),
            open_price: market_price(&["OPEN"]),
            high_price: market_price(&["HIGH"]),
            low_price: market_price(&["LOW"]),
            prev_price: security.decimal("PREVPRICE"),
            currency_id: security.text("CURRENCYID"),
            min_step: security.decimal("MINSTEP"),
            decimals: security.int("DECIMALS"),
            settle_date: security.date("SETTLEDATE"),
            lot_size: security.int("LOTSIZE"),
            face_value: security.decimal("FACEVALUE"),
            issue_size: security.int("ISSUESIZE"),
            status: security.text("STATUS"),
            list_level: security.int("LISTLEVEL"),
            sec_type: security.text("SECTYPE"),
            sector_id: security.text("SECTORID"),
            market_code: security.text("MARKETCODE"),
            instr_id: security.text("INSTRID"),
        })
    }

    /// Cost of one lot at the last price.
    pub fn lot_price(&self) -> Option<Decimal> {
        self.last_price?.checked_mul(Decimal::from(self.lot_size?))
    }

    /// Change from the previous close in percent, rounded to two places.
    pub fn change_percent(&self) -> Option<Decimal> {
        let last = self.last_price?;
        let prev = self.prev_price.filter(|prev| !prev.is_zero())?;
        let change = last.checked_sub(prev)?.checked_div(prev)?;
        Some(change.checked_mul(Decimal::ONE_HUNDRED)?.round_dp(2))
    }
}

impl Display for Share {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Share {}", self.sec_id)?;
        if let Some(short_name) = &self.short_name {
            write!(f, " | {short_name}")?;
        }
        if let Some(last_price) = self.last_price {
            write!(f, " | price={last_price}")?;
        }
        Ok(())
    }
}
