use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::table::Row;
use crate::ValidationError;

/// Marketdata columns that count as live bond trading.
pub const BOND_PRICE_COLUMNS: &[&str] = &["LAST", "WAPRICE", "MARKETPRICE"];

/// Bond record. Prices are quoted in percent of face value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub sec_id: String,
    pub short_name: Option<String>,
    pub sec_name: Option<String>,
    pub isin: Option<String>,
    pub reg_number: Option<String>,
    pub board_id: Option<String>,

    pub price_percent: Option<Decimal>,
    pub yield_percent: Option<Decimal>,

    pub coupon_value: Option<Decimal>,
    pub coupon_percent: Option<Decimal>,
    pub accrued_int: Option<Decimal>,
    #[serde(default, with = "super::iso_date::option")]
    pub next_coupon: Option<Date>,
    #[serde(default, with = "super::iso_date::option")]
    pub mat_date: Option<Date>,
    pub coupon_period: Option<i64>,

    pub face_value: Option<Decimal>,
    pub lot_size: Option<i64>,
    pub lot_value: Option<Decimal>,
    pub face_unit: Option<String>,
    pub currency_id: Option<String>,

    pub issue_size_placed: Option<i64>,
    pub list_level: Option<i64>,
    pub status: Option<String>,
    pub sec_type: Option<String>,

    #[serde(default, with = "super::iso_date::option")]
    pub offer_date: Option<Date>,
    #[serde(default, with = "super::iso_date::option")]
    pub date_yield_from_issuer: Option<Date>,
    #[serde(default, with = "super::iso_date::option")]
    pub call_option_date: Option<Date>,
    #[serde(default, with = "super::iso_date::option")]
    pub put_option_date: Option<Date>,
    #[serde(default, with = "super::iso_date::option")]
    pub buyback_date: Option<Date>,
    pub buyback_price: Option<Decimal>,

    pub bond_type: Option<String>,
    pub bond_sub_type: Option<String>,
    pub sector_id: Option<String>,
}

impl Bond {
    /// Builds a bond from the selected reference row, its marketdata row and
    /// its yields row.
    ///
    /// `price_percent` is the first of `LAST`, `WAPRICE`, `MARKETPRICE`
    /// (marketdata) then `PREVWAPRICE`, `PREVPRICE` (reference).
    /// `yield_percent` is `EFFECTIVEYIELD` (yields), then `YIELD`
    /// (marketdata), then `YIELDATPREVWAPRICE` (reference).
    pub fn from_rows(
        security: &Row,
        market: Option<&Row>,
        yields: Option<&Row>,
    ) -> Result<Self, ValidationError> {
        let sec_id = security
            .text("SECID")
            .ok_or(ValidationError::MissingField { field: "SECID" })?;

        let price_percent = market
            .and_then(|row| row.first_decimal(BOND_PRICE_COLUMNS))
            .or_else(|| security.first_decimal(&["PREVWAPRICE", "PREVPRICE"]));
        let yield_percent = yields
            .and_then(|row| row.decimal("EFFECTIVEYIELD"))
            .or_else(|| market.and_then(|row| row.decimal("YIELD")))
            .or_else(|| security.decimal("YIELDATPREVWAPRICE"));

        Ok(Self {
            sec_id,
            short_name: security.text("SHORTNAME"),
            sec_name: security.text("SECNAME"),
            isin: security.text("ISIN"),
            reg_number: security.text("REGNUMBER"),
            board_id: security.board_id(),
            price_percent,
            yield_percent,
            coupon_value: security.decimal("COUPONVALUE"),
            coupon_percent: security.decimal("COUPONPERCENT"),
            accrued_int: security.decimal("ACCRUEDINT"),
            next_coupon: security.date("NEXTCOUPON"),
            mat_date: security.date("MATDATE"),
            coupon_period: security.int("COUPONPERIOD"),
            face_value: security.decimal("FACEVALUE"),
            lot_size: security.int("LOTSIZE"),
            lot_value: security.decimal("LOTVALUE"),
            face_unit: security.text("FACEUNIT"),
            currency_id: security.text("CURRENCYID"),
            issue_size_placed: security.int("ISSUESIZEPLACED"),
            list_level: security.int("LISTLEVEL"),
            status: security.text("STATUS"),
            sec_type: security.text("SECTYPE"),
            offer_date: security.date("OFFERDATE"),
            date_yield_from_issuer: security.date("DATEYIELDFROMISSUER"),
            call_option_date: security.date("CALLOPTIONDATE"),
            put_option_date: security.date("PUTOPTIONDATE"),
            buyback_date: security.date("BUYBACKDATE"),
            buyback_price: security.decimal("BUYBACKPRICE"),
            bond_type: security.text("BONDTYPE"),
            bond_sub_type: security.text("BONDSUBTYPE"),
            sector_id: security.text("SECTORID"),
        })
    }

    /// Clean price in currency: face value × price percent ÷ 100.
    /// `None` when an input is missing or the product overflows.
    pub fn price(&self) -> Option<Decimal> {
        self.face_value?
            .checked_mul(self.price_percent?)?
            .checked_div(Decimal::ONE_HUNDRED)
    }

    /// Clean price plus accrued coupon interest.
    pub fn dirty_price(&self) -> Option<Decimal> {
        self.price()?.checked_add(self.accrued_int?)
    }

    /// Whole days from `today` until maturity; negative once matured.
    pub fn days_to_maturity(&self, today: Date) -> Option<i64> {
        Some((self.mat_date? - today).whole_days())
    }
}

impl Display for Bond {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bond {}", self.sec_id)?;
        if let Some(short_name) = &self.short_name {
            write!(f, " | {short_name}")?;
        }
        if let Some(price_percent) = self.price_percent {
            write!(f, " | price={price_percent}%")?;
        }
        if let Some(yield_percent) = self.yield_percent {
            write!(f, " | yield={yield_percent}%")?;
        }
        Ok(())
    }
}
