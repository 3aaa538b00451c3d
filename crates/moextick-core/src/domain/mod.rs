//! # Domain Models
//!
//! Typed MOEX records built from ISS rows.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Share`] | Share reference data with prices of the selected board |
//! | [`Bond`] | Bond reference data, price in percent of face value, yield |
//! | [`SearchResult`] | One hit of the instrument search |
//! | [`InstrumentType`] | Search filter (`share`, `bond`, `fund`) |
//! | [`InstrumentKind`] | Classification of a search hit |
//! | [`Ticker`] | Normalized security code |
//!
//! ## Coercion
//!
//! ISS cells are loosely typed. [`coerce`] turns them into exact values:
//! "no data" sentinels (`""`, `-`, `—`, `0000-00-00`) become `None`, never
//! an error, and numbers are parsed as [`rust_decimal::Decimal`] so derived
//! prices stay exact.
//!
//! Derived values such as [`Bond::price`] are computed on every call and
//! never stored.

pub mod coerce;

mod bond;
mod instrument_type;
mod search;
mod share;
mod ticker;

pub use bond::{Bond, BOND_PRICE_COLUMNS};
pub use instrument_type::{InstrumentKind, InstrumentType};
pub use search::SearchResult;
pub use share::{Share, SHARE_PRICE_COLUMNS};
pub use ticker::Ticker;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");
