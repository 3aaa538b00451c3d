//! Board (trading venue) selection shared by the share and bond services.
//!
//! ISS returns one reference row per board an instrument is listed on and
//! one marketdata row per board it trades on. Selection order:
//!
//! 1. the first preferred board that has a reference row and live data;
//! 2. the first reference row whose board has live data;
//! 3. the first reference row.
//!
//! A board has live data when one of its marketdata rows carries a value in
//! any of the price columns.

use crate::table::Row;

/// Picks the reference row to build a record from; `None` only when
/// `reference` is empty.
pub fn select_board<'a>(
    reference: &'a [Row],
    live: &[Row],
    preferred: &[String],
    price_columns: &[&str],
) -> Option<&'a Row> {
    let is_live = |row: &Row| {
        row.board_id()
            .is_some_and(|board| board_has_live_data(live, &board, price_columns))
    };

    preferred
        .iter()
        .find_map(|board| {
            reference
                .iter()
                .find(|row| row.board_id().as_deref() == Some(board.as_str()) && is_live(*row))
        })
        .or_else(|| reference.iter().find(|row| is_live(*row)))
        .or_else(|| reference.first())
}

/// Marketdata row for `board`, preferring one that carries prices.
pub fn live_row<'a>(live: &'a [Row], board: Option<&str>, price_columns: &[&str]) -> Option<&'a Row> {
    let board = board?;
    let mut on_board = live
        .iter()
        .filter(|row| row.board_id().as_deref() == Some(board));
    let first = on_board.next()?;
    if has_prices(first, price_columns) {
        return Some(first);
    }
    on_board
        .find(|row| has_prices(row, price_columns))
        .or(Some(first))
}

fn board_has_live_data(live: &[Row], board: &str, price_columns: &[&str]) -> bool {
    live.iter()
        .any(|row| row.board_id().as_deref() == Some(board) && has_prices(row, price_columns))
}

fn has_prices(row: &Row, price_columns: &[&str]) -> bool {
    row.first_decimal(price_columns).is_some()
}
