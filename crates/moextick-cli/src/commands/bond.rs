use moextick_core::{Bond, MoexClient};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

use crate::cli::TickerArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct BondData<'a> {
    #[serde(flatten)]
    bond: &'a Bond,
    price: Option<Decimal>,
    dirty_price: Option<Decimal>,
    days_to_maturity: Option<i64>,
}

pub async fn run(args: &TickerArgs, client: &MoexClient) -> Result<Value, CliError> {
    let bond = client.bond(&args.ticker).await?;
    let today = OffsetDateTime::now_utc().date();

    let data = serde_json::to_value(BondData {
        bond: &bond,
        price: bond.price(),
        dirty_price: bond.dirty_price(),
        days_to_maturity: bond.days_to_maturity(today),
    })?;
    Ok(data)
}
