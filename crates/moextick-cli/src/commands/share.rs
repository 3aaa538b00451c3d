use moextick_core::{MoexClient, Share};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::cli::TickerArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ShareData<'a> {
    #[serde(flatten)]
    share: &'a Share,
    lot_price: Option<Decimal>,
    change_percent: Option<Decimal>,
}

pub async fn run(args: &TickerArgs, client: &MoexClient) -> Result<Value, CliError> {
    let share = client.share(&args.ticker).await?;

    let data = serde_json::to_value(ShareData {
        share: &share,
        lot_price: share.lot_price(),
        change_percent: share.change_percent(),
    })?;
    Ok(data)
}
