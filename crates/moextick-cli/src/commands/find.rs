use moextick_core::{MoexClient, SearchResult};
use serde::Serialize;
use serde_json::Value;

use crate::cli::FindArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct FindData<'a> {
    query: &'a str,
    instrument_type: Option<&'static str>,
    results: &'a [SearchResult],
}

pub async fn run(args: &FindArgs, client: &MoexClient) -> Result<Value, CliError> {
    let instrument_type = args.instrument_type.map(|filter| filter.as_str());
    let results = client.find(&args.query, instrument_type).await?;

    let data = serde_json::to_value(FindData {
        query: args.query.trim(),
        instrument_type,
        results: &results,
    })?;
    Ok(data)
}
