mod bond;
mod find;
mod share;

use std::time::Instant;

use moextick_core::MoexClient;
use serde_json::Value;
use tracing::info;

use crate::cli::Command;
use crate::error::CliError;
use crate::output::{Envelope, Meta, RequestId};

pub async fn run(command: &Command, client: &MoexClient) -> Result<Envelope, CliError> {
    let request_id = RequestId::new_v4();
    let started = Instant::now();

    let (name, data): (&str, Value) = match command {
        Command::Share(args) => ("share", share::run(args, client).await?),
        Command::Bond(args) => ("bond", bond::run(args, client).await?),
        Command::Find(args) => ("find", find::run(args, client).await?),
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(%request_id, command = name, latency_ms, "command complete");

    Ok(Envelope::new(Meta::new(request_id, latency_ms), data))
}
