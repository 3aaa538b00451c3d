//! JSON envelope written to stdout for every successful command.

use std::fmt::{Display, Formatter};
use std::io::Write;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::CliError;

/// Request identifier (UUID v4) for correlating output with logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Envelope metadata. Field order is fixed to keep JSON output stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub request_id: RequestId,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub latency_ms: u64,
}

impl Meta {
    pub fn new(request_id: RequestId, latency_ms: u64) -> Self {
        Self {
            request_id,
            generated_at: OffsetDateTime::now_utc(),
            latency_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub meta: Meta,
    pub data: Value,
}

impl Envelope {
    pub fn new(meta: Meta, data: Value) -> Self {
        Self { meta, data }
    }
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_envelope(&mut handle, envelope, pretty)
}

pub fn write_envelope<W: Write>(
    writer: &mut W,
    envelope: &Envelope,
    pretty: bool,
) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, envelope)?;
    } else {
        serde_json::to_writer(&mut *writer, envelope)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::format_description::well_known::Rfc3339;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn envelope_serializes_meta_before_data() {
        let request_id = RequestId(
            Uuid::parse_str("123e4567-e89b-42d3-a456-426614174000").expect("valid uuid"),
        );
        let envelope = Envelope::new(Meta::new(request_id, 42), json!({"secid": "SBER"}));

        let mut buffer = Vec::new();
        write_envelope(&mut buffer, &envelope, false).expect("renders");
        let rendered = String::from_utf8(buffer).expect("utf-8");

        assert!(rendered.starts_with(
            "{\"meta\":{\"request_id\":\"123e4567-e89b-42d3-a456-426614174000\",\"generated_at\":\""
        ));
        assert!(rendered.contains("\"latency_ms\":42},\"data\":{\"secid\":\"SBER\"}}"));
        assert!(rendered.ends_with('\n'));

        let expected = envelope.meta.generated_at.format(&Rfc3339).expect("formats");
        assert!(rendered.contains(&expected));
    }

    #[test]
    fn pretty_output_is_indented() {
        let envelope = Envelope::new(Meta::new(RequestId::new_v4(), 0), json!([]));

        let mut buffer = Vec::new();
        write_envelope(&mut buffer, &envelope, true).expect("renders");
        let rendered = String::from_utf8(buffer).expect("utf-8");

        assert!(rendered.contains("\n  \"meta\": {"));
    }
}
