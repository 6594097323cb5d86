use crate::error::StoreError;
use core_types::RawRow;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use std::path::Path;

/// Raw rows grouped by series name, as delivered by the upstream data collaborator.
pub type RawSeriesMap = BTreeMap<String, Vec<RawRow>>;

#[derive(Deserialize)]
#[serde(untagged)]
enum SeriesPayload {
    Rows(Vec<RawRow>),
    Malformed(IgnoredAny),
}

/// Parses a JSON document of the form `{"NAME": [{"date": "YYYY-MM-DD", "value": ...}]}`.
///
/// Only a document that is not valid JSON, or not an object, is an error. Corrupt rows
/// come back as invalid `RawRow`s, and a series whose payload is not a list of rows
/// comes back empty.
pub fn parse_raw_rows(json: &str) -> Result<RawSeriesMap, StoreError> {
    let document: BTreeMap<String, SeriesPayload> = serde_json::from_str(json)?;
    Ok(document
        .into_iter()
        .map(|(name, payload)| match payload {
            SeriesPayload::Rows(rows) => (name, rows),
            SeriesPayload::Malformed(_) => {
                tracing::warn!(series = %name, "Series payload is not a list of rows; treating it as empty.");
                (name, Vec::new())
            }
        })
        .collect())
}

/// Reads and parses a raw-row JSON file.
pub fn load_raw_rows(path: impl AsRef<Path>) -> Result<RawSeriesMap, StoreError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;
    let raw = parse_raw_rows(&contents)?;
    tracing::debug!(path = %path.display(), series = raw.len(), "Loaded raw series rows.");
    Ok(raw)
}
