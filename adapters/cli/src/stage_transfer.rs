//! Single-line share strings for stage lists.
//!
//! Format: `stages:v1:<base64 of the exported JSON>`.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use lane_siege_core::StageConfig;
use lane_siege_system_stages::{export_value, import_str, Imported, StageImportError};
use thiserror::Error;

const SHARE_DOMAIN: &str = "stages";
const SHARE_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded payload.
pub(crate) const SHARE_HEADER: &str = "stages:v1";
const FIELD_DELIMITER: char = ':';

/// Errors that can occur while decoding share strings.
#[derive(Debug, Error)]
pub(crate) enum StageTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("share string was empty")]
    EmptyPayload,
    /// A prefix, version or payload segment was missing.
    #[error("share string is missing the {0} segment")]
    MissingSegment(&'static str),
    /// The share string used an unexpected prefix segment.
    #[error("share prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The share string used an unsupported version identifier.
    #[error("share version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    #[error("could not decode share payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The payload bytes were not UTF-8 text.
    #[error("share payload is not text: {0}")]
    InvalidText(#[from] std::string::FromUtf8Error),
    /// The decoded payload was not a usable stage document.
    #[error(transparent)]
    InvalidStages(#[from] StageImportError),
}

/// Encodes a stage list into a single-line share string.
#[must_use]
pub(crate) fn encode(config: &StageConfig) -> String {
    let json = export_value(config).to_string();
    format!("{SHARE_HEADER}{FIELD_DELIMITER}{}", STANDARD_NO_PAD.encode(json))
}

/// Decodes and imports a share string.
pub(crate) fn decode(value: &str) -> Result<Imported, StageTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StageTransferError::EmptyPayload);
    }

    let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
    let domain = parts
        .next()
        .ok_or(StageTransferError::MissingSegment("prefix"))?;
    let version = parts
        .next()
        .ok_or(StageTransferError::MissingSegment("version"))?;
    let payload = parts
        .next()
        .ok_or(StageTransferError::MissingSegment("payload"))?;

    if domain != SHARE_DOMAIN {
        return Err(StageTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SHARE_VERSION {
        return Err(StageTransferError::UnsupportedVersion(version.to_owned()));
    }

    let bytes = STANDARD_NO_PAD.decode(payload.trim_end_matches('=').as_bytes())?;
    let text = String::from_utf8(bytes)?;
    Ok(import_str(&text)?)
}

/// Reports whether `value` looks like a share string rather than JSON.
#[must_use]
pub(crate) fn is_share_string(value: &str) -> bool {
    value
        .trim_start()
        .starts_with(&format!("{SHARE_HEADER}{FIELD_DELIMITER}"))
}

#[cfg(test)]
mod tests {
    use lane_siege_core::{BuildingKind, EnemyBuilding, SpeciesId};

    use super::*;

    #[test]
    fn round_trip_populated_stages() {
        let mut config = StageConfig::new(true);
        config.stages[2].enemy_buildings.push(EnemyBuilding {
            kind: BuildingKind::Nest,
            x: 360.0,
            y: 230.0,
            spawn_species: Some(SpeciesId::Goblin),
        });
        config.stages[2].enemy_buildings.push(EnemyBuilding {
            kind: BuildingKind::Tower,
            x: 120.0,
            y: 300.0,
            spawn_species: None,
        });

        let encoded = encode(&config);
        assert!(encoded.starts_with("stages:v1:"));
        assert!(is_share_string(&encoded));

        let decoded = decode(&encoded).expect("share string decodes");
        assert_eq!(decoded.discarded, 0);
        assert_eq!(decoded.config, config);
    }

    #[test]
    fn rejects_foreign_prefixes_and_versions() {
        assert!(matches!(
            decode("   "),
            Err(StageTransferError::EmptyPayload)
        ));
        assert!(matches!(
            decode("layout:v1:abc"),
            Err(StageTransferError::InvalidPrefix(prefix)) if prefix == "layout"
        ));
        assert!(matches!(
            decode("stages:v2:abc"),
            Err(StageTransferError::UnsupportedVersion(version)) if version == "v2"
        ));
        assert!(matches!(
            decode("stages"),
            Err(StageTransferError::MissingSegment("version"))
        ));
        assert!(matches!(
            decode("stages:v1:!!!"),
            Err(StageTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn payloads_must_hold_stage_documents() {
        let encoded = format!("{SHARE_HEADER}:{}", STANDARD_NO_PAD.encode("[1,2,3]"));
        assert!(matches!(
            decode(&encoded),
            Err(StageTransferError::InvalidStages(StageImportError::NotAnObject))
        ));
    }
}
