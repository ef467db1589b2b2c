//! Opaque continuation cursors for history scans.
//!
//! A cursor carries one keyset position per partition (newest-first scans
//! resume strictly *before* the recorded position). The wire form is
//! URL-safe base64 over compact JSON — opaque to callers, versionless by
//! construction since absent fields mean "partition not yet entered".

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use starfuse_core::history::RecordSource;

use crate::{Error, Result};

/// Resume position within one partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  /// `created_at` of the last returned record, epoch millis.
  pub created_at: i64,
  /// `record_id` of the last returned record; tie-breaker for equal
  /// timestamps.
  pub id:         String,
}

/// Per-partition resume positions for a (possibly merged) scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub fusion: Option<Position>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub custom: Option<Position>,
}

impl Cursor {
  pub fn position(&self, source: RecordSource) -> Option<&Position> {
    match source {
      RecordSource::Fusion => self.fusion.as_ref(),
      RecordSource::Custom => self.custom.as_ref(),
    }
  }

  pub fn set_position(&mut self, source: RecordSource, pos: Position) {
    match source {
      RecordSource::Fusion => self.fusion = Some(pos),
      RecordSource::Custom => self.custom = Some(pos),
    }
  }

  pub fn encode(&self) -> Result<String> {
    let json = serde_json::to_vec(self)?;
    Ok(URL_SAFE_NO_PAD.encode(json))
  }

  pub fn decode(raw: &str) -> Result<Self> {
    let bytes = URL_SAFE_NO_PAD
      .decode(raw)
      .map_err(|e| Error::BadCursor(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| Error::BadCursor(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_decode_roundtrip() {
    let mut cursor = Cursor::default();
    cursor.set_position(RecordSource::Fusion, Position {
      created_at: 1_700_000_000_000,
      id:         "3f9e7d2a-0000-4000-8000-000000000001".into(),
    });

    let encoded = cursor.encode().unwrap();
    assert_eq!(Cursor::decode(&encoded).unwrap(), cursor);
  }

  #[test]
  fn garbage_is_a_bad_cursor() {
    assert!(matches!(Cursor::decode("!!!"), Err(Error::BadCursor(_))));
    // Valid base64, invalid JSON.
    let encoded = URL_SAFE_NO_PAD.encode(b"not json");
    assert!(matches!(Cursor::decode(&encoded), Err(Error::BadCursor(_))));
  }
}
