//! JSON export of a documentation session.
//!
//! The export document carries session metadata, the drafted note when one
//! exists, and the full ordered transcript. The session id is an opaque
//! correlation token; its format is not a compatibility contract.

use crate::defaults;
use crate::error::Result;
use crate::notes::SoapNote;
use crate::transcript::TranscriptEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session metadata stamped into every export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    pub specialty: String,
    pub provider: String,
}

/// The exported document: metadata, optional note, ordered transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub metadata: ExportMetadata,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub note: Option<SoapNote>,
    pub transcript: Vec<TranscriptEntry>,
}

impl SessionExport {
    pub fn new(
        session_id: impl Into<String>,
        specialty: impl Into<String>,
        note: Option<SoapNote>,
        transcript: Vec<TranscriptEntry>,
    ) -> Self {
        Self {
            metadata: ExportMetadata {
                session_id: session_id.into(),
                generated_at: Utc::now(),
                specialty: specialty.into(),
                provider: defaults::PROVIDER.to_string(),
            },
            note,
            transcript,
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously exported document.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Suggested download file name for this export.
    pub fn file_name(&self) -> String {
        format!("soap-note-{}.json", self.metadata.session_id)
    }
}

/// Generate a fresh session identifier.
///
/// Combines the creation time (base-36 milliseconds) with a short random
/// suffix, e.g. `SOAP-mc3k91xq-4F7A2`.
pub fn new_session_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(5)
        .collect::<String>()
        .to_uppercase();
    format!(
        "{}{}-{}",
        defaults::SESSION_ID_PREFIX,
        to_base36(millis),
        suffix
    )
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = String::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize] as char);
        value /= 36;
    }
    out.chars().rev().collect()
}
