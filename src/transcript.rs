//! Append-only transcript accumulator.
//!
//! Stores accepted utterances in arrival order. Entries are never mutated or
//! removed individually; the whole log is cleared on an explicit new-session
//! reset, and the oldest entry is evicted only when a configured cap is hit.

use crate::session::{Speaker, Utterance};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored utterance with its generated unique id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    pub id: String,
    pub speaker: Speaker,
    pub text: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate statistics over the transcript, recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscriptStats {
    pub total_words: usize,
    pub mean_confidence: f32,
}

/// Ordered, append-only log of accepted utterances.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    max_entries: Option<usize>,
}

impl Transcript {
    /// Create an unbounded transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of stored entries; the oldest entry is evicted when an
    /// append would exceed the cap.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Store an utterance at the end of the log and return the stored entry.
    pub fn append(&mut self, utterance: Utterance) -> &TranscriptEntry {
        if let Some(max) = self.max_entries
            && max > 0
            && self.entries.len() >= max
        {
            self.entries.remove(0);
        }

        self.entries.push(TranscriptEntry {
            id: Uuid::new_v4().simple().to_string(),
            speaker: utterance.speaker,
            text: utterance.text,
            confidence: utterance.confidence,
            timestamp: utterance.timestamp,
        });

        // Just pushed, so the log is non-empty.
        &self.entries[self.entries.len() - 1]
    }

    /// Clear the whole log. Used only on an explicit new-session action.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Entries in append order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Word count and mean confidence over all entries.
    pub fn stats(&self) -> TranscriptStats {
        let total_words = self
            .entries
            .iter()
            .map(|entry| entry.text.split_whitespace().count())
            .sum();

        let mean_confidence = if self.entries.is_empty() {
            0.0
        } else {
            let sum: f32 = self.entries.iter().map(|entry| entry.confidence).sum();
            sum / self.entries.len() as f32
        };

        TranscriptStats {
            total_words,
            mean_confidence,
        }
    }

    /// The conversation as newline-joined `"Speaker: text"` lines, the wire
    /// format consumed by the note-generation service.
    pub fn dialogue(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!("{}: {}", entry.speaker, entry.text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
