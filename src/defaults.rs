//! Default configuration constants for medscribe.
//!
//! Shared constants used across configuration types to keep the session,
//! transcript, and note-generation defaults in one place.

/// Default confidence threshold for accepting a finalized utterance.
///
/// Finalized results below this confidence (0.0 to 1.0) are discarded
/// unless they match a voice command. 0.7 keeps most clean dictation while
/// dropping garbled fragments.
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Default recognition language as a BCP-47 tag.
pub const LANGUAGE: &str = "en-US";

/// Default number of ranked alternatives requested per final result.
///
/// The engine delivers alternatives best-first; the session always takes
/// the top one, but requesting a few lets the host engine rank properly.
pub const MAX_ALTERNATIVES: u32 = 3;

/// Default cap on stored transcript entries.
///
/// When the cap is reached the oldest entry is evicted on append. Clinical
/// encounters stay far below this; the cap bounds memory on runaway
/// sessions.
pub const MAX_TRANSCRIPT_ENTRIES: usize = 1000;

/// Default documentation specialty tag.
pub const SPECIALTY: &str = "pediatrics";

/// Default timeout for a note-generation request, in seconds.
pub const NOTE_TIMEOUT_SECS: u64 = 30;

/// Default model name sent to the note-generation service.
pub const NOTE_MODEL: &str = "gpt-4";

/// Prefix for generated session identifiers.
pub const SESSION_ID_PREFIX: &str = "SOAP-";

/// Provider tag stamped into exported documents.
pub const PROVIDER: &str = "medscribe";
