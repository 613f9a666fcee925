//! medscribe - Clinical dictation capture
//!
//! Speaker-attributed speech capture with voice commands, confidence gating,
//! and SOAP note drafting from the accumulated transcript.

// Enforce error handling discipline
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod export;
pub mod notes;
pub mod session;
pub mod transcript;

// Core traits (engine → session → transcript/notes)
pub use engine::{EngineEvent, MockRecognitionEngine, RecognitionEngine, RecognitionUpdate};
pub use notes::{MockNoteGenerator, NoteGenerator, NoteRequest, QualityLevel, SoapNote};

// Session state machine
pub use session::{
    CommandEvent, InterimPreview, SessionEvent, SessionStatus, Speaker, SpeechSession, Utterance,
};

// Voice commands
pub use commands::{CommandId, CommandMatch, CommandTable};

// Transcript
pub use transcript::{Transcript, TranscriptEntry, TranscriptStats};

// Composition root
pub use app::{AppAction, ScribeApp};

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::Config;

// Export
pub use export::{SessionExport, new_session_id};

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.2+abc1234"` when git hash is available, `"0.3.2"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(
                ver.contains('+'),
                "With GIT_HASH set, version should contain '+', got: {}",
                ver
            );
            let hash_part = ver.split('+').nth(1).unwrap_or("");
            assert_eq!(
                hash_part.len(),
                7,
                "Git hash should be 7 chars, got: {}",
                hash_part
            );
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
