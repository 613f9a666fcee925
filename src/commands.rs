//! Voice command identifiers and the trigger-phrase matcher.
//!
//! Spoken commands are matched against finalized recognition text by
//! substring containment, so "please switch to patient now" still triggers
//! "switch to patient". When several phrases could match, the first phrase
//! in table order wins; that tie-break is part of the command semantics and
//! must stay stable.

use crate::config::CommandsConfig;
use serde::{Deserialize, Serialize};

/// Application actions that can be triggered by voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandId {
    SwitchToPatient,
    SwitchToClinician,
    AddParagraphBreak,
    GenerateNote,
    PauseRecording,
    StopRecording,
    StartRecording,
    ClearNote,
    SaveNote,
    NewSession,
}

/// A matched command with the trigger phrase that selected it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMatch {
    pub command: CommandId,
    pub phrase: String,
}

/// Ordered table of (trigger phrase, command) pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandTable {
    entries: Vec<(String, CommandId)>,
}

impl CommandTable {
    /// Build a table from explicit entries. Phrases are lower-cased;
    /// declaration order is preserved for the tie-break.
    pub fn new(entries: Vec<(String, CommandId)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(phrase, id)| (phrase.to_lowercase(), id))
            .collect();
        Self { entries }
    }

    /// The built-in trigger table.
    ///
    /// "generate soap" is declared before "generate soap note" so the shorter
    /// phrase wins for inputs containing both; reordering would silently
    /// change which phrase is reported as matched.
    pub fn standard() -> Self {
        Self::new(vec![
            ("switch to patient".to_string(), CommandId::SwitchToPatient),
            ("switch to clinician".to_string(), CommandId::SwitchToClinician),
            ("switch to doctor".to_string(), CommandId::SwitchToClinician),
            ("new paragraph".to_string(), CommandId::AddParagraphBreak),
            ("paragraph break".to_string(), CommandId::AddParagraphBreak),
            ("generate soap".to_string(), CommandId::GenerateNote),
            ("generate soap note".to_string(), CommandId::GenerateNote),
            ("pause recording".to_string(), CommandId::PauseRecording),
            ("stop recording".to_string(), CommandId::StopRecording),
            ("start recording".to_string(), CommandId::StartRecording),
            ("clear note".to_string(), CommandId::ClearNote),
            ("save note".to_string(), CommandId::SaveNote),
            ("new session".to_string(), CommandId::NewSession),
        ])
    }

    /// An empty table (command interception disabled).
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build the active table from configuration: built-ins first (unless
    /// disabled), then custom bindings in their declared order.
    pub fn from_config(config: &CommandsConfig) -> Self {
        if !config.enabled {
            return Self::empty();
        }

        let mut entries = if config.disable_defaults {
            Vec::new()
        } else {
            Self::standard().entries
        };

        for binding in &config.custom {
            entries.push((binding.phrase.to_lowercase(), binding.command));
        }

        Self { entries }
    }

    /// Match text against the table.
    ///
    /// The input is lower-cased and trimmed; a phrase matches by substring
    /// containment. Returns the first match in table order, or None when the
    /// text is dictation content.
    pub fn find(&self, text: &str) -> Option<CommandMatch> {
        let normalized = text.to_lowercase();
        let normalized = normalized.trim();

        for (phrase, command) in &self.entries {
            if normalized.contains(phrase.as_str()) {
                return Some(CommandMatch {
                    command: *command,
                    phrase: phrase.clone(),
                });
            }
        }

        None
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[(String, CommandId)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommandBinding;

    #[test]
    fn test_exact_phrase_matches() {
        let table = CommandTable::standard();
        let m = table.find("switch to patient").unwrap();
        assert_eq!(m.command, CommandId::SwitchToPatient);
        assert_eq!(m.phrase, "switch to patient");
    }

    #[test]
    fn test_containment_matches_embedded_phrase() {
        let table = CommandTable::standard();
        let m = table.find("please switch to patient now").unwrap();
        assert_eq!(m.command, CommandId::SwitchToPatient);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_trimmed() {
        let table = CommandTable::standard();
        let m = table.find("  Switch To Doctor  ").unwrap();
        assert_eq!(m.command, CommandId::SwitchToClinician);
        assert_eq!(m.phrase, "switch to doctor");
    }

    #[test]
    fn test_first_table_entry_wins_tie_break() {
        let table = CommandTable::standard();
        // "generate soap note" contains both "generate soap" and
        // "generate soap note"; the earlier declaration must win.
        let m = table.find("generate soap note").unwrap();
        assert_eq!(m.command, CommandId::GenerateNote);
        assert_eq!(m.phrase, "generate soap");
    }

    #[test]
    fn test_dictation_content_is_not_a_command() {
        let table = CommandTable::standard();
        assert!(table.find("patient reports headache").is_none());
        assert!(table.find("").is_none());
    }

    #[test]
    fn test_standard_table_order_is_stable() {
        let table = CommandTable::standard();
        let phrases: Vec<&str> = table
            .entries()
            .iter()
            .map(|(phrase, _)| phrase.as_str())
            .collect();

        assert_eq!(
            phrases,
            vec![
                "switch to patient",
                "switch to clinician",
                "switch to doctor",
                "new paragraph",
                "paragraph break",
                "generate soap",
                "generate soap note",
                "pause recording",
                "stop recording",
                "start recording",
                "clear note",
                "save note",
                "new session",
            ]
        );
    }

    #[test]
    fn test_custom_bindings_are_appended_after_defaults() {
        let config = CommandsConfig {
            enabled: true,
            disable_defaults: false,
            custom: vec![CommandBinding {
                phrase: "Next Section".to_string(),
                command: CommandId::AddParagraphBreak,
            }],
        };

        let table = CommandTable::from_config(&config);
        assert_eq!(table.len(), CommandTable::standard().len() + 1);

        let m = table.find("next section please").unwrap();
        assert_eq!(m.command, CommandId::AddParagraphBreak);
        assert_eq!(m.phrase, "next section");
    }

    #[test]
    fn test_disable_defaults_keeps_only_custom() {
        let config = CommandsConfig {
            enabled: true,
            disable_defaults: true,
            custom: vec![CommandBinding {
                phrase: "mark done".to_string(),
                command: CommandId::StopRecording,
            }],
        };

        let table = CommandTable::from_config(&config);
        assert_eq!(table.len(), 1);
        assert!(table.find("switch to patient").is_none());
        assert!(table.find("mark done").is_some());
    }

    #[test]
    fn test_disabled_config_yields_empty_table() {
        let config = CommandsConfig {
            enabled: false,
            ..Default::default()
        };

        let table = CommandTable::from_config(&config);
        assert!(table.is_empty());
        assert!(table.find("stop recording").is_none());
    }

    #[test]
    fn test_command_id_serializes_camel_case() {
        let json = serde_json::to_string(&CommandId::SwitchToPatient).unwrap();
        assert_eq!(json, r#""switchToPatient""#);

        let id: CommandId = serde_json::from_str(r#""addParagraphBreak""#).unwrap();
        assert_eq!(id, CommandId::AddParagraphBreak);
    }
}
