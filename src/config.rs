use crate::commands::CommandId;
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::notes::QualityLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub speech: SpeechConfig,
    pub session: SessionConfig,
    pub commands: CommandsConfig,
    pub note: NoteConfig,
}

/// Speech recognition configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    /// Recognition language as a BCP-47 tag (e.g. "en-US")
    pub language: String,
    /// Minimum confidence for accepting a finalized utterance, in [0, 1]
    pub confidence_threshold: f32,
    /// Ranked alternatives requested per final result
    pub max_alternatives: u32,
}

/// Session and transcript configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Documentation specialty tag (e.g. "cardiology")
    pub specialty: String,
    /// Note generation quality level
    pub quality: QualityLevel,
    /// Cap on stored transcript entries; oldest entries are evicted beyond it
    pub max_transcript_entries: usize,
}

/// Voice command configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CommandsConfig {
    /// Master switch for command interception
    pub enabled: bool,
    /// Drop the built-in trigger table and use only `custom`
    pub disable_defaults: bool,
    /// Additional bindings, matched after the built-in table
    pub custom: Vec<CommandBinding>,
}

/// A single phrase-to-command binding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandBinding {
    pub phrase: String,
    pub command: CommandId,
}

/// Note-generation service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoteConfig {
    /// Service endpoint; empty selects the built-in mock generator
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: defaults::LANGUAGE.to_string(),
            confidence_threshold: defaults::CONFIDENCE_THRESHOLD,
            max_alternatives: defaults::MAX_ALTERNATIVES,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            specialty: defaults::SPECIALTY.to_string(),
            quality: QualityLevel::Standard,
            max_transcript_entries: defaults::MAX_TRANSCRIPT_ENTRIES,
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disable_defaults: false,
            custom: Vec::new(),
        }
    }
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: defaults::NOTE_MODEL.to_string(),
            timeout_secs: defaults::NOTE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML or values outside
    /// their allowed ranges. Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ScribeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file is missing
    ///
    /// Only a missing file yields defaults; invalid TOML or invalid values
    /// are reported as errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ScribeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEDSCRIBE_LANGUAGE → speech.language
    /// - MEDSCRIBE_SPECIALTY → session.specialty
    /// - MEDSCRIBE_NOTE_ENDPOINT → note.endpoint
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("MEDSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.speech.language = language;
        }

        if let Ok(specialty) = std::env::var("MEDSCRIBE_SPECIALTY")
            && !specialty.is_empty()
        {
            self.session.specialty = specialty;
        }

        if let Ok(endpoint) = std::env::var("MEDSCRIBE_NOTE_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.note.endpoint = endpoint;
        }

        self
    }

    /// Check value ranges that serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.speech.confidence_threshold) {
            return Err(ScribeError::ConfigInvalidValue {
                key: "speech.confidence_threshold".to_string(),
                message: "must be between 0 and 1".to_string(),
            });
        }
        if self.speech.max_alternatives == 0 {
            return Err(ScribeError::ConfigInvalidValue {
                key: "speech.max_alternatives".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/medscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("medscribe").join("config.toml"))
    }
}
