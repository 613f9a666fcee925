//! Recognition engine adapter.
//!
//! Wraps a capability-provided continuous speech-to-text engine. The engine
//! delivers results in short-lived bursts and may self-terminate at any time;
//! the session layer owns the continuity policy, this module only defines the
//! contract and the event types crossing it.

use crate::error::Result;
use std::fmt;
use std::sync::{Arc, Mutex};

/// One ranked hypothesis for a finalized result.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionAlternative {
    pub text: String,
    /// Engine-reported confidence in [0, 1]. Engines that omit confidence
    /// report 0.
    pub confidence: f32,
}

impl RecognitionAlternative {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A single segment within a recognition burst.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionSegment {
    /// Unconfirmed partial transcription, superseded by later segments.
    Interim { text: String },
    /// Finalized result with alternatives ranked best-first by the engine.
    Final {
        alternatives: Vec<RecognitionAlternative>,
    },
}

/// One `onresult`-style burst: interim and final segments in engine order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecognitionUpdate {
    pub segments: Vec<RecognitionSegment>,
}

impl RecognitionUpdate {
    pub fn new(segments: Vec<RecognitionSegment>) -> Self {
        Self { segments }
    }

    /// Burst containing a single finalized result.
    pub fn final_result(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            segments: vec![RecognitionSegment::Final {
                alternatives: vec![RecognitionAlternative::new(text, confidence)],
            }],
        }
    }

    /// Burst containing a single interim fragment.
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            segments: vec![RecognitionSegment::Interim { text: text.into() }],
        }
    }
}

/// Engine-reported failure codes.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionFault {
    /// Silence timeout. Expected during pauses, never surfaced.
    NoSpeech,
    /// Microphone not accessible.
    AudioCapture,
    /// Microphone permission refused mid-session.
    NotAllowed,
    /// Network failure during recognition.
    Network,
    /// The host refused access to the speech service.
    ServiceNotAllowed,
    /// Any other engine-specific code.
    Other(String),
}

impl RecognitionFault {
    /// True for the silence timeout, which is not an error condition.
    pub fn is_no_speech(&self) -> bool {
        matches!(self, RecognitionFault::NoSpeech)
    }

    /// User-facing description with recovery guidance.
    pub fn message(&self) -> String {
        match self {
            RecognitionFault::NoSpeech => "No speech detected".to_string(),
            RecognitionFault::AudioCapture => {
                "Microphone not accessible. Check that a microphone is connected and try again"
                    .to_string()
            }
            RecognitionFault::NotAllowed => {
                "Microphone permission denied. Allow microphone access and try again".to_string()
            }
            RecognitionFault::Network => {
                "Network error during recognition. Check your connection and try again".to_string()
            }
            RecognitionFault::ServiceNotAllowed => {
                "Speech service not allowed by the host".to_string()
            }
            RecognitionFault::Other(code) => format!("Recognition error: {}", code),
        }
    }
}

impl fmt::Display for RecognitionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Asynchronous notifications from the engine.
///
/// Delivered to the session in the order the engine produced them; the
/// session never reorders.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Capture actually began (may lag the start request).
    Started,
    /// A recognition burst.
    Update(RecognitionUpdate),
    /// The engine stopped, whether requested or self-terminated.
    Ended,
    /// An engine failure.
    Fault(RecognitionFault),
}

/// Contract for a continuous speech-to-text engine.
///
/// This trait allows swapping implementations (platform engine vs mock).
pub trait RecognitionEngine: Send {
    /// Request continuous capture.
    ///
    /// # Errors
    /// `EngineUnavailable` when the host has no speech capability,
    /// `PermissionDenied` when microphone access is refused.
    fn start(&mut self) -> Result<()>;

    /// Request cessation of capture. Idempotent; never fails.
    fn stop(&mut self);

    /// Select the recognition language (BCP-47 tag).
    fn set_language(&mut self, tag: &str);

    /// Name for logging/diagnostics.
    fn name(&self) -> &'static str {
        "engine"
    }
}

#[derive(Debug, Default)]
struct MockEngineState {
    /// Ordered record of "start"/"stop" calls.
    ops: Vec<String>,
    active: bool,
    start_attempts: usize,
    /// Starts issued while a capture handle was already active.
    overlapping_starts: usize,
    language: String,
}

/// Read-only view into a mock engine's recorded state.
///
/// Obtained via [`MockRecognitionEngine::probe`] before the engine is moved
/// into a session.
#[derive(Debug, Clone)]
pub struct MockEngineProbe {
    state: Arc<Mutex<MockEngineState>>,
}

impl MockEngineProbe {
    /// Ordered start/stop call sequence.
    pub fn ops(&self) -> Vec<String> {
        self.state.lock().expect("mock state lock").ops.clone()
    }

    /// True while a capture handle is held.
    pub fn active(&self) -> bool {
        self.state.lock().expect("mock state lock").active
    }

    /// Total start attempts, including failed ones.
    pub fn start_attempts(&self) -> usize {
        self.state.lock().expect("mock state lock").start_attempts
    }

    /// Starts issued while already active (two concurrent handles).
    pub fn overlapping_starts(&self) -> usize {
        self.state.lock().expect("mock state lock").overlapping_starts
    }

    /// Last language tag applied.
    pub fn language(&self) -> String {
        self.state.lock().expect("mock state lock").language.clone()
    }
}

/// Mock recognition engine for testing
#[derive(Debug)]
pub struct MockRecognitionEngine {
    state: Arc<Mutex<MockEngineState>>,
    unavailable: bool,
    permission_denied: bool,
    fail_start_attempt: Option<usize>,
}

impl MockRecognitionEngine {
    /// Create a new mock engine that starts and stops successfully
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockEngineState::default())),
            unavailable: false,
            permission_denied: false,
            fail_start_attempt: None,
        }
    }

    /// Configure the mock to report no speech capability on start
    pub fn with_unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Configure the mock to report refused microphone access on start
    pub fn with_permission_denied(mut self) -> Self {
        self.permission_denied = true;
        self
    }

    /// Configure the mock to fail the Nth start attempt (1-based)
    pub fn with_start_failure_on_attempt(mut self, attempt: usize) -> Self {
        self.fail_start_attempt = Some(attempt);
        self
    }

    /// Probe handle for inspecting calls after the engine is moved
    pub fn probe(&self) -> MockEngineProbe {
        MockEngineProbe {
            state: self.state.clone(),
        }
    }
}

impl Default for MockRecognitionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RecognitionEngine for MockRecognitionEngine {
    fn start(&mut self) -> Result<()> {
        let mut state = self.state.lock().expect("mock state lock");
        state.start_attempts += 1;
        let attempt = state.start_attempts;

        if self.unavailable {
            return Err(crate::error::ScribeError::EngineUnavailable);
        }
        if self.permission_denied {
            return Err(crate::error::ScribeError::PermissionDenied {
                message: "mock microphone access refused".to_string(),
            });
        }
        if self.fail_start_attempt == Some(attempt) {
            return Err(crate::error::ScribeError::Recognition {
                message: format!("mock start failure on attempt {}", attempt),
            });
        }

        if state.active {
            state.overlapping_starts += 1;
        }
        state.active = true;
        state.ops.push("start".to_string());
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().expect("mock state lock");
        state.active = false;
        state.ops.push("stop".to_string());
    }

    fn set_language(&mut self, tag: &str) {
        self.state.lock().expect("mock state lock").language = tag.to_string();
    }

    fn name(&self) -> &'static str {
        "mock-engine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScribeError;

    #[test]
    fn test_mock_engine_records_call_sequence() {
        let mut engine = MockRecognitionEngine::new();
        let probe = engine.probe();

        engine.start().unwrap();
        engine.stop();
        engine.start().unwrap();

        assert_eq!(probe.ops(), vec!["start", "stop", "start"]);
        assert!(probe.active());
        assert_eq!(probe.overlapping_starts(), 0);
    }

    #[test]
    fn test_mock_engine_stop_is_idempotent() {
        let mut engine = MockRecognitionEngine::new();
        let probe = engine.probe();

        engine.stop();
        engine.stop();

        assert!(!probe.active());
        assert_eq!(probe.ops(), vec!["stop", "stop"]);
    }

    #[test]
    fn test_mock_engine_unavailable() {
        let mut engine = MockRecognitionEngine::new().with_unavailable();

        match engine.start() {
            Err(ScribeError::EngineUnavailable) => {}
            other => panic!("Expected EngineUnavailable, got {:?}", other.is_ok()),
        }
        assert!(!engine.probe().active());
    }

    #[test]
    fn test_mock_engine_permission_denied() {
        let mut engine = MockRecognitionEngine::new().with_permission_denied();

        match engine.start() {
            Err(ScribeError::PermissionDenied { .. }) => {}
            other => panic!("Expected PermissionDenied, got {:?}", other.is_ok()),
        }
    }

    #[test]
    fn test_mock_engine_fails_configured_attempt() {
        let mut engine = MockRecognitionEngine::new().with_start_failure_on_attempt(2);
        let probe = engine.probe();

        assert!(engine.start().is_ok());
        engine.stop();
        assert!(engine.start().is_err());
        assert!(engine.start().is_ok());

        assert_eq!(probe.start_attempts(), 3);
    }

    #[test]
    fn test_mock_engine_detects_overlapping_starts() {
        let mut engine = MockRecognitionEngine::new();
        let probe = engine.probe();

        engine.start().unwrap();
        engine.start().unwrap();

        assert_eq!(probe.overlapping_starts(), 1);
    }

    #[test]
    fn test_mock_engine_set_language() {
        let mut engine = MockRecognitionEngine::new();
        let probe = engine.probe();

        engine.set_language("de-DE");
        assert_eq!(probe.language(), "de-DE");
    }

    #[test]
    fn test_fault_no_speech_is_not_an_error() {
        assert!(RecognitionFault::NoSpeech.is_no_speech());
        assert!(!RecognitionFault::Network.is_no_speech());
    }

    #[test]
    fn test_fault_messages_include_guidance() {
        assert!(
            RecognitionFault::AudioCapture
                .message()
                .contains("microphone is connected")
        );
        assert!(
            RecognitionFault::NotAllowed
                .message()
                .contains("Allow microphone access")
        );
        assert!(
            RecognitionFault::Network
                .message()
                .contains("Check your connection")
        );
        assert_eq!(
            RecognitionFault::Other("aborted".to_string()).message(),
            "Recognition error: aborted"
        );
    }

    #[test]
    fn test_update_constructors() {
        let update = RecognitionUpdate::final_result("hello", 0.9);
        assert_eq!(update.segments.len(), 1);
        match &update.segments[0] {
            RecognitionSegment::Final { alternatives } => {
                assert_eq!(alternatives[0].text, "hello");
                assert_eq!(alternatives[0].confidence, 0.9);
            }
            other => panic!("Expected final segment, got {:?}", other),
        }

        let update = RecognitionUpdate::interim("hel");
        assert_eq!(
            update.segments,
            vec![RecognitionSegment::Interim {
                text: "hel".to_string()
            }]
        );
    }

    #[test]
    fn test_engine_trait_is_object_safe() {
        let mut engine: Box<dyn RecognitionEngine> = Box::new(MockRecognitionEngine::new());
        assert_eq!(engine.name(), "mock-engine");
        assert!(engine.start().is_ok());
        engine.stop();
    }
}
