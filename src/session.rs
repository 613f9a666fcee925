//! Speech capture session state machine.
//!
//! Owns the recording lifecycle, speaker attribution, confidence gating, and
//! the restart logic that hides the engine's short-lived capture bursts from
//! the caller. Consumes adapter events in arrival order and emits typed
//! [`SessionEvent`]s over a channel; it never touches the transcript itself.

use crate::commands::{CommandId, CommandTable};
use crate::engine::{EngineEvent, RecognitionEngine, RecognitionFault, RecognitionSegment, RecognitionUpdate};
use crate::error::Result;
use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, warn};

/// The two alternating speakers in a clinical encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    Clinician,
    Patient,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Clinician => write!(f, "Clinician"),
            Speaker::Patient => write!(f, "Patient"),
        }
    }
}

/// Recording lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Recording,
    Paused,
    Stopped,
    Error,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Recording => "recording",
            SessionStatus::Paused => "paused",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// A finalized, speaker-attributed recognition result. Immutable once
/// emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub speaker: Speaker,
    pub text: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// Transient preview of the utterance currently being spoken.
///
/// Superseded by the next interim or final result; consumers drop it when a
/// paused/stopped status change arrives.
#[derive(Debug, Clone, PartialEq)]
pub struct InterimPreview {
    pub speaker: Speaker,
    pub text: String,
}

/// An intercepted voice command. Never stored in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandEvent {
    pub command: CommandId,
    pub matched_phrase: String,
    pub original_text: String,
}

/// Outward notifications from the session.
///
/// Status changes and errors share this channel with results; there is no
/// separate failure path at the application boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Utterance(Utterance),
    Interim(InterimPreview),
    Command(CommandEvent),
    StatusChanged {
        status: SessionStatus,
        speaker: Option<Speaker>,
    },
    Error {
        message: String,
    },
}

/// Speech capture session over a recognition engine.
///
/// Created once per recording context and reused for its lifetime; the host
/// pumps engine events into [`handle_engine_event`](Self::handle_engine_event)
/// on a single logical thread.
pub struct SpeechSession<E: RecognitionEngine> {
    engine: E,
    status: SessionStatus,
    current_speaker: Option<Speaker>,
    confidence_threshold: f32,
    commands: CommandTable,
    event_tx: Sender<SessionEvent>,
}

impl<E: RecognitionEngine> SpeechSession<E> {
    /// Create a session and the receiving side of its event channel.
    ///
    /// The threshold is clamped to [0, 1].
    pub fn new(
        engine: E,
        commands: CommandTable,
        confidence_threshold: f32,
    ) -> (Self, Receiver<SessionEvent>) {
        let (event_tx, event_rx) = unbounded();
        let session = Self {
            engine,
            status: SessionStatus::Idle,
            current_speaker: None,
            confidence_threshold: confidence_threshold.clamp(0.0, 1.0),
            commands,
            event_tx,
        };
        (session, event_rx)
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn current_speaker(&self) -> Option<Speaker> {
        self.current_speaker
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    pub fn is_recording(&self) -> bool {
        self.status == SessionStatus::Recording
    }

    /// Select the recognition language on the underlying engine.
    pub fn set_language(&mut self, tag: &str) {
        self.engine.set_language(tag);
    }

    /// Set the confidence threshold, clamped to [0, 1].
    ///
    /// Affects subsequent finalization decisions only.
    pub fn set_confidence_threshold(&mut self, threshold: f32) {
        self.confidence_threshold = threshold.clamp(0.0, 1.0);
    }

    /// Start (or resume) capture for a speaker.
    ///
    /// Already recording the same speaker is a successful no-op. When
    /// recording a different speaker, the previous capture handle is released
    /// before the new one is acquired; the device supports at most one.
    ///
    /// # Errors
    /// Propagates `EngineUnavailable`/`PermissionDenied` from the adapter,
    /// after transitioning to the Error state.
    pub fn start_recording(&mut self, speaker: Speaker) -> Result<()> {
        if self.status == SessionStatus::Recording && self.current_speaker == Some(speaker) {
            return Ok(());
        }

        if self.status == SessionStatus::Recording {
            self.engine.stop();
        }

        self.current_speaker = Some(speaker);

        match self.engine.start() {
            Ok(()) => {
                self.status = SessionStatus::Recording;
                debug!(%speaker, "recording started");
                self.emit_status();
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "failed to start recognition");
                self.enter_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Pause capture, keeping the speaker for resume.
    ///
    /// Returns false (and does nothing) unless currently recording.
    pub fn pause_recording(&mut self) -> bool {
        if self.status != SessionStatus::Recording {
            return false;
        }

        self.engine.stop();
        self.status = SessionStatus::Paused;
        debug!("recording paused");
        self.emit_status();
        true
    }

    /// Stop capture from any state.
    ///
    /// Safe to call repeatedly; always leaves the session Stopped with no
    /// speaker and discards any pending interim preview.
    pub fn stop_recording(&mut self) {
        self.status = SessionStatus::Stopped;
        self.current_speaker = None;
        self.engine.stop();
        debug!("recording stopped");
        self.emit_status();
    }

    /// Switch the attributed speaker.
    ///
    /// While recording this restarts capture for the new speaker; otherwise
    /// it only pre-selects the speaker for the next start.
    pub fn switch_speaker(&mut self, speaker: Speaker) -> Result<()> {
        if self.status == SessionStatus::Recording {
            self.start_recording(speaker)
        } else {
            self.current_speaker = Some(speaker);
            Ok(())
        }
    }

    /// Process one engine event. Events must be delivered in the order the
    /// engine produced them.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started => {
                // Confirmation of an earlier start request; the transition
                // was already applied and announced there.
                debug!("engine capture confirmed");
            }
            EngineEvent::Update(update) => self.process_update(update),
            EngineEvent::Ended => self.handle_ended(),
            EngineEvent::Fault(fault) => self.handle_fault(fault),
        }
    }

    fn process_update(&mut self, update: RecognitionUpdate) {
        if self.status != SessionStatus::Recording {
            debug!("dropping recognition burst received outside recording");
            return;
        }
        let Some(speaker) = self.current_speaker else {
            return;
        };

        let mut interim = String::new();

        for segment in update.segments {
            match segment {
                RecognitionSegment::Final { alternatives } => {
                    // The engine ranks alternatives; take its best and do not
                    // second-guess the ordering.
                    let Some(best) = alternatives.into_iter().next() else {
                        continue;
                    };

                    // Commands are checked before gating, so a command spoken
                    // quietly still fires and never enters the transcript.
                    if let Some(m) = self.commands.find(&best.text) {
                        debug!(command = ?m.command, phrase = %m.phrase, "voice command intercepted");
                        self.emit(SessionEvent::Command(CommandEvent {
                            command: m.command,
                            matched_phrase: m.phrase,
                            original_text: best.text,
                        }));
                        continue;
                    }

                    if best.confidence >= self.confidence_threshold {
                        self.emit(SessionEvent::Utterance(Utterance {
                            speaker,
                            text: best.text.trim().to_string(),
                            confidence: best.confidence,
                            timestamp: Utc::now(),
                        }));
                    } else {
                        debug!(
                            confidence = best.confidence,
                            threshold = self.confidence_threshold,
                            "discarding low-confidence result"
                        );
                    }
                }
                RecognitionSegment::Interim { text } => interim.push_str(&text),
            }
        }

        if !interim.is_empty() {
            self.emit(SessionEvent::Interim(InterimPreview {
                speaker,
                text: interim,
            }));
        }
    }

    fn handle_ended(&mut self) {
        if self.status == SessionStatus::Recording && self.current_speaker.is_some() {
            // Continuous engines self-terminate periodically; resume
            // transparently. One attempt only, so a persistent hardware
            // failure surfaces instead of looping.
            debug!("engine ended mid-session, restarting capture");
            if let Err(e) = self.engine.start() {
                error!(error = %e, "restart after engine end failed");
                self.enter_error(format!("Failed to restart speech recognition: {}", e));
            }
            return;
        }

        // Otherwise the engine is confirming a requested stop/pause.
        debug!(status = %self.status, "engine ended");
    }

    fn handle_fault(&mut self, fault: RecognitionFault) {
        if fault.is_no_speech() {
            // Expected during silence; not surfaced, not an error.
            debug!("ignoring no-speech timeout");
            return;
        }

        warn!(%fault, "recognition fault");
        self.engine.stop();
        self.enter_error(fault.message());
    }

    fn enter_error(&mut self, message: String) {
        self.current_speaker = None;
        self.status = SessionStatus::Error;
        self.emit_status();
        self.emit(SessionEvent::Error { message });
    }

    fn emit_status(&self) {
        self.emit(SessionEvent::StatusChanged {
            status: self.status,
            speaker: self.current_speaker,
        });
    }

    fn emit(&self, event: SessionEvent) {
        // A dropped receiver means the application is shutting down; events
        // are simply discarded.
        self.event_tx.send(event).ok();
    }
}
