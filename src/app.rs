//! Application composition root.
//!
//! Wires the speech session, the transcript accumulator, and voice-command
//! dispatch into one owned state object. The host drains the session's event
//! channel through [`ScribeApp::pump`]; the app applies each event to the
//! transcript, tracks the interim preview and the drafted note, and turns
//! intercepted commands into session calls or queued actions.

use crate::commands::CommandId;
use crate::config::Config;
use crate::engine::RecognitionEngine;
use crate::error::Result;
use crate::export::{SessionExport, new_session_id};
use crate::notes::{NoteGenerator, NoteRequest, SoapNote, generate_with_fallback};
use crate::session::{
    CommandEvent, InterimPreview, SessionEvent, SessionStatus, Speaker, SpeechSession,
};
use crate::transcript::Transcript;
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

/// Actions a voice command requests from the host.
///
/// Note generation is async and export needs an output sink, so the app
/// queues these instead of executing them inside the event pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    GenerateNote,
    SaveNote,
}

/// Owned application state for one documentation session.
pub struct ScribeApp<E: RecognitionEngine> {
    session: SpeechSession<E>,
    event_rx: Receiver<SessionEvent>,
    transcript: Transcript,
    session_id: String,
    specialty: String,
    quality: crate::notes::QualityLevel,
    note: Option<SoapNote>,
    interim: Option<InterimPreview>,
    last_error: Option<String>,
    pending_break: bool,
    pending_actions: Vec<AppAction>,
}

impl<E: RecognitionEngine> ScribeApp<E> {
    /// Assemble the app from configuration and an engine.
    pub fn new(engine: E, config: &Config) -> Self {
        let table = crate::commands::CommandTable::from_config(&config.commands);
        let (mut session, event_rx) =
            SpeechSession::new(engine, table, config.speech.confidence_threshold);
        session.set_language(&config.speech.language);

        Self {
            session,
            event_rx,
            transcript: Transcript::new().with_max_entries(config.session.max_transcript_entries),
            session_id: new_session_id(),
            specialty: config.session.specialty.clone(),
            quality: config.session.quality,
            note: None,
            interim: None,
            last_error: None,
            pending_break: false,
            pending_actions: Vec::new(),
        }
    }

    pub fn session(&mut self) -> &mut SpeechSession<E> {
        &mut self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn note(&self) -> Option<&SoapNote> {
        self.note.as_ref()
    }

    /// The preview of the utterance currently being spoken, if any.
    pub fn interim(&self) -> Option<&InterimPreview> {
        self.interim.as_ref()
    }

    /// The most recent session error message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Drain queued host actions (note generation, export).
    pub fn take_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Drain and apply all pending session events, in arrival order.
    ///
    /// Returns the processed events so a host can render them. Events emitted
    /// while dispatching a command (e.g. the status change from a spoken
    /// "pause recording") are picked up in the same pass.
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut processed = Vec::new();
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(&event);
            processed.push(event);
        }
        processed
    }

    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Utterance(utterance) => {
                let mut utterance = utterance.clone();
                if self.pending_break {
                    // Entries are immutable once stored, so a spoken paragraph
                    // break prefixes the next utterance instead of editing the
                    // previous one.
                    utterance.text = format!("\n\n{}", utterance.text);
                    self.pending_break = false;
                }
                self.interim = None;
                self.transcript.append(utterance);
            }
            SessionEvent::Interim(preview) => {
                self.interim = Some(preview.clone());
            }
            SessionEvent::Command(command) => self.dispatch(command),
            SessionEvent::StatusChanged { status, .. } => {
                if *status != SessionStatus::Recording {
                    self.interim = None;
                }
                if *status == SessionStatus::Recording {
                    self.last_error = None;
                }
            }
            SessionEvent::Error { message } => {
                self.last_error = Some(message.clone());
            }
        }
    }

    fn dispatch(&mut self, command: &CommandEvent) {
        debug!(command = ?command.command, "dispatching voice command");
        match command.command {
            CommandId::SwitchToPatient => self.switch_speaker(Speaker::Patient),
            CommandId::SwitchToClinician => self.switch_speaker(Speaker::Clinician),
            CommandId::AddParagraphBreak => self.pending_break = true,
            CommandId::PauseRecording => {
                self.session.pause_recording();
            }
            CommandId::StopRecording => self.session.stop_recording(),
            CommandId::StartRecording => {
                // Resume a paused session; without a remembered speaker there
                // is nothing to attribute dictation to.
                if self.session.status() == SessionStatus::Paused
                    && let Some(speaker) = self.session.current_speaker()
                    && let Err(e) = self.session.start_recording(speaker)
                {
                    warn!(error = %e, "voice-commanded resume failed");
                }
            }
            CommandId::ClearNote => self.note = None,
            CommandId::GenerateNote => self.pending_actions.push(AppAction::GenerateNote),
            CommandId::SaveNote => self.pending_actions.push(AppAction::SaveNote),
            CommandId::NewSession => self.new_session(),
        }
    }

    fn switch_speaker(&mut self, speaker: Speaker) {
        if let Err(e) = self.session.switch_speaker(speaker) {
            warn!(error = %e, %speaker, "voice-commanded speaker switch failed");
        }
    }

    /// Start a fresh documentation session.
    ///
    /// Stops recording, clears the transcript and the drafted note, and
    /// issues a new session id.
    pub fn new_session(&mut self) {
        self.session.stop_recording();
        self.transcript.reset();
        self.note = None;
        self.interim = None;
        self.last_error = None;
        self.pending_break = false;
        self.session_id = new_session_id();
        info!(session_id = %self.session_id, "new session started");
    }

    /// Draft a note from the accumulated transcript.
    ///
    /// Falls back to the mock structure when the generator fails; the
    /// resulting note is stored and returned.
    pub async fn generate_note(&mut self, generator: &dyn NoteGenerator) -> &SoapNote {
        let request = NoteRequest {
            dialogue: self.transcript.dialogue(),
            specialty: self.specialty.clone(),
            quality: self.quality,
        };
        let note = generate_with_fallback(generator, &request).await;
        self.note.insert(note)
    }

    /// Snapshot the session as an export document.
    pub fn export(&self) -> SessionExport {
        SessionExport::new(
            self.session_id.clone(),
            self.specialty.clone(),
            self.note.clone(),
            self.transcript.entries().to_vec(),
        )
    }

    /// Export serialized as pretty JSON.
    pub fn export_json(&self) -> Result<String> {
        self.export().to_json()
    }
}
