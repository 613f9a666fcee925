//! End-to-end session flows through the public API: scripted engine events
//! driven through the app, transcript accumulation, note drafting, export.

use medscribe::app::ScribeApp;
use medscribe::config::Config;
use medscribe::engine::{
    EngineEvent, MockRecognitionEngine, RecognitionSegment, RecognitionUpdate,
};
use medscribe::notes::MockNoteGenerator;
use medscribe::session::{SessionStatus, Speaker};
use medscribe::SessionExport;

fn final_burst(text: &str, confidence: f32) -> EngineEvent {
    EngineEvent::Update(RecognitionUpdate::final_result(text, confidence))
}

#[test]
fn full_visit_dialogue_accumulates_in_arrival_order() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());

    app.session().start_recording(Speaker::Clinician).unwrap();
    app.session()
        .handle_engine_event(final_burst("what brings you in today", 0.93));

    app.session()
        .handle_engine_event(final_burst("switch to patient", 0.95));
    app.pump();
    assert_eq!(app.session().current_speaker(), Some(Speaker::Patient));

    app.session()
        .handle_engine_event(final_burst("I have had a headache for two days", 0.88));
    // Below threshold, silently dropped
    app.session()
        .handle_engine_event(final_burst("mumbled something", 0.41));

    app.session()
        .handle_engine_event(final_burst("switch to clinician", 0.9));
    app.session()
        .handle_engine_event(final_burst("any nausea or sensitivity to light", 0.91));
    app.pump();

    let entries = app.transcript().entries();
    let lines: Vec<(Speaker, &str)> = entries
        .iter()
        .map(|e| (e.speaker, e.text.as_str()))
        .collect();
    assert_eq!(
        lines,
        vec![
            (Speaker::Clinician, "what brings you in today"),
            (Speaker::Patient, "I have had a headache for two days"),
            (Speaker::Clinician, "any nausea or sensitivity to light"),
        ]
    );

    assert_eq!(
        app.transcript().dialogue(),
        "Clinician: what brings you in today\n\
         Patient: I have had a headache for two days\n\
         Clinician: any nausea or sensitivity to light"
    );
}

#[test]
fn command_below_threshold_fires_and_stays_out_of_transcript() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());
    app.session().start_recording(Speaker::Clinician).unwrap();

    app.session()
        .handle_engine_event(final_burst("please pause recording", 0.2));
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Paused);
    assert!(app.transcript().is_empty());
}

#[test]
fn speaker_switch_never_holds_two_capture_handles() {
    let engine = MockRecognitionEngine::new();
    let probe = engine.probe();
    let mut app = ScribeApp::new(engine, &Config::default());

    app.session().start_recording(Speaker::Clinician).unwrap();
    app.session()
        .handle_engine_event(final_burst("switch to patient", 0.95));
    app.pump();

    assert_eq!(probe.ops(), vec!["start", "stop", "start"]);
    assert_eq!(probe.overlapping_starts(), 0);
}

#[test]
fn engine_end_mid_dictation_is_invisible_to_the_transcript() {
    let engine = MockRecognitionEngine::new();
    let probe = engine.probe();
    let mut app = ScribeApp::new(engine, &Config::default());

    app.session().start_recording(Speaker::Patient).unwrap();
    app.session()
        .handle_engine_event(final_burst("the pain is behind my eyes", 0.9));

    // Engine hiccup between bursts
    app.session().handle_engine_event(EngineEvent::Ended);
    app.session()
        .handle_engine_event(final_burst("and worse in the morning", 0.86));
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Recording);
    assert_eq!(probe.start_attempts(), 2);
    assert_eq!(app.transcript().len(), 2);
    assert!(app.last_error().is_none());
}

#[test]
fn failed_restart_surfaces_through_the_event_channel() {
    let mut app = ScribeApp::new(
        MockRecognitionEngine::new().with_start_failure_on_attempt(2),
        &Config::default(),
    );

    app.session().start_recording(Speaker::Patient).unwrap();
    app.session().handle_engine_event(EngineEvent::Ended);
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Error);
    assert!(
        app.last_error()
            .is_some_and(|m| m.contains("Failed to restart"))
    );
}

#[test]
fn stop_recording_twice_is_harmless() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());
    app.session().start_recording(Speaker::Clinician).unwrap();

    app.session().stop_recording();
    app.session().stop_recording();
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Stopped);
    assert_eq!(app.session().current_speaker(), None);
    assert!(app.last_error().is_none());
}

#[test]
fn interim_preview_survives_only_while_recording() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());
    app.session().start_recording(Speaker::Patient).unwrap();

    app.session()
        .handle_engine_event(EngineEvent::Update(RecognitionUpdate::new(vec![
            RecognitionSegment::Interim {
                text: "it start".to_string(),
            },
            RecognitionSegment::Interim {
                text: "ed on sun".to_string(),
            },
        ])));
    app.pump();
    assert_eq!(
        app.interim().map(|p| p.text.as_str()),
        Some("it started on sun")
    );

    app.session().pause_recording();
    app.pump();
    assert!(app.interim().is_none());
}

#[tokio::test]
async fn visit_flows_into_note_and_export_round_trip() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());

    app.session().start_recording(Speaker::Clinician).unwrap();
    app.session()
        .handle_engine_event(final_burst("well child visit today", 0.94));
    app.session()
        .handle_engine_event(final_burst("switch to patient", 0.95));
    app.session()
        .handle_engine_event(final_burst("feeling great", 0.9));
    app.session()
        .handle_engine_event(final_burst("generate soap note", 0.92));
    app.pump();

    for action in app.take_actions() {
        assert_eq!(action, medscribe::AppAction::GenerateNote);
        app.generate_note(&MockNoteGenerator::new()).await;
    }
    assert!(app.note().is_some());

    let json = app.export_json().unwrap();
    let parsed = SessionExport::from_json(&json).unwrap();

    assert_eq!(parsed.metadata.session_id, app.session_id());
    assert_eq!(parsed.transcript.len(), 2);
    assert_eq!(parsed.transcript, app.transcript().entries().to_vec());
    assert_eq!(
        parsed.note.as_ref().map(|n| n.patient_info.name.as_str()),
        Some("Emma Johnson")
    );
}

#[test]
fn custom_command_bindings_flow_through_the_session() {
    let mut config = Config::default();
    config.commands.custom.push(medscribe::config::CommandBinding {
        phrase: "wrap it up".to_string(),
        command: medscribe::CommandId::StopRecording,
    });

    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &config);
    app.session().start_recording(Speaker::Clinician).unwrap();
    app.session()
        .handle_engine_event(final_burst("okay wrap it up please", 0.9));
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Stopped);
    assert!(app.transcript().is_empty());
}

#[test]
fn no_speech_timeouts_do_not_disturb_a_long_session() {
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &Config::default());
    app.session().start_recording(Speaker::Patient).unwrap();

    for _ in 0..3 {
        app.session().handle_engine_event(EngineEvent::Fault(
            medscribe::engine::RecognitionFault::NoSpeech,
        ));
    }
    app.session()
        .handle_engine_event(final_burst("sorry I was thinking", 0.85));
    app.pump();

    assert_eq!(app.session().status(), SessionStatus::Recording);
    assert_eq!(app.transcript().len(), 1);
    assert!(app.last_error().is_none());
}
