//! Command-line interface for medscribe
//!
//! Provides argument parsing using clap derive macros, plus the runners for
//! each subcommand.

use crate::app::{AppAction, ScribeApp};
use crate::commands::CommandTable;
use crate::config::Config;
use crate::engine::{
    EngineEvent, MockRecognitionEngine, RecognitionFault, RecognitionUpdate,
};
use crate::error::{Result, ScribeError};
use crate::notes::generator_from_config;
use crate::session::{SessionEvent, Speaker};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Clinical dictation capture and SOAP note drafting
#[derive(Parser, Debug)]
#[command(name = "medscribe", version, about = "Clinical dictation capture and SOAP note drafting")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drive a full capture session from a script file and print the export
    Demo {
        /// Line-oriented session script (see `medscribe demo --help`)
        ///
        /// Verbs: `start <clinician|patient>`, `switch <clinician|patient>`,
        /// `interim <text>`, `final <confidence> <text>`, `ended`,
        /// `fault <code>`, `pause`, `stop`, `threshold <value>`.
        /// Blank lines and `#` comments are skipped.
        #[arg(value_name = "FILE")]
        script: PathBuf,
    },

    /// Print the active voice-command trigger table in match order
    Commands,

    /// Print the effective configuration as TOML
    Config,
}

/// Load configuration: explicit path, else default path, else defaults; then
/// environment overrides.
pub fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else if let Some(path) = Config::default_path() {
        Config::load_or_default(&path)?
    } else {
        Config::default()
    };
    Ok(config.with_env_overrides())
}

/// Run the demo command: replay a scripted session through the real state
/// machine, then draft a note and print the export document.
pub async fn run_demo_command(config: Config, script_path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(script_path)?;
    let mut app = ScribeApp::new(MockRecognitionEngine::new(), &config);
    let generator = generator_from_config(&config.note)?;

    for (line_no, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        apply_script_line(&mut app, line).map_err(|e| ScribeError::Other(format!(
            "{}:{}: {}",
            script_path.display(),
            line_no + 1,
            e
        )))?;

        for event in app.pump() {
            render_event(&event);
        }
        for action in app.take_actions() {
            match action {
                AppAction::GenerateNote => {
                    app.generate_note(generator.as_ref()).await;
                    println!("[note drafted]");
                }
                AppAction::SaveNote => {
                    println!("{}", app.export_json()?);
                }
            }
        }
    }

    app.session().stop_recording();
    app.pump();

    if app.note().is_none() && !app.transcript().is_empty() {
        app.generate_note(generator.as_ref()).await;
    }

    let stats = app.transcript().stats();
    eprintln!(
        "-- {} entries, {} words, mean confidence {:.2}",
        app.transcript().len(),
        stats.total_words,
        stats.mean_confidence
    );
    println!("{}", app.export_json()?);
    Ok(())
}

/// Apply one script verb to the app.
fn apply_script_line(app: &mut ScribeApp<MockRecognitionEngine>, line: &str) -> Result<()> {
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "start" => {
            app.session().start_recording(parse_speaker(rest)?)?;
        }
        "switch" => {
            app.session().switch_speaker(parse_speaker(rest)?)?;
        }
        "interim" => {
            app.session()
                .handle_engine_event(EngineEvent::Update(RecognitionUpdate::interim(rest)));
        }
        "final" => {
            let (conf, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| ScribeError::Other("final needs `<confidence> <text>`".into()))?;
            let confidence: f32 = conf
                .parse()
                .map_err(|_| ScribeError::Other(format!("bad confidence `{}`", conf)))?;
            app.session()
                .handle_engine_event(EngineEvent::Update(RecognitionUpdate::final_result(
                    text.trim(),
                    confidence,
                )));
        }
        "ended" => app.session().handle_engine_event(EngineEvent::Ended),
        "fault" => {
            app.session()
                .handle_engine_event(EngineEvent::Fault(parse_fault(rest)));
        }
        "pause" => {
            app.session().pause_recording();
        }
        "stop" => app.session().stop_recording(),
        "threshold" => {
            let t: f32 = rest
                .parse()
                .map_err(|_| ScribeError::Other(format!("bad threshold `{}`", rest)))?;
            app.session().set_confidence_threshold(t);
        }
        other => {
            return Err(ScribeError::Other(format!("unknown verb `{}`", other)));
        }
    }
    Ok(())
}

fn parse_speaker(s: &str) -> Result<Speaker> {
    match s {
        "clinician" => Ok(Speaker::Clinician),
        "patient" => Ok(Speaker::Patient),
        other => Err(ScribeError::Other(format!(
            "unknown speaker `{}` (expected clinician or patient)",
            other
        ))),
    }
}

fn parse_fault(code: &str) -> RecognitionFault {
    match code {
        "no-speech" => RecognitionFault::NoSpeech,
        "audio-capture" => RecognitionFault::AudioCapture,
        "not-allowed" => RecognitionFault::NotAllowed,
        "network" => RecognitionFault::Network,
        "service-not-allowed" => RecognitionFault::ServiceNotAllowed,
        other => RecognitionFault::Other(other.to_string()),
    }
}

fn render_event(event: &SessionEvent) {
    match event {
        SessionEvent::Utterance(u) => {
            println!("{}: {}  [{:.2}]", u.speaker, u.text.trim_start(), u.confidence);
        }
        SessionEvent::Interim(p) => println!("({}…) {}", p.speaker, p.text),
        SessionEvent::Command(c) => {
            println!("[command {:?} via \"{}\"]", c.command, c.matched_phrase);
        }
        SessionEvent::StatusChanged { status, speaker } => match speaker {
            Some(speaker) => println!("[{} — {}]", status, speaker),
            None => println!("[{}]", status),
        },
        SessionEvent::Error { message } => eprintln!("error: {}", message),
    }
}

/// Print the active trigger table in match order.
pub fn run_commands_command(config: &Config) -> Result<()> {
    let table = CommandTable::from_config(&config.commands);
    if table.is_empty() {
        println!("Voice commands are disabled.");
        return Ok(());
    }

    println!("Voice commands (first match wins):");
    for (phrase, command) in table.entries() {
        println!("  {:<22} -> {:?}", format!("\"{}\"", phrase), command);
    }
    Ok(())
}

/// Print the effective configuration as TOML.
pub fn run_config_command(config: &Config) -> Result<()> {
    let toml = toml::to_string_pretty(config)
        .map_err(|e| ScribeError::Other(format!("could not render configuration: {}", e)))?;
    print!("{}", toml);
    Ok(())
}
