//! lector main entry point
//!
//! A command loop over two event sources merged into one channel:
//! 1. stdin (user commands) - read on a separate thread
//! 2. speech completion signals - delivered by the TTS backend callback
//!
//! The reader advances only when a completion signal for the live session
//! arrives, so every command returns immediately.

use anyhow::{Context, Result};
use lector::document::PdfLoader;
use lector::reader::ReaderEvent;
use lector::segment::SegmentMode;
use lector::session::{Config, ReaderSession};
use lector::speech::{CompletionSignal, NativeBackend};
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::process;
use std::sync::mpsc;
use std::thread;

/// Events merged into the main loop
enum AppEvent {
    /// One line typed by the user
    Command(String),

    /// The backend finished an utterance
    SpeechDone(CompletionSignal),

    /// stdin closed
    Eof,
}

/// What the command handler wants the loop to do next
#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let debug_mode = args.iter().any(|arg| arg == "--debug" || arg == "-d");

    // Initialize logger
    if debug_mode {
        // Debug mode: write to lector.log file
        use std::fs::OpenOptions;
        match OpenOptions::new().create(true).append(true).open("lector.log") {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: failed to open lector.log for debug logging: {}", e);
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Warn)
                    .init();
            }
        }
        info!(
            "lector version {} starting (debug mode, logging to lector.log)",
            lector::VERSION
        );
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .init();
    }

    // First non-flag argument is a PDF to open right away
    let initial = args
        .iter()
        .skip(1)
        .find(|arg| !arg.starts_with('-'))
        .cloned();

    if let Err(e) = run(initial) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(initial: Option<String>) -> Result<()> {
    let (tx, rx) = mpsc::channel();

    // Speech completion signals land in the same channel as commands
    let speech_tx = tx.clone();
    let backend = NativeBackend::new(Box::new(move |signal| {
        let _ = speech_tx.send(AppEvent::SpeechDone(signal));
    }))
    .context("failed to initialize speech synthesis")?;

    let config = Config::load().context("failed to load configuration")?;
    info!("Configuration loaded from {:?}", config.path());

    let mut session = ReaderSession::new(config, Box::new(PdfLoader::new()), Box::new(backend));

    // stdin reader thread
    let input_tx = tx.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if input_tx.send(AppEvent::Command(line)).is_err() {
                        return;
                    }
                }
                Err(_) => break,
            }
        }
        let _ = input_tx.send(AppEvent::Eof);
    });

    println!("lector {} - type 'help' for commands", lector::VERSION);

    if let Some(path) = initial {
        open_document(&mut session, &path);
    }
    prompt();

    for event in rx {
        match event {
            AppEvent::Command(line) => {
                if handle_command(&mut session, &line) == Flow::Quit {
                    break;
                }
                prompt();
            }
            AppEvent::SpeechDone(signal) => match session.on_speech_complete(signal) {
                Ok(Some(event)) => report(&session, event),
                Ok(None) => {} // stale signal from a superseded session
                Err(e) => println!("Error: {}", e),
            },
            AppEvent::Eof => break,
        }
    }

    session.stop().ok();
    Ok(())
}

fn prompt() {
    print!("> ");
    io::stdout().flush().ok();
}

/// Print a progress or finish notification
fn report(session: &ReaderSession, event: ReaderEvent) {
    match event {
        ReaderEvent::Progress { index, total } => {
            let text = session.unit_text(index).unwrap_or("");
            println!("Reading unit {} of {}: {}", index + 1, total, preview(text));
        }
        ReaderEvent::Finished => println!("Finished reading."),
    }
}

/// First line of a unit, shortened for a status line
fn preview(text: &str) -> String {
    const MAX: usize = 60;
    let line = text.lines().next().unwrap_or("");
    match line.char_indices().nth(MAX) {
        Some((byte, _)) => format!("{}...", &line[..byte]),
        None => line.to_string(),
    }
}

fn open_document(session: &mut ReaderSession, path: &str) {
    let bytes = match std::fs::read(path).with_context(|| format!("cannot read {}", path)) {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Error: {:#}", e);
            return;
        }
    };
    match session.load(&bytes) {
        Ok(count) => println!("Document loaded with {} units.", count),
        Err(e) => println!("Error: {}", e),
    }
}

fn handle_command(session: &mut ReaderSession, line: &str) -> Flow {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "open" => {
            if rest.is_empty() {
                println!("Usage: open <file>");
            } else {
                open_document(session, rest);
            }
        }
        "read" => {
            let result = if rest.is_empty() {
                session.read_all()
            } else {
                session.read_selection(rest)
            };
            match result {
                Ok(event) => report(session, event),
                Err(e) => println!("Error: {}", e),
            }
        }
        "pause" => match session.pause() {
            Ok(()) => println!("Paused."),
            Err(e) => println!("Error: {}", e),
        },
        "resume" => match session.resume() {
            Ok(()) => println!("Resumed."),
            Err(e) => println!("Error: {}", e),
        },
        "stop" => match session.stop() {
            Ok(()) => println!("Stopped."),
            Err(e) => println!("Error: {}", e),
        },
        "mode" => {
            if rest.is_empty() {
                println!("Mode: {}", session.mode().name());
            } else {
                match SegmentMode::parse(rest) {
                    Some(mode) => match session.set_mode(mode) {
                        Ok(count) => {
                            println!("Mode set to {}; {} units.", mode.name(), count)
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Unknown mode: {} (sentence or page)", rest),
                }
            }
        }
        "voices" => match session.voices() {
            Ok(voices) if voices.is_empty() => println!("No voices reported by the platform."),
            Ok(voices) => {
                for voice in voices {
                    println!(
                        "{} {}  {} ({})",
                        if voice.is_default { "*" } else { " " },
                        voice.id,
                        voice.display_name,
                        voice.lang
                    );
                }
            }
            Err(e) => println!("Error: {}", e),
        },
        "voice" => {
            if rest.is_empty() {
                println!("Usage: voice <id>  (see 'voices')");
            } else {
                match session.set_voice(rest) {
                    Ok(()) => println!("Voice set to {}.", rest),
                    Err(e) => println!("Error: {}", e),
                }
            }
        }
        "rate" | "pitch" => match rest.parse::<f32>() {
            Ok(value) => {
                let result = if command == "rate" {
                    session.set_rate(value)
                } else {
                    session.set_pitch(value)
                };
                match result {
                    Ok(()) => println!("{} set to {}.", command, value),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(_) => println!("Usage: {} <number>", command),
        },
        "search" => {
            if rest.is_empty() {
                println!("Search cleared.");
            } else {
                let matches = session.search(rest);
                if matches.is_empty() {
                    println!("No units match '{}'.", rest);
                } else {
                    println!("{} units match '{}':", matches.len(), rest);
                    for index in matches {
                        let text = session.unit_text(index).unwrap_or("");
                        println!("  {}: {}", index + 1, preview(text));
                    }
                }
            }
        }
        "show" => match rest.parse::<usize>() {
            Ok(number) if number >= 1 => match session.unit_text(number - 1) {
                Some(text) => println!("{}", text),
                None => println!("No unit {} ({} units).", number, session.units().len()),
            },
            _ => println!("Usage: show <unit number>"),
        },
        "export" => {
            if rest.is_empty() {
                println!("Usage: export <file>");
            } else {
                match session
                    .export_json()
                    .map_err(anyhow::Error::from)
                    .and_then(|json| {
                        std::fs::write(rest, json)
                            .with_context(|| format!("cannot write {}", rest))
                    }) {
                    Ok(()) => println!("Exported to {}.", rest),
                    Err(e) => println!("Error: {:#}", e),
                }
            }
        }
        "close" => match session.clear() {
            Ok(()) => println!("Document closed."),
            Err(e) => println!("Error: {}", e),
        },
        "status" => {
            let reader = session.reader();
            println!(
                "{} | position {}/{} | mode {}",
                reader.status().name(),
                reader.position(),
                reader.unit_count(),
                session.mode().name()
            );
        }
        "help" => print_help(),
        "quit" | "exit" => return Flow::Quit,
        _ => println!("Unknown command: {} (type 'help')", command),
    }

    Flow::Continue
}

fn print_help() {
    println!("Commands:");
    println!("  open <file>           load a PDF");
    println!("  read                  read all units from the beginning");
    println!("  read <text>           read the given text once");
    println!("  pause / resume        suspend or continue reading");
    println!("  stop                  stop and rewind");
    println!("  mode [sentence|page]  show or set the segment mode");
    println!("  voices                list available voices");
    println!("  voice <id>            select a voice");
    println!("  rate <0.1-10>         set the speech rate multiplier");
    println!("  pitch <0.1-10>        set the speech pitch multiplier");
    println!("  search <keyword>      list matching units");
    println!("  show <n>              print unit n");
    println!("  export <file>         write the extracted text as JSON");
    println!("  close                 discard the current document");
    println!("  status                show reader status");
    println!("  quit                  exit");
}
