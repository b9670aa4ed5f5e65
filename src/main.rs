//! Line-driven demo host.
//!
//! Mounts one component over a fixed catalog and drives it from stdin, one
//! command per line. After every command the view model and the form field
//! are printed as a single JSON line.
//!
//! ```text
//! liveselect [config.toml] [catalog.json]
//! ```
//!
//! The catalog is any candidate list the option normalizer accepts: bare
//! labels, `[label, value]` pairs, option maps or a label → value object.
//! Without one, a small list of cities is used.
//!
//! # Commands
//!
//! - `type <text>`: Replace the input text
//! - `tick <ms>`: Advance the clock
//! - `up` / `down` / `home` / `end`: Move the highlighted entry
//! - `enter` / `esc` / `backspace`: Keys
//! - `click <i>`: Click candidate `i`
//! - `remove <i>`: Remove tag `i`
//! - `clear`: Press the clear button
//! - `focus` / `blur`
//! - `disconnect` / `reconnect`: Drop and restore the transport
//! - `show`: Print without changing anything
//! - `quit`

#![allow(clippy::multiple_crate_versions)]

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

use liveselect::normalize::normalize_list;
use liveselect::search::FuzzyCatalog;
use liveselect::surface::{Event, Key};
use liveselect::{Config, LiveSelectError, Result, Session};

const DEFAULT_CATALOG: [&str; 8] = [
    "Amsterdam",
    "Berlin",
    "Bern",
    "Boston",
    "Lisbon",
    "London",
    "Madrid",
    "Paris",
];

fn main() {
    if let Err(e) = run() {
        eprintln!("liveselect: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let catalog = match args.next() {
        Some(path) => load_catalog(&path)?,
        None => FuzzyCatalog::from_labels(DEFAULT_CATALOG),
    };

    liveselect::observability::init_tracing(&config);
    tracing::info!(
        field_name = %config.field_name,
        mode = %config.mode,
        entries = catalog.len(),
        "demo host started"
    );

    let mut session = Session::new(config, Value::Null, catalog);
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    print_state(&mut stdout, &session)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        match apply(&mut session, line) {
            Ok(()) => print_state(&mut stdout, &session)?,
            Err(e) => {
                tracing::debug!(command = line, error = %e, "command rejected");
                writeln!(stdout, "{}", json!({ "error": e.to_string() }))?;
            }
        }
    }

    Ok(())
}

fn apply(session: &mut Session<FuzzyCatalog>, line: &str) -> Result<()> {
    let (command, argument) = line.split_once(' ').unwrap_or((line, ""));

    match command {
        "type" => {
            session.dispatch(Event::Input {
                text: argument.to_string(),
            })?;
        }
        "tick" => {
            session.advance_by(parse_number(argument)?)?;
        }
        "up" => {
            session.dispatch(Event::Key(Key::Up))?;
        }
        "down" => {
            session.dispatch(Event::Key(Key::Down))?;
        }
        "home" => {
            session.dispatch(Event::Key(Key::Home))?;
        }
        "end" => {
            session.dispatch(Event::Key(Key::End))?;
        }
        "enter" => {
            session.dispatch(Event::Key(Key::Enter))?;
        }
        "esc" => {
            session.dispatch(Event::Key(Key::Escape))?;
        }
        "backspace" => {
            let mut text = session.surface().text.clone();
            if text.pop().is_some() {
                session.dispatch(Event::Input { text })?;
            } else {
                session.dispatch(Event::Key(Key::Backspace))?;
            }
        }
        "click" => {
            session.dispatch(Event::ClickOption(parse_number(argument)?))?;
        }
        "remove" => {
            session.dispatch(Event::RemoveTag(parse_number(argument)?))?;
        }
        "clear" => {
            session.dispatch(Event::ClearButton)?;
        }
        "focus" => {
            session.dispatch(Event::Focus)?;
        }
        "blur" => {
            session.dispatch(Event::Blur)?;
        }
        "disconnect" => {
            session.disconnect()?;
        }
        "reconnect" => {
            session.reconnect()?;
        }
        "show" => {}
        other => {
            return Err(LiveSelectError::Config(format!("unknown command: {other}")));
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(argument: &str) -> Result<T> {
    argument
        .trim()
        .parse()
        .map_err(|_| LiveSelectError::Config(format!("expected a number, got {argument:?}")))
}

fn print_state(out: &mut impl Write, session: &Session<FuzzyCatalog>) -> Result<()> {
    let state = json!({
        "t_ms": session.now(),
        "view": session.view(),
        "field": session.form_field(),
    });
    writeln!(out, "{state}")?;
    Ok(())
}

fn load_catalog(path: &str) -> Result<FuzzyCatalog> {
    let source = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&source)
        .map_err(|e| LiveSelectError::Config(format!("catalog {path}: {e}")))?;

    let entries: Vec<(String, Value)> = normalize_list(&raw)
        .into_iter()
        .map(|option| (option.label().to_string(), option.value().clone()))
        .collect();
    if entries.is_empty() {
        return Err(LiveSelectError::Config(format!("catalog {path}: no usable entries")));
    }

    Ok(FuzzyCatalog::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn catalog_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn catalog_accepts_every_candidate_shape() {
        let file = catalog_file(
            r#"["Paris", ["Lima", "lim"], {"value": "osl"}, 42, ["Rome", "rom", true]]"#,
        );
        let catalog = load_catalog(&file.path().to_string_lossy()).unwrap();

        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.matches("lima"),
            vec![json!({"label": "Lima", "value": "lim"})]
        );
    }

    #[test]
    fn catalog_from_label_map() {
        let file = catalog_file(r#"{"Zurich": "zrh", "Bern": "brn"}"#);
        let catalog = load_catalog(&file.path().to_string_lossy()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let file = catalog_file("[null]");
        let err = load_catalog(&file.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, LiveSelectError::Config(_)));
    }
}
