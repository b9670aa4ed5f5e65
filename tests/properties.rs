//! Selection invariants over every short interaction sequence.

use liveselect::search::FuzzyCatalog;
use liveselect::surface::{Event, Key};
use liveselect::{Config, Mode, Session};
use serde_json::{json, Value};

const STEPS: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Step {
    Click(usize),
    RemoveTag(usize),
    Clear,
    Backspace,
}

const ALPHABET: [Step; 7] = [
    Step::Click(0),
    Step::Click(1),
    Step::Click(2),
    Step::Click(3),
    Step::RemoveTag(0),
    Step::Clear,
    Step::Backspace,
];

fn candidates() -> Value {
    json!([
        {"label": "Pinned", "value": "pin", "sticky": true},
        "a",
        "b",
        {"label": "Off", "value": "off", "disabled": true},
    ])
}

fn event(step: Step) -> Event {
    match step {
        Step::Click(index) => Event::ClickOption(index),
        Step::RemoveTag(index) => Event::RemoveTag(index),
        Step::Clear => Event::ClearButton,
        Step::Backspace => Event::Key(Key::Backspace),
    }
}

fn sequences(len: usize) -> Vec<Vec<Step>> {
    let mut all = vec![vec![]];
    for _ in 0..len {
        all = all
            .into_iter()
            .flat_map(|prefix| {
                ALPHABET.iter().map(move |step| {
                    let mut next = prefix.clone();
                    next.push(*step);
                    next
                })
            })
            .collect();
    }
    all
}

fn check(mode: Mode, max_selectable: usize, steps: &[Step]) {
    let mut s = Session::new(
        Config {
            mode,
            max_selectable,
            allow_clear: true,
            ..Config::default()
        },
        Value::Null,
        FuzzyCatalog::from_labels(["unused"]),
    );
    s.set_options(candidates()).unwrap();

    let mut pinned = false;
    for step in steps {
        s.dispatch(event(*step)).unwrap();
        let selection = s.controller().selection();
        let context = format!("{mode} max={max_selectable} {steps:?}");

        let values: Vec<&Value> = selection.iter().map(|o| o.value()).collect();
        for (i, value) in values.iter().enumerate() {
            assert!(!values[..i].contains(value), "duplicate value: {context}");
        }

        if mode.is_multi() {
            if max_selectable > 0 {
                assert!(selection.len() <= max_selectable, "over the limit: {context}");
            }
            pinned |= values.contains(&&json!("pin"));
            if pinned {
                assert!(values.contains(&&json!("pin")), "sticky entry lost: {context}");
            }
        } else {
            assert!(selection.len() <= 1, "single mode holds many: {context}");
        }

        assert!(
            !values.contains(&&json!("off")),
            "disabled candidate selected: {context}"
        );
        assert_eq!(
            s.surface().snapshot,
            *selection,
            "surface snapshot diverged: {context}"
        );
    }
}

#[test]
fn single_mode_invariants() {
    for steps in sequences(STEPS) {
        check(Mode::Single, 0, &steps);
    }
}

#[test]
fn tags_invariants() {
    for max_selectable in [0, 1, 2] {
        for steps in sequences(STEPS) {
            check(Mode::Tags, max_selectable, &steps);
        }
    }
}

#[test]
fn quick_tags_invariants() {
    for max_selectable in [0, 2] {
        for steps in sequences(STEPS) {
            check(Mode::QuickTags, max_selectable, &steps);
        }
    }
}
