//! Integration tests for libmultipress.
//!
//! Tests the complete multipress workflow including:
//! - Factory functions for the built-in layouts and key files
//! - Cycling, interruption, timeout and pass-through behavior
//! - Degraded operation when the key file is unusable

use libmultipress::{
    create_engine, create_engine_from_file, create_engine_numeric_keypad,
    create_engine_phone_keypad, ConfigError, KeyCandidateTable, KeyEvent, KeyResult, Keyval,
    Layout, MultipressConfig, MultipressEngine, SharedTimerQueue, Signal, SignalLog, TimerQueue,
};
use std::path::PathBuf;
use std::time::Duration;

fn key(name: &str) -> Keyval {
    Keyval::from_name(name).unwrap()
}

fn press(engine: &mut MultipressEngine<SharedTimerQueue>, name: &str) -> KeyResult {
    engine.handle_key(KeyEvent::press(key(name)))
}

fn wait(engine: &mut MultipressEngine<SharedTimerQueue>, queue: &SharedTimerQueue, ms: u64) {
    let expired = queue.borrow_mut().advance(Duration::from_millis(ms));
    for id in expired {
        engine.timer_fired(id);
    }
}

fn phone() -> (MultipressEngine<SharedTimerQueue>, SharedTimerQueue, SignalLog) {
    let queue = TimerQueue::shared();
    let engine = create_engine_phone_keypad(queue.clone());
    let log = SignalLog::new();
    log.attach(engine.signals());
    (engine, queue, log)
}

/// Write a key file under the system temp dir, unique per test.
fn write_key_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "libmultipress_{}_{}.conf",
        name,
        std::process::id()
    ));
    std::fs::write(&path, content).expect("write temp key file");
    path
}

#[test]
fn test_cycling_wraps_to_first_candidate() {
    let (mut engine, _queue, log) = phone();
    let mut seen = Vec::new();
    for _ in 0..9 {
        assert_eq!(press(&mut engine, "2"), KeyResult::Handled);
        seen.push(engine.preedit().text);
    }
    assert_eq!(seen, ["a", "b", "c", "2", "a", "b", "c", "2", "a"]);
    assert!(log.commits().is_empty());
}

#[test]
fn test_interruption_commits_before_next_key() {
    let (mut engine, _queue, log) = phone();
    press(&mut engine, "4");
    press(&mut engine, "5");

    let signals = log.signals();
    let commit = signals
        .iter()
        .position(|s| *s == Signal::Commit("g".into()))
        .expect("g committed");
    let second_start = signals
        .iter()
        .rposition(|s| *s == Signal::PreeditStart)
        .unwrap();
    assert!(commit < second_start);
    assert_eq!(engine.preedit().text, "j");
}

#[test]
fn test_idle_timeout_commits_exactly_once() {
    let (mut engine, queue, log) = phone();
    press(&mut engine, "7");
    press(&mut engine, "7");
    press(&mut engine, "7");

    wait(&mut engine, &queue, 999);
    assert!(log.commits().is_empty());

    wait(&mut engine, &queue, 1);
    assert_eq!(log.commits(), vec!["r".to_string()]);
    assert!(!engine.is_composing());

    wait(&mut engine, &queue, 10_000);
    assert_eq!(log.commits().len(), 1);
}

#[test]
fn test_timeout_counts_from_last_press() {
    let (mut engine, queue, log) = phone();
    press(&mut engine, "2");
    wait(&mut engine, &queue, 800);
    press(&mut engine, "2");
    wait(&mut engine, &queue, 800);
    assert!(log.commits().is_empty());
    wait(&mut engine, &queue, 200);
    assert_eq!(log.commits(), vec!["b".to_string()]);
}

#[test]
fn test_unmapped_printable_key_passes_through() {
    let (mut engine, _queue, log) = phone();
    assert_eq!(press(&mut engine, "x"), KeyResult::Handled);
    assert_eq!(log.signals(), vec![Signal::Commit("x".into())]);
    assert!(engine.preedit().is_empty());
}

#[test]
fn test_unmapped_non_printing_key_is_unhandled() {
    let (mut engine, queue, log) = phone();
    assert_eq!(press(&mut engine, "Shift_L"), KeyResult::NotHandled);
    assert_eq!(press(&mut engine, "F5"), KeyResult::NotHandled);
    assert!(log.signals().is_empty());
    assert_eq!(queue.borrow().pending_count(), 0);
}

#[test]
fn test_reset_is_abandonment() {
    let (mut engine, queue, log) = phone();
    press(&mut engine, "2");
    press(&mut engine, "2");
    assert_eq!(engine.preedit().text, "b");

    engine.reset();
    assert!(log.commits().is_empty());
    assert_eq!(log.signals().last(), Some(&Signal::PreeditEnd));
    assert_eq!(queue.borrow().pending_count(), 0);

    press(&mut engine, "2");
    assert_eq!(engine.preedit().text, "a");
}

#[test]
fn test_end_to_end_scenario() {
    // 2 -> "a", 2 -> "b", Shift (unmapped, no character) -> commit "b", 2 -> fresh "a"
    let (mut engine, _queue, log) = phone();
    press(&mut engine, "2");
    assert_eq!(engine.preedit().text, "a");
    press(&mut engine, "2");
    assert_eq!(engine.preedit().text, "b");

    assert_eq!(press(&mut engine, "Shift_L"), KeyResult::NotHandled);
    assert_eq!(log.commits(), vec!["b".to_string()]);
    assert!(!engine.is_composing());

    press(&mut engine, "2");
    assert_eq!(engine.preedit().text, "a");
}

#[test]
fn test_phone_keypad_space_on_zero() {
    let (mut engine, queue, log) = phone();
    press(&mut engine, "4");
    press(&mut engine, "4");
    press(&mut engine, "0");
    press(&mut engine, "4");
    press(&mut engine, "4");
    press(&mut engine, "4");
    wait(&mut engine, &queue, 1000);
    assert_eq!(log.commits().concat(), "h i");
}

#[test]
fn test_numeric_keypad_factory() {
    let queue = TimerQueue::shared();
    let mut engine = create_engine_numeric_keypad(queue.clone());
    let log = SignalLog::new();
    log.attach(engine.signals());

    press(&mut engine, "KP_3");
    assert_eq!(engine.preedit().text, "d");
    // Plain digit keys are ordinary input in this layout
    press(&mut engine, "3");
    assert_eq!(log.commits(), vec!["d".to_string(), "3".to_string()]);
}

#[test]
fn test_malformed_key_file_keeps_valid_entries() {
    let mut content = String::from("[keys]\n");
    for digit in 0..9 {
        content.push_str(&format!("{}=x{},y{}\n", digit, digit, digit));
    }
    content.push_str("NoSuchKey=z\n");

    let report = KeyCandidateTable::from_key_file_str(&content, &Default::default()).unwrap();
    assert_eq!(report.table.len(), 9);
    assert_eq!(report.skipped.len(), 1);
    assert!(matches!(
        &report.skipped[0],
        ConfigError::InvalidKeyName(name) if name == "NoSuchKey"
    ));
}

#[test]
fn test_engine_from_key_file() {
    let path = write_key_file("from_file", "[keys]\n2=a,b,c,2\n3=d,e,f\n");
    let queue = TimerQueue::shared();
    let mut engine = create_engine_from_file(&path, queue.clone()).unwrap();
    let log = SignalLog::new();
    log.attach(engine.signals());

    press(&mut engine, "3");
    press(&mut engine, "3");
    press(&mut engine, "3");
    press(&mut engine, "3");
    assert_eq!(engine.preedit().text, "d");
    press(&mut engine, "2");
    assert_eq!(log.commits(), vec!["d".to_string()]);

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_engine_from_unparsable_file_fails() {
    let path = write_key_file("unparsable", "2=a,b\n");
    let result = create_engine_from_file(&path, TimerQueue::shared());
    assert!(matches!(result, Err(ConfigError::Syntax { line: 1, .. })));
    let _ = std::fs::remove_file(path);
}

#[test]
fn test_missing_key_file_degrades_to_pass_through() {
    let config = MultipressConfig {
        key_file: Some(PathBuf::from("/nonexistent/im-multipress.conf")),
        ..MultipressConfig::default()
    };
    let queue = TimerQueue::shared();
    let mut engine = create_engine(&config, queue.clone());
    let log = SignalLog::new();
    log.attach(engine.signals());

    assert!(engine.table().is_empty());
    assert_eq!(press(&mut engine, "2"), KeyResult::Handled);
    assert_eq!(press(&mut engine, "2"), KeyResult::Handled);
    assert_eq!(press(&mut engine, "Shift_L"), KeyResult::NotHandled);
    assert_eq!(log.commits(), vec!["2".to_string(), "2".to_string()]);
    assert_eq!(queue.borrow().pending_count(), 0);
}

#[test]
fn test_config_timeout_applies_to_engine() {
    let mut config = MultipressConfig {
        layout: Layout::PhoneKeypad,
        ..MultipressConfig::default()
    };
    config.base_mut().compose_timeout_ms = 300;

    let queue = TimerQueue::shared();
    let mut engine = create_engine(&config, queue.clone());
    let log = SignalLog::new();
    log.attach(engine.signals());

    press(&mut engine, "8");
    wait(&mut engine, &queue, 300);
    assert_eq!(log.commits(), vec!["t".to_string()]);
}
