use super::*;
use crate::core::backend::Backend;
use crate::core::message::Turn;
use crate::utils::test_utils::create_test_app;

#[test]
fn plain_text_is_a_message() {
    let (mut app, _dir) = create_test_app();
    assert!(matches!(
        process_input(&mut app, "hello there"),
        CommandResult::ProcessAsMessage(text) if text == "hello there"
    ));
    assert!(matches!(
        process_input(&mut app, "/notacommand really"),
        CommandResult::ProcessAsMessage(_)
    ));
    assert!(matches!(
        process_input(&mut app, "/"),
        CommandResult::ProcessAsMessage(_)
    ));
}

#[tokio::test]
async fn clear_command_resets_transcript() {
    let (mut app, _dir) = create_test_app();
    app.session
        .submit("hi", Some(&Backend::local("a")))
        .await
        .unwrap();
    assert_eq!(app.session.conversation().len(), 2);

    assert!(matches!(
        process_input(&mut app, "/clear"),
        CommandResult::Continue
    ));
    assert!(app.session.conversation().is_empty());
    assert_eq!(app.notices(), ["Transcript cleared"]);
}

#[test]
fn save_defers_to_the_loop_with_optional_name() {
    let (mut app, _dir) = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/save"),
        CommandResult::Save(None)
    ));
    assert!(matches!(
        process_input(&mut app, "/save  trip plans.json "),
        CommandResult::Save(Some(name)) if name == "trip plans.json"
    ));
}

#[tokio::test]
async fn load_replaces_transcript_and_list_shows_files() {
    let (mut app, dir) = create_test_app();
    app.session
        .submit("hi", Some(&Backend::local("a")))
        .await
        .unwrap();
    app.session
        .save(Some(std::path::Path::new("one.json")))
        .await
        .unwrap();
    app.session.clear();

    assert!(matches!(
        process_input(&mut app, "/load one.json"),
        CommandResult::ShowTranscript
    ));
    assert_eq!(app.session.conversation().turns()[0], Turn::user("hi"));
    assert_eq!(
        app.session.store().loaded_file(),
        Some(dir.path().join("one.json").as_path())
    );

    app.take_notices();
    process_input(&mut app, "/list");
    assert_eq!(app.notices(), ["Saved conversations:\n  • one.json"]);
}

#[test]
fn load_failures_are_reported() {
    let (mut app, _dir) = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/load"),
        CommandResult::Continue
    ));
    assert_eq!(app.notices(), ["Usage: /load <filename>"]);

    app.take_notices();
    process_input(&mut app, "/load missing.json");
    assert!(app.notices()[0].starts_with("Load error: Failed to read conversation"));
}

#[test]
fn model_command_lists_and_selects() {
    let (mut app, _dir) = create_test_app();
    process_input(&mut app, "/model Ollama b");
    assert_eq!(app.session.selected(), Some(&Backend::local("b")));
    assert_eq!(app.take_notices(), vec!["Model set: Ollama b"]);

    process_input(&mut app, "/model");
    assert_eq!(
        app.take_notices(),
        vec!["Backends:\n   AzureOpen AI\n   Ollama a\n * Ollama b"]
    );

    process_input(&mut app, "/model Ollama");
    assert!(app.take_notices()[0].starts_with("Model error:"));
    assert_eq!(app.session.selected(), Some(&Backend::local("b")));
}

#[tokio::test]
async fn status_reports_missing_models() {
    let (mut app, _dir) = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/status"),
        CommandResult::Status
    ));
    report_status(&mut app).await;
    let notices = app.take_notices();
    assert!(notices[0].contains("  - b (install with: ollama pull b)"));
    assert!(!notices[0].contains("ollama pull a"));
}

#[test]
fn help_lists_every_command() {
    let (mut app, _dir) = create_test_app();
    process_input(&mut app, "/HELP");
    let help = app.take_notices().remove(0);
    for command in all_commands() {
        assert!(help.contains(command.usage), "missing {}", command.usage);
    }
}

#[test]
fn quit_ends_the_loop() {
    let (mut app, _dir) = create_test_app();
    assert!(matches!(
        process_input(&mut app, "/quit"),
        CommandResult::Quit
    ));
}

#[test]
fn log_without_file_reports_error() {
    let (mut app, _dir) = create_test_app();
    process_input(&mut app, "/log");
    assert!(app.take_notices()[0].starts_with("Log error: No log file specified"));
    process_input(&mut app, "/log a b");
    assert_eq!(app.take_notices(), vec!["Usage: /log [filename]"]);
}
