//! Line-oriented chat loop over stdin/stdout.

use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{process_input, report_status, CommandResult};
use crate::core::app::App;
use crate::core::config::Config;
use crate::core::message::Turn;
use crate::core::process::{ensure_running, StartupAction};

pub struct ChatOptions {
    pub backend: Option<String>,
    pub log_file: Option<String>,
    pub conversations_dir: Option<PathBuf>,
    pub start_runtimes: bool,
}

fn print_turn(turn: &Turn) {
    println!("{turn}");
    println!();
}

fn print_notices(app: &mut App) {
    for notice in app.take_notices() {
        println!("{notice}");
    }
}

fn describe_startup(action: &StartupAction) -> String {
    match action {
        StartupAction::AlreadyRunning(model) => format!("{model} is already running."),
        StartupAction::Started(model) => format!("Started {model}"),
        StartupAction::Failed { model, reason } => format!("⚠️  Could not start {model}: {reason}"),
    }
}

/// Applies the startup selection; a bad label is reported and leaves nothing selected.
pub fn select_initial_backend(app: &mut App, label: Option<&str>) {
    let Some(label) = label else {
        return;
    };
    match app.select_label(label) {
        Ok(backend) => app.notify(format!("Model set: {backend}")),
        Err(err) => app.notify(format!("Model error: {err}")),
    }
}

async fn save(app: &mut App, filename: Option<String>) {
    let result = match filename {
        Some(name) => app.session.save(Some(Path::new(&name))).await,
        None => app.session.save_current().await,
    };
    match result {
        Ok(path) => app.notify(format!("Saved: {}", path.display())),
        Err(err) => app.notify(format!("Save error: {err}")),
    }
}

pub async fn run_chat(config: Config, options: ChatOptions) -> Result<(), Box<dyn Error>> {
    let mut app = App::from_config(&config, options.conversations_dir, options.log_file);

    if options.start_runtimes {
        for action in ensure_running(app.models(), app.processes.as_ref()).await {
            println!("{}", describe_startup(&action));
        }
    }

    let initial = options.backend.or_else(|| config.default_backend.clone());
    select_initial_backend(&mut app, initial.as_deref());

    println!("💬 switchboard: type a message, /model to pick a backend, /help for commands");
    print_notices(&mut app);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match process_input(&mut app, &line) {
            CommandResult::Continue => {}
            CommandResult::ProcessAsMessage(message) => {
                if message.trim().is_empty() {
                    continue;
                }
                debug!(len = message.len(), "Submitting message");
                match app.session.submit_selected(&message).await {
                    Ok(conversation) => {
                        if let Some(reply) = conversation.last() {
                            print_turn(reply);
                        }
                    }
                    Err(err) => print_turn(&err.as_turn()),
                }
            }
            CommandResult::Save(filename) => save(&mut app, filename).await,
            CommandResult::Status => report_status(&mut app).await,
            CommandResult::ShowTranscript => {
                print_notices(&mut app);
                for turn in app.session.conversation() {
                    print_turn(turn);
                }
            }
            CommandResult::Quit => break,
        }
        print_notices(&mut app);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::Backend;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn initial_backend_must_be_offered() {
        let (mut app, _dir) = create_test_app();
        select_initial_backend(&mut app, Some("Ollama nope"));
        assert_eq!(app.session.selected(), None);
        assert!(app.take_notices()[0].starts_with("Model error:"));

        select_initial_backend(&mut app, Some("Ollama a"));
        assert_eq!(app.session.selected(), Some(&Backend::local("a")));
    }

    #[tokio::test]
    async fn save_without_name_reuses_loaded_file() {
        let (mut app, dir) = create_test_app();
        app.session
            .submit("hi", Some(&Backend::local("a")))
            .await
            .unwrap();
        save(&mut app, Some("chat.json".to_string())).await;
        app.session.load("chat.json").unwrap();

        app.take_notices();
        save(&mut app, None).await;
        assert_eq!(
            app.take_notices(),
            vec![format!("Saved: {}", dir.path().join("chat.json").display())]
        );
    }

    #[test]
    fn startup_lines_read_naturally() {
        assert_eq!(
            describe_startup(&StartupAction::AlreadyRunning("a".into())),
            "a is already running."
        );
        assert_eq!(
            describe_startup(&StartupAction::Started("b".into())),
            "Started b"
        );
    }
}
