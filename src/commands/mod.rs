mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::app::App;
use crate::core::status::status_from_system;

pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
    /// Save needs the generation backend for titling, so the loop runs it.
    Save(Option<String>),
    /// The transcript was replaced and should be shown again.
    ShowTranscript,
    /// Querying the runtime is async; the loop calls [`report_status`].
    Status,
    Quit,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    let Some(rest) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => (command.handler)(
            app,
            CommandInvocation {
                input: trimmed,
                args,
            },
        ),
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

fn usage_status(app: &mut App, usage: &'static str) -> CommandResult {
    app.notify(format!("Usage: {usage}"));
    CommandResult::Continue
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<18} {}", command.usage, command.help));
    }
    app.notify(help);
    CommandResult::Continue
}

pub(super) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.session.clear();
    app.notify("Transcript cleared");
    CommandResult::Continue
}

pub(super) fn handle_save(_app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Save(invocation.rest().map(str::to_string))
}

pub(super) fn handle_load(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let Some(filename) = invocation.rest() else {
        return usage_status(app, "/load <filename>");
    };
    match app.session.load(filename) {
        Ok(conversation) => {
            let turns = conversation.len();
            app.notify(format!("Loaded {filename} ({turns} turns)"));
            CommandResult::ShowTranscript
        }
        Err(err) => {
            app.notify(format!("Load error: {err}"));
            CommandResult::Continue
        }
    }
}

pub(super) fn handle_list(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    match app.session.list_saved_files() {
        Ok(files) if files.is_empty() => app.notify("No saved conversations."),
        Ok(files) => {
            let listing = files
                .iter()
                .map(|name| format!("  • {name}"))
                .collect::<Vec<_>>()
                .join("\n");
            app.notify(format!("Saved conversations:\n{listing}"));
        }
        Err(err) => app.notify(format!("List error: {err}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_model(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    match invocation.rest() {
        None => {
            let selected = app.session.selected().cloned();
            let listing = app
                .choices()
                .iter()
                .map(|backend| {
                    let marker = if Some(backend) == selected.as_ref() { "*" } else { " " };
                    format!(" {marker} {backend}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            app.notify(format!("Backends:\n{listing}"));
        }
        Some(label) => match app.select_label(label) {
            Ok(backend) => app.notify(format!("Model set: {backend}")),
            Err(err) => app.notify(format!("Model error: {err}")),
        },
    }
    CommandResult::Continue
}

pub(super) fn handle_status(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Status
}

pub async fn report_status(app: &mut App) {
    let result = status_from_system(app.models(), app.processes.as_ref()).await;
    match result {
        Ok(report) => app.notify(report.to_string()),
        Err(err) => app.notify(format!("Status error: {err}")),
    }
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = match invocation.rest() {
        None => app.session.logging.toggle_logging(),
        Some(filename) if filename.split_whitespace().count() == 1 => {
            app.session.logging.set_log_file(filename.to_string())
        }
        Some(_) => return usage_status(app, "/log [filename]"),
    };
    match result {
        Ok(message) => app.notify(message),
        Err(err) => app.notify(format!("Log error: {err}")),
    }
    CommandResult::Continue
}

pub(super) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

#[cfg(test)]
mod tests;
