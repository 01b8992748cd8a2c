use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    /// Remaining text after the command name, `None` when blank.
    pub fn rest(&self) -> Option<&'a str> {
        let args = self.args.trim();
        (!args.is_empty()).then_some(args)
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handle_help,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Start over with an empty transcript.",
        handler: super::handle_clear,
    },
    Command {
        name: "save",
        usage: "/save [filename]",
        help: "Save the transcript; without a name, reuse the loaded file or generate a title.",
        handler: super::handle_save,
    },
    Command {
        name: "load",
        usage: "/load <filename>",
        help: "Replace the transcript with a saved conversation.",
        handler: super::handle_load,
    },
    Command {
        name: "list",
        usage: "/list",
        help: "List saved conversations.",
        handler: super::handle_list,
    },
    Command {
        name: "model",
        usage: "/model [backend]",
        help: "Show the backend choices or select one (e.g. /model Ollama llama3.2).",
        handler: super::handle_model,
    },
    Command {
        name: "status",
        usage: "/status",
        help: "Compare configured local models with installed ones.",
        handler: super::handle_status,
    },
    Command {
        name: "log",
        usage: "/log [filename]",
        help: "Toggle transcript logging or set the log file.",
        handler: super::handle_log,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handle_quit,
    },
];
