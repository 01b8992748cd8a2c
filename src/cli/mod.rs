//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod model_list;
pub mod say;
pub mod settings;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cli::model_list::{list_backends, list_saved, print_status};
use crate::cli::say::run_say;
use crate::cli::settings::{set_value, unset_value};
use crate::core::config::Config;
use crate::ui::chat_loop::{run_chat, ChatOptions};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("VERGEN_GIT_DESCRIBE"),
    "\nbuilt: ",
    env!("VERGEN_BUILD_DATE"),
    "\ntarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

#[derive(Parser)]
#[command(name = "switchboard")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat front-end for local Ollama models and Azure OpenAI")]
#[command(
    long_about = "Switchboard routes one conversation to a choice of backends: any locally \
installed Ollama model, or an Azure OpenAI deployment. Conversations can be saved to and \
loaded from JSON files.\n\n\
Environment Variables:\n\
  AZURE_OPENAI_ENDPOINT   Azure OpenAI endpoint URL (enables the cloud backend)\n\
  AZURE_OPENAI_API_KEY    Azure OpenAI API key (enables the cloud backend)\n\
  RUST_LOG                Diagnostic log filter (default: warn)\n\n\
Commands inside the chat:\n\
  /model [backend]  Show or select the backend, e.g. /model Ollama llama3.2\n\
  /save [filename]  Save the conversation (auto-named when no file is loaded)\n\
  /load <filename>  Load a saved conversation\n\
  /help             Show all commands"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend to select at startup, e.g. "Ollama llama3.2" or "AzureOpen AI"
    #[arg(short = 'm', long, global = true, value_name = "BACKEND")]
    pub model: Option<String>,

    /// Mirror the transcript to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Directory for saved conversations (defaults to the configured one)
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Skip launching local runtimes at startup
    #[arg(long, global = true)]
    pub no_start: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Compare configured local models with the installed ones
    Status,
    /// List saved conversations
    List,
    /// List the backends offered in the model selector
    Models,
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text (multiple words are joined)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set configuration values
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (several values for `models`)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Reset a configuration value to its default
    Unset {
        /// Configuration key to unset
        key: String,
    },
    /// Print the current configuration
    Config,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            run_chat(
                config,
                ChatOptions {
                    backend: args.model,
                    log_file: args.log,
                    conversations_dir: args.dir,
                    start_runtimes: !args.no_start,
                },
            )
            .await
        }
        Commands::Status => print_status(&Config::load()?).await,
        Commands::List => list_saved(&Config::load()?, args.dir),
        Commands::Models => {
            list_backends(&Config::load()?);
            Ok(())
        }
        Commands::Say { prompt } => {
            run_say(&Config::load()?, prompt, args.model, args.dir, args.log).await
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let message = set_value(&mut config, &key, &value)?;
            config.save()?;
            println!("✅ {message}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            let message = unset_value(&mut config, &key)?;
            config.save()?;
            println!("✅ {message}");
            Ok(())
        }
        Commands::Config => {
            let config = Config::load()?;
            config.print_all();
            if let Ok(path) = Config::get_config_path() {
                println!();
                println!("Config file: {}", crate::core::config::data::path_display(path));
            }
            Ok(())
        }
    }
}
