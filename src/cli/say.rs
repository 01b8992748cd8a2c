//! Interactive-free "say" command

use std::error::Error;
use std::path::PathBuf;

use crate::core::app::App;
use crate::core::config::Config;

pub async fn run_say(
    config: &Config,
    prompt: Vec<String>,
    backend: Option<String>,
    dir: Option<PathBuf>,
    log_file: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err("Usage: switchboard say <prompt>".into());
    }

    let mut app = App::from_config(config, dir, log_file);
    if let Some(label) = backend.or_else(|| config.default_backend.clone()) {
        app.select_label(&label)?;
    }

    let conversation = app
        .session
        .submit_selected(&prompt)
        .await
        .map_err(|err| format!("{err} Pass -m <backend> or run `switchboard set default-backend <backend>`."))?;

    if let Some(reply) = conversation.last() {
        println!("{}", reply.message);
    }
    Ok(())
}
