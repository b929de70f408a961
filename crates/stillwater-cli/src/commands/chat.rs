use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Subcommand;
use stillwater_core::storage::keyring_store;
use stillwater_core::{ChatCompanion, Config, OpenAiChatClient};

use super::{runtime, CmdResult};

#[derive(Subcommand)]
pub enum ChatAction {
    /// Send one message and print the reply
    Say { message: String },
    /// Interactive conversation; an empty line ends it
    Session,
    /// Store the API key in the OS keyring
    SetKey { key: String },
    /// Remove the stored API key
    ClearKey,
}

pub fn run(action: ChatAction) -> CmdResult {
    match action {
        ChatAction::Say { message } => {
            let mut companion = companion()?;
            println!("{}", runtime()?.block_on(companion.reply(&message)));
        }
        ChatAction::Session => {
            let mut companion = companion()?;
            let rt = runtime()?;
            let mut lines = std::io::stdin().lock().lines();
            loop {
                print!("> ");
                std::io::stdout().flush()?;
                let Some(line) = lines.next() else { break };
                let line = line?;
                let text = line.trim();
                if text.is_empty() {
                    break;
                }
                println!("{}\n", rt.block_on(companion.reply(text)));
            }
        }
        ChatAction::SetKey { key } => {
            keyring_store::set(keyring_store::CHAT_API_KEY, &key)?;
            println!("API key stored");
        }
        ChatAction::ClearKey => {
            keyring_store::delete(keyring_store::CHAT_API_KEY)?;
            println!("API key removed");
        }
    }
    Ok(())
}

fn companion() -> Result<ChatCompanion, Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let client = Arc::new(OpenAiChatClient::from_config(&config.chat)?);
    Ok(ChatCompanion::from_config(client, &config.chat))
}
